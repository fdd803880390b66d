// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the engine. Constants are organized by category.
//!
//! # Categories
//!
//! - **Volume**: Playback volume settings
//! - **Playback rate**: Accepted rate presets
//! - **Seeking**: Skip step, time sync threshold, end-of-media tolerance
//! - **Modality switch**: Bounded wait for source metadata

// ==========================================================================
// Volume Defaults
// ==========================================================================

/// Default playback volume (0.0 to 1.0).
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Minimum volume level.
pub const MIN_VOLUME: f32 = 0.0;

/// Maximum volume level.
pub const MAX_VOLUME: f32 = 1.0;

/// Volume adjustment step per key press (5%).
pub const VOLUME_STEP: f32 = 0.05;

// ==========================================================================
// Playback Rate Defaults
// ==========================================================================

/// The only playback rates the engine accepts, in ascending order.
pub const PLAYBACK_RATE_PRESETS: &[f64] = &[0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Default playback rate (normal speed).
pub const DEFAULT_PLAYBACK_RATE: f64 = 1.0;

// ==========================================================================
// Seeking Defaults
// ==========================================================================

/// Default skip step for skip forward/backward (in seconds).
pub const DEFAULT_SEEK_STEP_SECS: f64 = 10.0;

/// Minimum skip step (in seconds).
pub const MIN_SEEK_STEP_SECS: f64 = 1.0;

/// Maximum skip step (in seconds).
pub const MAX_SEEK_STEP_SECS: f64 = 60.0;

/// Divergence between requested and element-reported time above which a
/// seek is pushed down to the element.
pub const TIME_SYNC_THRESHOLD_SECS: f64 = 0.5;

/// Distance from the end within which `play()` restarts from the beginning.
pub const END_RESTART_TOLERANCE_SECS: f64 = 0.1;

// ==========================================================================
// Modality Switch Defaults
// ==========================================================================

/// Default bounded wait for metadata while switching modality (in seconds).
pub const DEFAULT_SWITCH_TIMEOUT_SECS: u64 = 15;

/// Minimum switch timeout (in seconds).
pub const MIN_SWITCH_TIMEOUT_SECS: u64 = 1;

/// Maximum switch timeout (in seconds).
pub const MAX_SWITCH_TIMEOUT_SECS: u64 = 120;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    // Volume validation
    assert!(MIN_VOLUME >= 0.0);
    assert!(MAX_VOLUME > MIN_VOLUME);
    assert!(DEFAULT_VOLUME >= MIN_VOLUME);
    assert!(DEFAULT_VOLUME <= MAX_VOLUME);
    assert!(VOLUME_STEP > 0.0);

    // Rate validation
    assert!(DEFAULT_PLAYBACK_RATE > 0.0);
    assert!(!PLAYBACK_RATE_PRESETS.is_empty());

    // Seek validation
    assert!(MIN_SEEK_STEP_SECS > 0.0);
    assert!(MAX_SEEK_STEP_SECS >= MIN_SEEK_STEP_SECS);
    assert!(DEFAULT_SEEK_STEP_SECS >= MIN_SEEK_STEP_SECS);
    assert!(DEFAULT_SEEK_STEP_SECS <= MAX_SEEK_STEP_SECS);
    assert!(TIME_SYNC_THRESHOLD_SECS > 0.0);
    assert!(END_RESTART_TOLERANCE_SECS < TIME_SYNC_THRESHOLD_SECS);

    // Switch timeout validation
    assert!(MIN_SWITCH_TIMEOUT_SECS > 0);
    assert!(MAX_SWITCH_TIMEOUT_SECS >= MIN_SWITCH_TIMEOUT_SECS);
    assert!(DEFAULT_SWITCH_TIMEOUT_SECS >= MIN_SWITCH_TIMEOUT_SECS);
    assert!(DEFAULT_SWITCH_TIMEOUT_SECS <= MAX_SWITCH_TIMEOUT_SECS);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_defaults_are_valid() {
        assert_eq!(DEFAULT_VOLUME, 1.0);
        assert!(DEFAULT_VOLUME >= MIN_VOLUME);
        assert!(DEFAULT_VOLUME <= MAX_VOLUME);
    }

    #[test]
    fn rate_presets_are_sorted_and_contain_default() {
        assert!(PLAYBACK_RATE_PRESETS.windows(2).all(|w| w[0] < w[1]));
        assert!(PLAYBACK_RATE_PRESETS.contains(&DEFAULT_PLAYBACK_RATE));
        assert_eq!(PLAYBACK_RATE_PRESETS.len(), 6);
    }

    #[test]
    fn seek_defaults_are_valid() {
        assert_eq!(DEFAULT_SEEK_STEP_SECS, 10.0);
        assert_eq!(TIME_SYNC_THRESHOLD_SECS, 0.5);
    }

    #[test]
    fn switch_timeout_defaults_are_valid() {
        assert_eq!(DEFAULT_SWITCH_TIMEOUT_SECS, 15);
        assert!(DEFAULT_SWITCH_TIMEOUT_SECS <= MAX_SWITCH_TIMEOUT_SECS);
    }
}
