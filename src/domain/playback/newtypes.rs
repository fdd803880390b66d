// SPDX-License-Identifier: MPL-2.0
//! Playback newtypes.
//!
//! This module provides type-safe wrappers for playback values,
//! ensuring they are always within valid ranges.

use crate::config::defaults::{
    DEFAULT_PLAYBACK_RATE, DEFAULT_SEEK_STEP_SECS, DEFAULT_VOLUME, MAX_SEEK_STEP_SECS,
    MAX_VOLUME, MIN_SEEK_STEP_SECS, MIN_VOLUME, PLAYBACK_RATE_PRESETS, VOLUME_STEP,
};
use crate::error::PlaybackError;

/// Tolerance used when matching a float against the rate presets.
const RATE_EPSILON: f64 = 0.001;

// =============================================================================
// Volume
// =============================================================================

/// Volume level, guaranteed to be within valid range (0.0–1.0).
///
/// Non-finite input is treated as silence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume(f32);

impl Volume {
    /// Creates a new volume level, clamping to valid range.
    #[must_use]
    pub fn new(volume: f32) -> Self {
        if volume.is_nan() {
            return Self(MIN_VOLUME);
        }
        Self(volume.clamp(MIN_VOLUME, MAX_VOLUME))
    }

    /// Returns the volume value as f32.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Increases volume by one step, clamping to maximum.
    #[must_use]
    pub fn increase(self) -> Self {
        Self::new(self.0 + VOLUME_STEP)
    }

    /// Decreases volume by one step, clamping to minimum.
    #[must_use]
    pub fn decrease(self) -> Self {
        Self::new(self.0 - VOLUME_STEP)
    }

    #[must_use]
    pub fn is_min(self) -> bool {
        self.0 <= MIN_VOLUME
    }

    #[must_use]
    pub fn is_max(self) -> bool {
        self.0 >= MAX_VOLUME
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self(DEFAULT_VOLUME)
    }
}

// =============================================================================
// PlaybackRate
// =============================================================================

/// Playback rate, guaranteed to be one of [`PLAYBACK_RATE_PRESETS`].
///
/// Unlike volume, rates are never clamped: a value outside the preset list
/// is rejected so the caller can report the invalid argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackRate(f64);

impl PlaybackRate {
    /// Validates a rate against the preset list.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidArgument`] if `rate` is not a preset.
    pub fn try_new(rate: f64) -> Result<Self, PlaybackError> {
        PLAYBACK_RATE_PRESETS
            .iter()
            .find(|&&preset| (preset - rate).abs() < RATE_EPSILON)
            .map(|&preset| Self(preset))
            .ok_or_else(|| {
                PlaybackError::InvalidArgument(format!(
                    "playback rate {rate} is not one of {PLAYBACK_RATE_PRESETS:?}"
                ))
            })
    }

    /// Returns the rate value as f64.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Returns the next higher preset rate, or self if at maximum.
    #[must_use]
    pub fn increase(self) -> Self {
        let next = PLAYBACK_RATE_PRESETS
            .iter()
            .find(|&&r| r > self.0 + RATE_EPSILON)
            .copied()
            .unwrap_or(self.0);
        Self(next)
    }

    /// Returns the next lower preset rate, or self if at minimum.
    #[must_use]
    pub fn decrease(self) -> Self {
        let prev = PLAYBACK_RATE_PRESETS
            .iter()
            .rev()
            .find(|&&r| r < self.0 - RATE_EPSILON)
            .copied()
            .unwrap_or(self.0);
        Self(prev)
    }

    #[must_use]
    pub fn is_min(self) -> bool {
        PLAYBACK_RATE_PRESETS
            .first()
            .is_some_and(|&min| (self.0 - min).abs() < RATE_EPSILON)
    }

    #[must_use]
    pub fn is_max(self) -> bool {
        PLAYBACK_RATE_PRESETS
            .last()
            .is_some_and(|&max| (self.0 - max).abs() < RATE_EPSILON)
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self(DEFAULT_PLAYBACK_RATE)
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = PlaybackError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        Self::try_new(rate)
    }
}

// =============================================================================
// SeekStep
// =============================================================================

/// Skip step in seconds for skip forward/backward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekStep(f64);

impl SeekStep {
    /// Creates a new seek step, clamping to valid range.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(MIN_SEEK_STEP_SECS, MAX_SEEK_STEP_SECS))
    }

    /// Returns the value as f64.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for SeekStep {
    fn default() -> Self {
        Self(DEFAULT_SEEK_STEP_SECS)
    }
}
