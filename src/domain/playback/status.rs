// SPDX-License-Identifier: MPL-2.0
//! Playback status state machine.
//!
//! ```text
//! Idle → Loading → Ready → {Playing ⇄ Paused ⇄ Buffering} → Ended
//! ```
//!
//! `Error` is reachable from any state except `Idle` and goes back to
//! `Loading` through an explicit retry or a new load.

use std::fmt;

/// Represents the current playback status of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Nothing loaded, player hidden.
    #[default]
    Idle,
    /// A source is loading, duration not yet known.
    Loading,
    /// Metadata loaded, playback not started.
    Ready,
    /// Media is playing.
    Playing,
    /// Media is paused at the current position.
    Paused,
    /// Playback stalled waiting for data.
    Buffering,
    /// The playhead reached the end.
    Ended,
    /// Loading or playback failed.
    Error,
}

impl PlaybackStatus {
    /// Returns true if the engine is in the error state.
    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Returns true once metadata is known for the current source.
    #[must_use]
    pub fn has_metadata(self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Playing | Self::Paused | Self::Buffering | Self::Ended
        )
    }

    /// Returns true if the status belongs to the play/pause/buffering cycle.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused | Self::Buffering)
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Buffering => "buffering",
            Self::Ended => "ended",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(PlaybackStatus::default(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_state_checks() {
        assert!(PlaybackStatus::Error.is_error());
        assert!(!PlaybackStatus::Ended.is_error());
    }

    #[test]
    fn test_has_metadata() {
        assert!(!PlaybackStatus::Idle.has_metadata());
        assert!(!PlaybackStatus::Loading.has_metadata());
        assert!(PlaybackStatus::Ready.has_metadata());
        assert!(PlaybackStatus::Ended.has_metadata());
        assert!(!PlaybackStatus::Error.has_metadata());
    }

    #[test]
    fn test_is_active() {
        assert!(PlaybackStatus::Playing.is_active());
        assert!(PlaybackStatus::Buffering.is_active());
        assert!(PlaybackStatus::Paused.is_active());
        assert!(!PlaybackStatus::Ready.is_active());
        assert!(!PlaybackStatus::Ended.is_active());
    }
}
