// SPDX-License-Identifier: MPL-2.0
//! Read model handed to presentation surfaces.

use super::progress;
use crate::domain::playback::{ContentAtom, Modality, PlaybackRate, PlaybackStatus, Volume};
use std::sync::Arc;

/// Mutable playback state owned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Modality whose source is loaded. Only changes once a switch completed.
    pub modality: Modality,
    pub is_playing: bool,
    /// Seconds, always within `[0, duration]`.
    pub current_time: f64,
    /// Seconds, 0 until metadata loads.
    pub duration: f64,
    /// 0–100, never decreasing within one load cycle.
    pub buffered_percent: f64,
    pub volume: Volume,
    pub is_muted: bool,
    pub playback_rate: PlaybackRate,
    pub is_minimized: bool,
    pub is_visible: bool,
    pub status: PlaybackStatus,
    /// Set only while `status` is `Error`.
    pub error_message: Option<String>,
    /// The element refused to play without a user gesture.
    pub autoplay_blocked: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            modality: Modality::Watch,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            buffered_percent: 0.0,
            volume: Volume::default(),
            is_muted: false,
            playback_rate: PlaybackRate::default(),
            is_minimized: false,
            is_visible: false,
            status: PlaybackStatus::Idle,
            error_message: None,
            autoplay_blocked: false,
        }
    }
}

/// Everything a surface needs to render, derived from one store state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub atom: Option<Arc<ContentAtom>>,
    pub state: PlaybackState,
    /// Target of an in-flight modality switch. `state.modality` keeps
    /// naming the loaded source until the switch completes.
    pub switching_to: Option<Modality>,
    pub formatted_current_time: String,
    pub formatted_duration: String,
    pub progress_percent: f64,
}

impl PlaybackSnapshot {
    pub(crate) fn new(
        atom: Option<Arc<ContentAtom>>,
        state: PlaybackState,
        switching_to: Option<Modality>,
    ) -> Self {
        Self {
            formatted_current_time: progress::format_time(state.current_time),
            formatted_duration: progress::format_time(state.duration),
            progress_percent: progress::percent_from_time(state.current_time, state.duration),
            atom,
            state,
            switching_to,
        }
    }

    /// Title line for compact surfaces: `course · lesson`, or the lesson alone.
    #[must_use]
    pub fn display_title(&self) -> Option<String> {
        let atom = self.atom.as_ref()?;
        Some(match atom.course_title.as_deref() {
            Some(course) if !course.trim().is_empty() => format!("{course} · {}", atom.title),
            _ => atom.title.clone(),
        })
    }

    /// Returns true if the other modality is available for the loaded atom.
    #[must_use]
    pub fn can_switch(&self) -> bool {
        self.atom
            .as_ref()
            .is_some_and(|atom| atom.supports(self.state.modality.other()))
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self::new(None, PlaybackState::default(), None)
    }
}
