// SPDX-License-Identifier: MPL-2.0
//! `course_player` is a persistent cross-modal playback engine for course
//! content.
//!
//! One [`PlaybackStore`](player::PlaybackStore) keeps a single "now playing"
//! item in sync across a playable element, the two interchangeable sources
//! of a lesson (watch the video or listen to the audio) and every surface
//! rendering it (mini player, bottom bar, expanded view).

#![doc(html_root_url = "https://docs.rs/course_player/0.3.0")]

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod player;

#[cfg(test)]
mod test_utils;
