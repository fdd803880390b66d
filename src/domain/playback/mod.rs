// SPDX-License-Identifier: MPL-2.0
//! Playback domain types.
//!
//! This module contains the playable unit, its presentations and the
//! value objects the engine state is built from. None of them depend on a
//! concrete playback backend.

pub mod atom;
pub mod newtypes;
pub mod status;

pub use atom::{ContentAtom, Modality};
pub use newtypes::{PlaybackRate, SeekStep, Volume};
pub use status::PlaybackStatus;
