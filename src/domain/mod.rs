// SPDX-License-Identifier: MPL-2.0
//! Domain layer - core playback types with no I/O.
//!
//! This module contains pure domain types, value objects, and business rules
//! that the engine, the element port, and the presentation surfaces share.
//!
//! # Modules
//!
//! - [`playback`]: Playback types ([`ContentAtom`](playback::ContentAtom),
//!   [`Modality`](playback::Modality), [`PlaybackStatus`](playback::PlaybackStatus),
//!   [`Volume`](playback::Volume), [`PlaybackRate`](playback::PlaybackRate),
//!   [`SeekStep`](playback::SeekStep))

pub mod playback;
