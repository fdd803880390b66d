// SPDX-License-Identifier: MPL-2.0
//! Playback engine.
//!
//! - [`progress`]: pure time/percent arithmetic
//! - [`adapter`]: owns the playable element and normalizes its events
//! - [`switcher`]: watch ⇄ listen source swaps
//! - [`store`]: the state container every surface talks to
//! - [`surface`]: the contract presentation surfaces implement

pub mod adapter;
pub mod progress;
pub mod snapshot;
pub mod store;
pub mod surface;
pub mod switcher;

pub use adapter::{MediaElementAdapter, MediaEvent};
pub use snapshot::{PlaybackSnapshot, PlaybackState};
pub use store::PlaybackStore;
pub use surface::{Surface, SurfaceKind, SurfaceSet};
pub use switcher::{ModalitySwitcher, SwitchProgress, SwitchRequest, SwitchResult};
