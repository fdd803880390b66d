// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that playback backends implement.
//! A browser `<video>`/`<audio>` binding, a native decoder or the in-memory
//! simulation all plug in behind the same traits.
//!
//! # Available Ports
//!
//! - [`media_element`]: The native playable element and its factory
//!
//! # Design Notes
//!
//! - Methods are not `async`: element I/O is reported back as
//!   [`NativeEvent`]s through a [`NativeEventSink`]
//! - Elements are not required to be `Send`; the engine is single-threaded

pub mod media_element;

pub use media_element::{
    ElementFactory, MediaElement, NativeEnvelope, NativeEvent, NativeEventSink, PlayRejection,
    SessionId, TimeRange,
};
