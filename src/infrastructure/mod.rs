// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! Concrete implementations of the port traits defined in
//! `application::port`.
//!
//! - [`simulated`]: clock-driven in-memory element (implements [`MediaElement`])
//!
//! [`MediaElement`]: crate::application::port::MediaElement

pub mod simulated;

pub use simulated::{SimulatedController, SimulatedElement, SimulatedFactory};
