// SPDX-License-Identifier: MPL-2.0
//! Application layer - ports the engine depends on.
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - The playback engine only talks to backends through these ports

pub mod port;
