//! Per-project sandbox image builder for the Clowdy invocation core.
//!
//! Builds and caches content-addressed sandbox images on top of the
//! default runtime image whenever a project's dependency manifest
//! changes, reusing [`clowdy_sandbox`]'s engine socket and transport
//! rather than opening a second connection path to the engine.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod builder;
pub mod error;
pub mod hash;

pub use builder::{BuildOutcome, ImageBuilder};
pub use error::BuildError;
pub use hash::{hash_manifest, image_name};
