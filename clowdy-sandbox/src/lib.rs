//! Sandbox driver, worker, and placement for the Clowdy invocation core.
//!
//! This crate talks to exactly one container engine (Docker, over its Unix
//! socket API) and exposes three layers on top of it:
//! - [`driver`]: the engine-facing contract ([`driver::SandboxDriver`]).
//! - [`worker`]: runs a single invocation inside an already-created
//!   sandbox.
//! - [`placement`]: a stateless create/destroy façade used by the
//!   gateway's pool.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod docker;
pub mod driver;
pub mod error;
pub mod handle;
pub mod placement;
pub mod socket;
pub mod transport;
pub mod worker;

pub use docker::DockerDriver;
pub use driver::{ExecOutcome, SandboxDriver};
pub use error::{DriverError, WorkerError};
pub use handle::SandboxHandle;
pub use placement::Placement;
pub use socket::discover as discover_socket;
pub use worker::{Worker, WorkerOutcome};
