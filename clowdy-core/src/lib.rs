//! Core types for the Clowdy function-as-a-service invocation fabric.
//!
//! Defines the entities the invocation core reads and writes — functions,
//! versions, projects, env vars, routes, and invocation log entries — plus
//! the pool key shared by the sandbox driver and the gateway's warm pool.
//! Persistent storage of these entities is out of scope: this crate only
//! defines their shape.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod id;
pub mod model;
pub mod pool_key;

pub use error::CoreError;
pub use id::{FunctionId, InvocationId, ProjectId, RouteId};
pub use model::{
    EnvVar, Function, FunctionStatus, FunctionVersion, HttpMethod, Invocation, InvocationSource,
    InvocationStatus, Project, Route,
};
pub use pool_key::PoolKey;
