//! HTTP gateway for the Clowdy invocation core.
//!
//! Routes external HTTP requests into the invoke orchestrator: matches
//! pattern-based routes, synthesizes the canonical event object, resolves
//! per-project context, and shapes the function's return value back into
//! an HTTP response.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod context;
pub mod error;
pub mod event;
pub mod orchestrator;
pub mod pool;
pub mod response;
pub mod router;
pub mod routes;
pub mod store;

pub use context::{ContextResolver, ResolvedContext};
pub use error::GatewayError;
pub use orchestrator::{InvokeResult, Orchestrator};
pub use pool::Pool;
pub use routes::{create_router, AppState};
