//! Sandbox handle — an owned reference to a running, long-lived sandbox.

use chrono::{DateTime, Utc};

/// A handle to a running sandbox.
///
/// Exactly three disposal paths exist for a handle: the warm pool's
/// `release`, the pool's eviction/reap/shutdown destroy, or the
/// orchestrator's post-failure destroy. Dropping this value does **not**
/// destroy the sandbox — call [`crate::driver::SandboxDriver::destroy`]
/// explicitly.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct SandboxHandle {
    /// Engine-assigned container id.
    pub id: String,
    /// When this sandbox was created.
    pub created_at: DateTime<Utc>,
}

impl SandboxHandle {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), created_at: Utc::now() }
    }
}
