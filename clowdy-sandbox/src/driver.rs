//! Sandbox driver contract.
//!
//! A thin, single-owner wrapper over a container engine. Every engine
//! credential and socket discovery decision lives behind an implementation
//! of this trait — the rest of the core never talks to the engine
//! directly.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::DriverError;
use crate::handle::SandboxHandle;

/// Result of a single `exec` call inside a sandbox.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Contract over a container engine: create, inject, exec, destroy.
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Cancel Safety
/// `exec` is cancel safe with respect to sandbox state: dropping the
/// future does not corrupt the sandbox, though the in-flight command may
/// keep running until the engine's own timeout.
#[async_trait]
pub trait SandboxDriver: Send + Sync {
    /// Create and start a sandbox running a no-op keep-alive command.
    ///
    /// Applies the fixed resource profile (memory cap, CPU cap) and
    /// disables networking unless `network_enabled` is set.
    ///
    /// # Errors
    /// Returns [`DriverError::ImageMissing`] if `image` does not exist, or
    /// [`DriverError::EngineUnavailable`] if the engine cannot be reached.
    async fn create(&self, image: &str, network_enabled: bool) -> Result<SandboxHandle, DriverError>;

    /// Place `content` as a file at `dir/filename` inside the sandbox, as a
    /// single tar-stream upload. Idempotent — overwriting the same path is
    /// allowed.
    ///
    /// # Errors
    /// Returns [`DriverError::Api`] if the engine rejects the upload.
    async fn inject(
        &self,
        handle: &SandboxHandle,
        dir: &str,
        filename: &str,
        content: &str,
    ) -> Result<(), DriverError>;

    /// Run `argv` inside the sandbox with the merged environment, subject
    /// to `timeout`. Exceeding `timeout` terminates the in-sandbox process
    /// and returns `exit_code = `[`crate::config::TIMEOUT_SENTINEL`].
    ///
    /// # Errors
    /// Returns [`DriverError::Api`] or [`DriverError::EngineUnavailable`]
    /// if the exec call itself cannot be made (distinct from the *command*
    /// failing, which is reported via `exit_code`).
    async fn exec(
        &self,
        handle: &SandboxHandle,
        argv: &[String],
        env: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<ExecOutcome, DriverError>;

    /// Best-effort destroy. Never fails the caller.
    async fn destroy(&self, handle: SandboxHandle);

    /// Cheap liveness probe.
    async fn engine_reachable(&self) -> bool;
}
