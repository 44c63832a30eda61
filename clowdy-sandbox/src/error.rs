//! Error types for the sandbox crate.

/// Errors surfaced by a [`crate::driver::SandboxDriver`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DriverError {
    /// The container engine cannot be reached at all (socket missing,
    /// connection refused, daemon not running).
    #[error("container engine unavailable: {reason}")]
    EngineUnavailable { reason: String },

    /// The requested image does not exist on the engine.
    #[error("image not found: {image}")]
    ImageMissing { image: String },

    /// The engine's management API returned an unexpected error.
    #[error("engine API error: {0}")]
    Api(String),

    /// Underlying I/O error (socket connect, archive build, ...).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by [`crate::worker::Worker::execute`].
///
/// Per the driver/worker contract: an injection failure or a non-zero user
/// exit is *not* an error here — it is reported as `success = false` inside
/// an `Ok(WorkerOutcome)`. A `WorkerError` means the sandbox itself is
/// presumed corrupted and must be destroyed, not released.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WorkerError {
    /// The driver failed while running the bootstrap command.
    #[error("sandbox exec failed: {0}")]
    Driver(#[from] DriverError),
}
