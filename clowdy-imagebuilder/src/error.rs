//! Error types for the image builder crate.

/// Errors produced while building or pruning a project's sandbox image.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("container engine unavailable: {0}")]
    Driver(#[from] clowdy_sandbox::DriverError),

    /// The build request completed but the engine reported a failed build.
    /// Carries the trailing log lines from the build stream.
    #[error("image build failed: {0}")]
    BuildFailed(String),
}
