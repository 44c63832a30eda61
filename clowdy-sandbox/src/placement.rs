//! Placement — owns a driver reference and exposes only sandbox
//! create/destroy, with no pool or scheduling state of its own.

use crate::driver::SandboxDriver;
use crate::error::DriverError;
use crate::handle::SandboxHandle;

/// Thin create/destroy façade over a [`SandboxDriver`].
///
/// Everything about *which* sandbox to reuse, evict, or keep warm lives in
/// the gateway's pool, not here — `Placement` has no memory between calls.
pub struct Placement<D: SandboxDriver> {
    driver: D,
}

impl<D: SandboxDriver> Placement<D> {
    #[must_use]
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// # Errors
    /// Returns [`DriverError`] if the underlying driver cannot create the
    /// sandbox.
    pub async fn create(&self, image: &str, network_enabled: bool) -> Result<SandboxHandle, DriverError> {
        self.driver.create(image, network_enabled).await
    }

    pub async fn destroy(&self, handle: SandboxHandle) {
        self.driver.destroy(handle).await;
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;
    use crate::driver::ExecOutcome;

    struct CountingDriver {
        destroyed: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl SandboxDriver for CountingDriver {
        async fn create(&self, _image: &str, _network_enabled: bool) -> Result<SandboxHandle, DriverError> {
            Ok(SandboxHandle::new("c1"))
        }

        async fn inject(
            &self,
            _handle: &SandboxHandle,
            _dir: &str,
            _filename: &str,
            _content: &str,
        ) -> Result<(), DriverError> {
            Ok(())
        }

        async fn exec(
            &self,
            _handle: &SandboxHandle,
            _argv: &[String],
            _env: &HashMap<String, String>,
            _timeout: Duration,
        ) -> Result<ExecOutcome, DriverError> {
            Ok(ExecOutcome { exit_code: 0, stdout: Vec::new(), stderr: Vec::new() })
        }

        async fn destroy(&self, _handle: SandboxHandle) {
            self.destroyed.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }

        async fn engine_reachable(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn destroy_delegates_to_driver() {
        let placement = Placement::new(CountingDriver { destroyed: std::sync::atomic::AtomicUsize::new(0) });
        let handle = placement.create("img", false).await.expect("create");
        placement.destroy(handle).await;
        assert_eq!(placement.driver().destroyed.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
