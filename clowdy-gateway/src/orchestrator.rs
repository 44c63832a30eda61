//! Invoke Orchestrator — the single entry point for running a function.
//!
//! Owns the warm→cold fallback, delegates actual execution to
//! [`clowdy_sandbox::Worker`], and decides whether the sandbox is released
//! back to the pool or destroyed based on how execution ended.

use std::time::Instant;

use indexmap::IndexMap;

use clowdy_core::PoolKey;
use clowdy_sandbox::{DriverError, SandboxDriver, Worker, WorkerError};

use crate::pool::Pool;

/// Default image used when the caller does not specify one.
pub const DEFAULT_IMAGE: &str = "clowdy-python-runtime";

/// Result of one [`Orchestrator::invoke`] call.
#[derive(Debug, Clone)]
pub struct InvokeResult {
    pub success: bool,
    pub output: String,
    pub duration_ms: u64,
    pub cold_start: bool,
    pub timed_out: bool,
}

/// The invocation orchestrator: warm→cold fallback, execute, release or
/// destroy.
pub struct Orchestrator<D: SandboxDriver> {
    pool: std::sync::Arc<Pool<D>>,
}

impl<D: SandboxDriver> Orchestrator<D> {
    #[must_use]
    pub fn new(pool: std::sync::Arc<Pool<D>>) -> Self {
        Self { pool }
    }

    /// Run `code` against `event` inside a warm or freshly created sandbox.
    #[allow(clippy::too_many_arguments)]
    pub async fn invoke(
        &self,
        code: &str,
        input_json: &str,
        function_name: &str,
        env: &IndexMap<String, String>,
        database_url: Option<&str>,
        image: Option<&str>,
        network_enabled: bool,
    ) -> InvokeResult {
        let t0 = Instant::now();
        let image = image.unwrap_or(DEFAULT_IMAGE);
        let key = PoolKey::new(image, network_enabled);

        let (handle, cold_start) = match self.pool.acquire(&key) {
            Some(handle) => (handle, false),
            None => match self.pool.placement().create(image, network_enabled).await {
                Ok(handle) => (handle, true),
                Err(e) => return Self::driver_error_result(&e, t0),
            },
        };

        let worker = Worker::new(self.pool.placement().driver());
        let outcome = worker.execute(&handle, code, function_name, input_json, env, database_url).await;

        match outcome {
            Ok(outcome) if outcome.exit_code == clowdy_sandbox::config::TIMEOUT_SENTINEL => {
                self.pool.placement().destroy(handle).await;
                InvokeResult {
                    success: false,
                    output: format!(
                        "Function timed out after {} seconds",
                        clowdy_sandbox::config::EXEC_TIMEOUT.as_secs()
                    ),
                    duration_ms: as_millis(t0),
                    cold_start,
                    timed_out: true,
                }
            }
            Ok(outcome) => {
                self.pool.release(handle, key).await;
                InvokeResult {
                    success: outcome.success,
                    output: shape_output(&outcome),
                    duration_ms: as_millis(t0),
                    cold_start,
                    timed_out: false,
                }
            }
            Err(WorkerError::Driver(e)) => {
                self.pool.placement().destroy(handle).await;
                InvokeResult {
                    success: false,
                    output: e.to_string(),
                    duration_ms: as_millis(t0),
                    cold_start,
                    timed_out: false,
                }
            }
            Err(e) => {
                self.pool.placement().destroy(handle).await;
                InvokeResult {
                    success: false,
                    output: e.to_string(),
                    duration_ms: as_millis(t0),
                    cold_start,
                    timed_out: false,
                }
            }
        }
    }

    fn driver_error_result(error: &DriverError, t0: Instant) -> InvokeResult {
        let output = match error {
            DriverError::EngineUnavailable { reason } => {
                format!("sandbox engine unavailable: {reason}")
            }
            DriverError::ImageMissing { image } if image == DEFAULT_IMAGE => {
                format!("image '{image}' is missing; build the default runtime image")
            }
            DriverError::ImageMissing { image } => {
                format!("image '{image}' is missing; the project image must be rebuilt")
            }
            other => other.to_string(),
        };
        InvokeResult {
            success: false,
            output,
            duration_ms: as_millis(t0),
            cold_start: false,
            timed_out: false,
        }
    }
}

fn as_millis(t0: Instant) -> u64 {
    u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Parse a worker outcome's stdout/stderr into the output string per the
/// success/failure extraction rules.
fn shape_output(outcome: &clowdy_sandbox::WorkerOutcome) -> String {
    let stdout = String::from_utf8_lossy(&outcome.stdout);
    let stderr = String::from_utf8_lossy(&outcome.stderr);

    if outcome.success {
        return stdout.trim().to_owned();
    }

    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(stdout.trim()) {
        if let Some(error) = parsed.get("error").and_then(serde_json::Value::as_str) {
            return error.to_owned();
        }
    }

    if !stdout.trim().is_empty() {
        return stdout.trim().to_owned();
    }
    if !stderr.trim().is_empty() {
        return stderr.trim().to_owned();
    }
    format!("function exited with code {}", outcome.exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clowdy_sandbox::{ExecOutcome, SandboxHandle};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct ScriptedDriver {
        exit_code: i32,
        stdout: Vec<u8>,
        created: AtomicUsize,
        destroyed: AtomicUsize,
    }

    #[async_trait]
    impl SandboxDriver for ScriptedDriver {
        async fn create(&self, _image: &str, _network_enabled: bool) -> Result<SandboxHandle, DriverError> {
            let n = self.created.fetch_add(1, Ordering::SeqCst);
            Ok(SandboxHandle::new(format!("s{n}")))
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
            Ok(ExecOutcome { exit_code: self.exit_code, stdout: self.stdout.clone(), stderr: Vec::new() })
        }

        async fn destroy(&self, _handle: SandboxHandle) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }

        async fn engine_reachable(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn first_invocation_is_cold_second_is_warm() {
        let driver = ScriptedDriver {
            exit_code: 0,
            stdout: b"{\"msg\":\"hi\"}".to_vec(),
            created: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
        };
        let pool = Arc::new(Pool::new(driver));
        let orchestrator = Orchestrator::new(pool);

        let first = orchestrator
            .invoke("code", "{}", "fn", &IndexMap::new(), None, None, false)
            .await;
        assert!(first.cold_start);

        let second = orchestrator
            .invoke("code", "{}", "fn", &IndexMap::new(), None, None, false)
            .await;
        assert!(!second.cold_start);
    }

    #[tokio::test]
    async fn worker_exception_destroys_sandbox_not_release() {
        struct FailingExecDriver;

        #[async_trait]
        impl SandboxDriver for FailingExecDriver {
            async fn create(
                &self,
                _image: &str,
                _network_enabled: bool,
            ) -> Result<SandboxHandle, DriverError> {
                Ok(SandboxHandle::new("s1"))
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
                Err(DriverError::Api("engine blew up".to_owned()))
            }

            async fn destroy(&self, _handle: SandboxHandle) {}

            async fn engine_reachable(&self) -> bool {
                true
            }
        }

        let pool = Arc::new(Pool::new(FailingExecDriver));
        let orchestrator = Orchestrator::new(pool.clone());

        let result = orchestrator
            .invoke("code", "{}", "fn", &IndexMap::new(), None, None, false)
            .await;

        assert!(!result.success);
        assert_eq!(pool.stats().total, 0, "sandbox must not be released back to the pool");
    }

    #[tokio::test]
    async fn clean_user_error_still_releases_sandbox() {
        let driver = ScriptedDriver {
            exit_code: 1,
            stdout: b"{\"error\":\"boom\"}".to_vec(),
            created: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
        };
        let pool = Arc::new(Pool::new(driver));
        let orchestrator = Orchestrator::new(pool.clone());

        let result = orchestrator
            .invoke("code", "{}", "fn", &IndexMap::new(), None, None, false)
            .await;

        assert!(!result.success);
        assert_eq!(result.output, "boom");
        assert_eq!(pool.stats().total, 1, "clean user error must still release the sandbox");
    }

    #[tokio::test]
    async fn timeout_sentinel_destroys_sandbox_and_reports_timeout_message() {
        let driver = ScriptedDriver {
            exit_code: clowdy_sandbox::config::TIMEOUT_SENTINEL,
            stdout: Vec::new(),
            created: AtomicUsize::new(0),
            destroyed: AtomicUsize::new(0),
        };
        let pool = Arc::new(Pool::new(driver));
        let orchestrator = Orchestrator::new(pool.clone());

        let result = orchestrator
            .invoke("code", "{}", "fn", &IndexMap::new(), None, None, false)
            .await;

        assert!(!result.success);
        assert!(result.output.contains("timed out"));
        assert_eq!(pool.stats().total, 0);
    }
}
