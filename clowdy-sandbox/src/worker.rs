//! Worker — runs one invocation inside an already-created sandbox.
//!
//! The worker owns exactly one responsibility: inject the function's code,
//! merge the environment, exec the bootstrap, and shape the result. It
//! never creates or destroys sandboxes — that belongs to the orchestrator
//! and the pool.

use indexmap::IndexMap;

use crate::config;
use crate::driver::SandboxDriver;
use crate::error::WorkerError;
use crate::handle::SandboxHandle;

/// Outcome of a single invocation.
///
/// `success = false` is not an error: it covers both a user function that
/// exited non-zero and a code-injection failure that never reached exec.
/// Either way the sandbox is still presumed healthy and may be released
/// back to the pool.
#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl WorkerOutcome {
    fn injection_failed(reason: &str) -> Self {
        Self {
            success: false,
            exit_code: -1,
            stdout: Vec::new(),
            stderr: reason.as_bytes().to_vec(),
        }
    }
}

/// Runs one invocation inside a sandbox, given a driver reference.
pub struct Worker<'d, D: SandboxDriver> {
    driver: &'d D,
}

impl<'d, D: SandboxDriver> Worker<'d, D> {
    #[must_use]
    pub fn new(driver: &'d D) -> Self {
        Self { driver }
    }

    /// Inject `code`, merge `project_env` with the per-call `input_json`
    /// and `function_name`, and exec the bootstrap.
    ///
    /// Environment precedence (lowest to highest): `project_env`, then
    /// `DATABASE_URL` (if provided), then the invocation's own
    /// `INPUT_JSON`/`FUNCTION_NAME` pair. The invocation's pair always wins
    /// a key collision, since it is inserted last into the merged map.
    ///
    /// # Errors
    /// Returns [`WorkerError`] only when the exec call itself fails at the
    /// driver level — a non-zero user exit or an injection failure is
    /// reported via `WorkerOutcome::success`, not an `Err`.
    pub async fn execute(
        &self,
        handle: &SandboxHandle,
        code: &str,
        function_name: &str,
        input_json: &str,
        project_env: &IndexMap<String, String>,
        database_url: Option<&str>,
    ) -> Result<WorkerOutcome, WorkerError> {
        if let Err(e) = self
            .driver
            .inject(handle, config::CODE_DIR, config::CODE_FILENAME, code)
            .await
        {
            return Ok(WorkerOutcome::injection_failed(&e.to_string()));
        }

        let mut env: IndexMap<String, String> = project_env.clone();
        if let Some(url) = database_url {
            env.insert("DATABASE_URL".to_owned(), url.to_owned());
        }
        env.insert("FUNCTION_NAME".to_owned(), function_name.to_owned());
        env.insert("INPUT_JSON".to_owned(), input_json.to_owned());

        let env_map: std::collections::HashMap<String, String> = env.into_iter().collect();

        let outcome = self
            .driver
            .exec(handle, &config::bootstrap_argv(), &env_map, config::EXEC_TIMEOUT)
            .await?;

        Ok(WorkerOutcome {
            success: outcome.exit_code == 0,
            exit_code: outcome.exit_code,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use super::*;
    use crate::driver::ExecOutcome;
    use crate::error::DriverError;

    #[derive(Default)]
    struct FakeDriver {
        inject_fails: bool,
        last_env: Mutex<Option<HashMap<String, String>>>,
        exit_code: i32,
    }

    #[async_trait]
    impl SandboxDriver for FakeDriver {
        async fn create(&self, _image: &str, _network_enabled: bool) -> Result<SandboxHandle, DriverError> {
            Ok(SandboxHandle::new("fake"))
        }

        async fn inject(
            &self,
            _handle: &SandboxHandle,
            _dir: &str,
            _filename: &str,
            _content: &str,
        ) -> Result<(), DriverError> {
            if self.inject_fails {
                Err(DriverError::Api("disk full".to_owned()))
            } else {
                Ok(())
            }
        }

        async fn exec(
            &self,
            _handle: &SandboxHandle,
            _argv: &[String],
            env: &HashMap<String, String>,
            _timeout: Duration,
        ) -> Result<ExecOutcome, DriverError> {
            *self.last_env.lock().await = Some(env.clone());
            Ok(ExecOutcome { exit_code: self.exit_code, stdout: b"ok".to_vec(), stderr: Vec::new() })
        }

        async fn destroy(&self, _handle: SandboxHandle) {}

        async fn engine_reachable(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn injection_failure_is_reported_as_unsuccessful_not_an_error() {
        let driver = FakeDriver { inject_fails: true, ..Default::default() };
        let worker = Worker::new(&driver);
        let handle = SandboxHandle::new("h1");

        let outcome = worker
            .execute(&handle, "print(1)", "fn", "{}", &IndexMap::new(), None)
            .await
            .expect("injection failure must not surface as Err");

        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn invocation_env_overrides_project_env_on_collision() {
        let driver = FakeDriver { exit_code: 0, ..Default::default() };
        let worker = Worker::new(&driver);
        let handle = SandboxHandle::new("h1");

        let mut project_env = IndexMap::new();
        project_env.insert("FUNCTION_NAME".to_owned(), "stale".to_owned());

        worker
            .execute(&handle, "print(1)", "real-name", "{\"x\":1}", &project_env, None)
            .await
            .expect("exec should succeed");

        let env = driver.last_env.lock().await.clone().expect("exec was called");
        assert_eq!(env.get("FUNCTION_NAME"), Some(&"real-name".to_owned()));
        assert_eq!(env.get("INPUT_JSON"), Some(&"{\"x\":1}".to_owned()));
    }

    #[tokio::test]
    async fn database_url_is_included_when_present() {
        let driver = FakeDriver { exit_code: 0, ..Default::default() };
        let worker = Worker::new(&driver);
        let handle = SandboxHandle::new("h1");

        worker
            .execute(&handle, "print(1)", "fn", "{}", &IndexMap::new(), Some("postgres://x"))
            .await
            .expect("exec should succeed");

        let env = driver.last_env.lock().await.clone().expect("exec was called");
        assert_eq!(env.get("DATABASE_URL"), Some(&"postgres://x".to_owned()));
    }

    #[tokio::test]
    async fn non_zero_exit_is_unsuccessful_but_not_an_error() {
        let driver = FakeDriver { exit_code: 1, ..Default::default() };
        let worker = Worker::new(&driver);
        let handle = SandboxHandle::new("h1");

        let outcome = worker
            .execute(&handle, "raise ValueError()", "fn", "{}", &IndexMap::new(), None)
            .await
            .expect("non-zero exit must not surface as Err");

        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, 1);
    }
}
