//! Resource profile and fixed paths shared by the driver and the worker.

use std::time::Duration;

/// Default base image, used whenever a function's project has no custom
/// image built.
pub const DEFAULT_IMAGE: &str = "clowdy-python-runtime";

/// Memory cap applied to every sandbox, regardless of image.
pub const MEMORY_LIMIT_MIB: i64 = 128;

/// CPU cap applied to every sandbox: 0.5 cores, in nano-CPU units.
pub const NANO_CPUS: i64 = 500_000_000;

/// Wall-clock timeout for a single `exec` inside a sandbox.
pub const EXEC_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit code returned by [`crate::driver::SandboxDriver::exec`] when the
/// command was terminated for exceeding its timeout.
pub const TIMEOUT_SENTINEL: i32 = 124;

/// Directory inside the sandbox that user code is injected into.
pub const CODE_DIR: &str = "/app";

/// Filename the worker injects the function's code as.
pub const CODE_FILENAME: &str = "function.py";

/// Full path to the injected code file, for error messages and tests.
pub const CODE_PATH: &str = "/app/function.py";

/// Argv of the fixed in-sandbox bootstrap command.
#[must_use]
pub fn bootstrap_argv() -> Vec<String> {
    vec!["python".to_owned(), "/app/runner.py".to_owned()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_path_matches_dir_and_filename() {
        assert_eq!(CODE_PATH, format!("{CODE_DIR}/{CODE_FILENAME}"));
    }

    #[test]
    fn bootstrap_argv_is_non_empty() {
        assert!(!bootstrap_argv().is_empty());
    }
}
