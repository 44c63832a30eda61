//! Container engine socket discovery.

use std::env;
use std::path::{Path, PathBuf};

/// Resolve the Unix socket path for the container engine.
///
/// Resolution order:
/// 1. `DOCKER_HOST` environment variable, if set and prefixed with
///    `unix://` (the prefix is stripped).
/// 2. `~/.colima/default/docker.sock`, if it exists.
/// 3. `/var/run/docker.sock`, the engine's own default.
#[must_use]
pub fn discover() -> PathBuf {
    if let Ok(host) = env::var("DOCKER_HOST") {
        if let Some(path) = host.strip_prefix("unix://") {
            return PathBuf::from(path);
        }
    }

    if let Some(home) = env::var_os("HOME") {
        let colima = Path::new(&home).join(".colima/default/docker.sock");
        if colima.exists() {
            return colima;
        }
    }

    PathBuf::from("/var/run/docker.sock")
}
