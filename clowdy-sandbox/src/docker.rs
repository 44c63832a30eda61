//! Docker Engine API driver: the only [`crate::driver::SandboxDriver`]
//! implementation this crate ships.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use hyper::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::config;
use crate::driver::{ExecOutcome, SandboxDriver};
use crate::error::DriverError;
use crate::handle::SandboxHandle;
use crate::transport::{self, RequestBody};

/// A [`SandboxDriver`] backed by the Docker Engine API over a Unix socket.
pub struct DockerDriver {
    socket_path: PathBuf,
}

impl DockerDriver {
    #[must_use]
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Build a driver using the discovered engine socket.
    #[must_use]
    pub fn discover() -> Self {
        Self::new(crate::socket::discover())
    }

    fn socket(&self) -> &Path {
        &self.socket_path
    }
}

#[derive(Deserialize)]
struct CreateResponse {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Deserialize)]
struct ExecCreateResponse {
    #[serde(rename = "Id")]
    id: String,
}

#[derive(Deserialize)]
struct ExecInspectResponse {
    #[serde(rename = "ExitCode")]
    exit_code: Option<i64>,
    #[serde(rename = "Running")]
    running: bool,
}

#[async_trait]
impl SandboxDriver for DockerDriver {
    async fn create(&self, image: &str, network_enabled: bool) -> Result<SandboxHandle, DriverError> {
        let body = json!({
            "Image": image,
            // Keep the container alive without running user code yet;
            // `exec` drives every real invocation.
            "Cmd": ["sleep", "infinity"],
            "NetworkDisabled": !network_enabled,
            "HostConfig": {
                "Memory": config::MEMORY_LIMIT_MIB * 1024 * 1024,
                "NanoCpus": config::NANO_CPUS,
            },
        });

        let resp = transport::request(
            self.socket(),
            Method::POST,
            "/containers/create",
            RequestBody::Json(body.to_string()),
        )
        .await?;

        if resp.status == StatusCode::NOT_FOUND {
            return Err(DriverError::ImageMissing { image: image.to_owned() });
        }
        if !resp.status.is_success() {
            return Err(DriverError::Api(format!(
                "create container: HTTP {} {}",
                resp.status,
                String::from_utf8_lossy(&resp.body)
            )));
        }

        let created: CreateResponse = serde_json::from_slice(&resp.body)
            .map_err(|e| DriverError::Api(format!("parse create response: {e}")))?;

        let start_path = format!("/containers/{}/start", created.id);
        let start_resp =
            transport::request(self.socket(), Method::POST, &start_path, RequestBody::Empty).await?;
        if !start_resp.status.is_success() {
            return Err(DriverError::Api(format!(
                "start container: HTTP {}",
                start_resp.status
            )));
        }

        Ok(SandboxHandle::new(created.id))
    }

    async fn inject(
        &self,
        handle: &SandboxHandle,
        dir: &str,
        filename: &str,
        content: &str,
    ) -> Result<(), DriverError> {
        let tar_bytes = build_single_file_tar(filename, content)?;
        let path = format!(
            "/containers/{}/archive?path={}",
            handle.id,
            urlencode(dir)
        );

        let resp =
            transport::request(self.socket(), Method::PUT, &path, RequestBody::Tar(tar_bytes)).await?;

        if !resp.status.is_success() {
            return Err(DriverError::Api(format!(
                "inject file: HTTP {} {}",
                resp.status,
                String::from_utf8_lossy(&resp.body)
            )));
        }

        Ok(())
    }

    async fn exec(
        &self,
        handle: &SandboxHandle,
        argv: &[String],
        env: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<ExecOutcome, DriverError> {
        let env_list: Vec<String> = env.iter().map(|(k, v)| format!("{k}={v}")).collect();

        let create_body = json!({
            "Cmd": argv,
            "Env": env_list,
            "AttachStdout": true,
            "AttachStderr": true,
        });

        let create_path = format!("/containers/{}/exec", handle.id);
        let resp = transport::request(
            self.socket(),
            Method::POST,
            &create_path,
            RequestBody::Json(create_body.to_string()),
        )
        .await?;

        if !resp.status.is_success() {
            return Err(DriverError::Api(format!("exec create: HTTP {}", resp.status)));
        }

        let exec: ExecCreateResponse = serde_json::from_slice(&resp.body)
            .map_err(|e| DriverError::Api(format!("parse exec create response: {e}")))?;

        let start_body = json!({ "Detach": false, "Tty": false });
        let start_path = format!("/exec/{}/start", exec.id);

        let run = transport::request(
            self.socket(),
            Method::POST,
            &start_path,
            RequestBody::Json(start_body.to_string()),
        );

        let start_resp = match tokio::time::timeout(timeout, run).await {
            Ok(result) => result?,
            Err(_elapsed) => {
                return Ok(ExecOutcome {
                    exit_code: config::TIMEOUT_SENTINEL,
                    stdout: Vec::new(),
                    stderr: Vec::new(),
                });
            }
        };

        if !start_resp.status.is_success() {
            return Err(DriverError::Api(format!("exec start: HTTP {}", start_resp.status)));
        }

        let (stdout, stderr) = transport::demux(&start_resp.body);

        let inspect_path = format!("/exec/{}/json", exec.id);
        let inspect_resp =
            transport::request(self.socket(), Method::GET, &inspect_path, RequestBody::Empty).await?;
        let inspect: ExecInspectResponse = serde_json::from_slice(&inspect_resp.body)
            .map_err(|e| DriverError::Api(format!("parse exec inspect response: {e}")))?;

        let exit_code = if inspect.running {
            config::TIMEOUT_SENTINEL
        } else {
            i32::try_from(inspect.exit_code.unwrap_or(0)).unwrap_or(-1)
        };

        Ok(ExecOutcome { exit_code, stdout, stderr })
    }

    async fn destroy(&self, handle: SandboxHandle) {
        let path = format!("/containers/{}?force=true", handle.id);
        if let Err(e) = transport::request(self.socket(), Method::DELETE, &path, RequestBody::Empty).await {
            tracing::warn!(sandbox_id = %handle.id, error = %e, "failed to destroy sandbox");
        }
    }

    async fn engine_reachable(&self) -> bool {
        transport::request(self.socket(), Method::GET, "/_ping", RequestBody::Empty)
            .await
            .is_ok_and(|r| r.status.is_success())
    }
}

/// Build an in-memory tar archive containing a single file, suitable for
/// upload to `/containers/{id}/archive`.
fn build_single_file_tar(filename: &str, content: &str) -> Result<Vec<u8>, DriverError> {
    let mut builder = tar::Builder::new(Vec::new());
    let bytes = content.as_bytes();

    let mut header = tar::Header::new_gnu();
    header.set_path(filename).map_err(DriverError::Io)?;
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();

    builder.append(&header, bytes).map_err(DriverError::Io)?;
    builder.into_inner().map_err(DriverError::Io)
}

fn urlencode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'/' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_file_tar_round_trips_through_archive_crate() {
        let bytes = build_single_file_tar("function.py", "print('hi')\n").expect("build tar");
        let mut archive = tar::Archive::new(bytes.as_slice());
        let mut entries = archive.entries().expect("entries");
        let mut entry = entries.next().expect("one entry").expect("readable entry");
        assert_eq!(entry.path().unwrap().to_str().unwrap(), "function.py");

        let mut out = Vec::new();
        std::io::copy(&mut entry, &mut out).unwrap();
        assert_eq!(out, b"print('hi')\n");
    }

    #[test]
    fn urlencode_leaves_path_separators_alone() {
        assert_eq!(urlencode("/app"), "/app");
    }

    #[test]
    fn urlencode_escapes_spaces() {
        assert_eq!(urlencode("a b"), "a%20b");
    }
}
