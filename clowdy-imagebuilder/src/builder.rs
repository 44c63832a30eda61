//! Image builder — materializes per-project sandbox images on top of the
//! default runtime image.

use std::path::PathBuf;

use clowdy_sandbox::transport::{self, RequestBody};
use clowdy_sandbox::DriverError;
use hyper::{Method, StatusCode};
use serde_json::Value;

use crate::error::BuildError;
use crate::hash::{hash_manifest, image_name};

const BASE_RUNTIME_IMAGE: &str = "clowdy-python-runtime";
const MANIFEST_FILENAME: &str = "requirements.txt";
const BUILD_LOG_TAIL_LINES: usize = 10;

/// Outcome of a [`ImageBuilder::build`] call.
pub struct BuildOutcome {
    pub image_name: String,
    pub hash: String,
}

/// Builds, caches, and prunes per-project sandbox images against the
/// container engine's image endpoints.
pub struct ImageBuilder {
    socket_path: PathBuf,
}

impl ImageBuilder {
    #[must_use]
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    #[must_use]
    pub fn discover() -> Self {
        Self::new(clowdy_sandbox::discover_socket())
    }

    /// # Errors
    /// Returns [`BuildError::Driver`] if the engine cannot be reached.
    pub async fn exists(&self, image_name: &str) -> Result<bool, BuildError> {
        let filters = serde_json::json!({ "reference": [image_name] }).to_string();
        let path = format!("/images/json?filters={}", urlencode(&filters));

        let resp = transport::request(&self.socket_path, Method::GET, &path, RequestBody::Empty)
            .await
            .map_err(BuildError::Driver)?;

        if !resp.status.is_success() {
            return Err(BuildError::Driver(DriverError::Api(format!(
                "list images: HTTP {}",
                resp.status
            ))));
        }

        let images: Vec<Value> = serde_json::from_slice(&resp.body)
            .map_err(|e| BuildError::Driver(DriverError::Api(format!("parse image list: {e}"))))?;
        Ok(!images.is_empty())
    }

    /// Build (or reuse) the image for `project_id` at the hash of
    /// `manifest`. Returns the resolved image name and hash whether or not
    /// a build actually ran.
    ///
    /// # Errors
    /// Returns [`BuildError::BuildFailed`] with the trailing build-log
    /// lines if the engine reports a failed build.
    pub async fn build(&self, project_id: &str, manifest: &str) -> Result<BuildOutcome, BuildError> {
        let hash = hash_manifest(manifest);
        let name = image_name(project_id, &hash);

        if self.exists(&name).await? {
            return Ok(BuildOutcome { image_name: name, hash });
        }

        let context = build_context_tar(manifest)?;
        let build_path = format!("/build?t={}", urlencode(&name));

        let resp = transport::request(&self.socket_path, Method::POST, &build_path, RequestBody::Tar(context))
            .await
            .map_err(BuildError::Driver)?;

        let log = String::from_utf8_lossy(&resp.body);
        if resp.status != StatusCode::OK || build_stream_has_error(&log) {
            let tail = tail_lines(&log, BUILD_LOG_TAIL_LINES);
            return Err(BuildError::BuildFailed(tail));
        }

        self.prune(project_id, &hash).await;

        Ok(BuildOutcome { image_name: name, hash })
    }

    /// Remove every locally tagged image for `project_id` except the one
    /// tagged `keep`. Best-effort: individual removal failures are logged
    /// and swallowed.
    pub async fn prune(&self, project_id: &str, keep: &str) {
        let prefix = format!("clowdy-project-{project_id}:");
        let filters = serde_json::json!({ "reference": [format!("{prefix}*")] }).to_string();
        let path = format!("/images/json?filters={}", urlencode(&filters));

        let Ok(resp) = transport::request(&self.socket_path, Method::GET, &path, RequestBody::Empty).await
        else {
            return;
        };
        let Ok(images) = serde_json::from_slice::<Vec<Value>>(&resp.body) else {
            return;
        };

        let keep_tag = format!("{prefix}{}", &keep[..keep.len().min(8)]);

        for image in images {
            let Some(tags) = image.get("RepoTags").and_then(Value::as_array) else { continue };
            for tag in tags.iter().filter_map(Value::as_str) {
                if tag == keep_tag {
                    continue;
                }
                let remove_path = format!("/images/{}?force=true", urlencode(tag));
                if let Err(e) =
                    transport::request(&self.socket_path, Method::DELETE, &remove_path, RequestBody::Empty)
                        .await
                {
                    tracing::warn!(image = %tag, error = %e, "failed to prune stale project image");
                }
            }
        }
    }
}

fn build_context_tar(manifest: &str) -> Result<Vec<u8>, BuildError> {
    let dockerfile = format!(
        "FROM {BASE_RUNTIME_IMAGE}\nCOPY {MANIFEST_FILENAME} /tmp/{MANIFEST_FILENAME}\nRUN pip install --no-cache-dir -r /tmp/{MANIFEST_FILENAME} && rm /tmp/{MANIFEST_FILENAME}\n"
    );

    let mut builder = tar::Builder::new(Vec::new());
    append_tar_entry(&mut builder, "Dockerfile", dockerfile.as_bytes())?;
    append_tar_entry(&mut builder, MANIFEST_FILENAME, manifest.as_bytes())?;
    builder
        .into_inner()
        .map_err(|e| BuildError::Driver(DriverError::Io(e)))
}

fn append_tar_entry(
    builder: &mut tar::Builder<Vec<u8>>,
    path: &str,
    content: &[u8],
) -> Result<(), BuildError> {
    let mut header = tar::Header::new_gnu();
    header
        .set_path(path)
        .map_err(|e| BuildError::Driver(DriverError::Io(e)))?;
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append(&header, content)
        .map_err(|e| BuildError::Driver(DriverError::Io(e)))
}

/// Docker's `/build` endpoint streams newline-delimited JSON; an error is
/// reported as an `{"error": ...}` object rather than a non-2xx status.
fn build_stream_has_error(log: &str) -> bool {
    log.lines().any(|line| {
        serde_json::from_str::<Value>(line)
            .ok()
            .and_then(|v| v.get("error").cloned())
            .is_some()
    })
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

fn urlencode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => (b as char).to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}
