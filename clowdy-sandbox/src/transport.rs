//! Minimal HTTP client over a Unix domain socket.
//!
//! The container engine exposes its management API via a Unix socket, not
//! TCP. Standard HTTP clients don't support Unix sockets, so this builds a
//! thin wrapper using hyper + tokio's `UnixStream`.

use std::path::Path;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;

use crate::error::DriverError;

/// Raw body of a single request to the engine: either a JSON document or a
/// pre-built tar stream (used for file injection and image build contexts).
pub enum RequestBody {
    Json(String),
    Tar(Vec<u8>),
    Empty,
}

/// Outcome of a request: status code plus the raw response body.
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Send an HTTP request to the engine's API socket and collect the full
/// response body.
///
/// `uri_path` is the path component only (e.g. `/containers/create`). The
/// `Host` header is set to `localhost`, as Unix-socket HTTP servers
/// typically require *some* host header but ignore its value.
///
/// # Errors
/// Returns [`DriverError::EngineUnavailable`] if the socket cannot be
/// reached, or [`DriverError::Api`] on a malformed request/response.
pub async fn request(
    socket_path: &Path,
    method: Method,
    uri_path: &str,
    body: RequestBody,
) -> Result<RawResponse, DriverError> {
    let stream = UnixStream::connect(socket_path)
        .await
        .map_err(|e| DriverError::EngineUnavailable {
            reason: format!("connect to {}: {e}", socket_path.display()),
        })?;

    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(|e| DriverError::EngineUnavailable { reason: format!("HTTP handshake: {e}") })?;

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!("engine connection closed: {e}");
        }
    });

    let (content_type, body_bytes) = match body {
        RequestBody::Json(s) => (Some("application/json"), Bytes::from(s)),
        RequestBody::Tar(bytes) => (Some("application/x-tar"), Bytes::from(bytes)),
        RequestBody::Empty => (None, Bytes::new()),
    };
    let content_len = body_bytes.len();

    let uri: Uri = uri_path
        .parse()
        .map_err(|e| DriverError::Api(format!("invalid URI path {uri_path}: {e}")))?;

    let mut builder = Request::builder().method(method).uri(uri).header("Host", "localhost");

    if content_len > 0 {
        if let Some(ct) = content_type {
            builder = builder.header("Content-Type", ct);
        }
        builder = builder.header("Content-Length", content_len.to_string());
    }

    let req = builder
        .body(Full::new(body_bytes))
        .map_err(|e| DriverError::Api(format!("build request: {e}")))?;

    let resp: Response<_> = sender
        .send_request(req)
        .await
        .map_err(|e| DriverError::Api(format!("send request: {e}")))?;

    let status = resp.status();
    let body_bytes = resp
        .into_body()
        .collect()
        .await
        .map_err(|e| DriverError::Api(format!("read response body: {e}")))?
        .to_bytes();

    Ok(RawResponse { status, body: body_bytes.to_vec() })
}

/// Split a Docker exec-attach stream into (stdout, stderr).
///
/// Docker multiplexes attached streams with an 8-byte frame header per
/// chunk: `[stream_type, 0, 0, 0, size_be_u32]` followed by `size` bytes of
/// payload. `stream_type` is `1` for stdout, `2` for stderr; any other
/// value is treated as stdout to stay forgiving of engine quirks.
#[must_use]
pub fn demux(raw: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut pos = 0;

    while pos + 8 <= raw.len() {
        let stream_type = raw[pos];
        let size = u32::from_be_bytes([raw[pos + 4], raw[pos + 5], raw[pos + 6], raw[pos + 7]]) as usize;
        pos += 8;

        let end = (pos + size).min(raw.len());
        let chunk = &raw[pos..end];
        if stream_type == 2 {
            stderr.extend_from_slice(chunk);
        } else {
            stdout.extend_from_slice(chunk);
        }
        pos = end;
    }

    (stdout, stderr)
}
