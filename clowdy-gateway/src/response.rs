//! Response shaping: turn a function's return value into an HTTP response.

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Response, StatusCode};
use serde_json::Value;

/// Shape `output` into an HTTP response.
///
/// If `output` is a JSON object with a `statusCode` field, the response is
/// built from its `statusCode`/`headers`/`body`. Otherwise `output` is
/// JSON-encoded verbatim with status 200 and `application/json`.
#[must_use]
pub fn shape(output: &Value) -> Response<Body> {
    if let Some(status_code) = output.get("statusCode").and_then(Value::as_u64) {
        return shape_custom(output, status_code);
    }

    let body = output.to_string();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

fn shape_custom(output: &Value, status_code: u64) -> Response<Body> {
    let status = u16::try_from(status_code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut builder = Response::builder().status(status);

    if let Some(headers) = output.get("headers").and_then(Value::as_object) {
        for (key, value) in headers {
            let Some(value_str) = value.as_str() else { continue };
            let Ok(name) = HeaderName::try_from(key.as_str()) else { continue };
            let Ok(value) = HeaderValue::from_str(value_str) else { continue };
            builder = builder.header(name, value);
        }
    }

    let body = match output.get("body") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    builder
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_return_value_is_wrapped_with_200_and_json_content_type() {
        let resp = shape(&json!({"msg": "hi"}));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("Content-Type").and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn status_code_field_drives_custom_status() {
        let resp = shape(&json!({"statusCode": 201, "body": {"ok": true}}));
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[test]
    fn custom_headers_are_applied() {
        let resp = shape(&json!({"statusCode": 200, "headers": {"X-Foo": "bar"}}));
        assert_eq!(resp.headers().get("X-Foo").and_then(|v| v.to_str().ok()), Some("bar"));
    }
}
