//! Canonical event synthesis from a matched HTTP request.

use std::collections::HashMap;

use serde_json::{Map, Value};

const EXCLUDED_HEADERS: [&str; 4] = ["host", "connection", "authorization", "content-length"];

/// Raw pieces of an incoming request, independent of any web framework.
pub struct RawRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub params: HashMap<String, String>,
    pub query: &'a str,
    pub headers: Vec<(String, String)>,
    pub content_type: Option<&'a str>,
    pub body: &'a [u8],
}

/// Build the canonical event object passed to a function's handler.
#[must_use]
pub fn build_event(req: &RawRequest<'_>) -> Value {
    let mut event = Map::new();
    event.insert("method".to_owned(), Value::String(req.method.to_owned()));
    event.insert("path".to_owned(), Value::String(req.path.to_owned()));
    event.insert("params".to_owned(), params_to_value(&req.params));
    event.insert("query".to_owned(), parse_query(req.query));
    event.insert("headers".to_owned(), headers_to_value(&req.headers));
    event.insert("body".to_owned(), parse_body(req.content_type, req.body));
    Value::Object(event)
}

fn params_to_value(params: &HashMap<String, String>) -> Value {
    Value::Object(params.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect())
}

/// Parse a raw query string into a map, last value wins on duplicate keys.
fn parse_query(query: &str) -> Value {
    let mut map = Map::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        map.insert(urldecode(key), Value::String(urldecode(value)));
    }
    Value::Object(map)
}

fn urldecode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(bytes[i]);
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn headers_to_value(headers: &[(String, String)]) -> Value {
    let mut map = Map::new();
    for (key, value) in headers {
        let lower = key.to_ascii_lowercase();
        if EXCLUDED_HEADERS.contains(&lower.as_str()) {
            continue;
        }
        map.insert(lower, Value::String(value.clone()));
    }
    Value::Object(map)
}

fn parse_body(content_type: Option<&str>, body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }

    let accepts_json = content_type.is_none_or(|ct| ct.contains("json") || ct.is_empty());
    if accepts_json {
        if let Ok(value) = serde_json::from_slice(body) {
            return value;
        }
    }

    std::str::from_utf8(body).map_or(Value::Null, |s| Value::String(s.to_owned()))
}
