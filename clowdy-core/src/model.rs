//! The entities visible to the invocation core.
//!
//! These are plain DTOs exchanged with the persistent store (out of scope
//! for this workspace — see the crate docs). Nothing here owns storage;
//! the core only reads and writes these shapes across a trait boundary
//! defined by its caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{FunctionId, InvocationId, ProjectId, RouteId};

/// HTTP method a [`Route`] binds to, or the `ANY` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    /// Matches any of the five concrete methods above; only consulted as a
    /// fallback after every concrete-method route has been tried.
    Any,
}

impl HttpMethod {
    /// Returns `true` if this method is [`HttpMethod::Any`].
    #[must_use]
    pub fn is_any(self) -> bool {
        matches!(self, HttpMethod::Any)
    }
}

impl FromStr for HttpMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "ANY" => Ok(HttpMethod::Any),
            other => Err(CoreError::InvalidHttpMethod(other.to_owned())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Any => "ANY",
        };
        f.write_str(s)
    }
}

/// Lifecycle status of a [`Function`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FunctionStatus {
    Active,
    Error,
}

/// A registered, invocable program.
///
/// Immutable identity; the active code lives in the [`FunctionVersion`]
/// pointed to by `active_version`. Owned by the external store — the core
/// only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Function {
    pub id: FunctionId,
    pub name: String,
    /// Single supported runtime tag today: `"python"`.
    pub runtime: String,
    pub active_version: u32,
    pub status: FunctionStatus,
    /// When `true`, sandboxes running this function's code get outbound
    /// network access.
    pub network_enabled: bool,
    pub project_id: Option<ProjectId>,
}

impl Function {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: FunctionId,
        name: String,
        runtime: String,
        active_version: u32,
        status: FunctionStatus,
        network_enabled: bool,
        project_id: Option<ProjectId>,
    ) -> Self {
        Self { id, name, runtime, active_version, status, network_enabled, project_id }
    }

    /// `true` when this function may currently be invoked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.status, FunctionStatus::Active)
    }
}

/// A single, append-only version of a [`Function`]'s code.
///
/// Versions never mutate once created; `active_version` on the owning
/// [`Function`] can be retargeted to point at a different version number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct FunctionVersion {
    pub function_id: FunctionId,
    /// 1-indexed version number.
    pub version: u32,
    /// The function's source code, opaque to the core.
    pub code: String,
}

/// A group of functions, routes, and shared configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Globally unique URL path segment, e.g. `my-api`.
    pub slug: String,
    /// Opaque dependency manifest text (e.g. a `requirements.txt`); may be
    /// empty when the project has no extra dependencies.
    pub manifest: String,
    /// Content hash of `manifest`, computed by the image builder; empty
    /// when no custom image has been built yet.
    pub manifest_hash: String,
    /// Connection string for a managed database, if provisioned.
    pub database_url: Option<String>,
}

impl Project {
    #[must_use]
    pub fn new(
        id: ProjectId,
        name: String,
        slug: String,
        manifest: String,
        manifest_hash: String,
        database_url: Option<String>,
    ) -> Self {
        Self { id, name, slug, manifest, manifest_hash, database_url }
    }

    /// `true` when this project has a built custom image (non-empty hash).
    #[must_use]
    pub fn has_custom_image(&self) -> bool {
        !self.manifest_hash.is_empty()
    }
}

/// A per-project environment variable injected into sandboxes at exec time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct EnvVar {
    pub project_id: ProjectId,
    pub key: String,
    pub value: String,
    /// Affects external API responses only (masking); the core always
    /// injects the full value regardless of this flag.
    pub is_secret: bool,
}

impl EnvVar {
    #[must_use]
    pub fn new(project_id: ProjectId, key: String, value: String, is_secret: bool) -> Self {
        Self { project_id, key, value, is_secret }
    }
}

/// A gateway route binding an HTTP method + path pattern to a function.
///
/// Invariant: `function_id` must resolve to a [`Function`] whose
/// `project_id` equals this route's `project_id` (enforced by the store,
/// not this crate).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Route {
    pub id: RouteId,
    pub project_id: ProjectId,
    pub method: HttpMethod,
    /// `/`-joined sequence of literal or `:name` parameter segments.
    pub path: String,
    pub function_id: FunctionId,
}

impl Route {
    #[must_use]
    pub fn new(
        id: RouteId,
        project_id: ProjectId,
        method: HttpMethod,
        path: String,
        function_id: FunctionId,
    ) -> Self {
        Self { id, project_id, method, path, function_id }
    }
}

/// Outcome status of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum InvocationStatus {
    Success,
    Error,
    Timeout,
}

/// Where an invocation originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum InvocationSource {
    /// Invoked directly (e.g. via an admin/test-run API), bypassing routing.
    Direct,
    /// Invoked through the HTTP gateway via a matched [`Route`].
    Gateway,
}

/// An append-only invocation log entry, emitted by the core and persisted
/// by the external store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Invocation {
    pub id: InvocationId,
    pub function_id: FunctionId,
    /// Serialized input event.
    pub input: String,
    /// Serialized output (JSON for object/array outputs, raw string form
    /// otherwise).
    pub output: String,
    pub status: InvocationStatus,
    pub duration_ms: u64,
    pub source: InvocationSource,
    pub http_method: Option<HttpMethod>,
    pub http_path: Option<String>,
}

impl Invocation {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: InvocationId,
        function_id: FunctionId,
        input: String,
        output: String,
        status: InvocationStatus,
        duration_ms: u64,
        source: InvocationSource,
        http_method: Option<HttpMethod>,
        http_path: Option<String>,
    ) -> Self {
        Self {
            id,
            function_id,
            input,
            output,
            status,
            duration_ms,
            source,
            http_method,
            http_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_method_from_str_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("GET".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Any".parse::<HttpMethod>().unwrap(), HttpMethod::Any);
    }

    #[test]
    fn http_method_from_str_rejects_unknown() {
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn http_method_display_round_trips_through_from_str() {
        for m in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Patch,
            HttpMethod::Any,
        ] {
            let s = m.to_string();
            assert_eq!(s.parse::<HttpMethod>().unwrap(), m);
        }
    }

    #[test]
    fn project_has_custom_image_reflects_manifest_hash() {
        let mut project = Project {
            id: ProjectId::new("p1"),
            name: "demo".to_owned(),
            slug: "demo".to_owned(),
            manifest: String::new(),
            manifest_hash: String::new(),
            database_url: None,
        };
        assert!(!project.has_custom_image());
        project.manifest_hash = "deadbeef".to_owned();
        assert!(project.has_custom_image());
    }

    #[test]
    fn function_is_active_checks_status() {
        let active = Function {
            id: FunctionId::new("f1"),
            name: "fn".to_owned(),
            runtime: "python".to_owned(),
            active_version: 1,
            status: FunctionStatus::Active,
            network_enabled: false,
            project_id: None,
        };
        assert!(active.is_active());

        let mut errored = active;
        errored.status = FunctionStatus::Error;
        assert!(!errored.is_active());
    }
}
