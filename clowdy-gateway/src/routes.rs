//! Axum route handlers for the Clowdy gateway API.

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, on, MethodFilter};
use axum::{Json, Router};
use clowdy_sandbox::SandboxDriver;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use clowdy_core::{HttpMethod, Invocation, InvocationId, InvocationSource, InvocationStatus};

use crate::context::ContextResolver;
use crate::error::GatewayError;
use crate::event::{build_event, RawRequest};
use crate::orchestrator::Orchestrator;
use crate::response;
use crate::router::RouteTable;
use crate::store::{EnvVarStore, FunctionStore, InvocationSink, ProjectStore, RouteStore};

/// Application state shared across every request handler.
///
/// Stores are held as trait objects so the router's state type does not
/// depend on a concrete persistence backend; the driver is generic so the
/// orchestrator keeps static dispatch on its hot path.
pub struct AppState<D: SandboxDriver> {
    pub orchestrator: Arc<Orchestrator<D>>,
    pub functions: Arc<dyn FunctionStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub routes: Arc<dyn RouteStore>,
    pub env_vars: Arc<dyn EnvVarStore>,
    pub invocations: Arc<dyn InvocationSink>,
}

impl<D: SandboxDriver> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            functions: Arc::clone(&self.functions),
            projects: Arc::clone(&self.projects),
            routes: Arc::clone(&self.routes),
            env_vars: Arc::clone(&self.env_vars),
            invocations: Arc::clone(&self.invocations),
        }
    }
}

/// Build the gateway's router: the published function surface plus a
/// liveness probe.
pub fn create_router<D: SandboxDriver + 'static>(state: Arc<AppState<D>>) -> Router {
    let gateway_methods = MethodFilter::GET
        .or(MethodFilter::POST)
        .or(MethodFilter::PUT)
        .or(MethodFilter::DELETE)
        .or(MethodFilter::PATCH);

    Router::new()
        .route("/health", get(health))
        .route("/api/gateway/{slug}", on(gateway_methods, gateway_root::<D>))
        .route("/api/gateway/{slug}/{*path}", on(gateway_methods, gateway_path::<D>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `GET /health` — liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

async fn gateway_root<D: SandboxDriver + 'static>(
    state: State<Arc<AppState<D>>>,
    method: Method,
    Path(slug): Path<String>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    handle_gateway_request(state, method, slug, String::new(), headers, query, body).await
}

async fn gateway_path<D: SandboxDriver + 'static>(
    state: State<Arc<AppState<D>>>,
    method: Method,
    Path((slug, path)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    handle_gateway_request(state, method, slug, path, headers, query, body).await
}

async fn handle_gateway_request<D: SandboxDriver + 'static>(
    State(state): State<Arc<AppState<D>>>,
    method: Method,
    slug: String,
    path: String,
    headers: HeaderMap,
    query: Option<String>,
    body: Bytes,
) -> Response {
    match dispatch(&state, &method, &slug, &path, &headers, query.as_deref(), &body).await {
        Ok(resp) => resp,
        Err(e) => e.into_response(),
    }
}

async fn dispatch<D: SandboxDriver + 'static>(
    state: &AppState<D>,
    method: &Method,
    slug: &str,
    path: &str,
    headers: &HeaderMap,
    query: Option<&str>,
    body: &[u8],
) -> Result<Response, GatewayError> {
    let project = state
        .projects
        .get_by_slug(slug)
        .await
        .ok_or_else(|| GatewayError::UnknownSlug(slug.to_owned()))?;

    let routes = state.routes.routes_for_project(project.id.as_str()).await;
    if routes.is_empty() {
        return Err(GatewayError::NoRoutes(slug.to_owned()));
    }
    let table = RouteTable::new(routes);

    let http_method = HttpMethod::from_str(method.as_str())
        .map_err(|_| GatewayError::NoMatch(method.to_string(), path.to_owned()))?;
    let normalized_path = crate::router::normalize_path(&format!("/{path}"));

    let (route, params) = table
        .match_request(http_method, &normalized_path)
        .ok_or_else(|| GatewayError::NoMatch(method.to_string(), normalized_path.clone()))?;
    let route = route.clone();

    let function = state
        .functions
        .get(route.function_id.as_str())
        .await
        .ok_or_else(|| GatewayError::OrchestratorError("route points at an unknown function".to_owned()))?;

    if !function.is_active() {
        return Err(GatewayError::FunctionInactive);
    }

    let code = state
        .functions
        .active_code(&function)
        .await
        .ok_or_else(|| GatewayError::OrchestratorError("function has no active version".to_owned()))?;

    let content_type = headers.get("content-type").and_then(|v| v.to_str().ok());
    let header_pairs: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_owned()))
        .collect();

    let event = build_event(&RawRequest {
        method: method.as_str(),
        path: &normalized_path,
        params,
        query: query.unwrap_or_default(),
        headers: header_pairs,
        content_type,
        body,
    });
    let input_json = event.to_string();

    let resolver = ContextResolver::new(state.projects.as_ref(), state.env_vars.as_ref());
    let ctx = resolver.resolve(Some(&project.id)).await;

    let result = state
        .orchestrator
        .invoke(
            &code,
            &input_json,
            &function.name,
            &ctx.env_vars,
            None,
            ctx.image_name.as_deref(),
            function.network_enabled,
        )
        .await;

    let status = if result.success {
        InvocationStatus::Success
    } else if result.timed_out {
        InvocationStatus::Timeout
    } else {
        InvocationStatus::Error
    };

    state
        .invocations
        .record(Invocation::new(
            InvocationId::new(Uuid::new_v4().to_string()),
            function.id.clone(),
            input_json,
            result.output.clone(),
            status,
            result.duration_ms,
            InvocationSource::Gateway,
            Some(http_method),
            Some(normalized_path),
        ))
        .await;

    if !result.success {
        return Err(GatewayError::OrchestratorError(result.output));
    }

    let output_value: Value = serde_json::from_str(&result.output).unwrap_or(Value::String(result.output));
    Ok(response::shape(&output_value))
}
