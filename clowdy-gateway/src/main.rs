//! Entry point for the `clowdy-gateway` HTTP server.

use std::sync::Arc;
use std::time::Duration;

use clowdy_gateway::pool::{DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_POOL_SIZE, DEFAULT_REAP_INTERVAL};
use clowdy_gateway::store::in_memory::InMemoryStore;
use clowdy_gateway::{AppState, Orchestrator, Pool};
use clowdy_sandbox::{DockerDriver, SandboxDriver};
use tracing::info;

/// Parse an env var into `T`, falling back to `default` when unset or
/// unparseable.
fn env_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let addr =
        std::env::var("CLOWDY_GATEWAY_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:3456".to_owned());
    let max_pool_size = env_or("CLOWDY_GATEWAY_MAX_POOL_SIZE", DEFAULT_MAX_POOL_SIZE);
    let idle_timeout =
        Duration::from_secs(env_or("CLOWDY_GATEWAY_IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT.as_secs()));
    let reap_interval =
        Duration::from_secs(env_or("CLOWDY_GATEWAY_REAP_INTERVAL_SECS", DEFAULT_REAP_INTERVAL.as_secs()));

    let driver = DockerDriver::discover();
    if !driver.engine_reachable().await {
        tracing::warn!("container engine not reachable at startup; cold starts will fail until it is");
    }

    let pool = Arc::new(Pool::with_config(driver, max_pool_size, idle_timeout));
    let reaper = Arc::clone(&pool).run_reaper(reap_interval);

    let store = Arc::new(InMemoryStore::default());
    let state = Arc::new(AppState {
        orchestrator: Arc::new(Orchestrator::new(Arc::clone(&pool))),
        functions: store.clone(),
        projects: store.clone(),
        routes: store.clone(),
        env_vars: store.clone(),
        invocations: store,
    });

    let app = clowdy_gateway::create_router(state);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "clowdy-gateway listening");

    let serve_result = axum::serve(listener, app).await;

    reaper.abort();
    pool.shutdown().await;

    if let Err(e) = serve_result {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
