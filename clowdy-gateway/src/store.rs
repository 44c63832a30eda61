//! External store traits.
//!
//! The gateway never owns persistent state — functions, projects, routes,
//! env vars, and the invocation log all live in a store outside this
//! crate. These traits are the only way the gateway touches them, which
//! keeps every downstream component unit-testable against an in-memory
//! double instead of a real database.

use async_trait::async_trait;

use clowdy_core::{EnvVar, Function, Invocation, Project, Route};

/// Read access to registered functions.
#[async_trait]
pub trait FunctionStore: Send + Sync {
    async fn get(&self, id: &str) -> Option<Function>;

    /// The source code of a function's currently active version.
    async fn active_code(&self, function: &Function) -> Option<String>;
}

/// Read access to registered projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn get(&self, id: &str) -> Option<Project>;
    async fn get_by_slug(&self, slug: &str) -> Option<Project>;
}

/// Read access to a project's routes.
#[async_trait]
pub trait RouteStore: Send + Sync {
    async fn routes_for_project(&self, project_id: &str) -> Vec<Route>;
}

/// Read access to a project's environment variables.
#[async_trait]
pub trait EnvVarStore: Send + Sync {
    async fn env_vars_for_project(&self, project_id: &str) -> Vec<EnvVar>;
}

/// Write access to the append-only invocation log.
#[async_trait]
pub trait InvocationSink: Send + Sync {
    async fn record(&self, invocation: Invocation);
}

pub mod in_memory {
    //! An in-memory double implementing every store trait.
    //!
    //! The real function/project/route/env-var/invocation store is a
    //! separate, out-of-scope service; this exists so the gateway binary
    //! has something to run against and so unit tests never need a real
    //! database.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::{EnvVarStore, FunctionStore, InvocationSink, ProjectStore, RouteStore};
    use clowdy_core::{EnvVar, Function, Invocation, Project, Route};

    #[derive(Default)]
    pub struct InMemoryStore {
        pub functions: HashMap<String, Function>,
        /// Active-version code, keyed by function id.
        pub function_code: HashMap<String, String>,
        pub projects: HashMap<String, Project>,
        pub routes: HashMap<String, Vec<Route>>,
        pub env_vars: HashMap<String, Vec<EnvVar>>,
        pub invocations: Mutex<Vec<Invocation>>,
    }

    #[async_trait::async_trait]
    impl FunctionStore for InMemoryStore {
        async fn get(&self, id: &str) -> Option<Function> {
            self.functions.get(id).cloned()
        }

        async fn active_code(&self, function: &Function) -> Option<String> {
            self.function_code.get(function.id.as_str()).cloned()
        }
    }

    #[async_trait::async_trait]
    impl ProjectStore for InMemoryStore {
        async fn get(&self, id: &str) -> Option<Project> {
            self.projects.get(id).cloned()
        }

        async fn get_by_slug(&self, slug: &str) -> Option<Project> {
            self.projects.values().find(|p| p.slug == slug).cloned()
        }
    }

    #[async_trait::async_trait]
    impl RouteStore for InMemoryStore {
        async fn routes_for_project(&self, project_id: &str) -> Vec<Route> {
            self.routes.get(project_id).cloned().unwrap_or_default()
        }
    }

    #[async_trait::async_trait]
    impl EnvVarStore for InMemoryStore {
        async fn env_vars_for_project(&self, project_id: &str) -> Vec<EnvVar> {
            self.env_vars.get(project_id).cloned().unwrap_or_default()
        }
    }

    #[async_trait::async_trait]
    impl InvocationSink for InMemoryStore {
        async fn record(&self, invocation: Invocation) {
            #[expect(clippy::expect_used, reason = "test double, lock poisoning is a test bug")]
            self.invocations.lock().expect("invocation log lock poisoned").push(invocation);
        }
    }
}
