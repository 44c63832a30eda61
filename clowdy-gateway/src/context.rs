//! Context Resolver — loads per-project env vars and resolves the custom
//! image tag, independent of any sandbox or routing concern.

use indexmap::IndexMap;

use clowdy_core::ProjectId;

use crate::store::{EnvVarStore, ProjectStore};

/// Resolved execution context for a project: its merged environment and
/// its custom image name, if any.
#[derive(Debug, Clone, Default)]
pub struct ResolvedContext {
    pub env_vars: IndexMap<String, String>,
    pub image_name: Option<String>,
}

/// Resolves project-scoped execution context against the store traits
/// only — never a concrete store implementation.
pub struct ContextResolver<'a, P: ProjectStore + ?Sized, E: EnvVarStore + ?Sized> {
    projects: &'a P,
    env_vars: &'a E,
}

impl<'a, P: ProjectStore + ?Sized, E: EnvVarStore + ?Sized> ContextResolver<'a, P, E> {
    #[must_use]
    pub fn new(projects: &'a P, env_vars: &'a E) -> Self {
        Self { projects, env_vars }
    }

    /// Resolve the context for `project_id`. `None` yields an empty,
    /// default context (both fields absent).
    pub async fn resolve(&self, project_id: Option<&ProjectId>) -> ResolvedContext {
        let Some(project_id) = project_id else {
            return ResolvedContext::default();
        };

        let mut env = IndexMap::new();
        for var in self.env_vars.env_vars_for_project(project_id.as_str()).await {
            env.insert(var.key, var.value);
        }

        let Some(project) = self.projects.get(project_id.as_str()).await else {
            return ResolvedContext { env_vars: env, image_name: None };
        };

        let image_name = project
            .has_custom_image()
            .then(|| clowdy_imagebuilder::image_name(project.id.as_str(), &project.manifest_hash));

        if let Some(database_url) = project.database_url.filter(|url| !url.is_empty()) {
            env.insert("DATABASE_URL".to_owned(), database_url);
        }

        ResolvedContext { env_vars: env, image_name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::in_memory::InMemoryStore;
    use clowdy_core::{EnvVar, Project};

    fn store_with_project() -> InMemoryStore {
        let mut store = InMemoryStore::default();
        store.projects.insert(
            "p1".to_owned(),
            Project::new(
                ProjectId::new("p1"),
                "demo".to_owned(),
                "demo".to_owned(),
                "flask==2.0".to_owned(),
                "deadbeef00".to_owned(),
                Some("postgres://x".to_owned()),
            ),
        );
        store.env_vars.insert(
            "p1".to_owned(),
            vec![EnvVar::new(
                ProjectId::new("p1"),
                "DATABASE_URL".to_owned(),
                "stale-user-value".to_owned(),
                false,
            )],
        );
        store
    }

    #[tokio::test]
    async fn missing_project_id_yields_empty_context() {
        let store = InMemoryStore::default();
        let resolver = ContextResolver::new(&store, &store);
        let ctx = resolver.resolve(None).await;
        assert!(ctx.env_vars.is_empty());
        assert!(ctx.image_name.is_none());
    }

    #[tokio::test]
    async fn database_url_overrides_colliding_user_env_var() {
        let store = store_with_project();
        let resolver = ContextResolver::new(&store, &store);
        let ctx = resolver.resolve(Some(&ProjectId::new("p1"))).await;
        assert_eq!(ctx.env_vars.get("DATABASE_URL"), Some(&"postgres://x".to_owned()));
    }

    #[tokio::test]
    async fn custom_image_name_set_when_manifest_hash_present() {
        let store = store_with_project();
        let resolver = ContextResolver::new(&store, &store);
        let ctx = resolver.resolve(Some(&ProjectId::new("p1"))).await;
        assert_eq!(ctx.image_name, Some("clowdy-project-p1:deadbeef".to_owned()));
    }
}
