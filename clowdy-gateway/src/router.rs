//! Pattern-based route matcher.
//!
//! Each stored [`Route`] path compiles once into a sequence of segments.
//! Matching is pure and synchronous; memoizing the compiled form at load
//! time (not per-request) is what makes it cheap under load.

use std::collections::HashMap;

use clowdy_core::{HttpMethod, Route};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A route together with its compiled path pattern.
pub struct CompiledRoute {
    pub route: Route,
    segments: Vec<Segment>,
}

impl CompiledRoute {
    #[must_use]
    pub fn compile(route: Route) -> Self {
        let segments = compile_pattern(&route.path);
        Self { route, segments }
    }

    fn matches(&self, request_segments: &[&str]) -> Option<HashMap<String, String>> {
        if self.segments.len() != request_segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (segment, actual) in self.segments.iter().zip(request_segments) {
            match segment {
                Segment::Literal(expected) if expected == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_owned());
                }
            }
        }
        Some(params)
    }
}

fn compile_pattern(path: &str) -> Vec<Segment> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment.strip_prefix(':').map_or_else(
                || Segment::Literal(segment.to_owned()),
                |name| Segment::Param(name.to_owned()),
            )
        })
        .collect()
}

/// Normalize a request path: ensure a single leading `/`, strip a trailing
/// `/` unless the path is exactly `/`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    let mut normalized = format!("/{trimmed}");
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// A compiled set of routes for one project, matched in store order.
pub struct RouteTable {
    compiled: Vec<CompiledRoute>,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { compiled: routes.into_iter().map(CompiledRoute::compile).collect() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Match `(method, path)` against the table.
    ///
    /// First pass only considers routes whose method equals `method`
    /// exactly; a second pass considers [`HttpMethod::Any`] routes. Within
    /// each pass, the first matching route wins.
    #[must_use]
    pub fn match_request(&self, method: HttpMethod, path: &str) -> Option<(&Route, HashMap<String, String>)> {
        let normalized = normalize_path(path);
        let request_segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

        self.compiled
            .iter()
            .filter(|c| c.route.method == method)
            .find_map(|c| c.matches(&request_segments).map(|params| (&c.route, params)))
            .or_else(|| {
                self.compiled
                    .iter()
                    .filter(|c| c.route.method.is_any())
                    .find_map(|c| c.matches(&request_segments).map(|params| (&c.route, params)))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clowdy_core::{FunctionId, ProjectId, RouteId};

    fn route(method: HttpMethod, path: &str) -> Route {
        Route::new(RouteId::new("r1"), ProjectId::new("p1"), method, path.to_owned(), FunctionId::new("f1"))
    }

    #[test]
    fn single_param_segment_captures_value() {
        let table = RouteTable::new(vec![route(HttpMethod::Get, "/users/:id")]);
        let (_, params) = table.match_request(HttpMethod::Get, "/users/abc").expect("should match");
        assert_eq!(params.get("id"), Some(&"abc".to_owned()));
    }

    #[test]
    fn trailing_param_segment_does_not_match_empty_value() {
        let table = RouteTable::new(vec![route(HttpMethod::Get, "/users/:id")]);
        assert!(table.match_request(HttpMethod::Get, "/users/").is_none());
    }

    #[test]
    fn multiple_param_segments_capture_all_values() {
        let table = RouteTable::new(vec![route(HttpMethod::Get, "/users/:id/posts/:pid")]);
        let (_, params) = table
            .match_request(HttpMethod::Get, "/users/42/posts/9")
            .expect("should match");
        assert_eq!(params.get("id"), Some(&"42".to_owned()));
        assert_eq!(params.get("pid"), Some(&"9".to_owned()));
    }

    #[test]
    fn trailing_slash_is_normalized_away() {
        let table = RouteTable::new(vec![route(HttpMethod::Get, "/users/:id")]);
        let a = table.match_request(HttpMethod::Get, "/users/42");
        let b = table.match_request(HttpMethod::Get, "/users/42/");
        assert_eq!(a.map(|(_, p)| p), b.map(|(_, p)| p));
    }

    #[test]
    fn any_method_route_only_matches_after_exact_method_misses() {
        let table = RouteTable::new(vec![
            route(HttpMethod::Get, "/a"),
            route(HttpMethod::Any, "/a"),
        ]);
        let (matched, _) = table.match_request(HttpMethod::Post, "/a").expect("ANY should match");
        assert_eq!(matched.method, HttpMethod::Any);
    }

    #[test]
    fn no_route_matches_unknown_path() {
        let table = RouteTable::new(vec![route(HttpMethod::Get, "/a")]);
        assert!(table.match_request(HttpMethod::Post, "/a").is_none());
    }

    #[test]
    fn normalize_path_collapses_trailing_slash_but_keeps_root() {
        assert_eq!(normalize_path("/a/b/"), "/a/b");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("a/b"), "/a/b");
    }
}
