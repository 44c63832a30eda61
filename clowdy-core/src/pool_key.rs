//! The key that makes warm-sandbox reuse economical.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `(image name, network-enabled)` — the granularity at which sandboxes
/// are interchangeable.
///
/// Deliberately excludes user identity, function id, code, and environment
/// variables: those are supplied at exec time, so one warm sandbox can
/// serve any function sharing the same image and network policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub image: String,
    pub network_enabled: bool,
}

impl PoolKey {
    #[must_use]
    pub fn new(image: impl Into<String>, network_enabled: bool) -> Self {
        Self { image: image.into(), network_enabled }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|net={}", self.image, self.network_enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_with_same_fields_are_equal() {
        let a = PoolKey::new("clowdy-python-runtime", false);
        let b = PoolKey::new("clowdy-python-runtime", false);
        assert_eq!(a, b);
    }

    #[test]
    fn keys_differ_on_network_flag() {
        let a = PoolKey::new("clowdy-python-runtime", false);
        let b = PoolKey::new("clowdy-python-runtime", true);
        assert_ne!(a, b);
    }

    #[test]
    fn display_format() {
        let key = PoolKey::new("img", true);
        assert_eq!(key.to_string(), "img|net=true");
    }
}
