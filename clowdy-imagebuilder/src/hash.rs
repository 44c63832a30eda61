//! Canonical dependency-manifest hashing.
//!
//! The hash is insensitive to whitespace, comments, and line order, so
//! that reformatting a manifest never invalidates a cached image.

use sha2::{Digest, Sha256};

/// Canonicalize `manifest` and return its SHA-256 hex digest.
///
/// Canonicalization: trim each line, drop blank lines and `#`-comment
/// lines, sort the remaining lines lexicographically, join with `\n`.
#[must_use]
pub fn hash_manifest(manifest: &str) -> String {
    let mut lines: Vec<&str> = manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    lines.sort_unstable();

    let canonical = lines.join("\n");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Image tag for a project at a given manifest hash.
#[must_use]
pub fn image_name(project_id: &str, hash: &str) -> String {
    let short = &hash[..hash.len().min(8)];
    format!("clowdy-project-{project_id}:{short}")
}
