//! Fuzz target: image tag formatting.
//!
//! `image_name` must never panic on arbitrary project ids or hashes and
//! must always produce a tag Docker's reference parser would accept the
//! shape of (no whitespace, single `:` separator).

#![no_main]

use clowdy_imagebuilder::{hash_manifest, image_name};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (project_id, manifest) = data;
    let hash = hash_manifest(manifest);
    let tag = image_name(project_id, &hash);
    assert!(!tag.contains(char::is_whitespace));
    assert_eq!(tag.matches(':').count(), 1, "image tag must have exactly one ':'");
});
