//! Fuzz target: manifest hashing.
//!
//! `hash_manifest` must never panic on arbitrary UTF-8 input and must
//! always produce a 64-character hex string.

#![no_main]

use clowdy_imagebuilder::hash_manifest;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let hex = hash_manifest(data);
    assert_eq!(hex.len(), 64, "manifest hash must always be 64 hex chars");
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(hex, hash_manifest(data), "hashing must be deterministic");
});
