//! Fuzz target: Docker exec-attach stream demuxer.
//!
//! `demux` walks an attacker-controlled byte stream using length-prefixed
//! frame headers; it must never panic or read past the buffer regardless
//! of how the declared frame sizes relate to the actual remaining bytes.

#![no_main]

use clowdy_sandbox::transport::demux;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let (stdout, stderr) = demux(data);
    assert!(stdout.len() + stderr.len() <= data.len());
});
