//! Shared test helpers for integration tests.
//!
//! Provides the WAT guests exercised across test files, harness factory
//! functions, and fixture-file builders.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scout_hostapi::{BlockDataStore, DEFAULT_PRE_STATE_ROOT};
use scout_sandbox::{Harness, HarnessConfig, HostContext};

// ── Guests ──

/// Copies the whole block payload to offset 0 and saves the first 32 bytes
/// of memory as the post-state root.
pub const ROOT_FROM_BLOCK: &str = r#"
(module
    (import "env" "eth2_blockDataSize" (func $size (result i32)))
    (import "env" "eth2_blockDataCopy" (func $copy (param i32 i32 i32)))
    (import "env" "eth2_savePostStateRoot" (func $save (param i32)))
    (memory (export "memory") 1)
    (func (export "main")
        (call $copy (i32.const 0) (i32.const 0) (call $size))
        (call $save (i32.const 0)))
)
"#;

/// Saves the pre-state root back unchanged.
pub const ECHO_PRE_STATE: &str = r#"
(module
    (import "env" "eth2_loadPreStateRoot" (func $load (param i32)))
    (import "env" "eth2_savePostStateRoot" (func $save (param i32)))
    (memory (export "memory") 1)
    (func (export "main")
        (call $load (i32.const 64))
        (call $save (i32.const 64)))
)
"#;

/// Imports `host.print` with a result so the resolver must zero-fill it.
pub const HOST_PRINT: &str = r#"
(module
    (import "host" "print" (func $print (param i32 i64) (result i32)))
    (func (export "main") (result i32)
        (call $print (i32.const 7) (i64.const -1)))
)
"#;

/// Dumps four bytes of memory through `debug_printMemHex`, once in range and
/// once out of range.
pub const DEBUG_PRINT: &str = r#"
(module
    (import "env" "debug_printMemHex" (func $dump (param i32 i32)))
    (memory (export "memory") 1)
    (data (i32.const 16) "\de\ad\be\ef")
    (func (export "main")
        (call $dump (i32.const 16) (i32.const 4))
        (call $dump (i32.const 65534) (i32.const 4)))
)
"#;

/// Increments a global on each call to `main` and returns the new value.
pub const COUNTER: &str = r#"
(module
    (import "env" "eth2_blockDataSize" (func $size (result i32)))
    (global $n (mut i32) (i32.const 0))
    (func (export "main") (result i32)
        (drop (call $size))
        (global.set $n (i32.add (global.get $n) (i32.const 1)))
        (global.get $n))
)
"#;

/// Guest whose `main` copies `len` bytes from block offset `src` to memory
/// offset `out`, then saves the root at `out`.
pub fn copy_guest(out: i64, src: i64, len: i64) -> String {
    format!(
        r#"
(module
    (import "env" "eth2_blockDataCopy" (func $copy (param i32 i32 i32)))
    (import "env" "eth2_savePostStateRoot" (func $save (param i32)))
    (memory (export "memory") 1)
    (func (export "main")
        (call $copy (i32.const {out}) (i32.const {src}) (i32.const {len}))
        (call $save (i32.const {out})))
)
"#
    )
}

// ── Harness Factories ──

/// Build a host context serving `payload` with the default pre-state root.
pub fn context_with_block(payload: &[u8]) -> HostContext {
    HostContext::new(
        Arc::new(BlockDataStore::new(payload.to_vec())),
        DEFAULT_PRE_STATE_ROOT,
    )
}

/// Load and instantiate `wat` with `config`, serving `payload`.
pub fn instantiated_with(wat: &str, payload: &[u8], config: HarnessConfig) -> Harness {
    let mut harness =
        Harness::new(config, context_with_block(payload)).expect("failed to create harness");
    harness
        .load_bytes(wat.as_bytes())
        .expect("failed to load guest");
    harness.instantiate().expect("failed to instantiate guest");
    harness
}

/// Load and instantiate `wat` with the default config, serving `payload`.
pub fn instantiated(wat: &str, payload: &[u8]) -> Harness {
    instantiated_with(wat, payload, HarnessConfig::default())
}

/// Deterministic payload of `len` bytes.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

// ── Fixture Files ──

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write fixture file");
    path
}
