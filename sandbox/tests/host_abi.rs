//! Host ABI tests — bounds handling of the `env` imports, dynamic
//! `host.print` binding, and debug output.

mod common;

use scout_sandbox::{HarnessConfig, HarnessError, HarnessStatus};
use wasmtime::Val;

use common::*;

// ── Test: block data copy ──

#[test]
fn test_copy_with_offsets() {
    let block = payload(100);
    let mut harness = instantiated(&copy_guest(256, 40, 32), &block);

    harness.run().unwrap();

    let root = harness.post_state_root().unwrap();
    assert_eq!(&root[..], &block[40..72]);
}

#[test]
fn test_zero_length_copy_never_faults() {
    let wat = r#"
    (module
        (import "env" "eth2_blockDataCopy" (func $copy (param i32 i32 i32)))
        (memory (export "memory") 1)
        (func (export "main")
            (call $copy (i32.const 70000) (i32.const 5000) (i32.const 0))
            (call $copy (i32.const -1) (i32.const -1) (i32.const 0)))
    )
    "#;
    let mut harness = instantiated(wat, &payload(10));
    harness.run().unwrap();
    assert_eq!(harness.status(), HarnessStatus::Finished);
    assert_eq!(harness.host_context().host_calls, 2);
}

#[test]
fn test_copy_past_memory_end_traps() {
    let mut harness = instantiated(&copy_guest(65530, 0, 16), &payload(100));

    let err = harness.run().unwrap_err();

    match err {
        HarnessError::ExecutionFault { export, message } => {
            assert_eq!(export, "main");
            assert!(message.contains("out of bounds"), "got: {}", message);
        }
        other => panic!("expected ExecutionFault, got: {:?}", other),
    }
    assert_eq!(harness.status(), HarnessStatus::Failed);
    assert_eq!(harness.post_state_root(), None);
}

#[test]
fn test_copy_past_block_end_traps() {
    let mut harness = instantiated(&copy_guest(0, 90, 20), &payload(100));
    let err = harness.run().unwrap_err();
    assert!(matches!(err, HarnessError::ExecutionFault { .. }));
}

#[test]
fn test_negative_offset_is_out_of_bounds() {
    let mut harness = instantiated(&copy_guest(-1, 0, 4), &payload(100));
    assert!(harness.run().is_err());
}

// ── Test: state roots ──

#[test]
fn test_save_near_memory_end_traps() {
    let wat = r#"
    (module
        (import "env" "eth2_savePostStateRoot" (func $save (param i32)))
        (memory (export "memory") 1)
        (func (export "main") (call $save (i32.const 65520)))
    )
    "#;
    let mut harness = instantiated(wat, &[]);
    assert!(harness.run().is_err());
    assert_eq!(harness.post_state_root(), None);
}

#[test]
fn test_last_save_wins() {
    let wat = r#"
    (module
        (import "env" "eth2_savePostStateRoot" (func $save (param i32)))
        (memory (export "memory") 1)
        (data (i32.const 32) "\01")
        (func (export "main")
            (call $save (i32.const 0))
            (call $save (i32.const 32)))
    )
    "#;
    let mut harness = instantiated(wat, &[]);
    harness.run().unwrap();
    let root = harness.post_state_root().unwrap();
    assert_eq!(root[0], 1);
}

// ── Test: host.print ──

#[test]
fn test_host_print_unbound_without_flag() {
    let mut harness = scout_sandbox::Harness::from_config(HarnessConfig::default()).unwrap();
    harness.load_bytes(HOST_PRINT.as_bytes()).unwrap();
    let err = harness.instantiate().unwrap_err();
    assert!(matches!(err, HarnessError::Link(_)));
}

#[test]
fn test_host_print_bound_with_flag() {
    let config = HarnessConfig {
        host_print: true,
        ..HarnessConfig::default()
    };
    let mut harness = instantiated_with(HOST_PRINT, &[], config);
    let results = harness.run().unwrap();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Val::I32(0)));
}

#[test]
fn test_static_import_not_shadowed_by_resolver() {
    let config = HarnessConfig {
        host_print: true,
        ..HarnessConfig::default()
    };
    let mut harness = instantiated_with(ROOT_FROM_BLOCK, &payload(40), config);
    harness.run().unwrap();
    assert!(harness.post_state_root().is_some());
}

// ── Test: debug output ──

#[test]
fn test_debug_print_out_of_range_does_not_trap() {
    let mut harness = instantiated(DEBUG_PRINT, &[]);
    harness.run().unwrap();
    assert_eq!(harness.host_context().host_calls, 2);
}

#[test]
fn test_trace_flag_reaches_host_context() {
    let config = HarnessConfig {
        trace: true,
        ..HarnessConfig::default()
    };
    let harness = instantiated_with(COUNTER, &[], config);
    assert!(harness.host_context().trace);
}
