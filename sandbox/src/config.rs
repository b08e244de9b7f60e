//! Harness configuration.

use std::path::PathBuf;

use scout_hostapi::{StateRoot, DEFAULT_PRE_STATE_ROOT};

/// Bytes of native stack budgeted per value-stack slot.
pub const VALUE_SLOT_BYTES: usize = 16;
/// Bytes of native stack budgeted per call frame.
pub const CALL_FRAME_BYTES: usize = 256;
/// Wasmtime's default `max_wasm_stack`.
pub const DEFAULT_MAX_WASM_STACK: usize = 512 * 1024;

/// What happens to guest state between benchmark iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetPolicy {
    /// Every iteration reuses the same instance and memory. Guests that
    /// accumulate state see non-idempotent iterations.
    #[default]
    SharedInstance,
    /// Re-instantiate with a fresh store and host context before each
    /// iteration. Instantiation time is excluded from the measurement.
    FreshInstance,
}

/// Configuration for one harness run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Export invoked by `run`/`benchmark`.
    pub entry_point: String,

    /// Invoke every nullary export instead of `entry_point`. Loading then
    /// does not require `entry_point` to exist.
    pub run_all_exports: bool,

    /// Value stack size in elements. `None` keeps the engine default.
    pub value_stack_size: Option<usize>,

    /// Call stack size in frames. `None` keeps the engine default.
    pub call_stack_size: Option<usize>,

    /// Log every host call at trace level.
    pub trace: bool,

    /// Bind `host.print` for guests that import it.
    pub host_print: bool,

    /// Pre-state root handed out by `eth2_loadPreStateRoot`.
    pub pre_state_root: StateRoot,

    /// Raw block-payload hex file. Scenario runs fall back to the
    /// scenario's shard block when unset.
    pub block_data_path: Option<PathBuf>,

    pub reset_policy: ResetPolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            entry_point: "main".into(),
            run_all_exports: false,
            value_stack_size: None,
            call_stack_size: None,
            trace: false,
            host_print: false,
            pre_state_root: DEFAULT_PRE_STATE_ROOT,
            block_data_path: None,
            reset_policy: ResetPolicy::SharedInstance,
        }
    }
}

impl HarnessConfig {
    /// Export the loaded module must provide, if any.
    pub fn required_entry_point(&self) -> Option<&str> {
        if self.run_all_exports {
            None
        } else {
            Some(&self.entry_point)
        }
    }

    /// Native stack budget for guest code, in bytes.
    ///
    /// Wasmtime bounds only total stack bytes, so the element and frame
    /// counts are converted and the larger requirement wins.
    pub fn max_wasm_stack(&self) -> usize {
        let values = self.value_stack_size.map(|n| n.saturating_mul(VALUE_SLOT_BYTES));
        let calls = self.call_stack_size.map(|n| n.saturating_mul(CALL_FRAME_BYTES));
        match (values, calls) {
            (None, None) => DEFAULT_MAX_WASM_STACK,
            (a, b) => a.unwrap_or(0).max(b.unwrap_or(0)).max(1),
        }
    }
}
