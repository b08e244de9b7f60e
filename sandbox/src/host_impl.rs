//! Per-run host state held in the Wasmtime `Store`.
//!
//! `HostContext` owns everything the `env` imports read or write: the shared
//! block payload and the state root exchange. The harness creates one per
//! store; benchmark runs with `ResetPolicy::FreshInstance` clone a pristine
//! template for each iteration.

use std::sync::Arc;

use log::trace;

use scout_hostapi::{
    hex, memory, BlockDataStore, HostError, ShardHostApi, StateRoot, StateRootExchange,
};

/// Host data visible to guest calls through `Caller::data`.
#[derive(Debug, Clone)]
pub struct HostContext {
    /// Block payload, immutable for the whole run.
    pub block_data: Arc<BlockDataStore>,
    /// Pre-state root supply and post-state root capture.
    pub state_roots: StateRootExchange,
    /// Log each host call at trace level.
    pub trace: bool,
    /// Number of `env` host calls served by this context.
    pub host_calls: u64,
}

impl HostContext {
    pub fn new(block_data: Arc<BlockDataStore>, pre_state_root: StateRoot) -> Self {
        Self {
            block_data,
            state_roots: StateRootExchange::new(pre_state_root),
            trace: false,
            host_calls: 0,
        }
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Copy of this context with no captured post-state and a zeroed call count.
    pub fn fresh(&self) -> Self {
        let mut ctx = self.clone();
        ctx.state_roots.reset();
        ctx.host_calls = 0;
        ctx
    }

    pub fn post_state_root(&self) -> Option<&StateRoot> {
        self.state_roots.post_state_root()
    }

    /// Count a host call and trace it when enabled.
    pub fn record_call(&mut self, name: &str, args: &[i32]) {
        self.host_calls += 1;
        if self.trace {
            trace!("host call env.{}{:?}", name, args);
        }
    }
}

impl ShardHostApi for HostContext {
    fn debug_print_mem_hex(&self, mem: &[u8], offset: u32, len: u32) -> String {
        match memory::read_bytes(mem, offset, len as usize) {
            Ok(bytes) => hex::encode(bytes),
            Err(e) => format!("<{}>", e),
        }
    }

    fn load_pre_state_root(&self, mem: &mut [u8], out_offset: u32) -> Result<(), HostError> {
        self.state_roots.write_pre_state_root(mem, out_offset)
    }

    fn save_post_state_root(&mut self, mem: &[u8], in_offset: u32) -> Result<StateRoot, HostError> {
        self.state_roots.capture_post_state_root(mem, in_offset)
    }

    fn block_data_size(&self) -> u32 {
        self.block_data.size()
    }

    fn block_data_copy(
        &self,
        mem: &mut [u8],
        out_offset: u32,
        src_offset: u32,
        length: u32,
    ) -> Result<(), HostError> {
        self.block_data.copy(mem, out_offset, src_offset, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_hostapi::DEFAULT_PRE_STATE_ROOT;

    fn test_context() -> HostContext {
        let data = Arc::new(BlockDataStore::new((0u8..64).collect()));
        HostContext::new(data, DEFAULT_PRE_STATE_ROOT)
    }

    #[test]
    fn test_block_data_size() {
        assert_eq!(test_context().block_data_size(), 64);
    }

    #[test]
    fn test_block_data_copy_into_memory() {
        let ctx = test_context();
        let mut mem = vec![0u8; 128];
        ctx.block_data_copy(&mut mem, 100, 10, 4).unwrap();
        assert_eq!(&mem[100..104], &[10, 11, 12, 13]);
    }

    #[test]
    fn test_pre_and_post_state_roots() {
        let mut ctx = test_context();
        let mut mem = vec![0u8; 64];
        ctx.load_pre_state_root(&mut mem, 0).unwrap();
        assert_eq!(&mem[..32], &DEFAULT_PRE_STATE_ROOT);

        let root = ctx.save_post_state_root(&mem, 0).unwrap();
        assert_eq!(root, DEFAULT_PRE_STATE_ROOT);
        assert_eq!(ctx.post_state_root(), Some(&DEFAULT_PRE_STATE_ROOT));
    }

    #[test]
    fn test_debug_print_mem_hex_never_fails() {
        let ctx = test_context();
        let mem = vec![0xab, 0xcd, 0xef];
        assert_eq!(ctx.debug_print_mem_hex(&mem, 1, 2), "cdef");
        assert!(ctx.debug_print_mem_hex(&mem, 2, 5).starts_with('<'));
    }

    #[test]
    fn test_fresh_clears_capture_and_counter() {
        let mut ctx = test_context();
        ctx.record_call("eth2_blockDataSize", &[]);
        ctx.save_post_state_root(&[1u8; 32], 0).unwrap();

        let fresh = ctx.fresh();
        assert_eq!(fresh.host_calls, 0);
        assert!(fresh.post_state_root().is_none());
        assert!(Arc::ptr_eq(&fresh.block_data, &ctx.block_data));
        assert_eq!(ctx.host_calls, 1);
    }
}
