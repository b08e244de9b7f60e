//! Pre-state root supply and post-state root capture.

use crate::error::HostError;
use crate::memory::{read_bytes, write_bytes};
use crate::types::{state_root_from_slice, StateRoot, DEFAULT_PRE_STATE_ROOT, STATE_ROOT_LEN};

/// Holds the pre-state root handed to the guest and the post-state root it
/// reports back.
///
/// The pre-state root is fixed when the exchange is built. The post-state
/// root is `None` until the guest calls `eth2_savePostStateRoot`; each call
/// overwrites the previous capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRootExchange {
    pre_state_root: StateRoot,
    post_state_root: Option<StateRoot>,
}

impl Default for StateRootExchange {
    fn default() -> Self {
        Self::new(DEFAULT_PRE_STATE_ROOT)
    }
}

impl StateRootExchange {
    pub fn new(pre_state_root: StateRoot) -> Self {
        Self {
            pre_state_root,
            post_state_root: None,
        }
    }

    pub fn pre_state_root(&self) -> &StateRoot {
        &self.pre_state_root
    }

    /// Write the pre-state root into `dst[out_offset..out_offset+32]`.
    pub fn write_pre_state_root(&self, dst: &mut [u8], out_offset: u32) -> Result<(), HostError> {
        write_bytes(dst, out_offset, &self.pre_state_root)
    }

    /// Read 32 bytes at `in_offset` and record them as the produced root.
    pub fn capture_post_state_root(
        &mut self,
        src: &[u8],
        in_offset: u32,
    ) -> Result<StateRoot, HostError> {
        let bytes = read_bytes(src, in_offset, STATE_ROOT_LEN)?;
        // read_bytes returned exactly STATE_ROOT_LEN bytes
        let root = state_root_from_slice(bytes)
            .ok_or_else(|| HostError::out_of_bounds(in_offset, STATE_ROOT_LEN as u64, src.len()))?;
        self.post_state_root = Some(root);
        Ok(root)
    }

    /// The most recently captured post-state root, if any.
    pub fn post_state_root(&self) -> Option<&StateRoot> {
        self.post_state_root.as_ref()
    }

    /// Whether the captured post-state root equals `expected`.
    ///
    /// `false` when nothing was captured or `expected` is not 32 bytes.
    pub fn matches_expected(&self, expected: &[u8]) -> bool {
        match self.post_state_root {
            Some(root) => root.as_slice() == expected,
            None => false,
        }
    }

    /// Forget the captured post-state root.
    pub fn reset(&mut self) {
        self.post_state_root = None;
    }
}
