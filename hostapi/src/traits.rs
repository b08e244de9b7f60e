//! Host API trait — host-side signatures of the eth2 shard-execution imports.
//!
//! Each method corresponds to one function a guest imports from the `env`
//! namespace. Implementations work on plain byte slices: the sandbox hands
//! in the guest's linear memory for the duration of a single call and takes
//! it back when the method returns.

use crate::error::HostError;
use crate::types::StateRoot;

pub trait ShardHostApi {
    /// `debug_printMemHex(offset, len)`: render `len` bytes of guest memory
    /// at `offset` as hex. Diagnostic only; must not fault the guest.
    fn debug_print_mem_hex(&self, mem: &[u8], offset: u32, len: u32) -> String;

    /// `eth2_loadPreStateRoot(outOffset)`: write the 32-byte pre-state root.
    fn load_pre_state_root(&self, mem: &mut [u8], out_offset: u32) -> Result<(), HostError>;

    /// `eth2_savePostStateRoot(inOffset)`: capture the 32 bytes the guest
    /// wrote as its post-state root.
    fn save_post_state_root(&mut self, mem: &[u8], in_offset: u32) -> Result<StateRoot, HostError>;

    /// `eth2_blockDataSize()`: length of the block payload.
    fn block_data_size(&self) -> u32;

    /// `eth2_blockDataCopy(outOffset, srcOffset, length)`: copy payload bytes
    /// into guest memory.
    fn block_data_copy(
        &self,
        mem: &mut [u8],
        out_offset: u32,
        src_offset: u32,
        length: u32,
    ) -> Result<(), HostError>;
}
