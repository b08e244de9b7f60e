//! Shared types and ABI constants for the eth2 host interface.
//!
//! Import namespaces and function names are the ones compiled into existing
//! shard-execution guests and must not be renamed.

/// Length in bytes of a state root.
pub const STATE_ROOT_LEN: usize = 32;

/// A 32-byte state root exchanged with the guest.
pub type StateRoot = [u8; STATE_ROOT_LEN];

/// Pre-state root supplied when no scenario pre-state is configured.
pub const DEFAULT_PRE_STATE_ROOT: StateRoot = [
    0xb3, 0xc4, 0x18, 0xcb, 0x00, 0xad, 0x7c, 0x90, 0x71, 0x76, 0xbe, 0x86, 0xa5, 0xa2, 0x17, 0x59,
    0xb7, 0x4b, 0xd3, 0x82, 0x8e, 0xd6, 0x2a, 0x1e, 0xa2, 0xae, 0x8d, 0xae, 0xa9, 0x8c, 0x5d, 0xa2,
];

/// Namespace for block data, state roots, debug output, and bignum stubs.
pub const ENV_NAMESPACE: &str = "env";
/// Namespace for the ewasm modular-arithmetic stubs.
pub const EWASM_NAMESPACE: &str = "ewasm";
/// Namespace holding `finish`.
pub const ETHEREUM_NAMESPACE: &str = "ethereum";
/// Namespace searched for the opt-in `print` import.
pub const HOST_NAMESPACE: &str = "host";

pub const DEBUG_PRINT_MEM_HEX: &str = "debug_printMemHex";
pub const LOAD_PRE_STATE_ROOT: &str = "eth2_loadPreStateRoot";
pub const SAVE_POST_STATE_ROOT: &str = "eth2_savePostStateRoot";
pub const BLOCK_DATA_SIZE: &str = "eth2_blockDataSize";
pub const BLOCK_DATA_COPY: &str = "eth2_blockDataCopy";

/// `env` imports that read or write guest memory.
pub const MEMORY_IMPORTS: &[&str] = &[
    DEBUG_PRINT_MEM_HEX,
    LOAD_PRE_STATE_ROOT,
    SAVE_POST_STATE_ROOT,
    BLOCK_DATA_COPY,
];

/// Convert a `StateRoot`-sized slice, if it has exactly 32 bytes.
pub fn state_root_from_slice(bytes: &[u8]) -> Option<StateRoot> {
    bytes.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_root_prefix() {
        assert_eq!(&DEFAULT_PRE_STATE_ROOT[..4], &[0xb3, 0xc4, 0x18, 0xcb]);
        assert_eq!(DEFAULT_PRE_STATE_ROOT[31], 0xa2);
    }

    #[test]
    fn test_state_root_from_slice() {
        assert_eq!(state_root_from_slice(&[7u8; 32]), Some([7u8; 32]));
        assert_eq!(state_root_from_slice(&[7u8; 31]), None);
        assert_eq!(state_root_from_slice(&[7u8; 33]), None);
    }
}
