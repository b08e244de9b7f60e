//! `scout-hostapi` — host-side data for the shard-execution guest harness.
//!
//! Everything here is independent of the WebAssembly engine:
//!
//! - `hex` — hex text codec used by every fixture reader
//! - `BlockDataStore` — the raw block payload served to the guest
//! - `StateRootExchange` — pre-state root supply, post-state root capture
//! - `scenario` — YAML/JSON scenario fixture loader
//! - `ShardHostApi` — host-side mirror of the guest's `env` imports
//! - `HostError`, `HexDecodeError`, `ConfigLoadError`

pub mod error;
pub mod types;
pub mod hex;
pub mod memory;
pub mod block_data;
pub mod state_root;
pub mod scenario;
pub mod traits;

pub use error::{ConfigLoadError, HexDecodeError, HostError};
pub use types::{StateRoot, DEFAULT_PRE_STATE_ROOT, STATE_ROOT_LEN};
pub use block_data::BlockDataStore;
pub use state_root::StateRootExchange;
pub use scenario::{ScenarioDescriptor, ShardBlock};
pub use traits::ShardHostApi;
