//! Scenario fixture loading.
//!
//! A scenario bundles guest modules with their inputs and expected outputs:
//!
//! ```yaml
//! beacon_state:
//!   execution_scripts:
//!     - helloworld.wasm
//! shard_pre_state:
//!   exec_env_states:
//!     - "b3c418cb00ad7c907176be86a5a21759b74bd3828ed62a1ea2ae8daea98c5da2"
//! shard_blocks:
//!   - env: 0
//!     data: "aabbcc"
//! shard_post_state:
//!   exec_env_states:
//!     - "0000000000000000000000000000000000000000000000000000000000000000"
//! ```
//!
//! Module *i* pairs with pre-state *i*, post-state *i* and, when no raw block
//! file is given, shard block *i*. That pairing is a convention of the
//! format: sequences of different lengths load fine and only produce a
//! warning.
//!
//! Hex fields must be quoted. YAML reads an unquoted `112233` as an integer
//! and drops leading zeros, so such a fixture is rejected as a schema
//! mismatch rather than decoded wrongly.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use crate::error::ConfigLoadError;
use crate::hex;
use crate::types::{state_root_from_slice, StateRoot};

/// One block of shard payload addressed to an execution environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardBlock {
    pub environment_id: u32,
    pub payload: Vec<u8>,
}

/// In-memory form of a scenario fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioDescriptor {
    pub wasm_binaries: Vec<String>,
    pub shard_blocks: Vec<ShardBlock>,
    pub pre_states: Vec<Vec<u8>>,
    pub post_states: Vec<Vec<u8>>,
}

/// Document syntax of a fixture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureFormat {
    Yaml,
    Json,
}

impl FixtureFormat {
    /// `.json` files are JSON; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

// ── Wire shape ──

#[derive(Deserialize)]
struct RawFixture {
    beacon_state: RawBeaconState,
    shard_pre_state: RawExecEnvStates,
    shard_blocks: Vec<RawShardBlock>,
    shard_post_state: RawExecEnvStates,
}

#[derive(Deserialize)]
struct RawBeaconState {
    execution_scripts: Vec<String>,
}

#[derive(Deserialize)]
struct RawExecEnvStates {
    exec_env_states: Vec<String>,
}

#[derive(Deserialize)]
struct RawShardBlock {
    #[serde(alias = "environment_id", alias = "environmentId")]
    env: u32,
    data: String,
}

impl From<RawFixture> for ScenarioDescriptor {
    fn from(raw: RawFixture) -> Self {
        Self {
            wasm_binaries: raw.beacon_state.execution_scripts,
            shard_blocks: raw
                .shard_blocks
                .into_iter()
                .map(|b| ShardBlock {
                    environment_id: b.env,
                    payload: hex::decode_lenient(&b.data),
                })
                .collect(),
            pre_states: decode_all(&raw.shard_pre_state.exec_env_states),
            post_states: decode_all(&raw.shard_post_state.exec_env_states),
        }
    }
}

fn decode_all(hex_strings: &[String]) -> Vec<Vec<u8>> {
    hex_strings.iter().map(|s| hex::decode_lenient(s)).collect()
}

// ── Loading ──

/// Load a fixture file, picking the syntax from its extension.
pub fn load(path: &Path) -> Result<ScenarioDescriptor, ConfigLoadError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigLoadError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, FixtureFormat::from_path(path), path)
}

/// Parse fixture text. `origin` is only used in error messages.
pub fn parse(
    text: &str,
    format: FixtureFormat,
    origin: &Path,
) -> Result<ScenarioDescriptor, ConfigLoadError> {
    let parse_error = |message: String| ConfigLoadError::ParseError {
        path: origin.to_path_buf(),
        message,
    };
    let schema_error = |message: String| ConfigLoadError::SchemaMismatch {
        path: origin.to_path_buf(),
        message: if message.contains("expected a string") {
            format!("{} (hex fields must be quoted strings)", message)
        } else {
            message
        },
    };

    // Two stages so that syntax errors and shape errors are told apart.
    let raw: RawFixture = match format {
        FixtureFormat::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
            serde_yaml::from_value(value).map_err(|e| schema_error(e.to_string()))?
        }
        FixtureFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(text).map_err(|e| parse_error(e.to_string()))?;
            serde_json::from_value(value).map_err(|e| schema_error(e.to_string()))?
        }
    };

    let scenario = ScenarioDescriptor::from(raw);
    scenario.warn_on_misalignment(origin);
    debug!(
        "loaded scenario {}: {} module(s), {} shard block(s)",
        origin.display(),
        scenario.wasm_binaries.len(),
        scenario.shard_blocks.len()
    );
    Ok(scenario)
}

impl ScenarioDescriptor {
    fn warn_on_misalignment(&self, origin: &Path) {
        let modules = self.wasm_binaries.len();
        if self.pre_states.len() != modules || self.post_states.len() != modules {
            warn!(
                "scenario {}: {} module(s) but {} pre-state(s) and {} post-state(s); \
                 entries are paired by index",
                origin.display(),
                modules,
                self.pre_states.len(),
                self.post_states.len()
            );
        }
    }

    /// Path of module `index`, resolved against the fixture's directory.
    pub fn module_path(&self, base: &Path, index: usize) -> Option<PathBuf> {
        let script = self.wasm_binaries.get(index)?;
        let path = Path::new(script);
        if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            Some(base.join(path))
        }
    }

    /// Pre-state `index` as a state root, if present and exactly 32 bytes.
    pub fn pre_state_root(&self, index: usize) -> Option<StateRoot> {
        self.pre_states
            .get(index)
            .and_then(|s| state_root_from_slice(s))
    }

    pub fn expected_post_state(&self, index: usize) -> Option<&[u8]> {
        self.post_states.get(index).map(Vec::as_slice)
    }

    pub fn block_payload(&self, index: usize) -> Option<&[u8]> {
        self.shard_blocks.get(index).map(|b| b.payload.as_slice())
    }
}
