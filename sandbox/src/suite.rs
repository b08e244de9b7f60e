//! Scenario suite runner.
//!
//! Runs every module of a scenario fixture in its own harness and checks the
//! post-state root each one saves against the fixture's expectation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use scout_hostapi::{hex, scenario, BlockDataStore, StateRoot};

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::host_impl::HostContext;
use crate::runtime::Harness;

/// Result of running one module of a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub module: PathBuf,
    /// Root saved through `eth2_savePostStateRoot`, if the guest saved one.
    pub produced: Option<StateRoot>,
    /// Expected post-state from the fixture, if it lists one.
    pub expected: Option<Vec<u8>>,
    /// `produced` equals `expected`, or there was nothing to compare against.
    pub matched: bool,
}

/// Run every module listed in the fixture at `path`.
///
/// Module paths are resolved against the fixture's directory. Block data
/// comes from `config.block_data_path` when set, otherwise from the shard
/// block paired with the module. Load, link, and execution failures abort the
/// run; a post-state mismatch does not.
pub fn run_scenario(
    path: &Path,
    config: &HarnessConfig,
) -> Result<Vec<ScenarioOutcome>, HarnessError> {
    let fixture = scenario::load(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let raw_block_data = match &config.block_data_path {
        Some(block_path) => Some(Arc::new(BlockDataStore::from_file(block_path)?)),
        None => None,
    };

    let mut outcomes = Vec::with_capacity(fixture.wasm_binaries.len());
    for index in 0..fixture.wasm_binaries.len() {
        let module = match fixture.module_path(base, index) {
            Some(module) => module,
            None => break,
        };

        let block_data = match &raw_block_data {
            Some(data) => Arc::clone(data),
            None => Arc::new(match fixture.block_payload(index) {
                Some(payload) => BlockDataStore::new(payload.to_vec()),
                None => {
                    warn!("no shard block for module {}, using empty block data", index);
                    BlockDataStore::default()
                }
            }),
        };

        let pre_state_root = match fixture.pre_state_root(index) {
            Some(root) => root,
            None => {
                warn!(
                    "no 32-byte pre-state for module {}, using {}",
                    index,
                    hex::encode(&config.pre_state_root)
                );
                config.pre_state_root
            }
        };

        let context = HostContext::new(block_data, pre_state_root);
        let mut harness = Harness::new(config.clone(), context)?;
        harness.load_file(&module)?;
        harness.instantiate()?;
        if config.run_all_exports {
            harness.run_all_exports()?;
        } else {
            harness.run()?;
        }

        let produced = harness.post_state_root();
        let expected = fixture.expected_post_state(index).map(<[u8]>::to_vec);
        let matched = match &expected {
            Some(expected) => harness.host_context().state_roots.matches_expected(expected),
            None => true,
        };

        let produced_hex = produced.map(|r| hex::encode(&r)).unwrap_or_else(|| "none".into());
        if matched {
            info!("{}: post-state {} ok", module.display(), produced_hex);
        } else {
            warn!(
                "{}: post-state {} does not match expected {}",
                module.display(),
                produced_hex,
                expected.as_deref().map(hex::encode).unwrap_or_default()
            );
        }

        outcomes.push(ScenarioOutcome {
            module,
            produced,
            expected,
            matched,
        });
    }
    Ok(outcomes)
}
