//! Execution harness — Wasmtime engine, module loading, and export invocation.
//!
//! The `Harness` struct is the main entry point. It walks a fixed lifecycle:
//!
//! ```text
//! Unloaded → Loaded → Instantiated → Running → Finished
//!                                          ↘ Failed
//! ```
//!
//! Loading compiles and validates the module, instantiation links the host
//! ABI and runs the start routine once, and each `invoke` runs one export.
//! `Failed` is terminal: nothing is retried.

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use wasmtime::{Config, Engine, ExternType, Instance, Linker, Module, Store, Val};

use scout_hostapi::{BlockDataStore, StateRoot};

use crate::config::{HarnessConfig, ResetPolicy};
use crate::error::HarnessError;
use crate::host_impl::HostContext;
use crate::linker::register_host_functions;
use crate::resolver::{format_vals, resolve_imports, HostPrintResolver, ImportResolver};
use crate::validation::validate_module;

/// Where the harness is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessStatus {
    Unloaded,
    Loaded,
    Instantiated,
    Running,
    Finished,
    Failed,
}

/// Timing summary of a benchmark loop.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub export: String,
    pub iterations: u32,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
}

impl BenchmarkReport {
    fn from_timings(export: &str, timings: &[Duration]) -> Self {
        let total: Duration = timings.iter().sum();
        let iterations = timings.len() as u32;
        Self {
            export: export.to_string(),
            iterations,
            total,
            min: timings.iter().min().copied().unwrap_or_default(),
            max: timings.iter().max().copied().unwrap_or_default(),
            mean: total / iterations.max(1),
        }
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} iterations in {:?} (min {:?}, mean {:?}, max {:?})",
            self.export, self.iterations, self.total, self.min, self.mean, self.max
        )
    }
}

/// Loads one guest module and runs its exports against the shard host ABI.
pub struct Harness {
    engine: Engine,
    linker: Linker<HostContext>,
    store: Store<HostContext>,
    /// Pristine context that fresh stores are cloned from.
    template: HostContext,
    module: Option<Module>,
    instance: Option<Instance>,
    status: HarnessStatus,
    config: HarnessConfig,
    resolvers: Vec<Box<dyn ImportResolver>>,
}

impl Harness {
    /// Create a harness whose host calls are served by `context`.
    pub fn new(config: HarnessConfig, context: HostContext) -> Result<Self, HarnessError> {
        let engine = create_engine(&config)?;
        let mut linker = Linker::new(&engine);
        register_host_functions(&mut linker)?;

        let template = context.with_trace(config.trace);
        let store = Store::new(&engine, template.fresh());

        let mut resolvers: Vec<Box<dyn ImportResolver>> = Vec::new();
        if config.host_print {
            resolvers.push(Box::new(HostPrintResolver));
        }

        Ok(Self {
            engine,
            linker,
            store,
            template,
            module: None,
            instance: None,
            status: HarnessStatus::Unloaded,
            config,
            resolvers,
        })
    }

    /// Create a harness from configuration alone: block data is read from
    /// `config.block_data_path` (empty when unset) and the pre-state root is
    /// `config.pre_state_root`.
    pub fn from_config(config: HarnessConfig) -> Result<Self, HarnessError> {
        let block_data = match &config.block_data_path {
            Some(path) => BlockDataStore::from_file(path)?,
            None => BlockDataStore::default(),
        };
        let context = HostContext::new(Arc::new(block_data), config.pre_state_root);
        Self::new(config, context)
    }

    /// Offer unresolved imports to `resolver` after the built-in ones.
    pub fn add_resolver(&mut self, resolver: Box<dyn ImportResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn status(&self) -> HarnessStatus {
        self.status
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Host context of the current store.
    pub fn host_context(&self) -> &HostContext {
        self.store.data()
    }

    /// Root captured by the most recent `eth2_savePostStateRoot` call.
    pub fn post_state_root(&self) -> Option<StateRoot> {
        self.store.data().post_state_root().copied()
    }

    /// Read, compile, and validate a module from disk.
    pub fn load_file(&mut self, path: &Path) -> Result<(), HarnessError> {
        self.expect_status("load", &[HarnessStatus::Unloaded])?;
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return self.fail(HarnessError::ModuleLoad {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            }
        };
        self.load_module(&bytes, path)
    }

    /// Compile and validate a module from binary or text bytes.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), HarnessError> {
        self.expect_status("load", &[HarnessStatus::Unloaded])?;
        self.load_module(bytes, Path::new("<bytes>"))
    }

    fn load_module(&mut self, bytes: &[u8], origin: &Path) -> Result<(), HarnessError> {
        let module = match Module::new(&self.engine, bytes) {
            Ok(module) => module,
            Err(e) => {
                return self.fail(HarnessError::ModuleLoad {
                    path: origin.to_path_buf(),
                    message: format!("{:#}", e),
                });
            }
        };
        if let Err(e) = validate_module(&module, self.config.required_entry_point()) {
            return self.fail(e);
        }

        info!(
            "loaded {} ({} imports, {} exports)",
            origin.display(),
            module.imports().len(),
            module.exports().len()
        );
        self.module = Some(module);
        self.status = HarnessStatus::Loaded;
        Ok(())
    }

    /// Link the host ABI and instantiate, running the start routine once.
    pub fn instantiate(&mut self) -> Result<(), HarnessError> {
        self.expect_status("instantiate", &[HarnessStatus::Loaded])?;
        self.instantiate_current()
    }

    fn instantiate_current(&mut self) -> Result<(), HarnessError> {
        let module = self.loaded_module("instantiate")?;
        match self.instantiate_module(&module) {
            Ok(instance) => {
                self.instance = Some(instance);
                self.status = HarnessStatus::Instantiated;
                debug!("instantiated");
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn instantiate_module(&mut self, module: &Module) -> Result<Instance, HarnessError> {
        let bound = resolve_imports(&mut self.linker, &mut self.store, module, &self.resolvers)?;
        for name in &bound {
            debug!("bound {} through resolver", name);
        }

        let pre = self
            .linker
            .instantiate_pre(module)
            .map_err(|e| HarnessError::Link(format!("{:#}", e)))?;
        pre.instantiate(&mut self.store)
            .map_err(|e| HarnessError::StartFailed(format!("{:#}", e)))
    }

    /// Invoke a nullary export, returning its results.
    pub fn invoke(&mut self, export: &str) -> Result<Vec<Val>, HarnessError> {
        self.expect_status(
            "invoke",
            &[HarnessStatus::Instantiated, HarnessStatus::Finished],
        )?;
        let instance = match self.instance {
            Some(instance) => instance,
            None => {
                return Err(HarnessError::InvalidState {
                    operation: "invoke",
                    status: self.status,
                })
            }
        };
        let func = match instance.get_func(&mut self.store, export) {
            Some(func) => func,
            None => return self.fail(HarnessError::MissingExport(export.to_string())),
        };

        let ty = func.ty(&self.store);
        let mut results = vec![Val::I32(0); ty.results().len()];

        self.status = HarnessStatus::Running;
        match handle_trap(export, func.call(&mut self.store, &[], &mut results)) {
            Ok(()) => {
                self.status = HarnessStatus::Finished;
                debug!("{}() => ({})", export, format_vals(&results));
                Ok(results)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Invoke the configured entry point.
    pub fn run(&mut self) -> Result<Vec<Val>, HarnessError> {
        let entry_point = self.config.entry_point.clone();
        self.invoke(&entry_point)
    }

    /// Invoke every nullary function export in module order. Exports that
    /// take parameters are skipped with a warning.
    pub fn run_all_exports(&mut self) -> Result<Vec<(String, Vec<Val>)>, HarnessError> {
        self.expect_status(
            "run all exports",
            &[HarnessStatus::Instantiated, HarnessStatus::Finished],
        )?;
        let module = self.loaded_module("run all exports")?;

        let mut outcomes = Vec::new();
        for export in module.exports() {
            let ty = match export.ty() {
                ExternType::Func(ty) => ty,
                _ => continue,
            };
            if ty.params().len() != 0 {
                warn!(
                    "skipping export '{}': takes {} params",
                    export.name(),
                    ty.params().len()
                );
                continue;
            }
            let results = self.invoke(export.name())?;
            outcomes.push((export.name().to_string(), results));
        }
        Ok(outcomes)
    }

    /// Invoke `export` `iterations` times in a serial timed loop.
    ///
    /// Under `ResetPolicy::FreshInstance` each iteration gets a new store and
    /// instance; only the invocation itself is timed.
    pub fn benchmark(
        &mut self,
        export: &str,
        iterations: u32,
    ) -> Result<BenchmarkReport, HarnessError> {
        self.expect_status(
            "benchmark",
            &[HarnessStatus::Instantiated, HarnessStatus::Finished],
        )?;

        let mut timings = Vec::with_capacity(iterations as usize);
        for _ in 0..iterations {
            if self.config.reset_policy == ResetPolicy::FreshInstance
                && self.status != HarnessStatus::Instantiated
            {
                self.reset_instance()?;
            }
            let start = Instant::now();
            self.invoke(export)?;
            timings.push(start.elapsed());
        }

        let report = BenchmarkReport::from_timings(export, &timings);
        info!("{}", report);
        Ok(report)
    }

    /// Replace the store with one holding a fresh copy of the template
    /// context and instantiate again.
    fn reset_instance(&mut self) -> Result<(), HarnessError> {
        self.store = Store::new(&self.engine, self.template.fresh());
        self.instance = None;
        self.instantiate_current()
    }

    fn loaded_module(&self, operation: &'static str) -> Result<Module, HarnessError> {
        self.module.clone().ok_or(HarnessError::InvalidState {
            operation,
            status: self.status,
        })
    }

    fn expect_status(
        &self,
        operation: &'static str,
        allowed: &[HarnessStatus],
    ) -> Result<(), HarnessError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(HarnessError::InvalidState {
                operation,
                status: self.status,
            })
        }
    }

    fn fail<R>(&mut self, err: HarnessError) -> Result<R, HarnessError> {
        warn!("{}", err);
        self.status = HarnessStatus::Failed;
        Err(err)
    }
}

/// Create a Wasmtime engine sized by the configured stack budget.
fn create_engine(config: &HarnessConfig) -> Result<Engine, HarnessError> {
    let mut wasm_config = Config::new();
    wasm_config.max_wasm_stack(config.max_wasm_stack());
    Ok(Engine::new(&wasm_config)?)
}

/// Convert a failed guest call into `HarnessError::ExecutionFault`.
fn handle_trap<R>(export: &str, result: Result<R, anyhow::Error>) -> Result<R, HarnessError> {
    result.map_err(|e| HarnessError::ExecutionFault {
        export: export.to_string(),
        message: format!("{:#}", e),
    })
}
