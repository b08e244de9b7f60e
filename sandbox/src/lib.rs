//! `scout-sandbox` — Wasmtime-based harness for shard-execution guests.
//!
//! This crate loads a WebAssembly guest, links it against the eth2 shard
//! host ABI, and runs or benchmarks its exports:
//!
//! - **Host ABI:** block data, pre/post state roots and `debug_printMemHex`
//!   in `env`, plus no-op arithmetic stubs in `env`, `ewasm` and `ethereum`
//! - **Dynamic imports:** `host.print` bound on demand for any signature
//! - **ABI validation:** entry point and memory export checked at load
//! - **Scenarios:** YAML/JSON fixtures run module by module with post-state
//!   comparison
//!
//! The primary entry point is [`Harness`]; [`suite::run_scenario`] drives a
//! whole fixture.

pub mod error;
pub mod config;
pub mod memory;
pub mod host_impl;
pub mod validation;
pub mod linker;
pub mod resolver;
pub mod runtime;
pub mod suite;

pub use error::HarnessError;
pub use config::{HarnessConfig, ResetPolicy};
pub use host_impl::HostContext;
pub use runtime::{BenchmarkReport, Harness, HarnessStatus};
pub use suite::{run_scenario, ScenarioOutcome};
