//! Harness error types.

use std::path::PathBuf;

use scout_hostapi::ConfigLoadError;

use crate::runtime::HarnessStatus;

/// Top-level error type for the sandbox crate.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Scenario fixture or block-data file could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigLoadError),

    /// Module file could not be read or compiled.
    #[error("cannot load module {path}: {message}")]
    ModuleLoad { path: PathBuf, message: String },

    /// Module does not meet the harness ABI requirements.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unresolved import or import signature mismatch.
    #[error("link error: {0}")]
    Link(String),

    /// The module's start function trapped.
    #[error("error running start function: {0}")]
    StartFailed(String),

    /// The guest trapped while running an export.
    #[error("execution fault in '{export}': {message}")]
    ExecutionFault { export: String, message: String },

    /// The requested export does not exist or is not a function.
    #[error("missing export: {0}")]
    MissingExport(String),

    /// Operation not allowed in the harness's current state.
    #[error("cannot {operation} while {status:?}")]
    InvalidState {
        operation: &'static str,
        status: HarnessStatus,
    },

    /// Wasmtime engine or store error not covered above.
    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] anyhow::Error),
}
