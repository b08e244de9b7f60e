//! Host-side error types for the shard-execution harness.
//!
//! `HostError` is raised by host ABI calls that touch guest memory or the
//! block payload. The sandbox converts it into a guest trap, so a faulting
//! host call ends the run the same way an out-of-bounds guest access would.
//!
//! `HexDecodeError` and `ConfigLoadError` cover fixture ingestion.

use std::fmt;
use std::path::PathBuf;

/// Error raised by a host ABI call.
///
/// Offsets and lengths are carried as `u64` so that `offset + len` can be
/// reported even when it overflows the guest's 32-bit address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// `[offset, offset+len)` lies outside guest linear memory.
    OutOfBounds { offset: u64, len: u64, memory_size: usize },
    /// `[offset, offset+len)` lies outside the block payload.
    SourceOutOfRange { offset: u64, len: u64, payload_size: usize },
    /// The calling guest does not export a linear memory named `memory`.
    MissingMemory,
}

impl HostError {
    pub fn out_of_bounds(offset: u32, len: u64, memory_size: usize) -> Self {
        Self::OutOfBounds {
            offset: offset as u64,
            len,
            memory_size,
        }
    }

    pub fn source_out_of_range(offset: u32, len: u32, payload_size: usize) -> Self {
        Self::SourceOutOfRange {
            offset: offset as u64,
            len: len as u64,
            payload_size,
        }
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                offset,
                len,
                memory_size,
            } => write!(
                f,
                "guest memory access out of bounds: [{}, {}) exceeds memory size {}",
                offset,
                offset + len,
                memory_size
            ),
            Self::SourceOutOfRange {
                offset,
                len,
                payload_size,
            } => write!(
                f,
                "block data range out of range: [{}, {}) exceeds payload size {}",
                offset,
                offset + len,
                payload_size
            ),
            Self::MissingMemory => write!(f, "guest does not export 'memory'"),
        }
    }
}

impl std::error::Error for HostError {}

/// Error produced by strict hex decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexDecodeError {
    #[error("the length of the input is odd ({0} characters)")]
    OddLength(usize),

    #[error("not a hex digit: {found:?} at index {index}")]
    InvalidDigit { index: usize, found: char },
}

/// Error loading a scenario fixture or raw block-payload file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed YAML/JSON.
    #[error("malformed fixture {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// The document parsed but a required section or field is missing or mistyped.
    #[error("fixture {path} does not match the scenario schema: {message}")]
    SchemaMismatch { path: PathBuf, message: String },
}
