//! Error types for nvblock
//!
//! Lifecycle outcomes (`Ok`, `NotOk`, `Error`, `Uninit`) are reported through
//! [`Status`](crate::block::Status). This type covers API misuse and I/O that
//! happens outside the medium contract.

use thiserror::Error;

/// Result type alias using NvError
pub type Result<T> = std::result::Result<T, NvError>;

/// Unified error type for nvblock operations
#[derive(Debug, Error)]
pub enum NvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Block Errors
    // -------------------------------------------------------------------------
    #[error("Block '{key}': length mismatch (expected {expected} bytes, got {actual})")]
    LengthMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown block: {0}")]
    UnknownBlock(String),

    #[error("Block key already registered: {0}")]
    DuplicateKey(String),

    // -------------------------------------------------------------------------
    // Layout Errors
    // -------------------------------------------------------------------------
    #[error("Block index {index} out of range (registered: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Block index 0 is reserved for the header")]
    ReservedIndex,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),
}

impl From<bincode::Error> for NvError {
    fn from(err: bincode::Error) -> Self {
        NvError::Serialization(err.to_string())
    }
}
