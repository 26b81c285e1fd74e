//! Error types for caskdb
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using CaskError
pub type Result<T> = std::result::Result<T, CaskError>;

/// Unified error type for caskdb operations
#[derive(Debug, Error)]
pub enum CaskError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Key is empty")]
    KeyInvalid,

    #[error("Record field of {0} bytes exceeds the maximum encodable length")]
    RecordTooLarge(u64),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    #[error("Data file {0} not found")]
    DataFileNotFound(u32),

    // -------------------------------------------------------------------------
    // Corruption Errors
    // -------------------------------------------------------------------------
    #[error("Data file damaged: {0}")]
    DataFileDamaged(String),

    #[error("Corrupt record at offset {offset}: CRC mismatch")]
    CorruptData { offset: u64 },

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    /// The record is durable on disk but the in-memory index was not updated.
    #[error("Index update failed")]
    IndexUpdateFailed,
}
