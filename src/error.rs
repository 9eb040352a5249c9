// In: src/error.rs

//! This module defines the single, unified error type for the entire ottx walker.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every error is fatal to the current walk: a byte-accounting mistake anywhere
//! invalidates every offset after it, so nothing here is recoverable locally.

use std::string::FromUtf8Error;

use thiserror::Error;

use crate::format::ChunkId;

#[derive(Error, Debug)]
pub enum OttxError {
    // =========================================================================
    // === Container-Level Errors
    // =========================================================================
    #[error("Unsupported container format: magic {0:?} is not OTTX")]
    UnsupportedFormat([u8; 4]),

    #[error("Input truncated: needed {needed} more bytes, only {available} available")]
    TruncatedInput { needed: u64, available: u64 },

    #[error("Compressed payload is corrupt: {0}")]
    CorruptCompressedData(String),

    #[error("Compressed payload ended before the end-of-stream marker")]
    TruncatedCompressedData,

    // =========================================================================
    // === Chunk & Table Errors
    // =========================================================================
    #[error("Malformed gamma integer: first byte {0:#04x} needs more than 5 bytes")]
    MalformedGamma(u8),

    #[error("Chunk {chunk_id} has unsupported chunk type code {type_code}")]
    UnsupportedChunkType { chunk_id: ChunkId, type_code: u8 },

    #[error("Table chunk {chunk_id} has a zero schema marker")]
    BadTableHeader { chunk_id: ChunkId },

    #[error("Unsupported field type code {0} in table schema")]
    UnsupportedFieldType(u8),

    #[error("Table schema nests deeper than the limit of {limit} levels")]
    SchemaTooDeep { limit: usize },

    #[error("Struct field '{key}' has an empty nested schema")]
    EmptyStructSchema { key: String },

    #[error("String field is not valid UTF-8: {0}")]
    InvalidTextEncoding(#[from] FromUtf8Error),

    #[error("Invalid walker configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error from the byte supplier, e.g. a file read failing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library while loading a `WalkerConfig`.
    #[error("Config JSON error: {0}")]
    ConfigJson(#[from] serde_json::Error),
}
