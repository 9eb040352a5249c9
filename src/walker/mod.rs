//! This module defines the top-level orchestrator of a walk.
//!
//! `ChunkWalker` validates the container header, sets up the decompression stage and
//! then iterates chunk headers, handing each chunk's payload to the raw-skip or
//! schema-and-record paths. It is an `Iterator` of chunk events: the caller drives the
//! whole pipeline by pulling, and cancels it by stopping.

//==================================================================================
// 1. Module Declarations
//==================================================================================

mod orchestrator;


//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use self::orchestrator::{walk_all, ChunkWalker, WalkReport};

use serde::Serialize;

use crate::format::ChunkId;
use crate::types::ChunkType;

/// **CONTRACT:** One event per chunk, in file order, emitted after the chunk header
/// has been validated and before its payload is consumed.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkEvent {
    pub id: ChunkId,
    pub chunk_type: ChunkType,
    /// The full type byte; its high nibble extends Riff lengths.
    pub raw_type: u8,
}
