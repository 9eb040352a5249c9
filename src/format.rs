// In: src/format.rs

//! Defines all on-disk structures and constants for the OTTX container.
//! This is the single source of truth for the uncompressed file header and for the
//! fixed identifiers the chunk walker compares against.

use serde::{Serialize, Serializer};
use std::fmt;

//==================================================================================
// I. File-Level Header
//==================================================================================

/// The magic number identifying an LZMA-compressed container.
pub const CONTAINER_MAGIC: &[u8; 4] = b"OTTX";
/// Size of the uncompressed header: magic(4) + version(2) + reserved(2).
pub const CONTAINER_HEADER_LEN: usize = 8;

/// The uncompressed header that precedes the compressed stream.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Savegame format version. Read but not interpreted.
    pub version: u16,
    /// Present on disk, value unconstrained.
    pub reserved: u16,
}

//==================================================================================
// II. Chunk Identifiers
//==================================================================================

/// An opaque 4-byte chunk identifier, compared by exact byte equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    /// The all-zero id ending the chunk list.
    pub const TERMINATOR: ChunkId = ChunkId([0; 4]);

    pub fn is_terminator(&self) -> bool {
        *self == Self::TERMINATOR
    }

    /// Returns `true` for the chunks whose records are opaque blobs followed by one
    /// extra byte, instead of schema-shaped records.
    pub fn has_opaque_records(&self) -> bool {
        OPAQUE_RECORD_CHUNKS.contains(self)
    }
}

/// Printable ids render as text (`MAPS`); anything else renders as hex.
impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic()) {
            for &b in &self.0 {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            write!(f, "0x{:02x}{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2], self.0[3])
        }
    }
}

impl Serialize for ChunkId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Chunks whose table records deviate from their schema. Each record is `size` opaque
/// bytes followed by a single extra byte.
pub const OPAQUE_RECORD_CHUNKS: [ChunkId; 2] = [ChunkId(*b"AIPL"), ChunkId(*b"GSDT")];

//==================================================================================
// III. Chunk Header Layout
//==================================================================================

/// Width of the big-endian length that follows a Riff chunk's type byte.
pub const RIFF_LENGTH_LEN: usize = 3;
/// Where the type byte's high nibble lands in a Riff length.
pub const RIFF_LENGTH_HIGH_SHIFT: u32 = 24;

/// Assembles the 28-bit Riff payload length from the raw type byte and the three
/// length bytes that follow it.
pub fn riff_length(raw_type: u8, length_bytes: [u8; RIFF_LENGTH_LEN]) -> u32 {
    let low = u32::from_be_bytes([0, length_bytes[0], length_bytes[1], length_bytes[2]]);
    low | (u32::from(raw_type >> 4) << RIFF_LENGTH_HIGH_SHIFT)
}
