//! The chunk type carried in the low nibble of a chunk's type byte.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a top-level chunk.
///
/// `Array` and `SparseArray` are recognized so they can be reported precisely, but the
/// walker does not know their layout and rejects them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChunkType {
    /// An opaque blob with a 28-bit length.
    Riff,
    /// Deprecated.
    Array,
    /// Deprecated.
    SparseArray,
    Table,
    SparseTable,
}

impl ChunkType {
    /// Mask selecting the type code from a chunk's type byte.
    pub const CODE_MASK: u8 = 0x0F;

    /// Decodes the chunk type from a full type byte. Only the low nibble is used.
    pub fn from_type_byte(raw: u8) -> Option<Self> {
        match raw & Self::CODE_MASK {
            0 => Some(Self::Riff),
            1 => Some(Self::Array),
            2 => Some(Self::SparseArray),
            3 => Some(Self::Table),
            4 => Some(Self::SparseTable),
            _ => None,
        }
    }

    /// The numeric code of this chunk type.
    pub fn code(&self) -> u8 {
        match self {
            Self::Riff => 0,
            Self::Array => 1,
            Self::SparseArray => 2,
            Self::Table => 3,
            Self::SparseTable => 4,
        }
    }

    /// Returns `true` if the walker knows how to consume this chunk's payload.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Array | Self::SparseArray)
    }

    /// Returns `true` for the two table-shaped chunk types.
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Table | Self::SparseTable)
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
