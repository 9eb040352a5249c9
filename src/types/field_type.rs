//! The field type carried in the low nibble of a schema entry's type byte.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::OttxError;

/// The on-disk type of one table field.
///
/// All integer types are stored big-endian at their natural width. `StringId` is a
/// second code for a 16-bit unsigned value; it decodes exactly like `UInt16`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    StringId,
    String,
    Struct,
}

impl FieldType {
    /// Mask selecting the type code from a schema entry's type byte.
    pub const CODE_MASK: u8 = 0x0F;
    /// Bit marking a field as repeated (prefixed by a gamma count in every record).
    pub const REPEATED_FLAG: u8 = 0x10;

    /// Decodes a non-sentinel field type code. Code 0 is the end-of-level sentinel and
    /// must be handled by the caller before reaching here.
    pub fn from_code(code: u8) -> Result<Self, OttxError> {
        match code {
            1 => Ok(Self::Int8),
            2 => Ok(Self::UInt8),
            3 => Ok(Self::Int16),
            4 => Ok(Self::UInt16),
            5 => Ok(Self::Int32),
            6 => Ok(Self::UInt32),
            7 => Ok(Self::Int64),
            8 => Ok(Self::UInt64),
            9 => Ok(Self::StringId),
            10 => Ok(Self::String),
            11 => Ok(Self::Struct),
            other => Err(OttxError::UnsupportedFieldType(other)),
        }
    }

    /// The numeric code of this field type.
    pub fn code(&self) -> u8 {
        match self {
            Self::Int8 => 1,
            Self::UInt8 => 2,
            Self::Int16 => 3,
            Self::UInt16 => 4,
            Self::Int32 => 5,
            Self::UInt32 => 6,
            Self::Int64 => 7,
            Self::UInt64 => 8,
            Self::StringId => 9,
            Self::String => 10,
            Self::Struct => 11,
        }
    }

    /// The fixed byte width of an integer field, or `None` for strings and structs.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 | Self::StringId => Some(2),
            Self::Int32 | Self::UInt32 => Some(4),
            Self::Int64 | Self::UInt64 => Some(8),
            Self::String | Self::Struct => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
