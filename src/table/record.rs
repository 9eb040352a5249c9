//! Consumes one table record according to its schema.
//!
//! The walker's only hard contract is byte accounting: it consumes exactly the bytes
//! the schema implies. Decoded values are handed to a `WalkVisitor` as they go past,
//! so the same descent serves both "validate and skip" and "extract" callers.

use serde::Serialize;

use crate::config::TextMode;
use crate::error::OttxError;
use crate::kernels::gamma;
use crate::stream::{BufferSource, ByteCursor};
use crate::table::schema::FieldSchema;
use crate::types::FieldType;
use crate::visitor::WalkVisitor;

/// A decoded scalar field value.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    StringId(u16),
    Text(String),
}

impl FieldValue {
    /// The value as a wide integer, or `None` for text.
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Self::I8(v) => Some(v.into()),
            Self::U8(v) => Some(v.into()),
            Self::I16(v) => Some(v.into()),
            Self::U16(v) | Self::StringId(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::I64(v) => Some(v.into()),
            Self::U64(v) => Some(v.into()),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Reads one big-endian fixed-width integer of the given type.
fn read_integer<S: BufferSource>(
    cursor: &mut ByteCursor<S>,
    field_type: FieldType,
) -> Result<FieldValue, OttxError> {
    let value = match field_type {
        FieldType::Int8 => FieldValue::I8(i8::from_be_bytes(cursor.consume_array()?)),
        FieldType::UInt8 => FieldValue::U8(cursor.read_u8()?),
        FieldType::Int16 => FieldValue::I16(i16::from_be_bytes(cursor.consume_array()?)),
        FieldType::UInt16 => FieldValue::U16(u16::from_be_bytes(cursor.consume_array()?)),
        FieldType::Int32 => FieldValue::I32(i32::from_be_bytes(cursor.consume_array()?)),
        FieldType::UInt32 => FieldValue::U32(u32::from_be_bytes(cursor.consume_array()?)),
        FieldType::Int64 => FieldValue::I64(i64::from_be_bytes(cursor.consume_array()?)),
        FieldType::UInt64 => FieldValue::U64(u64::from_be_bytes(cursor.consume_array()?)),
        FieldType::StringId => FieldValue::StringId(u16::from_be_bytes(cursor.consume_array()?)),
        FieldType::String | FieldType::Struct => {
            return Err(OttxError::UnsupportedFieldType(field_type.code()))
        }
    };
    Ok(value)
}

/// Reads a gamma-prefixed string.
fn read_text<S: BufferSource>(
    cursor: &mut ByteCursor<S>,
    text_mode: TextMode,
) -> Result<String, OttxError> {
    let len = gamma::decode_one(cursor)? as usize;
    let bytes = cursor.consume(len)?;
    match text_mode {
        TextMode::Strict => Ok(String::from_utf8(bytes)?),
        TextMode::Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Consumes one record laid out as `fields`, recursing into struct fields.
pub fn walk_record<S, V>(
    cursor: &mut ByteCursor<S>,
    fields: &[FieldSchema],
    text_mode: TextMode,
    visitor: &mut V,
) -> Result<(), OttxError>
where
    S: BufferSource,
    V: WalkVisitor + ?Sized,
{
    for field in fields {
        let repeats = if field.repeated {
            gamma::decode_one(cursor)?
        } else {
            1
        };
        for repetition in 0..repeats {
            match field.field_type {
                FieldType::Struct => {
                    visitor.on_struct_start(field, repetition);
                    walk_record(cursor, &field.children, text_mode, visitor)?;
                    visitor.on_struct_end(field, repetition);
                }
                FieldType::String => {
                    let value = FieldValue::Text(read_text(cursor, text_mode)?);
                    visitor.on_field(field, repetition, &value);
                }
                integer => {
                    let value = read_integer(cursor, integer)?;
                    visitor.on_field(field, repetition, &value);
                }
            }
        }
    }
    Ok(())
}
