//! This module defines the core, strongly-typed tag enums read from the container:
//! the chunk type carried in each chunk header and the field type carried in each
//! table schema entry.
//!
//! Both replace raw nibble codes with exhaustive enums so that every dispatch in the
//! walker is a `match` the compiler checks.

pub mod chunk_type;
pub mod field_type;

// Re-export the main types for easier access.
pub use chunk_type::ChunkType;
pub use field_type::FieldType;
