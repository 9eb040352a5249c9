//! This module holds the two recursive parsers for table-shaped chunks: the reader for
//! the self-describing field schema at the head of the chunk, and the walker that
//! consumes one record according to that schema.

pub mod record;
pub mod schema;

pub use record::{walk_record, FieldValue};
pub use schema::{read_schema, FieldSchema, Schema};
