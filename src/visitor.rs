// In: src/visitor.rs

//! The observation hook of a walk.
//!
//! The walker always consumes every byte; a `WalkVisitor` only watches. Every method
//! has a no-op default, so a visitor implements just the callbacks it cares about.

use serde::Serialize;

use crate::format::ChunkId;
use crate::table::{FieldSchema, FieldValue, Schema};
use crate::types::ChunkType;
use crate::walker::ChunkEvent;

/// Position of one record inside its table chunk.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub chunk_id: ChunkId,
    /// Zero-based index of the record within its chunk.
    pub ordinal: u64,
    /// The gamma size prefix as stored.
    pub size: u32,
    /// Row index of a sparse-table record.
    pub sparse_index: Option<u32>,
}

/// **CONTRACT:** Callbacks are invoked in file order, on the walker's thread, while
/// the bytes they describe are being consumed.
pub trait WalkVisitor {
    fn on_chunk(&mut self, _event: &ChunkEvent) {}
    fn on_schema(&mut self, _chunk_id: ChunkId, _schema: &Schema) {}
    fn on_record_start(&mut self, _record: &RecordHeader) {}
    fn on_field(&mut self, _field: &FieldSchema, _repetition: u32, _value: &FieldValue) {}
    fn on_struct_start(&mut self, _field: &FieldSchema, _repetition: u32) {}
    fn on_struct_end(&mut self, _field: &FieldSchema, _repetition: u32) {}
    fn on_record_end(&mut self, _record: &RecordHeader) {}
    /// A record of an `AIPL`/`GSDT` chunk, skipped without schema decoding.
    fn on_opaque_record(&mut self, _record: &RecordHeader) {}
    /// The chunk's payload has been fully consumed.
    fn on_chunk_end(&mut self, _event: &ChunkEvent, _records: u64) {}
}

/// Watches nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopVisitor;

impl WalkVisitor for NoopVisitor {}

impl<V: WalkVisitor + ?Sized> WalkVisitor for &mut V {
    fn on_chunk(&mut self, event: &ChunkEvent) {
        (**self).on_chunk(event)
    }
    fn on_schema(&mut self, chunk_id: ChunkId, schema: &Schema) {
        (**self).on_schema(chunk_id, schema)
    }
    fn on_record_start(&mut self, record: &RecordHeader) {
        (**self).on_record_start(record)
    }
    fn on_field(&mut self, field: &FieldSchema, repetition: u32, value: &FieldValue) {
        (**self).on_field(field, repetition, value)
    }
    fn on_struct_start(&mut self, field: &FieldSchema, repetition: u32) {
        (**self).on_struct_start(field, repetition)
    }
    fn on_struct_end(&mut self, field: &FieldSchema, repetition: u32) {
        (**self).on_struct_end(field, repetition)
    }
    fn on_record_end(&mut self, record: &RecordHeader) {
        (**self).on_record_end(record)
    }
    fn on_opaque_record(&mut self, record: &RecordHeader) {
        (**self).on_opaque_record(record)
    }
    fn on_chunk_end(&mut self, event: &ChunkEvent, records: u64) {
        (**self).on_chunk_end(event, records)
    }
}

//==================================================================================
// Statistics Collection
//==================================================================================

/// Per-chunk counters gathered by `StatsVisitor`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChunkStats {
    pub chunk_id: ChunkId,
    pub chunk_type: ChunkType,
    pub records: u64,
    pub fields: u64,
    pub text_bytes: u64,
    pub schema_fields: usize,
}

/// Counts records and decoded fields per chunk.
#[derive(Serialize, Debug, Default, Clone)]
pub struct StatsVisitor {
    pub chunks: Vec<ChunkStats>,
}

impl StatsVisitor {
    pub fn total_records(&self) -> u64 {
        self.chunks.iter().map(|c| c.records).sum()
    }

    pub fn total_fields(&self) -> u64 {
        self.chunks.iter().map(|c| c.fields).sum()
    }

    pub fn get(&self, chunk_id: ChunkId) -> Option<&ChunkStats> {
        self.chunks.iter().find(|c| c.chunk_id == chunk_id)
    }
}

impl WalkVisitor for StatsVisitor {
    fn on_chunk(&mut self, event: &ChunkEvent) {
        self.chunks.push(ChunkStats {
            chunk_id: event.id,
            chunk_type: event.chunk_type,
            records: 0,
            fields: 0,
            text_bytes: 0,
            schema_fields: 0,
        });
    }

    fn on_schema(&mut self, _chunk_id: ChunkId, schema: &Schema) {
        if let Some(current) = self.chunks.last_mut() {
            current.schema_fields = schema.total_fields();
        }
    }

    fn on_field(&mut self, _field: &FieldSchema, _repetition: u32, value: &FieldValue) {
        if let Some(current) = self.chunks.last_mut() {
            current.fields += 1;
            if let FieldValue::Text(text) = value {
                current.text_bytes += text.len() as u64;
            }
        }
    }

    fn on_chunk_end(&mut self, _event: &ChunkEvent, records: u64) {
        if let Some(current) = self.chunks.last_mut() {
            current.records = records;
        }
    }
}
