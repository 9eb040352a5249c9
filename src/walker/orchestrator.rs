// In: src/walker/orchestrator.rs

use std::iter::FusedIterator;
use std::sync::Arc;

use crate::config::WalkerConfig;
use crate::error::OttxError;
use crate::format::{self, ChunkId, ContainerHeader, CONTAINER_MAGIC};
use crate::kernels::gamma;
use crate::stream::{BufferSource, ByteCursor, RemainingBytes, XzDecompressor};
use crate::table::{read_schema, walk_record};
use crate::types::ChunkType;
use crate::visitor::{NoopVisitor, RecordHeader, WalkVisitor};
use crate::walker::ChunkEvent;

/// The cursor over decompressed chunk data.
type PayloadCursor<S> = ByteCursor<XzDecompressor<RemainingBytes<S>>>;

enum WalkState<S> {
    /// Nothing read yet.
    Header(ByteCursor<S>),
    /// Between chunks. `pending` is the chunk whose event was last yielded and whose
    /// payload has not been consumed yet.
    ChunkLoop {
        cursor: PayloadCursor<S>,
        pending: Option<ChunkEvent>,
    },
    /// The terminator id was read.
    Done(PayloadCursor<S>),
    /// An error was yielded; the walk is over.
    Failed,
}

//==================================================================================
// 1. The Walker
//==================================================================================

/// Streams the chunks of one container.
///
/// Yields `Ok(ChunkEvent)` per chunk, then `None` after the terminator. The first
/// error is yielded once as `Some(Err(_))`, after which the iterator is exhausted.
pub struct ChunkWalker<S, V = NoopVisitor> {
    state: WalkState<S>,
    config: Arc<WalkerConfig>,
    visitor: V,
    header: Option<ContainerHeader>,
}

impl<S: BufferSource> ChunkWalker<S, NoopVisitor> {
    pub fn new(source: S, config: Arc<WalkerConfig>) -> Result<Self, OttxError> {
        Self::with_visitor(source, config, NoopVisitor)
    }
}

impl<S: BufferSource, V: WalkVisitor> ChunkWalker<S, V> {
    pub fn with_visitor(
        source: S,
        config: Arc<WalkerConfig>,
        visitor: V,
    ) -> Result<Self, OttxError> {
        config.validate()?;
        let cursor = ByteCursor::new(source, config.buffer_unit);
        Ok(Self {
            state: WalkState::Header(cursor),
            config,
            visitor,
            header: None,
        })
    }

    /// The container header, once it has been read.
    pub fn header(&self) -> Option<&ContainerHeader> {
        self.header.as_ref()
    }

    /// Decompressed bytes consumed so far, once decompression has started.
    pub fn decompressed_position(&self) -> Option<u64> {
        match &self.state {
            WalkState::ChunkLoop { cursor, .. } | WalkState::Done(cursor) => {
                Some(cursor.position())
            }
            WalkState::Header(_) | WalkState::Failed => None,
        }
    }

    /// After a completed walk, reports whether decompressed bytes follow the
    /// terminator. `None` if the walk has not completed.
    pub fn trailing_payload(&mut self) -> Result<Option<bool>, OttxError> {
        match &mut self.state {
            WalkState::Done(cursor) => Ok(Some(!cursor.is_exhausted()?)),
            _ => Ok(None),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, WalkState::Done(_))
    }

    pub fn visitor(&self) -> &V {
        &self.visitor
    }

    pub fn visitor_mut(&mut self) -> &mut V {
        &mut self.visitor
    }

    pub fn into_visitor(self) -> V {
        self.visitor
    }

    /// Advances the state machine to the next chunk event.
    ///
    /// The state is taken out for the duration of the step, so any `?` exit leaves
    /// the walker in `Failed`.
    fn step(&mut self) -> Result<Option<ChunkEvent>, OttxError> {
        loop {
            match std::mem::replace(&mut self.state, WalkState::Failed) {
                WalkState::Header(mut cursor) => {
                    let header = read_container_header(&mut cursor)?;
                    log::info!(
                        "OTTX container: format version {}, reserved {:#06x}",
                        header.version,
                        header.reserved
                    );
                    self.header = Some(header);

                    let unit = self.config.buffer_unit;
                    let decompressor = XzDecompressor::new(cursor.into_remaining(), unit)?;
                    self.state = WalkState::ChunkLoop {
                        cursor: ByteCursor::new(decompressor, unit),
                        pending: None,
                    };
                }
                WalkState::ChunkLoop {
                    mut cursor,
                    pending,
                } => {
                    if let Some(event) = pending {
                        self.consume_payload(&mut cursor, &event)?;
                    }
                    match read_chunk_header(&mut cursor)? {
                        Some(event) => {
                            log::debug!(
                                "chunk {} ({}) at decompressed offset {}",
                                event.id,
                                event.chunk_type,
                                cursor.position() - 5
                            );
                            self.visitor.on_chunk(&event);
                            self.state = WalkState::ChunkLoop {
                                cursor,
                                pending: Some(event),
                            };
                            return Ok(Some(event));
                        }
                        None => {
                            log::info!(
                                "walk complete: {} decompressed bytes consumed",
                                cursor.position()
                            );
                            self.state = WalkState::Done(cursor);
                            return Ok(None);
                        }
                    }
                }
                WalkState::Done(cursor) => {
                    self.state = WalkState::Done(cursor);
                    return Ok(None);
                }
                WalkState::Failed => return Ok(None),
            }
        }
    }

    /// Consumes the payload of the chunk whose header was just read.
    fn consume_payload<T: BufferSource>(
        &mut self,
        cursor: &mut ByteCursor<T>,
        event: &ChunkEvent,
    ) -> Result<(), OttxError> {
        match event.chunk_type {
            ChunkType::Riff => {
                let length = format::riff_length(event.raw_type, cursor.consume_array()?);
                log::debug!("riff chunk {}: skipping {} bytes", event.id, length);
                cursor.drain(u64::from(length))?;
                self.visitor.on_chunk_end(event, 0);
                Ok(())
            }
            ChunkType::Table | ChunkType::SparseTable => self.walk_table(cursor, event),
            ChunkType::Array | ChunkType::SparseArray => Err(OttxError::UnsupportedChunkType {
                chunk_id: event.id,
                type_code: event.chunk_type.code(),
            }),
        }
    }

    /// Reads a table chunk's schema, then every record up to the zero-size sentinel.
    fn walk_table<T: BufferSource>(
        &mut self,
        cursor: &mut ByteCursor<T>,
        event: &ChunkEvent,
    ) -> Result<(), OttxError> {
        let chunk_id = event.id;
        let schema_marker = gamma::decode_one(cursor)?;
        if schema_marker == 0 {
            return Err(OttxError::BadTableHeader { chunk_id });
        }
        let schema = read_schema(cursor, self.config.max_schema_depth)?;
        log::debug!(
            "table chunk {}: {} top-level fields, {} in total",
            chunk_id,
            schema.len(),
            schema.total_fields()
        );
        self.visitor.on_schema(chunk_id, &schema);

        let sparse = event.chunk_type == ChunkType::SparseTable;
        let opaque = chunk_id.has_opaque_records();
        let mut ordinal = 0u64;
        loop {
            let size = gamma::decode_one(cursor)?;
            if size == 0 {
                break;
            }
            let mut record = RecordHeader {
                chunk_id,
                ordinal,
                size,
                sparse_index: None,
            };

            if opaque {
                cursor.drain(u64::from(size))?;
                cursor.drain(1)?;
                self.visitor.on_opaque_record(&record);
            } else {
                if sparse {
                    record.sparse_index = Some(gamma::decode_one(cursor)?);
                }
                log::trace!(
                    "chunk {} record {} (size {}, index {:?})",
                    chunk_id,
                    ordinal,
                    size,
                    record.sparse_index
                );
                self.visitor.on_record_start(&record);
                walk_record(cursor, &schema.fields, self.config.text_mode, &mut self.visitor)?;
                self.visitor.on_record_end(&record);
            }
            ordinal += 1;
        }

        log::debug!("table chunk {}: {} records", chunk_id, ordinal);
        self.visitor.on_chunk_end(event, ordinal);
        Ok(())
    }
}

impl<S: BufferSource, V: WalkVisitor> Iterator for ChunkWalker<S, V> {
    type Item = Result<ChunkEvent, OttxError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.step() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => None,
            Err(e) => {
                log::warn!("walk failed: {}", e);
                self.state = WalkState::Failed;
                Some(Err(e))
            }
        }
    }
}

impl<S: BufferSource, V: WalkVisitor> FusedIterator for ChunkWalker<S, V> {}

//==================================================================================
// 2. Header Parsing
//==================================================================================

/// Reads the 8-byte uncompressed container header.
fn read_container_header<S: BufferSource>(
    cursor: &mut ByteCursor<S>,
) -> Result<ContainerHeader, OttxError> {
    let magic: [u8; 4] = cursor.consume_array()?;
    if magic != *CONTAINER_MAGIC {
        return Err(OttxError::UnsupportedFormat(magic));
    }
    let version = u16::from_be_bytes(cursor.consume_array()?);
    let reserved = u16::from_be_bytes(cursor.consume_array()?);
    Ok(ContainerHeader { version, reserved })
}

/// Reads a chunk id and, unless it is the terminator, the chunk's type byte.
fn read_chunk_header<S: BufferSource>(
    cursor: &mut ByteCursor<S>,
) -> Result<Option<ChunkEvent>, OttxError> {
    let id = ChunkId(cursor.consume_array()?);
    if id.is_terminator() {
        return Ok(None);
    }
    let raw_type = cursor.read_u8()?;
    let chunk_type = ChunkType::from_type_byte(raw_type)
        .filter(|t| t.is_supported())
        .ok_or(OttxError::UnsupportedChunkType {
            chunk_id: id,
            type_code: raw_type & ChunkType::CODE_MASK,
        })?;
    Ok(Some(ChunkEvent {
        id,
        chunk_type,
        raw_type,
    }))
}

//==================================================================================
// 3. Convenience Driver
//==================================================================================

/// Everything a completed walk produced.
pub struct WalkReport<V> {
    /// Always `Some` after a successful walk.
    pub header: Option<ContainerHeader>,
    pub chunks: Vec<ChunkEvent>,
    pub decompressed_bytes: u64,
    pub visitor: V,
}

/// Drives a walk to completion, collecting the chunk events.
pub fn walk_all<S, V>(
    source: S,
    config: Arc<WalkerConfig>,
    visitor: V,
) -> Result<WalkReport<V>, OttxError>
where
    S: BufferSource,
    V: WalkVisitor,
{
    let mut walker = ChunkWalker::with_visitor(source, config, visitor)?;
    let mut chunks = Vec::new();
    for event in walker.by_ref() {
        chunks.push(event?);
    }
    Ok(WalkReport {
        header: walker.header,
        chunks,
        decompressed_bytes: walker.decompressed_position().unwrap_or(0),
        visitor: walker.visitor,
    })
}
