//! This file is the root of the `ottx_stream` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of our library (`stream`, `walker`, etc.)
//!     so the Rust compiler knows they exist.
//! 2.  Re-exporting the public surface a host needs to walk a container: the walker,
//!     its configuration, the input sources and the visitor hook.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod config;
pub mod error;
pub mod format;
pub mod kernels;
pub mod logging;
pub mod stream;
pub mod table;
pub mod types;
pub mod visitor;
pub mod walker;

#[cfg(test)]
mod test_support;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use config::{TextMode, WalkerConfig};
pub use error::OttxError;
pub use format::{ChunkId, ContainerHeader};
pub use logging::enable_verbose_logging;
pub use stream::{BufferSource, ByteCursor, IterSource, ReaderSource};
pub use table::{FieldSchema, FieldValue, Schema};
pub use types::{ChunkType, FieldType};
pub use visitor::{ChunkStats, NoopVisitor, RecordHeader, StatsVisitor, WalkVisitor};
pub use walker::{walk_all, ChunkEvent, ChunkWalker, WalkReport};
