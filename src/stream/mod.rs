// In: src/stream/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Stream Layer
// ====================================================================================
//
// Everything below the chunk walker is a chain of pull-based byte sources. Each stage
// produces a buffer only when the stage above asks for one, so no stage ever holds
// more than one unit of data it was not asked for.
//
// Data Flow (one walk):
//
//   1. [Caller's BufferSource]          -> arbitrary, non-uniform raw buffers
//         |
//   2. [ByteCursor #1]                  -> reads the 8-byte container header
//         |
//         `-> into_remaining() ->
//         |
//   3. [RemainingBytes]                 -> the rest of the file, <= unit per piece
//         |
//   4. [XzDecompressor]                 -> decompressed blocks, <= unit per block
//         |
//   5. [ByteCursor #2]                  -> consume / drain for the chunk walker
//
// ====================================================================================

pub mod cursor;
pub mod decompress;
pub mod source;

pub use cursor::{ByteCursor, RemainingBytes};
pub use decompress::XzDecompressor;
pub use source::{IterSource, ReaderSource};

use crate::error::OttxError;

/// **CONTRACT:** A lazy, forward-only supplier of byte buffers.
///
/// Buffers may have any size, including zero. `Ok(None)` means the source is exhausted
/// and will stay exhausted.
pub trait BufferSource {
    fn pull(&mut self) -> Result<Option<Vec<u8>>, OttxError>;
}

impl<S: BufferSource + ?Sized> BufferSource for &mut S {
    fn pull(&mut self) -> Result<Option<Vec<u8>>, OttxError> {
        (**self).pull()
    }
}

impl<S: BufferSource + ?Sized> BufferSource for Box<S> {
    fn pull(&mut self) -> Result<Option<Vec<u8>>, OttxError> {
        (**self).pull()
    }
}
