//! This module contains the streaming decompression stage of the walker.
//!
//! It is a safe, panic-free wrapper around the `xz2` crate's liblzma auto-detecting
//! decoder, which takes either an `.xz` stream or a legacy `.lzma` (LZMA-alone) stream,
//! re-exposed as a `BufferSource` so the post-decompression `ByteCursor` can pull from
//! it exactly like it pulls from raw input. Every produced block is bounded by the
//! configured unit, so a multi-gigabyte container never needs more than one unit of
//! decompressed data in memory at once.

use xz2::stream::{Action, Status, Stream};

use crate::error::OttxError;
use crate::stream::BufferSource;

pub struct XzDecompressor<S> {
    source: S,
    stream: Stream,
    /// Compressed bytes pulled from `source` and not yet accepted by the decoder.
    input: Vec<u8>,
    input_offset: usize,
    unit: usize,
    finished: bool,
}

impl<S: BufferSource> XzDecompressor<S> {
    pub fn new(source: S, unit: usize) -> Result<Self, OttxError> {
        let stream = Stream::new_auto_decoder(u64::MAX, 0)
            .map_err(|e| OttxError::CorruptCompressedData(e.to_string()))?;
        Ok(Self {
            source,
            stream,
            input: Vec::new(),
            input_offset: 0,
            unit: unit.max(1),
            finished: false,
        })
    }

    /// `true` once the decoder has seen the end-of-stream marker.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total decompressed bytes produced so far.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }

    /// Pulls the next non-empty compressed buffer, keeping any input the decoder has
    /// not accepted yet in front of it.
    fn refill(&mut self) -> Result<(), OttxError> {
        loop {
            match self.source.pull()? {
                Some(next) if next.is_empty() => continue,
                Some(next) => {
                    if self.input_offset < self.input.len() {
                        self.input.drain(..self.input_offset);
                        self.input.extend_from_slice(&next);
                    } else {
                        self.input = next;
                    }
                    self.input_offset = 0;
                    return Ok(());
                }
                None => return Err(OttxError::TruncatedCompressedData),
            }
        }
    }
}

impl<S: BufferSource> BufferSource for XzDecompressor<S> {
    /// Produces the next decompressed block of at most one unit.
    ///
    /// The decoder is first drained of whatever it can produce from input it already
    /// holds; only a call that makes no progress at all pulls new compressed input.
    fn pull(&mut self) -> Result<Option<Vec<u8>>, OttxError> {
        while !self.finished {
            let mut output = Vec::with_capacity(self.unit);
            let before = self.stream.total_in();
            let status = self
                .stream
                .process_vec(&self.input[self.input_offset..], &mut output, Action::Run)
                .map_err(|e| OttxError::CorruptCompressedData(e.to_string()))?;
            let consumed = (self.stream.total_in() - before) as usize;
            self.input_offset += consumed;

            if matches!(status, Status::StreamEnd) {
                self.finished = true;
                log::debug!(
                    "xz stream ended: {} compressed bytes -> {} bytes",
                    self.stream.total_in(),
                    self.stream.total_out()
                );
            }
            if !output.is_empty() {
                return Ok(Some(output));
            }
            if consumed == 0 && !self.finished {
                self.refill()?;
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::IterSource;
    use crate::test_support::{lzma_alone_compress, split_evenly, xz_compress};

    fn drain_all<S: BufferSource>(source: &mut S) -> Result<Vec<Vec<u8>>, OttxError> {
        let mut blocks = Vec::new();
        while let Some(block) = source.pull()? {
            blocks.push(block);
        }
        Ok(blocks)
    }

    #[test]
    fn test_roundtrip_with_bounded_blocks() {
        let original: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let compressed = xz_compress(&original);
        let mut decompressor =
            XzDecompressor::new(IterSource::new(split_evenly(&compressed, 7)), 1000).unwrap();

        let blocks = drain_all(&mut decompressor).unwrap();
        assert!(blocks.iter().all(|b| !b.is_empty() && b.len() <= 1000));
        assert_eq!(blocks.concat(), original);
        assert!(decompressor.is_finished());
        assert_eq!(decompressor.total_out(), original.len() as u64);
    }

    #[test]
    fn test_legacy_lzma_stream_is_accepted() {
        let original: Vec<u8> = (0..20_000u32).map(|i| (i % 97) as u8).collect();
        let compressed = lzma_alone_compress(&original);
        let mut decompressor =
            XzDecompressor::new(IterSource::new(split_evenly(&compressed, 5)), 256).unwrap();

        let blocks = drain_all(&mut decompressor).unwrap();
        assert!(blocks.iter().all(|b| b.len() <= 256));
        assert_eq!(blocks.concat(), original);
        assert!(decompressor.is_finished());
    }

    #[test]
    fn test_trailing_bytes_after_stream_end_are_ignored() {
        let mut compressed = xz_compress(b"payload");
        compressed.extend_from_slice(b"garbage after the stream");
        let mut decompressor =
            XzDecompressor::new(IterSource::new(vec![compressed]), 64).unwrap();
        assert_eq!(drain_all(&mut decompressor).unwrap().concat(), b"payload");
        assert_eq!(decompressor.pull().unwrap(), None);
    }

    #[test]
    fn test_truncated_stream_is_reported() {
        let compressed = xz_compress(&vec![7u8; 4096]);
        let cut = compressed[..compressed.len() - 6].to_vec();
        let mut decompressor = XzDecompressor::new(IterSource::new(vec![cut]), 512).unwrap();
        assert!(matches!(
            drain_all(&mut decompressor),
            Err(OttxError::TruncatedCompressedData)
        ));
    }

    #[test]
    fn test_empty_input_is_truncated() {
        let mut decompressor =
            XzDecompressor::new(IterSource::new(Vec::<Vec<u8>>::new()), 512).unwrap();
        assert!(matches!(
            decompressor.pull(),
            Err(OttxError::TruncatedCompressedData)
        ));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let garbage = vec![0xFFu8; 64];
        let mut decompressor = XzDecompressor::new(IterSource::new(vec![garbage]), 512).unwrap();
        assert!(matches!(
            decompressor.pull(),
            Err(OttxError::CorruptCompressedData(_))
        ));
    }
}
