//! A forward-only byte cursor over a `BufferSource`.
//!
//! `ByteCursor` hides buffer boundaries from the parsers above it: a field may start in
//! one buffer and end three buffers later. It never rewinds and never looks further
//! ahead than the buffer it is currently reading.

use crate::error::OttxError;
use crate::stream::BufferSource;

//==================================================================================
// 1. ByteCursor
//==================================================================================

pub struct ByteCursor<S> {
    source: S,
    buffer: Vec<u8>,
    offset: usize,
    position: u64,
    unit: usize,
}

impl<S: BufferSource> ByteCursor<S> {
    /// Creates a cursor that drains in steps of at most `unit` bytes.
    pub fn new(source: S, unit: usize) -> Self {
        Self {
            source,
            buffer: Vec::new(),
            offset: 0,
            position: 0,
            unit: unit.max(1),
        }
    }

    /// Total bytes consumed or drained so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Makes sure at least one unread byte is buffered. Returns `false` once the
    /// source is exhausted. Empty buffers from the source are skipped.
    fn fill(&mut self) -> Result<bool, OttxError> {
        while self.offset == self.buffer.len() {
            match self.source.pull()? {
                Some(next) => {
                    self.buffer = next;
                    self.offset = 0;
                }
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    fn available(&self) -> usize {
        self.buffer.len() - self.offset
    }

    fn advance(&mut self, n: usize) {
        self.offset += n;
        self.position += n as u64;
    }

    pub fn read_u8(&mut self) -> Result<u8, OttxError> {
        if !self.fill()? {
            return Err(OttxError::TruncatedInput {
                needed: 1,
                available: 0,
            });
        }
        let byte = self.buffer[self.offset];
        self.advance(1);
        Ok(byte)
    }

    /// Fills `dst` completely or fails with `TruncatedInput`.
    pub fn read_exact(&mut self, dst: &mut [u8]) -> Result<(), OttxError> {
        let mut filled = 0;
        while filled < dst.len() {
            if !self.fill()? {
                return Err(OttxError::TruncatedInput {
                    needed: dst.len() as u64,
                    available: filled as u64,
                });
            }
            let take = (dst.len() - filled).min(self.available());
            dst[filled..filled + take]
                .copy_from_slice(&self.buffer[self.offset..self.offset + take]);
            self.advance(take);
            filled += take;
        }
        Ok(())
    }

    pub fn consume_array<const N: usize>(&mut self) -> Result<[u8; N], OttxError> {
        let mut out = [0u8; N];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    /// Returns exactly `n` bytes, assembled across as many source buffers as needed.
    ///
    /// The result grows as bytes arrive, so a corrupt length fails with
    /// `TruncatedInput` instead of reserving `n` bytes up front.
    pub fn consume(&mut self, n: usize) -> Result<Vec<u8>, OttxError> {
        let mut out = Vec::with_capacity(n.min(self.unit));
        while out.len() < n {
            if !self.fill()? {
                return Err(OttxError::TruncatedInput {
                    needed: n as u64,
                    available: out.len() as u64,
                });
            }
            let take = (n - out.len()).min(self.available());
            out.extend_from_slice(&self.buffer[self.offset..self.offset + take]);
            self.advance(take);
        }
        Ok(out)
    }

    /// Discards exactly `n` bytes without building a combined buffer, stepping at most
    /// one unit at a time.
    pub fn drain(&mut self, n: u64) -> Result<(), OttxError> {
        let mut remaining = n;
        while remaining > 0 {
            if !self.fill()? {
                return Err(OttxError::TruncatedInput {
                    needed: n,
                    available: n - remaining,
                });
            }
            let step = remaining.min(self.available() as u64).min(self.unit as u64) as usize;
            self.advance(step);
            remaining -= step as u64;
        }
        Ok(())
    }

    /// Returns `true` if no byte remains. May pull from the source, never rewinds.
    pub fn is_exhausted(&mut self) -> Result<bool, OttxError> {
        Ok(!self.fill()?)
    }

    /// Hands everything not yet consumed to a new `BufferSource`.
    pub fn into_remaining(self) -> RemainingBytes<S> {
        RemainingBytes {
            source: self.source,
            buffer: self.buffer,
            offset: self.offset,
            unit: self.unit,
        }
    }
}

//==================================================================================
// 2. RemainingBytes
//==================================================================================

/// The unread tail of a `ByteCursor`, re-exposed as pieces of at most one unit.
pub struct RemainingBytes<S> {
    source: S,
    buffer: Vec<u8>,
    offset: usize,
    unit: usize,
}

impl<S: BufferSource> BufferSource for RemainingBytes<S> {
    fn pull(&mut self) -> Result<Option<Vec<u8>>, OttxError> {
        loop {
            let len = self.buffer.len();
            if self.offset < len {
                if self.offset == 0 && len <= self.unit {
                    return Ok(Some(std::mem::take(&mut self.buffer)));
                }
                let end = (self.offset + self.unit).min(len);
                let piece = self.buffer[self.offset..end].to_vec();
                self.offset = end;
                return Ok(Some(piece));
            }
            match self.source.pull()? {
                Some(next) => {
                    self.buffer = next;
                    self.offset = 0;
                }
                None => return Ok(None),
            }
        }
    }
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
