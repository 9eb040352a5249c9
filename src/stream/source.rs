//! Adapters that turn caller-owned byte supplies into a `BufferSource`.
//!
//! Supplying the bytes is the caller's business; these are the two thin shapes the
//! walker is usually fed with: an in-memory sequence of buffers and a `std::io::Read`.

use std::io::{ErrorKind, Read};

use crate::error::OttxError;
use crate::stream::BufferSource;

/// A `BufferSource` over any sequence of owned buffers.
pub struct IterSource<I> {
    inner: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    pub fn new<T>(buffers: T) -> Self
    where
        T: IntoIterator<IntoIter = I, Item = Vec<u8>>,
    {
        Self {
            inner: buffers.into_iter(),
        }
    }
}

impl<I> BufferSource for IterSource<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    fn pull(&mut self) -> Result<Option<Vec<u8>>, OttxError> {
        Ok(self.inner.next())
    }
}

/// A `BufferSource` reading up to `unit` bytes from a reader per pull.
pub struct ReaderSource<R> {
    reader: R,
    unit: usize,
    exhausted: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R, unit: usize) -> Self {
        Self {
            reader,
            unit: unit.max(1),
            exhausted: false,
        }
    }
}

impl<R: Read> BufferSource for ReaderSource<R> {
    fn pull(&mut self) -> Result<Option<Vec<u8>>, OttxError> {
        if self.exhausted {
            return Ok(None);
        }
        let mut buf = vec![0u8; self.unit];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(Some(buf));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
