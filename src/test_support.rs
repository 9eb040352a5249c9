//! Builders for synthetic containers, shared by the unit tests.
//!
//! The crate itself only reads; everything that writes the format lives here.

use std::io::Write;

use xz2::stream::{Action, LzmaOptions, Status, Stream};
use xz2::write::XzEncoder;

use crate::format::CONTAINER_MAGIC;

/// Reference gamma encoder, always picking the shortest form.
pub fn encode_gamma(value: u32, out: &mut Vec<u8>) {
    let bytes = value.to_be_bytes();
    if value < 0x80 {
        out.push(bytes[3]);
    } else if value < 0x4000 {
        out.extend_from_slice(&[0x80 | bytes[2], bytes[3]]);
    } else if value < 0x20_0000 {
        out.extend_from_slice(&[0xC0 | bytes[1], bytes[2], bytes[3]]);
    } else if value < 0x1000_0000 {
        out.extend_from_slice(&[0xE0 | bytes[0], bytes[1], bytes[2], bytes[3]]);
    } else {
        out.push(0xF0);
        out.extend_from_slice(&bytes);
    }
}

pub fn gamma(value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    encode_gamma(value, &mut out);
    out
}

pub fn xz_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = XzEncoder::new(Vec::new(), 6);
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Compresses `data` as a legacy `.lzma` (LZMA-alone) stream.
pub fn lzma_alone_compress(data: &[u8]) -> Vec<u8> {
    let options = LzmaOptions::new_preset(6).unwrap();
    let mut stream = Stream::new_lzma_encoder(&options).unwrap();
    let mut out = Vec::with_capacity(data.len() + 64);
    let mut input = data;
    loop {
        if out.len() == out.capacity() {
            out.reserve(4096);
        }
        let before = stream.total_in();
        let status = stream.process_vec(input, &mut out, Action::Finish).unwrap();
        input = &input[(stream.total_in() - before) as usize..];
        if matches!(status, Status::StreamEnd) {
            return out;
        }
    }
}

/// Splits `data` into buffers of `size` bytes (the last one may be shorter).
pub fn split_evenly(data: &[u8], size: usize) -> Vec<Vec<u8>> {
    data.chunks(size.max(1)).map(|c| c.to_vec()).collect()
}

/// Splits `data` into buffers with a repeating, irregular size pattern, including
/// empty buffers.
pub fn split_irregular(data: &[u8]) -> Vec<Vec<u8>> {
    const PATTERN: [usize; 6] = [1, 0, 3, 17, 2, 250];
    let mut out = Vec::new();
    let mut offset = 0;
    let mut i = 0;
    while offset < data.len() {
        let size = PATTERN[i % PATTERN.len()];
        let end = (offset + size).min(data.len());
        out.push(data[offset..end].to_vec());
        offset = end;
        i += 1;
    }
    out
}

/// Wraps a decompressed chunk stream into a full OTTX file.
pub fn container(payload: &[u8]) -> Vec<u8> {
    container_with(&xz_compress(payload))
}

/// Prefixes an already compressed stream with the OTTX header.
pub fn container_with(compressed: &[u8]) -> Vec<u8> {
    let mut file = Vec::new();
    file.extend_from_slice(CONTAINER_MAGIC);
    file.extend_from_slice(&0x0001u16.to_be_bytes());
    file.extend_from_slice(&0x0000u16.to_be_bytes());
    file.extend_from_slice(compressed);
    file
}

//==================================================================================
// Schema & Payload Builders
//==================================================================================

/// One schema entry as written on disk, with its nested level if it is a struct.
pub struct FieldSpec {
    pub code: u8,
    pub repeated: bool,
    pub key: &'static str,
    pub children: Vec<FieldSpec>,
}

pub fn field(code: u8, key: &'static str) -> FieldSpec {
    FieldSpec {
        code,
        repeated: false,
        key,
        children: Vec::new(),
    }
}

pub fn repeated(code: u8, key: &'static str) -> FieldSpec {
    FieldSpec {
        repeated: true,
        ..field(code, key)
    }
}

pub fn structure(key: &'static str, repeated: bool, children: Vec<FieldSpec>) -> FieldSpec {
    FieldSpec {
        code: 11,
        repeated,
        key,
        children,
    }
}

/// Encodes one schema level: all headers, the sentinel, then each struct's level.
pub fn schema_bytes(fields: &[FieldSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    for f in fields {
        out.push(f.code | if f.repeated { 0x10 } else { 0 });
        encode_gamma(f.key.len() as u32, &mut out);
        out.extend_from_slice(f.key.as_bytes());
    }
    out.push(0);
    for f in fields.iter().filter(|f| f.code == 11) {
        out.extend_from_slice(&schema_bytes(&f.children));
    }
    out
}

/// Accumulates a decompressed chunk stream.
#[derive(Default)]
pub struct PayloadBuilder {
    pub bytes: Vec<u8>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn riff(mut self, id: &[u8; 4], body: &[u8]) -> Self {
        let len = body.len() as u32;
        assert!(len < (1 << 28));
        self.bytes.extend_from_slice(id);
        self.bytes.push(((len >> 24) as u8) << 4);
        self.bytes.extend_from_slice(&len.to_be_bytes()[1..]);
        self.bytes.extend_from_slice(body);
        self
    }

    /// A table chunk. Each record is given as its raw body bytes; sparse tables take
    /// `(index, body)` pairs through `sparse_table`.
    pub fn table(mut self, id: &[u8; 4], fields: &[FieldSpec], records: &[Vec<u8>]) -> Self {
        self.table_header(id, 0x03, fields);
        for body in records {
            encode_gamma(body.len() as u32 + 1, &mut self.bytes);
            self.bytes.extend_from_slice(body);
        }
        self.bytes.push(0);
        self
    }

    pub fn sparse_table(
        mut self,
        id: &[u8; 4],
        fields: &[FieldSpec],
        records: &[(u32, Vec<u8>)],
    ) -> Self {
        self.table_header(id, 0x04, fields);
        for (index, body) in records {
            let index_bytes = gamma(*index);
            encode_gamma((index_bytes.len() + body.len()) as u32 + 1, &mut self.bytes);
            self.bytes.extend_from_slice(&index_bytes);
            self.bytes.extend_from_slice(body);
        }
        self.bytes.push(0);
        self
    }

    fn table_header(&mut self, id: &[u8; 4], type_byte: u8, fields: &[FieldSpec]) {
        self.bytes.extend_from_slice(id);
        self.bytes.push(type_byte);
        encode_gamma(fields.len() as u32 + 1, &mut self.bytes);
        self.bytes.extend_from_slice(&schema_bytes(fields));
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn end(mut self) -> Vec<u8> {
        self.bytes.extend_from_slice(&[0, 0, 0, 0]);
        self.bytes
    }
}
