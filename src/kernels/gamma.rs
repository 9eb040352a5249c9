//! This module contains the kernel for decoding the container's "gamma" variable-length
//! unsigned integers.
//!
//! The first byte carries a unary length prefix in its high bits: `0xxxxxxx` is a
//! 1-byte value, `10xxxxxx` adds one byte, `110xxxxx` two, `1110xxxx` three, and
//! `11110xxx` means the value is entirely in the next four bytes (the low bits of the
//! first byte are discarded). Anything from `0xF8` up would need a sixth byte and is
//! rejected. Remaining bytes are folded in most-significant first.

use crate::error::OttxError;
use crate::stream::{BufferSource, ByteCursor};

/// The longest valid encoding, in bytes.
pub const MAX_ENCODED_LEN: usize = 5;

/// Total length of the encoding that starts with `first`.
pub fn encoded_len(first: u8) -> Result<usize, OttxError> {
    match first.leading_ones() as usize {
        n if n < MAX_ENCODED_LEN => Ok(n + 1),
        _ => Err(OttxError::MalformedGamma(first)),
    }
}

/// Decodes a single gamma integer from the cursor.
pub fn decode_one<S: BufferSource>(cursor: &mut ByteCursor<S>) -> Result<u32, OttxError> {
    let first = cursor.read_u8()?;
    let extra = encoded_len(first)? - 1;

    // The 5-byte form carries no payload bits in its first byte.
    let mut value = if extra == MAX_ENCODED_LEN - 1 {
        0
    } else {
        u32::from(first & (0x7F >> extra))
    };
    for _ in 0..extra {
        value = (value << 8) | u32::from(cursor.read_u8()?);
    }
    Ok(value)
}
