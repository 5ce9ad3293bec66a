//! Unsigned LEB128-style varints: the self-delimited integer encoding every
//! other layer in this crate (multihash, CID, CAR framing) builds on.
//!
//! Every byte but the last carries the continuation bit (`0x80`) set; the low
//! 7 bits hold little-endian payload. Decoding enforces the multiformats
//! minimality rule: a value must be encoded in the fewest possible bytes, so
//! `0x80 0x00` (a non-minimal zero-length encoding of `0`) is rejected rather
//! than silently accepted.

use thiserror::Error;

use crate::cursor::ByteCursor;

/// Errors raised while decoding a varint.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VarintError {
    /// The buffer ended before a terminator byte (high bit clear) was read.
    #[error("unexpected end of buffer while reading varint")]
    Insufficient,
    /// More continuation bytes were present than the target width allows.
    #[error("varint exceeds maximum byte width")]
    Overflow,
    /// The encoding was not the shortest possible one for its value.
    #[error("varint is not minimally encoded")]
    NotMinimal,
}

/// Maximum continuation-byte count `decode` will accept, keyed by the
/// nominal bit-width of the value being read (`8, 16, 32, 64`). These bounds
/// are protocol limits, not a generic LEB128 ceiling: the 64-bit case in
/// particular caps at 9 bytes (63 payload bits) rather than the 10 a full
/// 64-bit range would need, matching scenario S7 (a 10-byte encoding is
/// `Overflow` even though its tail value would otherwise fit in `u64`).
pub const MAX_BYTES_U8: usize = 1;
pub const MAX_BYTES_U16: usize = 3;
pub const MAX_BYTES_U32: usize = 5;
pub const MAX_BYTES_U64: usize = 9;

/// Buffer capacity recommended for `encode`-ing a value of the given width.
pub const ENCODE_BUF_LEN_U8: usize = 2;
pub const ENCODE_BUF_LEN_U16: usize = 3;
pub const ENCODE_BUF_LEN_U32: usize = 5;
/// Multicodec numbers fit comfortably in 5 encoded bytes even though the
/// decoder is tolerant of up to 9.
pub const ENCODE_BUF_LEN_U64: usize = 5;

/// Returns true iff `b`'s high bit is clear, i.e. `b` is the last byte of a
/// varint encoding.
pub fn is_last(b: u8) -> bool {
    b & 0x80 == 0
}

/// Decodes an unsigned varint from the front of `buf`, returning the decoded
/// value and the unconsumed remainder of `buf`.
///
/// `max_bytes` bounds how many bytes may be consumed before `Overflow` is
/// raised; callers pick it according to the integer width they expect
/// (1/3/5/9 bytes for 8/16/32/64-bit values per §4.1).
pub fn decode(buf: &[u8], max_bytes: usize) -> Result<(u64, &[u8]), VarintError> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i >= max_bytes {
            tracing::trace!(max_bytes, "varint exceeded its maximum byte width");
            return Err(VarintError::Overflow);
        }

        if is_last(byte) {
            if byte == 0x00 && i > 0 {
                tracing::trace!("varint had a non-minimal trailing zero byte");
                return Err(VarintError::NotMinimal);
            }
            value |= (byte as u64) << shift;
            return Ok((value, &buf[i + 1..]));
        }

        value |= ((byte & 0x7f) as u64) << shift;
        shift += 7;
    }

    tracing::trace!("varint buffer ended before a terminator byte");
    Err(VarintError::Insufficient)
}

/// Decodes an 8-bit-width varint (up to 1 byte).
pub fn decode_u8(buf: &[u8]) -> Result<(u64, &[u8]), VarintError> {
    decode(buf, MAX_BYTES_U8)
}

/// Decodes a 16-bit-width varint (up to 3 bytes).
pub fn decode_u16(buf: &[u8]) -> Result<(u64, &[u8]), VarintError> {
    decode(buf, MAX_BYTES_U16)
}

/// Decodes a 32-bit-width varint (up to 5 bytes).
pub fn decode_u32(buf: &[u8]) -> Result<(u64, &[u8]), VarintError> {
    decode(buf, MAX_BYTES_U32)
}

/// Decodes a 64-bit-width varint (up to 9 bytes).
pub fn decode_u64(buf: &[u8]) -> Result<(u64, &[u8]), VarintError> {
    decode(buf, MAX_BYTES_U64)
}

/// Reads a 64-bit-width varint directly off a [`ByteCursor`], one byte at a
/// time, rather than requiring the caller to already hold a contiguous
/// slice. This is the varint entry point multihash, CID, and CAR framing all
/// build on — each reads `code`/`size`/`version`/`codec`/frame-length
/// varints straight off a cursor (§6).
pub fn read(cursor: &mut ByteCursor<'_>) -> Result<u64, VarintError> {
    let mut scratch = [0u8; MAX_BYTES_U64 + 1];
    let mut len = 0;
    loop {
        let byte = cursor.read_u8().map_err(|_| VarintError::Insufficient)?;
        scratch[len] = byte;
        len += 1;
        if is_last(byte) || len == scratch.len() {
            break;
        }
    }
    decode(&scratch[..len], MAX_BYTES_U64).map(|(value, _)| value)
}

/// Encodes `n` into `out` (which must be at least [`ENCODE_BUF_LEN`] bytes),
/// returning the prefix slice actually written.
pub fn encode(n: u64, out: &mut [u8]) -> &[u8] {
    let mut n = n;
    let mut i = 0;
    loop {
        let mut byte = (n & 0x7f) as u8;
        n >>= 7;
        if n != 0 {
            byte |= 0x80;
        }
        out[i] = byte;
        i += 1;
        if n == 0 {
            break;
        }
    }
    &out[..i]
}

/// Convenience wrapper returning an owned `Vec<u8>` for the minimal encoding
/// of `n`.
pub fn encode_to_vec(n: u64) -> Vec<u8> {
    let mut buf = [0u8; 10];
    encode(n, &mut buf).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_small_values() {
        for n in [0u64, 1, 23, 24, 127, 128, 300, u32::MAX as u64, u64::MAX] {
            let mut buf = [0u8; 10];
            let encoded = encode(n, &mut buf);
            let (decoded, remaining) = decode(encoded, 10).unwrap();
            assert_eq!(decoded, n);
            assert!(remaining.is_empty());
        }
    }

    #[test]
    fn encode_is_minimal() {
        // 127 fits in one byte.
        assert_eq!(encode_to_vec(127), vec![0x7f]);
        // 128 needs two.
        assert_eq!(encode_to_vec(128), vec![0x80, 0x01]);
    }

    #[test]
    fn rejects_trailing_zero_byte() {
        // two-byte encoding of zero: 0x80 0x00 is not minimal.
        let err = decode(&[0x80, 0x00], 9).unwrap_err();
        assert_eq!(err, VarintError::NotMinimal);
    }

    #[test]
    fn rejects_overflow_past_width() {
        // ten continuation bytes for a width that only allows nine.
        let buf = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let err = decode_u64(&buf).unwrap_err();
        assert_eq!(err, VarintError::Overflow);
    }

    #[test]
    fn rejects_truncated_input() {
        let err = decode(&[0x80, 0x80], 9).unwrap_err();
        assert_eq!(err, VarintError::Insufficient);
    }

    #[test]
    fn s7_ten_byte_u64_is_overflow() {
        let buf = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert_eq!(decode_u64(&buf), Err(VarintError::Overflow));
    }

    #[test]
    fn width_specific_bounds() {
        assert_eq!(decode_u8(&[0x05]), Ok((5, &[][..])));
        assert_eq!(decode_u8(&[0x80, 0x01]), Err(VarintError::Overflow));
        assert_eq!(decode_u16(&[0x80, 0x80, 0x01]).unwrap().0, 1 << 14);
        assert_eq!(decode_u32(&[0x80, 0x80, 0x80, 0x80, 0x01]).unwrap().0, 1 << 28);
    }

    #[test]
    fn is_last_detects_continuation_bit() {
        assert!(is_last(0x00));
        assert!(is_last(0x7f));
        assert!(!is_last(0x80));
        assert!(!is_last(0xff));
    }

    #[test]
    fn read_consumes_a_varint_off_a_cursor() {
        let bytes = [0x80, 0x01, 0xff]; // 128, then a trailing byte untouched.
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(read(&mut cursor).unwrap(), 128);
        assert_eq!(cursor.remaining_slice(), &[0xff]);
    }

    #[test]
    fn read_rejects_ten_byte_overflow() {
        let buf = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(read(&mut cursor), Err(VarintError::Overflow));
    }

    #[test]
    fn read_rejects_truncated_cursor() {
        let buf = [0x80, 0x80];
        let mut cursor = ByteCursor::new(&buf);
        assert_eq!(read(&mut cursor), Err(VarintError::Insufficient));
    }
}
