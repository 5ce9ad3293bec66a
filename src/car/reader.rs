//! Frame-by-frame CAR v1 reading (§4.6).
//!
//! Grounded in `car/v1/mod.rs`'s `CarV1::read_bytes`/`get_block` (header
//! first, then length-delimited blocks) and `car/v1/block.rs`'s
//! `start_read`/`finish_read` split (read the frame length and CID, then the
//! remaining payload) — reshaped from the teacher's `Read + Seek` file-based
//! API into this crate's in-memory `ByteCursor` contract (§4.2), with the
//! reusable scratch buffer the spec's CarReader state calls for (§3).

use crate::car::error::CarError;
use crate::car::header::CarHeader;
use crate::cid::Cid;
use crate::cursor::ByteCursor;
use crate::varint;

/// Hard cap on any single length-delimited CAR region (§4.6 "Length cap").
pub const MAX_ALLOC: usize = 4 * 1024 * 1024;

/// Reads a CAR v1 stream frame by frame.
///
/// The scratch buffer is owned by the reader and reused across calls to
/// [`next_block`](Self::next_block); the slice returned by a call borrows
/// the scratch buffer and must not be read after the next call advances it
/// (§5 "Shared resources").
pub struct CarReader<'a> {
    cursor: ByteCursor<'a>,
    header: CarHeader,
    scratch: Vec<u8>,
}

impl<'a> CarReader<'a> {
    /// Reads the CAR header off the front of `cursor` and returns a reader
    /// positioned at the first block.
    pub fn new(mut cursor: ByteCursor<'a>) -> Result<Self, CarError> {
        let header_bytes = read_length_delimited(&mut cursor)?;
        let header = CarHeader::decode(&header_bytes)?;
        Ok(Self {
            cursor,
            header,
            scratch: Vec::new(),
        })
    }

    /// The decoded CAR header.
    pub fn header(&self) -> &CarHeader {
        &self.header
    }

    /// Reads the next `(CID, payload)` block, or `None` at a clean
    /// end-of-stream (§4.6 "Termination").
    ///
    /// The returned payload slice borrows this reader's scratch buffer and
    /// is only valid until the next call to `next_block`.
    pub fn next_block(&mut self) -> Result<Option<(Cid, &[u8])>, CarError> {
        if self.cursor.is_empty() {
            tracing::debug!("car stream exhausted at a frame boundary");
            return Ok(None);
        }

        let frame = match read_length_delimited_into(&mut self.cursor, &mut self.scratch) {
            Ok(frame_len) => frame_len,
            Err(err) if err.is_eof() => {
                tracing::debug!("car stream exhausted while reading next frame length");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let mut frame_cursor = ByteCursor::new(&self.scratch[..frame]);
        let cid = Cid::read_bytes(&mut frame_cursor)?;
        let payload_start = frame - frame_cursor.remaining();
        tracing::trace!(frame_len = frame, %cid, "read car block frame");
        Ok(Some((cid, &self.scratch[payload_start..frame])))
    }
}

/// Reads one `varint(length) ‖ bytes[length]` region into a fresh `Vec`.
fn read_length_delimited(cursor: &mut ByteCursor) -> Result<Vec<u8>, CarError> {
    let mut scratch = Vec::new();
    let len = read_length_delimited_into(cursor, &mut scratch)?;
    scratch.truncate(len);
    Ok(scratch)
}

/// Reads one length-delimited region into `scratch` (grown in place, never
/// shrunk — §3 "Scratch buffer is reused between frames"), returning the
/// number of meaningful bytes at the front of `scratch`.
fn read_length_delimited_into(cursor: &mut ByteCursor, scratch: &mut Vec<u8>) -> Result<usize, CarError> {
    let len = varint::read(cursor)? as usize;
    if len > MAX_ALLOC {
        return Err(CarError::frame_too_large(len));
    }
    if scratch.len() < len {
        scratch.resize(len, 0);
    }
    cursor.read_exact(&mut scratch[..len])?;
    Ok(len)
}
