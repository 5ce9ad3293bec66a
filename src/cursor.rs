//! A bounded, single-owner sequential reader over an in-memory buffer (§4.2).
//!
//! Unlike the teacher's `Read + Seek` generic style (which threads file
//! handles through the CAR layer), every decoder in this crate only ever
//! needs to walk forward through a buffer already held in memory — a
//! firehose frame, a CAR block, a CBOR value. `ByteCursor` models that
//! directly as a borrow rather than a trait object, and `take` returns a
//! nested sub-cursor borrowing the parent instead of the teacher's
//! `Take`-with-a-back-pointer (see spec §9, "Cursor-as-pointer").

use thiserror::Error;

/// Errors raised by cursor reads.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CursorError {
    /// `read_exact` ran out of bytes before filling its output buffer.
    #[error("unexpected end of buffer")]
    UnexpectedEof,
}

/// A forward-only cursor over a borrowed byte slice.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Wraps `buf` with the cursor positioned at the start.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current read position within the underlying buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes remaining before EOF.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once every byte of the underlying buffer has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the underlying buffer.
    pub fn remaining_slice(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Copies up to `out.len()` bytes into `out`, advances the position by
    /// the number of bytes copied, and returns that count (0 at EOF).
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.remaining());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    /// Reads exactly `out.len()` bytes or fails with `UnexpectedEof`. On
    /// failure the position is advanced to the end of the buffer, matching
    /// the spec's "position is advanced to end" contract.
    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<(), CursorError> {
        if self.remaining() < out.len() {
            self.pos = self.buf.len();
            return Err(CursorError::UnexpectedEof);
        }
        let n = self.read(out);
        debug_assert_eq!(n, out.len());
        Ok(())
    }

    /// Reads and returns a single byte.
    pub fn read_u8(&mut self) -> Result<u8, CursorError> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    /// Returns a sub-cursor that can read at most `limit` further bytes from
    /// `self`. Advancing the sub-cursor advances `self` in lockstep (it
    /// holds a disjoint borrow of the same backing slice, reassembled on
    /// drop rather than via a back-pointer).
    pub fn take(&mut self, limit: usize) -> ByteCursor<'a> {
        let limit = limit.min(self.remaining());
        let start = self.pos;
        let end = start + limit;
        let sub = ByteCursor {
            buf: &self.buf[start..end],
            pos: 0,
        };
        self.pos = end;
        sub
    }

    /// Appends all remaining bytes in this cursor to `sink`.
    pub fn read_to_end(&mut self, sink: &mut Vec<u8>) {
        sink.extend_from_slice(self.remaining_slice());
        self.pos = self.buf.len();
    }
}
