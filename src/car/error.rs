use crate::cbor::CborError;
use crate::cid::CidError;
use crate::cursor::CursorError;
use crate::varint::VarintError;

/// Errors raised while decoding CAR v1 framing (§4.6, §7).
///
/// Composite errors in this crate follow the teacher's manual `Display`
/// style (`native/error.rs`) rather than `thiserror`'s derive, since the
/// message needs to reference nested state (sizes, versions) gathered from
/// several possible inner-error kinds.
#[derive(Debug)]
pub struct CarError {
    kind: CarErrorKind,
}

impl CarError {
    pub(crate) fn eof(err: CursorError) -> Self {
        Self {
            kind: CarErrorKind::Eof(err),
        }
    }

    pub(crate) fn varint(err: VarintError) -> Self {
        Self {
            kind: CarErrorKind::Varint(err),
        }
    }

    pub(crate) fn cbor(err: CborError) -> Self {
        Self {
            kind: CarErrorKind::Cbor(err),
        }
    }

    pub(crate) fn cid(err: CidError) -> Self {
        Self {
            kind: CarErrorKind::Cid(err),
        }
    }

    pub fn header_malformed(reason: &'static str) -> Self {
        Self {
            kind: CarErrorKind::HeaderMalformed(reason),
        }
    }

    pub fn unsupported_version(version: u64) -> Self {
        Self {
            kind: CarErrorKind::UnsupportedVersion(version),
        }
    }

    pub fn empty_car() -> Self {
        Self {
            kind: CarErrorKind::EmptyCar,
        }
    }

    pub fn frame_too_large(size: usize) -> Self {
        Self {
            kind: CarErrorKind::FrameTooLarge(size),
        }
    }

    /// True iff this error represents a clean end-of-stream at a frame
    /// boundary, the signal `CarReader::next_block` surfaces to let the
    /// caller stop iterating (§4.6 "Termination").
    pub fn is_eof(&self) -> bool {
        matches!(
            self.kind,
            CarErrorKind::Eof(CursorError::UnexpectedEof)
                | CarErrorKind::Varint(VarintError::Insufficient)
        )
    }
}

#[derive(Debug)]
enum CarErrorKind {
    Eof(CursorError),
    Varint(VarintError),
    Cbor(CborError),
    Cid(CidError),
    HeaderMalformed(&'static str),
    UnsupportedVersion(u64),
    EmptyCar,
    FrameTooLarge(usize),
}

impl std::fmt::Display for CarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            CarErrorKind::Eof(e) => write!(f, "unexpected end of car stream: {e}"),
            CarErrorKind::Varint(e) => write!(f, "malformed car length varint: {e}"),
            CarErrorKind::Cbor(e) => write!(f, "malformed car header cbor: {e}"),
            CarErrorKind::Cid(e) => write!(f, "malformed cid in car frame: {e}"),
            CarErrorKind::HeaderMalformed(reason) => {
                write!(f, "malformed car header: {reason}")
            }
            CarErrorKind::UnsupportedVersion(v) => {
                write!(f, "unsupported car version {v}, only version 1 is supported")
            }
            CarErrorKind::EmptyCar => write!(f, "car header has no roots"),
            CarErrorKind::FrameTooLarge(size) => {
                write!(f, "car frame of {size} bytes exceeds the 4 MiB limit")
            }
        }
    }
}

impl From<CursorError> for CarError {
    fn from(value: CursorError) -> Self {
        Self::eof(value)
    }
}

impl From<VarintError> for CarError {
    fn from(value: VarintError) -> Self {
        Self::varint(value)
    }
}

impl From<CborError> for CarError {
    fn from(value: CborError) -> Self {
        Self::cbor(value)
    }
}

impl From<CidError> for CarError {
    fn from(value: CidError) -> Self {
        Self::cid(value)
    }
}

impl std::error::Error for CarError {}
