use thiserror::Error;

use crate::cid::CidError;
use crate::cursor::CursorError;

/// Errors raised while decoding a DAG-CBOR value (§4.5, §7).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CborError {
    #[error("unexpected end of input while decoding cbor")]
    Eof(#[from] CursorError),
    /// A major byte's additional-info field was 28-31, or major-7 carried a
    /// code outside {20,21,22,25,26,27}.
    #[error("invalid cbor major byte 0x{0:02x}")]
    InvalidCode(u8),
    /// An integer argument was encoded wider than necessary.
    #[error("cbor integer argument is not minimally encoded")]
    NotMinimal,
    /// Major 1 (negative int) whose magnitude overflows `i64`.
    #[error("negative integer overflows i64")]
    Overflow,
    /// A map key was not itself a text string.
    #[error("cbor map key was not a text string")]
    NonTextKey,
    /// The same text key appeared twice within one map.
    #[error("duplicate cbor map key: {0}")]
    DuplicateKey(String),
    /// A tag other than 42 (the CID link tag).
    #[error("unsupported cbor tag {0}")]
    UnknownTag(u64),
    /// Tag 42's payload was not a well-formed CID link.
    #[error("invalid cid link: {0}")]
    InvalidCid(&'static str),
    /// Propagated from CID parsing inside a tag-42 link.
    #[error("cid error inside cbor link: {0}")]
    Cid(#[from] CidError),
}
