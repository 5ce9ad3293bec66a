//! Codec stack for the IPLD/IPFS binary formats carried over the AT Protocol
//! firehose: varints, multihashes, CIDs, DAG-CBOR values, and CAR v1
//! containers.
//!
//! Given a byte buffer produced by a peer (a WebSocket repo-subscription
//! frame, say), this crate parses it into the typed values below and
//! preserves the identity of content-addressed links. Transport, the
//! firehose event loop, and identity resolution are all out of scope —
//! this crate only ever sees opaque bytes and hands back typed values.
#![warn(missing_debug_implementations, rust_2018_idioms)]

/// Bounded sequential reader over an in-memory buffer.
pub mod cursor;
/// Unsigned LEB128-style varints.
pub mod varint;

/// Fixed-capacity digest wrapper: `code ‖ size ‖ digest`.
pub mod multihash;

/// Versioned content identifiers built from a multihash.
pub mod cid;

/// DAG-CBOR value decoding.
pub mod cbor;

/// CAR v1 container framing.
pub mod car;

pub use car::{CarError, CarHeader, CarReader};
pub use cbor::{CborError, Value};
pub use cid::{Cid, CidError, Version};
pub use cursor::{ByteCursor, CursorError};
pub use multihash::{Multihash, MultihashError};
