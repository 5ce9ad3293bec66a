//! CARv1 header: `varint(len) ‖ cbor({"version": 1, "roots": [CID, ...]})`
//! (§4.6 "Header decoding").
//!
//! Grounded in `car/v1/header.rs`'s `Header` struct and its `from_ipld_bytes`
//! constructor in the teacher crate, reworked to decode through this crate's
//! own `cbor` module instead of `wnfs::common::dagcbor`.

use crate::car::error::CarError;
use crate::cbor::{self, Value};
use crate::cid::Cid;
use crate::cursor::ByteCursor;

/// The only CAR version this crate accepts.
pub const SUPPORTED_VERSION: u64 = 1;

/// `{ version: 1, roots: non-empty list of CID }` (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct CarHeader {
    version: u64,
    roots: Vec<Cid>,
}

impl CarHeader {
    /// The CAR version (always `1` for a successfully decoded header).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The non-empty list of root CIDs.
    pub fn roots(&self) -> &[Cid] {
        &self.roots
    }

    /// Decodes a CAR header from its raw CBOR bytes (the content of the
    /// first length-delimited region of a CAR v1 stream).
    pub fn decode(bytes: &[u8]) -> Result<Self, CarError> {
        let mut cursor = ByteCursor::new(bytes);
        let value = cbor::decode(&mut cursor)?;

        let map = value
            .as_map()
            .ok_or(CarError::header_malformed("header is not a cbor map"))?;

        let version = map
            .get("version")
            .and_then(Value::as_u64)
            .ok_or(CarError::header_malformed("missing or non-integer \"version\" key"))?;
        if version != SUPPORTED_VERSION {
            return Err(CarError::unsupported_version(version));
        }

        let roots_value = map
            .get("roots")
            .and_then(Value::as_list)
            .ok_or(CarError::header_malformed("missing or non-list \"roots\" key"))?;

        let roots = roots_value
            .iter()
            .map(|v| {
                v.as_cid()
                    .copied()
                    .ok_or(CarError::header_malformed("roots entry is not a cid link"))
            })
            .collect::<Result<Vec<Cid>, CarError>>()?;

        if roots.is_empty() {
            return Err(CarError::empty_car());
        }

        Ok(Self { version, roots })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multihash::{Multihash, SHA2_256};

    fn sample_header_bytes(roots: &[Cid]) -> Vec<u8> {
        // Hand-assemble {"version": 1, "roots": [link, ...]} as DAG-CBOR,
        // mirroring what `Cid::write_bytes` + the tag-42 wrapping would
        // produce, since this crate only implements CBOR *decoding* (§1
        // Non-goals: "writing CBOR values" is out of scope except for
        // varint/multihash/CID byte round-trips).
        let mut out = vec![];
        // map, 2 pairs
        out.push(0xa2);
        // "version"
        out.push(0x67);
        out.extend_from_slice(b"version");
        out.push(0x01); // unsigned 1
                         // "roots"
        out.push(0x65);
        out.extend_from_slice(b"roots");
        // array of roots.len()
        out.push(0x80 | roots.len() as u8);
        for root in roots {
            let mut cid_bytes = vec![];
            root.write_bytes(&mut cid_bytes);
            let mut link_bytes = vec![0x00];
            link_bytes.extend_from_slice(&cid_bytes);
            // tag 42
            out.push(0xd8);
            out.push(0x2a);
            // byte string, 1-byte length (fine for our small fixtures)
            out.push(0x58);
            out.push(link_bytes.len() as u8);
            out.extend_from_slice(&link_bytes);
        }
        out
    }

    fn sample_cid() -> Cid {
        Cid::v1(0x71, Multihash::wrap(SHA2_256, &[1u8; 32]).unwrap())
    }

    #[test]
    fn decodes_valid_header() {
        let cid = sample_cid();
        let bytes = sample_header_bytes(&[cid]);
        let header = CarHeader::decode(&bytes).unwrap();
        assert_eq!(header.version(), 1);
        assert_eq!(header.roots(), &[cid]);
    }

    #[test]
    fn s8_rejects_unsupported_version() {
        let mut out = vec![0xa2];
        out.push(0x67);
        out.extend_from_slice(b"version");
        out.push(0x02);
        out.push(0x65);
        out.extend_from_slice(b"roots");
        out.push(0x80); // empty array, doesn't matter, version check comes first
        let err = CarHeader::decode(&out).unwrap_err();
        assert!(err.to_string().contains("unsupported car version 2"));
    }

    #[test]
    fn rejects_empty_roots() {
        let bytes = sample_header_bytes(&[]);
        let err = CarHeader::decode(&bytes).unwrap_err();
        assert!(err.to_string().contains("no roots"));
    }
}
