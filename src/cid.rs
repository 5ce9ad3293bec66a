//! Content identifiers: version + codec + multihash (§4.4).
//!
//! Mirrors the `Cid::read_bytes` / `to_bytes` naming the teacher crate calls
//! through `wnfs::libipld::Cid` (see `car/v1/block.rs`), but owns the
//! encoding/decoding itself rather than delegating to `libipld`, since
//! getting v0-vs-v1 detection and the base32-multibase string form exactly
//! right is this crate's reason to exist.

use thiserror::Error;

use crate::cursor::{ByteCursor, CursorError};
use crate::multihash::{Multihash, MultihashError, DAG_PB, DEFAULT_DIGEST_CAPACITY, SHA2_256};
use crate::varint::{self, VarintError};

/// Errors raised while reading or constructing a CID.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CidError {
    #[error("cid read past end of input: {0}")]
    Eof(#[from] CursorError),
    #[error("cid varint malformed: {0}")]
    Varint(#[from] VarintError),
    #[error("multihash error in cid: {0}")]
    Multihash(#[from] MultihashError),
    /// Bad v0 shape, non-zero identity prefix inside a CBOR tag-42 link, or
    /// an explicit (illegal) version-0 prefix in the v1 branch.
    #[error("invalid cid: {0}")]
    InvalidCid(&'static str),
}

/// CID version, a closed enum mapped from a small unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V0,
    V1,
}

impl TryFrom<u64> for Version {
    type Error = CidError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Version::V0),
            1 => Ok(Version::V1),
            _ => Err(CidError::InvalidCid("unknown cid version")),
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::V0 => write!(f, "v0"),
            Version::V1 => write!(f, "v1"),
        }
    }
}

/// A versioned content identifier: `version + codec + multihash`.
///
/// `N` is the multihash digest capacity, defaulted to 64 to match the
/// resource model in §5.
#[derive(Debug, Clone, Copy)]
pub struct Cid<const N: usize = DEFAULT_DIGEST_CAPACITY> {
    version: Version,
    codec: u64,
    hash: Multihash<N>,
}

impl<const N: usize> Cid<N> {
    /// Builds a CIDv0. Requires `hash.code() == SHA2_256` and
    /// `hash.size() == 32`; the codec is fixed to `DAG_PB`.
    pub fn v0(hash: Multihash<N>) -> Result<Self, CidError> {
        if hash.code() != SHA2_256 || hash.size() != 32 {
            return Err(CidError::InvalidCid(
                "cidv0 requires a 32-byte sha2-256 multihash",
            ));
        }
        Ok(Self {
            version: Version::V0,
            codec: DAG_PB,
            hash,
        })
    }

    /// Builds a CIDv1 with an unconstrained codec.
    pub fn v1(codec: u64, hash: Multihash<N>) -> Self {
        Self {
            version: Version::V1,
            codec,
            hash,
        }
    }

    /// Returns an equivalent v1 CID: unchanged if `self` is already v1,
    /// otherwise the same codec (`DAG_PB`) and hash under `Version::V1`.
    pub fn into_v1(self) -> Self {
        Self {
            version: Version::V1,
            codec: self.codec,
            hash: self.hash,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn codec(&self) -> u64 {
        self.codec
    }

    pub fn hash(&self) -> &Multihash<N> {
        &self.hash
    }

    /// Reads a CID from `cursor`, detecting v0 vs. v1 shape per §4.4: a
    /// leading `0x12 0x20` (SHA2-256, 32-byte size) means CIDv0, since that
    /// byte pair is never a legal v1 `(version, codec)` pair. Otherwise the
    /// bytes are parsed as v1, and an explicit `version == 0` there is
    /// rejected (explicit v0 framing is forbidden; only the implicit 34-byte
    /// shape is legal v0).
    pub fn read_bytes(cursor: &mut ByteCursor) -> Result<Self, CidError> {
        let remaining = cursor.remaining_slice();
        let (first, after_first) = varint::decode_u64(remaining)?;
        let (second, _) = varint::decode_u64(after_first)?;

        if first == SHA2_256 && second == 32 {
            tracing::trace!("detected implicit cidv0 shape (0x12 0x20 prefix)");
            return Self::read_v0(cursor);
        }

        let version = varint::read(cursor)?;
        let version = Version::try_from(version)?;
        tracing::trace!(%version, "detected cid version from explicit v1 framing");
        if version == Version::V0 {
            return Err(CidError::InvalidCid("explicit v0 prefix is not legal"));
        }
        let codec = varint::read(cursor)?;
        let hash = Multihash::read(cursor)?;
        Ok(Self {
            version,
            codec,
            hash,
        })
    }

    fn read_v0(cursor: &mut ByteCursor) -> Result<Self, CidError> {
        let code = varint::read(cursor)?;
        let size = varint::read(cursor)?;
        if code != SHA2_256 || size != 32 {
            return Err(CidError::InvalidCid("malformed cidv0 prefix"));
        }
        let mut digest = [0u8; 32];
        cursor.read_exact(&mut digest)?;
        let hash = Multihash::wrap(code, &digest)?;
        Self::v0(hash)
    }

    /// Writes the v1 byte form, even when `self` is internally a v0 CID —
    /// only v1 is ever emitted on the wire (§4.4 "Write").
    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        let mut buf = [0u8; 10];
        out.extend_from_slice(varint::encode(1, &mut buf));
        out.extend_from_slice(varint::encode(self.codec, &mut buf));
        self.hash.write_to(out);
    }

    /// The CIDv1 base32-multibase textual form: `'b'` followed by unpadded
    /// lowercase RFC 4648 base32 of the v1 byte encoding.
    pub fn to_string_multibase(&self) -> String {
        let mut bytes = vec![];
        self.write_bytes(&mut bytes);
        multibase::encode(multibase::Base::Base32Lower, &bytes)
    }
}

impl<const N: usize> std::fmt::Display for Cid<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_multibase())
    }
}

impl<const N: usize> PartialEq for Cid<N> {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.codec == other.codec && self.hash == other.hash
    }
}
impl<const N: usize> Eq for Cid<N> {}

impl<const N: usize> std::hash::Hash for Cid<N> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.version.hash(state);
        self.codec.hash(state);
        self.hash.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::test_support::round_trip_tests;

    fn sha256_multihash(digest: [u8; 32]) -> Multihash {
        Multihash::wrap(SHA2_256, &digest).unwrap()
    }

    round_trip_tests! {
        <Cid>: round_trips_v1: Cid::v1(0x71, sha256_multihash([4u8; 32])),
        <Cid>: round_trips_v0: Cid::v0(sha256_multihash([5u8; 32])).unwrap(),
    }

    #[test]
    fn v0_round_trips_through_v1_wire_form() {
        let cid = Cid::v0(sha256_multihash([1u8; 32])).unwrap();
        let mut bytes = vec![];
        cid.write_bytes(&mut bytes);
        // v0 is never the wire form emitted on write.
        assert_eq!(bytes[0], 1);

        let mut cursor = ByteCursor::new(&bytes);
        let decoded = Cid::read_bytes(&mut cursor).unwrap();
        assert_eq!(decoded.version(), Version::V1);
        assert_eq!(decoded, cid.into_v1());
    }

    #[test]
    fn reads_implicit_cidv0_shape() {
        let mut bytes = vec![0x12, 0x20];
        bytes.extend_from_slice(&[9u8; 32]);
        let mut cursor = ByteCursor::new(&bytes);
        let cid = Cid::read_bytes(&mut cursor).unwrap();
        assert_eq!(cid.version(), Version::V0);
        assert_eq!(cid.codec(), DAG_PB);
        assert!(cursor.is_empty());
    }

    #[test]
    fn rejects_explicit_v0_in_v1_branch() {
        // version=0, codec=0x71, multihash(sha2-256, 4, ...) — not the
        // implicit 0x12 0x20 shape, so it falls into the v1 branch, where
        // version=0 must be rejected.
        let mut bytes = vec![];
        let mut buf = [0u8; 10];
        bytes.extend_from_slice(varint::encode(0, &mut buf));
        bytes.extend_from_slice(varint::encode(0x71, &mut buf));
        bytes.extend_from_slice(varint::encode(SHA2_256, &mut buf));
        bytes.extend_from_slice(varint::encode(4, &mut buf));
        bytes.extend_from_slice(&[1, 2, 3, 4]);
        let mut cursor = ByteCursor::new(&bytes);
        assert!(Cid::read_bytes(&mut cursor).is_err());
    }

    #[test]
    fn v1_round_trips_byte_for_byte() {
        let cid = Cid::v1(0x71, sha256_multihash([2u8; 32]));
        let mut bytes = vec![];
        cid.write_bytes(&mut bytes);
        let mut cursor = ByteCursor::new(&bytes);
        let decoded = Cid::read_bytes(&mut cursor).unwrap();
        assert_eq!(decoded, cid);
    }

    #[test]
    fn to_string_starts_with_b_and_is_base32() {
        let cid = Cid::v1(0x71, sha256_multihash([3u8; 32]));
        let s = cid.to_string_multibase();
        assert!(s.starts_with('b'));
        assert!(s[1..]
            .chars()
            .all(|c| "abcdefghijklmnopqrstuvwxyz234567".contains(c)));
    }

    #[test]
    fn v0_constructor_rejects_wrong_hash() {
        let bad = Multihash::<64>::wrap(0x11, &[0u8; 20]).unwrap();
        assert!(Cid::v0(bad).is_err());
    }
}
