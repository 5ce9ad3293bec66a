//! Multihash: `code ‖ size ‖ digest` (§4.3).
//!
//! The teacher crate hashes through `wnfs::libipld::multihash::Code`, an
//! opaque wrapper tied to a fixed set of supported hash functions. This
//! crate's job is to parse *any* multihash a peer sends, so `Multihash` is
//! hash-function-agnostic: `code` is just the multicodec identifier found on
//! the wire, stored in fixed-capacity in-object storage the way the spec's
//! §5 resource model requires ("Digests use fixed in-object storage sized at
//! the type level").

use thiserror::Error;

use crate::cursor::{ByteCursor, CursorError};
use crate::varint::{self, VarintError};

/// Multicodec code for SHA2-256.
pub const SHA2_256: u64 = 0x12;
/// Multicodec code for DAG-PB, pinned here because CIDv0 requires it.
pub const DAG_PB: u64 = 0x70;

/// Default digest capacity used throughout this crate's CID type.
pub const DEFAULT_DIGEST_CAPACITY: usize = 64;

/// Errors raised while reading or constructing a multihash.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MultihashError {
    #[error("multihash read past end of input: {0}")]
    Eof(#[from] CursorError),
    #[error("multihash varint malformed: {0}")]
    Varint(#[from] VarintError),
    /// `size` exceeds either the type's capacity `N` or the wire-format
    /// maximum of 255.
    #[error("multihash digest size {size} exceeds capacity {capacity}")]
    InvalidSize { size: usize, capacity: usize },
}

/// A multihash with a compile-time maximum digest capacity `N` (nominally
/// 64). Only the first `size` bytes of `digest` are meaningful; bytes at
/// positions `>= size` are unspecified, per §3's invariants.
#[derive(Debug, Clone, Copy)]
pub struct Multihash<const N: usize = DEFAULT_DIGEST_CAPACITY> {
    code: u64,
    size: u8,
    digest: [u8; N],
}

impl<const N: usize> Multihash<N> {
    /// Builds a multihash by copying `digest_bytes` into fixed storage.
    /// Fails if `digest_bytes` does not fit in capacity `N` or exceeds the
    /// wire-format maximum size of 255.
    pub fn wrap(code: u64, digest_bytes: &[u8]) -> Result<Self, MultihashError> {
        if digest_bytes.len() > N || digest_bytes.len() > 255 {
            return Err(MultihashError::InvalidSize {
                size: digest_bytes.len(),
                capacity: N,
            });
        }
        let mut digest = [0u8; N];
        digest[..digest_bytes.len()].copy_from_slice(digest_bytes);
        Ok(Self {
            code,
            size: digest_bytes.len() as u8,
            digest,
        })
    }

    /// The hash-function multicodec identifier.
    pub fn code(&self) -> u64 {
        self.code
    }

    /// The meaningful digest length.
    pub fn size(&self) -> u8 {
        self.size
    }

    /// The meaningful prefix of the digest (`digest[..size]`).
    pub fn digest(&self) -> &[u8] {
        &self.digest[..self.size as usize]
    }

    /// Lowers the effective `size`. Never raises it — there is no re-hash.
    /// A no-op (returns `self` truncated) if `new_size >= self.size`.
    pub fn truncate(&mut self, new_size: u8) {
        self.size = self.size.min(new_size);
    }

    /// Produces a multihash with a different capacity `M`, copying the
    /// meaningful digest bytes. Fails if the current `size` does not fit in
    /// `M`.
    pub fn resize<const M: usize>(&self) -> Result<Multihash<M>, MultihashError> {
        Multihash::<M>::wrap(self.code, self.digest())
    }

    /// Sum of the two varint lengths and the digest size — the number of
    /// bytes `write_to` will emit.
    pub fn encoded_len(&self) -> usize {
        varint_len(self.code) + varint_len(self.size as u64) + self.size as usize
    }

    /// Decodes `varint(code) ‖ varint(size) ‖ digest[size]` from `cursor`.
    pub fn read(cursor: &mut ByteCursor) -> Result<Self, MultihashError> {
        let code = varint::read(cursor)?;
        let size = varint::read(cursor)?;
        if size > N as u64 || size > 255 {
            return Err(MultihashError::InvalidSize {
                size: size as usize,
                capacity: N,
            });
        }
        let mut digest = [0u8; N];
        cursor.read_exact(&mut digest[..size as usize])?;
        Ok(Self {
            code,
            size: size as u8,
            digest,
        })
    }

    /// Emits `varint(code) ‖ varint(size) ‖ digest[size]` into `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        let mut buf = [0u8; 10];
        out.extend_from_slice(varint::encode(self.code, &mut buf));
        out.extend_from_slice(varint::encode(self.size as u64, &mut buf));
        out.extend_from_slice(self.digest());
    }
}

impl<const N: usize> PartialEq for Multihash<N> {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.size == other.size && self.digest() == other.digest()
    }
}
impl<const N: usize> Eq for Multihash<N> {}

impl<const N: usize> std::hash::Hash for Multihash<N> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.code.hash(state);
        self.size.hash(state);
        self.digest().hash(state);
    }
}

impl<const N: usize> AsRef<[u8]> for Multihash<N> {
    /// The meaningful digest bytes (`digest()`), for ergonomic interop
    /// without copying — e.g. passing a multihash's digest straight to a
    /// function expecting `impl AsRef<[u8]>`.
    fn as_ref(&self) -> &[u8] {
        self.digest()
    }
}

fn varint_len(n: u64) -> usize {
    let mut buf = [0u8; 10];
    varint::encode(n, &mut buf).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::test_support::round_trip_tests;

    round_trip_tests! {
        <Multihash>: round_trips_sha2_256: Multihash::wrap(SHA2_256, &[6u8; 32]).unwrap(),
        <Multihash>: round_trips_empty_digest: Multihash::wrap(SHA2_256, &[]).unwrap(),
    }

    #[test]
    fn wrap_rejects_oversized_digest() {
        let digest = [0u8; 65];
        let err = Multihash::<64>::wrap(SHA2_256, &digest).unwrap_err();
        assert_eq!(
            err,
            MultihashError::InvalidSize {
                size: 65,
                capacity: 64
            }
        );
    }

    #[test]
    fn read_write_round_trip() {
        let digest = [7u8; 32];
        let mh = Multihash::<64>::wrap(SHA2_256, &digest).unwrap();
        let mut bytes = vec![];
        mh.write_to(&mut bytes);
        assert_eq!(bytes.len(), mh.encoded_len());

        let mut cursor = ByteCursor::new(&bytes);
        let decoded = Multihash::<64>::read(&mut cursor).unwrap();
        assert_eq!(decoded, mh);
        assert!(cursor.is_empty());
    }

    #[test]
    fn equality_ignores_bytes_past_size() {
        let mut a = Multihash::<64>::wrap(SHA2_256, &[1, 2, 3]).unwrap();
        let mut b = a;
        // Poison the unused tail of `b`'s storage directly.
        b.digest[10] = 0xff;
        assert_eq!(a, b);
        a.truncate(2);
        assert_ne!(a, b);
    }

    #[test]
    fn truncate_never_raises_size() {
        let mut mh = Multihash::<64>::wrap(SHA2_256, &[1, 2, 3]).unwrap();
        mh.truncate(10);
        assert_eq!(mh.size(), 3);
        mh.truncate(1);
        assert_eq!(mh.size(), 1);
        assert_eq!(mh.digest(), &[1]);
    }

    #[test]
    fn resize_preserves_digest_when_it_fits() {
        let mh = Multihash::<64>::wrap(SHA2_256, &[1, 2, 3]).unwrap();
        let resized: Multihash<4> = mh.resize().unwrap();
        assert_eq!(resized.digest(), &[1, 2, 3]);
    }

    #[test]
    fn resize_fails_when_digest_does_not_fit() {
        let mh = Multihash::<64>::wrap(SHA2_256, &[1, 2, 3, 4, 5]).unwrap();
        let resized: Result<Multihash<4>, _> = mh.resize();
        assert!(resized.is_err());
    }

    #[test]
    fn wrap_accepts_a_real_sha2_256_digest() {
        use sha2::{Digest, Sha256};

        // A real SHA2-256 digest should wrap cleanly and preserve every
        // byte, same as any other 32-byte digest.
        let digest = Sha256::digest(b"hello ipld");
        let mh = Multihash::<64>::wrap(SHA2_256, &digest).unwrap();
        assert_eq!(mh.size(), 32);
        assert_eq!(mh.digest(), digest.as_slice());
    }

    #[test]
    fn wrap_rejects_a_digest_one_byte_over_capacity() {
        let digest = hex_literal::hex!(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f20"
        );
        assert_eq!(digest.len(), 33);
        let err = Multihash::<32>::wrap(SHA2_256, &digest).unwrap_err();
        assert_eq!(
            err,
            MultihashError::InvalidSize {
                size: 33,
                capacity: 32
            }
        );
    }

    #[test]
    fn as_ref_exposes_the_meaningful_digest() {
        let mh = Multihash::<64>::wrap(SHA2_256, &[1, 2, 3]).unwrap();
        assert_eq!(AsRef::<[u8]>::as_ref(&mh), &[1, 2, 3]);
    }

    #[test]
    fn read_rejects_size_over_capacity() {
        let mut bytes = vec![];
        let mut buf = [0u8; 10];
        bytes.extend_from_slice(varint::encode(SHA2_256, &mut buf));
        bytes.extend_from_slice(varint::encode(100, &mut buf)); // > 64
        bytes.extend_from_slice(&[0u8; 100]);
        let mut cursor = ByteCursor::new(&bytes);
        let err = Multihash::<64>::read(&mut cursor).unwrap_err();
        assert_eq!(
            err,
            MultihashError::InvalidSize {
                size: 100,
                capacity: 64
            }
        );
    }
}
