//! Round-trip test helper shared across modules (§10.4), adapted from the
//! teacher's `streamable_tests!` macro (`car/streamable.rs`) to this crate's
//! borrowed `ByteCursor` contract instead of `Read + Seek`.

use crate::cid::Cid;
use crate::cursor::ByteCursor;
use crate::multihash::Multihash;

/// Implemented by wire types with a symmetric `read_bytes`/`write_bytes`
/// pair, so [`round_trip_tests`] can drive them uniformly regardless of
/// their own method names.
pub(crate) trait ByteRoundTrip: Sized + PartialEq + std::fmt::Debug {
    type Error: std::fmt::Debug;
    fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self, Self::Error>;
    fn encode(&self, out: &mut Vec<u8>);
}

impl<const N: usize> ByteRoundTrip for Cid<N> {
    type Error = crate::cid::CidError;

    fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self, Self::Error> {
        Cid::read_bytes(cursor)
    }

    fn encode(&self, out: &mut Vec<u8>) {
        self.write_bytes(out)
    }
}

impl<const N: usize> ByteRoundTrip for Multihash<N> {
    type Error = crate::multihash::MultihashError;

    fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self, Self::Error> {
        Multihash::read(cursor)
    }

    fn encode(&self, out: &mut Vec<u8>) {
        self.write_to(out)
    }
}

/// Generates one `#[test]` per `name: value` pair: encode `value`, decode it
/// back, re-encode the result, and assert the two byte buffers are
/// identical. Unlike the teacher's macro (which round-trips through an
/// owned `Cursor<Vec<u8>>`), values borrow a fresh `ByteCursor` each time.
macro_rules! round_trip_tests {
    ($(<$type:ty>: $name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                use $crate::car::test_support::ByteRoundTrip;
                let value: $type = $value;
                let mut bytes = vec![];
                ByteRoundTrip::encode(&value, &mut bytes);
                let mut cursor = $crate::cursor::ByteCursor::new(&bytes);
                let decoded = <$type as ByteRoundTrip>::decode(&mut cursor).unwrap();
                let mut re_encoded = vec![];
                ByteRoundTrip::encode(&decoded, &mut re_encoded);
                assert_eq!(bytes, re_encoded);
            }
        )*
    };
}

pub(crate) use round_trip_tests;
