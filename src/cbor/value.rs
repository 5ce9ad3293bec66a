use std::collections::BTreeMap;

use crate::cid::Cid;

/// A decoded DAG-CBOR value: a closed, tagged sum (§3, §9 "Tagged value").
///
/// Unlike the teacher's runtime `Ipld` wrapper (coercion methods that abort
/// on the wrong variant), every accessor here returns `Option`, matching the
/// design note's instruction to "surface a typed error... rather than
/// silently returning a wrong-typed reference" — `None` is the typed
/// signal that the variant didn't match.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unsigned(u64),
    /// Represents wire values in `[-2^63, -1]`, decoded as `-1 - n`.
    Negative(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Bool(bool),
    Null,
    Link(Cid),
}

impl Value {
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Unsigned(n) => i64::try_from(*n).ok(),
            Value::Negative(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_cid(&self) -> Option<&Cid> {
        match self {
            Value::Link(cid) => Some(cid),
            _ => None,
        }
    }

    /// Like [`as_cid`](Self::as_cid), but tolerant of `null`: returns
    /// `Some(None)` for a null value (an absent optional link), `Some(Some(cid))`
    /// for a link, and `None` for any other variant.
    pub fn as_opt_cid(&self) -> Option<Option<&Cid>> {
        match self {
            Value::Null => Some(None),
            Value::Link(cid) => Some(Some(cid)),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl AsRef<[u8]> for Value {
    /// Returns the `Bytes`/`Text` payload as a slice, for callers who have
    /// already established the variant and want the bytes without
    /// re-matching. Panics on any other variant, per §9's guidance that a
    /// variant-coercing accessor should "surface a typed error or
    /// panic-with-documentation rather than silently returning a
    /// wrong-typed reference".
    fn as_ref(&self) -> &[u8] {
        match self {
            Value::Bytes(b) => b,
            Value::Text(t) => t.as_bytes(),
            other => panic!("Value::as_ref called on non-byte-bearing variant {other:?}"),
        }
    }
}
