use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use strum::{EnumIs, EnumTryAs};

use crate::lang::PrimitiveKind;

/// `f64` made `Eq` and `Hash`: all NaNs are one value and `-0.0` is `0.0`.
#[derive(Clone, Copy)]
pub struct Float(f64);

impl Float {
    fn canonicalize(x: f64) -> f64 {
        if x.is_nan() {
            f64::NAN
        } else if x == 0.0 {
            0.0
        } else {
            x
        }
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl From<f64> for Float {
    fn from(x: f64) -> Self {
        Float(Self::canonicalize(x))
    }
}

impl PartialEq for Float {
    fn eq(&self, other: &Self) -> bool {
        (self.0.is_nan() && other.0.is_nan()) || self.0 == other.0
    }
}

impl Eq for Float {}

impl Hash for Float {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Canonicalized on construction, so equal values share their bits.
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

impl fmt::Debug for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Float {
    /// Rust literal form: always carries a `.` or an exponent.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// A primitive leaf value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
pub enum Prim {
    Int(i64),
    Float(Float),
    Str(Arc<str>),
    Bytes(Arc<[u8]>),
    Bool(bool),
}

impl Prim {
    /// The most specific primitive kind inhabited by this value.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Prim::Int(_) => PrimitiveKind::Int,
            Prim::Float(_) => PrimitiveKind::Float,
            Prim::Str(_) => PrimitiveKind::Str,
            Prim::Bytes(_) => PrimitiveKind::Bytes,
            Prim::Bool(_) => PrimitiveKind::Bool,
        }
    }
}

impl fmt::Display for Prim {
    /// Rust literal syntax, which the dump parser reads back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prim::Int(i) => write!(f, "{i}"),
            Prim::Float(x) => write!(f, "{x}"),
            Prim::Str(s) => write!(f, "{:?}", &**s),
            Prim::Bytes(b) => write!(f, "b\"{}\"", b.escape_ascii()),
            Prim::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Prim {
    fn from(i: i64) -> Self {
        Prim::Int(i)
    }
}

impl From<f64> for Prim {
    fn from(x: f64) -> Self {
        Prim::Float(Float::from(x))
    }
}

impl From<bool> for Prim {
    fn from(b: bool) -> Self {
        Prim::Bool(b)
    }
}

impl From<&str> for Prim {
    fn from(s: &str) -> Self {
        Prim::Str(Arc::from(s))
    }
}

impl From<String> for Prim {
    fn from(s: String) -> Self {
        Prim::Str(Arc::from(s))
    }
}

impl From<&[u8]> for Prim {
    fn from(b: &[u8]) -> Self {
        Prim::Bytes(Arc::from(b))
    }
}

impl From<Vec<u8>> for Prim {
    fn from(b: Vec<u8>) -> Self {
        Prim::Bytes(Arc::from(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_zero_folds() {
        assert_eq!(Float::from(-0.0), Float::from(0.0));
        assert!(Float::from(-0.0).get().is_sign_positive());
    }

    #[test]
    fn nan_is_reflexive() {
        assert_eq!(Float::from(f64::NAN), Float::from(-f64::NAN));
    }

    #[test]
    fn literal_forms() {
        assert_eq!(Prim::from(1.0).to_string(), "1.0");
        assert_eq!(Prim::from("a\"b").to_string(), "\"a\\\"b\"");
        assert_eq!(Prim::from(&b"x\n"[..]).to_string(), "b\"x\\n\"");
    }
}
