use std::collections::BTreeMap;

use strum::{Display, EnumIs, EnumIter, IntoEnumIterator};

use crate::value::{Prim, Value};

/// Primitive type a grammar field may name instead of a node type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIs, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveKind {
    Int,
    Float,
    Str,
    Bytes,
    Bool,
    /// Accepts any value.
    Object,
}

impl PrimitiveKind {
    /// Whether `value` inhabits this primitive type.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (PrimitiveKind::Object, _) => true,
            (PrimitiveKind::Int, Value::Prim(Prim::Int(_)))
            | (PrimitiveKind::Float, Value::Prim(Prim::Float(_)))
            | (PrimitiveKind::Str, Value::Prim(Prim::Str(_)))
            | (PrimitiveKind::Bytes, Value::Prim(Prim::Bytes(_)))
            | (PrimitiveKind::Bool, Value::Prim(Prim::Bool(_))) => true,
            _ => false,
        }
    }

    /// Every kind, registered under its own name (`int`, `float`, ...).
    pub fn identity_table() -> BTreeMap<String, PrimitiveKind> {
        PrimitiveKind::iter().map(|k| (k.to_string(), k)).collect()
    }
}

/// The ASDL builtin types.
pub fn asdl_primitives() -> BTreeMap<String, PrimitiveKind> {
    [
        ("identifier", PrimitiveKind::Str),
        ("int", PrimitiveKind::Int),
        ("string", PrimitiveKind::Str),
        ("bytes", PrimitiveKind::Bytes),
        ("object", PrimitiveKind::Object),
        ("singleton", PrimitiveKind::Object),
    ]
    .into_iter()
    .map(|(name, kind)| (name.to_string(), kind))
    .collect()
}
