//! Tree values.
//!
//! Role
//! - [`Value`] is everything a field can hold: a [`Node`], a [`Seq`]uence, a
//!   primitive ([`Prim`]), the absence marker, or a pattern term.
//! - Values are immutable. Nodes and sequences are `Arc`-backed, so cloning a
//!   tree is O(1) and subtrees can be shared freely; [`Value::ptr_eq`] observes
//!   that sharing.
//! - Equality and hashing are structural.
//!
//! Printing
//! - `Display` renders a tree on one line (`Add(left = Num(n = 1), right = Num(n = 2))`).
//! - [`pretty::dump`] renders the same grammar on several column-aligned lines.
//!   Both are read back by [`parse`](crate::parser::parse).

mod node;
pub mod pretty;
mod prim;

pub use node::{FieldValues, Node};
pub use prim::{Float, Prim};

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use strum::EnumIs;

use crate::variable::{Metasyntactic, PatVar, Pattern, Wildcard};

/// Immutable ordered sequence of values.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Seq(Arc<[Value]>);

impl Seq {
    pub fn empty() -> Self {
        Seq(Arc::from(Vec::new()))
    }

    pub fn ptr_eq(&self, other: &Seq) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

impl Deref for Seq {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for Seq {
    fn from(values: Vec<Value>) -> Self {
        Seq(Arc::from(values))
    }
}

impl FromIterator<Value> for Seq {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Seq(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Seq {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Debug for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        if self.len() == 1 {
            f.write_str(",")?;
        }
        f.write_str(")")
    }
}

/// A field value.
#[derive(Clone, PartialEq, Eq, Hash, EnumIs)]
pub enum Value {
    Node(Node),
    Seq(Seq),
    Prim(Prim),
    /// Absence of an optional value, printed `None`.
    Absent,
    Pattern(Pattern),
}

impl Value {
    pub fn int(i: i64) -> Self {
        Value::Prim(Prim::Int(i))
    }

    pub fn float(x: f64) -> Self {
        Value::Prim(Prim::from(x))
    }

    pub fn str(s: &str) -> Self {
        Value::Prim(Prim::from(s))
    }

    pub fn bytes(b: &[u8]) -> Self {
        Value::Prim(Prim::from(b))
    }

    pub fn bool(b: bool) -> Self {
        Value::Prim(Prim::Bool(b))
    }

    pub fn seq(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Seq(values.into_iter().collect())
    }

    /// Pattern variable named `name`.
    pub fn var(name: &str) -> Self {
        Value::Pattern(Pattern::Var(PatVar::new(name)))
    }

    pub fn wildcard() -> Self {
        Value::Pattern(Pattern::Wildcard(Wildcard))
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Seq> {
        match self {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_prim(&self) -> Option<&Prim> {
        match self {
            Value::Prim(prim) => Some(prim),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Value::Pattern(pattern) => Some(pattern),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Prim(Prim::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Prim(Prim::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Name of the node type, if this is a node.
    pub fn type_name(&self) -> Option<&str> {
        self.as_node().map(Node::type_name)
    }

    /// Pattern variable name, if this is a variable.
    pub fn var_name(&self) -> Option<&str> {
        self.as_pattern().and_then(Pattern::var_name)
    }

    /// Pattern terms are metasyntactic; everything else is not.
    pub fn as_metasyntactic(&self) -> Option<&dyn Metasyntactic> {
        self.as_pattern().map(Pattern::as_metasyntactic)
    }

    /// Reference identity for nodes and sequences, equality for leaves.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Node(a), Value::Node(b)) => a.ptr_eq(b),
            (Value::Seq(a), Value::Seq(b)) => a.ptr_eq(b),
            (Value::Node(_) | Value::Seq(_), _) | (_, Value::Node(_) | Value::Seq(_)) => false,
            (a, b) => a == b,
        }
    }

    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Value::Node(node) => node.type_name().to_string(),
            Value::Seq(seq) => format!("sequence of {}", seq.len()),
            Value::Prim(prim) => format!("{} {prim}", prim.kind()),
            Value::Absent => "None".to_string(),
            Value::Pattern(pattern) => pattern.to_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Value {
    /// One line; the alternate flag (`{:#}`) writes the multi-line dump.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return pretty::write_dump(self, f);
        }
        match self {
            Value::Node(node) => fmt::Display::fmt(node, f),
            Value::Seq(seq) => fmt::Display::fmt(seq, f),
            Value::Prim(prim) => fmt::Display::fmt(prim, f),
            Value::Absent => f.write_str("None"),
            Value::Pattern(pattern) => fmt::Display::fmt(pattern, f),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

impl From<Seq> for Value {
    fn from(seq: Seq) -> Self {
        Value::Seq(seq)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Seq(Seq::from(values))
    }
}

impl From<Prim> for Value {
    fn from(prim: Prim) -> Self {
        Value::Prim(prim)
    }
}

impl From<Pattern> for Value {
    fn from(pattern: Pattern) -> Self {
        Value::Pattern(pattern)
    }
}

impl From<PatVar> for Value {
    fn from(var: PatVar) -> Self {
        Value::Pattern(Pattern::Var(var))
    }
}

impl From<Wildcard> for Value {
    fn from(w: Wildcard) -> Self {
        Value::Pattern(Pattern::Wildcard(w))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Prim(Prim::from(s))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    /// `None` becomes [`Value::Absent`].
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}
