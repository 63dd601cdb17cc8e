//! Pattern terms: variables and wildcards.
//!
//! Role
//! - [`PatVar`] names a hole to be bound by unification.
//! - [`Wildcard`] matches anything and binds nothing.
//! - Both are [`Metasyntactic`]: node constructors never type-check them, so a
//!   pattern term may stand in for any field value, or any sequence element.
use std::fmt;
use std::sync::Arc;

use strum::{EnumIs, EnumTryAs};

/// Marker for values that describe trees rather than being trees.
pub trait Metasyntactic: fmt::Display {
    /// Constructor name used by the textual dump.
    fn term_name(&self) -> &'static str;
}

/// A pattern variable, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatVar(Arc<str>);

impl PatVar {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        PatVar(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub(crate) fn name_shared(&self) -> &Arc<str> {
        &self.0
    }
}

impl Metasyntactic for PatVar {
    fn term_name(&self) -> &'static str {
        "PatVar"
    }
}

impl fmt::Display for PatVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatVar(id = {:?})", self.name())
    }
}

/// Matches any tree without binding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Wildcard;

impl Metasyntactic for Wildcard {
    fn term_name(&self) -> &'static str {
        "Wildcard"
    }
}

impl fmt::Display for Wildcard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Wildcard()")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
pub enum Pattern {
    Var(PatVar),
    Wildcard(Wildcard),
}

impl Pattern {
    pub fn as_metasyntactic(&self) -> &dyn Metasyntactic {
        match self {
            Pattern::Var(v) => v,
            Pattern::Wildcard(w) => w,
        }
    }

    /// Variable name, if this is a variable.
    pub fn var_name(&self) -> Option<&str> {
        match self {
            Pattern::Var(v) => Some(v.name()),
            Pattern::Wildcard(_) => None,
        }
    }
}

impl From<PatVar> for Pattern {
    fn from(v: PatVar) -> Self {
        Pattern::Var(v)
    }
}

impl From<Wildcard> for Pattern {
    fn from(w: Wildcard) -> Self {
        Pattern::Wildcard(w)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_metasyntactic(), f)
    }
}
