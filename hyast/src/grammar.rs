//! Grammar model: the input of the type generator.
//!
//! A [`Grammar`] is an ordered list of type definitions, each naming its
//! fields (declared type, arity, name) and an optional base type. The builder
//! mirrors the two ASDL declaration forms:
//! - `sum`: an abstract type plus one concrete constructor type per alternative;
//! - `product`: a single concrete type derived from the root.
//!
//! Entries keep their declaration order; nothing is validated here. Unknown
//! names, duplicates and cycles are reported by [`generate`](crate::lang::generate).
//!
//! Example
//! ```
//! use hyast::grammar::{Grammar, constructor, field};
//!
//! let grammar = Grammar::new()
//!     .sum("expr", [
//!         constructor("Add", [field("expr", "left"), field("expr", "right")]),
//!         constructor("Num", [field("num", "val")]),
//!     ])
//!     .product("num", [field("int", "real"), field("int?", "imag")]);
//!
//! assert_eq!(grammar.len(), 4);
//! assert_eq!(grammar.get("Add").unwrap().base.as_deref(), Some("expr"));
//! ```

use std::fmt;

use strum::{Display, EnumIs};

/// Arity qualifier of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIs)]
pub enum Arity {
    #[default]
    #[strum(serialize = "")]
    Single,
    #[strum(serialize = "?")]
    Optional,
    #[strum(serialize = "*")]
    Sequence,
}

/// Whether a type carries fields of its own or only groups its subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum TypeKind {
    #[strum(serialize = "abstract")]
    Abstract,
    #[strum(serialize = "concrete")]
    Concrete,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    pub name: String,
    pub type_name: String,
    pub arity: Arity,
}

impl FieldSpec {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            arity,
        }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.type_name, self.arity, self.name)
    }
}

/// Field shorthand in ASDL notation: `field("expr*", "body")` declares a
/// sequence of `expr`, `field("int?", "imag")` an optional `int`.
pub fn field(type_name: &str, name: &str) -> FieldSpec {
    let (type_name, arity) = if let Some(t) = type_name.strip_suffix('*') {
        (t, Arity::Sequence)
    } else if let Some(t) = type_name.strip_suffix('?') {
        (t, Arity::Optional)
    } else {
        (type_name, Arity::Single)
    };
    FieldSpec::new(type_name, name, arity)
}

/// One alternative of a sum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

pub fn constructor(name: &str, fields: impl IntoIterator<Item = FieldSpec>) -> Constructor {
    Constructor {
        name: name.to_string(),
        fields: fields.into_iter().collect(),
    }
}

/// A single grammar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    /// `None` derives from the root type.
    pub base: Option<String>,
    pub kind: TypeKind,
    pub fields: Vec<FieldSpec>,
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)?;
        if let Some(base) = &self.base {
            write!(f, " : {base}")?;
        }
        if self.kind.is_concrete() {
            write!(f, "(")?;
            for (i, field) in self.fields.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{field}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Ordered collection of type definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    entries: Vec<TypeSpec>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw entry.
    pub fn define(mut self, spec: TypeSpec) -> Self {
        self.entries.push(spec);
        self
    }

    /// Declare an abstract type. `base = None` places it directly under the root.
    pub fn abstract_type(self, name: &str, base: Option<&str>) -> Self {
        self.define(TypeSpec {
            name: name.to_string(),
            base: base.map(str::to_string),
            kind: TypeKind::Abstract,
            fields: Vec::new(),
        })
    }

    /// Declare a concrete type with its fields.
    pub fn concrete(
        self,
        name: &str,
        base: Option<&str>,
        fields: impl IntoIterator<Item = FieldSpec>,
    ) -> Self {
        self.define(TypeSpec {
            name: name.to_string(),
            base: base.map(str::to_string),
            kind: TypeKind::Concrete,
            fields: fields.into_iter().collect(),
        })
    }

    /// ASDL sum: `name = C1(...) | C2(...)`.
    pub fn sum(self, name: &str, constructors: impl IntoIterator<Item = Constructor>) -> Self {
        constructors
            .into_iter()
            .fold(self.abstract_type(name, None), |grammar, c| {
                grammar.concrete(&c.name, Some(name), c.fields)
            })
    }

    /// ASDL product: `name = (fields)`.
    pub fn product(self, name: &str, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.concrete(name, None, fields)
    }

    pub fn entries(&self) -> &[TypeSpec] {
        &self.entries
    }

    /// First entry with the given name.
    pub fn get(&self, name: &str) -> Option<&TypeSpec> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
