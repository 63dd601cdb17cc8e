//! Hyast: grammar-driven immutable trees.
//!
//! A [`Grammar`](grammar::Grammar) in the ASDL style (sum types with
//! constructors, product types, `?`/`*` field arities) is turned at runtime
//! into a [`Language`](lang::Language): one [`NodeType`](lang::NodeType) per
//! abstract or concrete type, rooted at a single `AST` type. Trees built from
//! those types are immutable and shared through `Arc`; structural equality and
//! hashing are derived from the type and field values.
//!
//! On top of the tree model
//!  - [`walker`]: a read-only [`Visitor`](walker::Visitor) and a copy-on-write
//!    [`Transformer`](walker::Transformer) with identity-based change detection
//!    and sequence splicing.
//!  - [`pattern`]: unification of trees containing pattern variables and
//!    wildcards, with an occurs-check.
//!  - [`rewrite`]: a bottom-up rule rewriter built on the transformer.
//!  - [`value::pretty`] and [`parser`]: a multi-line dump and the parser that
//!    reads it back.
//!
//! Performance
//!  - Nodes keep up to four field values inline (`smallvec`) before spilling.
//!  - Cloning a tree is a reference count increment; transforming a tree
//!    rebuilds only the nodes on paths to changed values.
//!
//! Example
//! ```
//! use hyast::prelude::*;
//! use hyast::grammar::{Grammar, constructor, field};
//!
//! let grammar = Grammar::new().sum("expr", [
//!     constructor("Add", [field("expr", "left"), field("expr", "right")]),
//!     constructor("Num", [field("int", "n")]),
//! ]);
//! let lang = generate(&grammar, GeneratorOptions::default().type_checked(true)).unwrap();
//!
//! let one = lang.make("Num", [Value::int(1)]).unwrap();
//! let tree = lang.make("Add", [one.clone(), Value::var("X")]).unwrap();
//! assert_eq!(tree.to_string(), "Add(left = Num(n = 1), right = PatVar(id = \"X\"))");
//!
//! let subst = unify(&tree, &lang.make("Add", [one.clone(), one.clone()]).unwrap()).unwrap();
//! assert_eq!(subst.get("X"), Some(&one));
//! assert_eq!(parse(&lang, &dump(&tree)).unwrap(), tree);
//! ```

/// Error types shared by every module.
pub mod error;
/// Grammar description: types, constructors and fields.
pub mod grammar;
/// Runtime languages generated from grammars.
pub mod lang;
/// Parser for the dump format.
pub mod parser;
pub mod pattern;
pub mod rewrite;
/// Tree values: nodes, sequences, primitives and pattern terms.
pub mod value;
/// Pattern terms: variables and wildcards.
pub mod variable;
pub mod walker;

#[cfg(feature = "derive")]
pub use hyast_derive::pattern_vars;

pub mod prelude {
    //! Convenient re-exports for end users.
    //!
    //! - Tree values and the language generator
    //! - Visitor and transformer traits
    //! - Unification and rewriting
    //! - Dump and parse entry points
    pub use crate::value::{Node, Prim, Seq, Value, pretty::PrettyValue, pretty::dump};
    pub use crate::lang::{GeneratorOptions, Language, NodeType, PrimitiveKind, generate};
    pub use crate::variable::{Metasyntactic, PatVar, Pattern, Wildcard};

    // Traversal
    pub use crate::walker::{
        Frame, Transformed, Transformer, TraversalStats, VisitContext, Visitor,
    };

    // Unification and rewriting
    pub use crate::pattern::{
        Substitution, match_step, occurs, try_unify, unify, unify_eqs, variables,
    };
    pub use crate::rewrite::{RewriteOptions, Rewriter, Rule, RuleOutcome};

    pub use crate::error::{
        AstError, AstResult, ConstructionError, GrammarError, MatchFailure, ParseError,
        RewriteError,
    };
    pub use crate::parser::parse;
}
