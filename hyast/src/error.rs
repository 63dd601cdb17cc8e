//! Error types shared by every layer of the crate.
//!
//! Each concern has its own `thiserror` enum; [`AstError`] aggregates them so
//! user callbacks (transformer handlers, rule actions) can use `?` on any of
//! them and return [`AstResult`].

use thiserror::Error;

/// Errors raised while turning a [`Grammar`](crate::grammar::Grammar) into a
/// [`Language`](crate::lang::Language). No partial language is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("type '{name}' is defined more than once")]
    DuplicateType { name: String },

    #[error("type '{name}' declares field '{field}' more than once")]
    DuplicateField { name: String, field: String },

    #[error("type '{name}' uses reserved name")]
    ReservedName { name: String },

    #[error("type '{name}' derives from unknown base '{base}'")]
    UnknownBase { name: String, base: String },

    #[error("field '{name}.{field}' has unknown type '{field_type}'")]
    UnknownFieldType {
        name: String,
        field: String,
        field_type: String,
    },

    #[error("inheritance cycle involving {}", names.join(", "))]
    InheritanceCycle { names: Vec<String> },
}

/// Errors raised by node constructors. Every variant names the node type and,
/// when relevant, the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("{ty} expects {expected} field(s), got {found}")]
    FieldCount {
        ty: String,
        expected: usize,
        found: usize,
    },

    #[error("{ty}.{field}: expected a sequence, got {found}")]
    ExpectedSequence {
        ty: String,
        field: String,
        found: String,
    },

    #[error("{ty}.{field}: unexpected sequence {found}")]
    UnexpectedSequence {
        ty: String,
        field: String,
        found: String,
    },

    #[error("{ty}.{field}: expected {expected}, got {found}")]
    WrongType {
        ty: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("{ty}.{field}: missing required value")]
    MissingValue { ty: String, field: String },

    #[error("{ty} is abstract and cannot be instantiated")]
    AbstractType { ty: String },

    #[error("{ty} has no field named '{field}'")]
    UnknownField { ty: String, field: String },

    #[error("{ty}: field '{field}' given more than once")]
    RepeatedField { ty: String, field: String },
}

/// Why two trees could not be unified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchFailure {
    #[error("node type mismatch: {left} vs {right}")]
    NodeMismatch { left: String, right: String },

    #[error("node {node} cannot match non-node {other}")]
    NodeVsNonNode { node: String, other: String },

    #[error("sequence cannot match non-sequence {other}")]
    SeqVsNonSeq { other: String },

    #[error("sequence length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("constant mismatch: {left} vs {right}")]
    Constant { left: String, right: String },

    #[error("circular binding of '{var}' to {tree}")]
    Circular { var: String, tree: String },
}

/// Errors of the rule rewriter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("rewriting exceeded the step limit of {limit}")]
    StepLimitExceeded { limit: usize },
}

/// Errors of the textual dump parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error: {}", messages.join("; "))]
    Syntax { messages: Vec<String> },

    #[error("unknown node type '{name}'")]
    UnknownType { name: String },

    #[error("{ty}: positional arguments cannot follow keyword arguments")]
    PositionalAfterKeyword { ty: String },

    #[error("malformed pattern term: {text}")]
    MalformedPattern { text: String },

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Crate-wide error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Match(#[from] MatchFailure),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown node type '{name}'")]
    UnknownType { name: String },

    #[error("pattern variable '{name}' is unbound")]
    Unbound { name: String },

    #[error("pattern variable '{name}' is bound to {found}, expected {expected}")]
    Binding {
        name: String,
        expected: &'static str,
        found: String,
    },

    #[error("{0}")]
    Custom(String),
}

pub type AstResult<T> = Result<T, AstError>;
