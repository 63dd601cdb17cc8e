//! Unification of trees containing pattern terms.
//!
//! Role
//! - Solve equations between trees where either side may contain pattern
//!   variables ([`PatVar`](crate::variable::PatVar)) and wildcards.
//! - Produce an idempotent [`Substitution`]: no bound variable occurs in any
//!   bound tree.
//!
//! Algorithm
//! - A worklist of equations, initialized with the input and processed from
//!   the end. Each step ([`match_step`]) either fails, decomposes the equation
//!   into sub-equations (same node type field by field, equal-length sequences
//!   element by element), or binds a variable.
//! - A new binding is substituted through the recorded bindings and through
//!   the remaining equations before the loop continues.
//! - A variable is never bound to a tree containing it (occurs-check).
//!
//! Example
//! ```
//! use hyast::prelude::*;
//!
//! let lhs = Value::seq([Value::var("X"), Value::int(2)]);
//! let rhs = Value::seq([Value::int(1), Value::var("Y")]);
//! let subst = unify(&lhs, &rhs).unwrap();
//! assert_eq!(subst.get("X"), Some(&Value::int(1)));
//! assert_eq!(subst.get("Y"), Some(&Value::int(2)));
//!
//! assert!(try_unify(&Value::int(1), &Value::int(2)).is_none());
//! ```

mod substitution;

pub use substitution::Substitution;

use std::collections::BTreeSet;
use std::sync::Arc;

use log::trace;

use crate::error::MatchFailure;
use crate::value::{Node, Value};
use crate::variable::Pattern;
use crate::walker::{VisitContext, Visitor};
use substitution::{expand_unchecked, singleton};

/// A pair of trees to be made equal.
pub type Equation = (Value, Value);

/// Outcome of one unification step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    /// Sub-equations that must hold in turn.
    pub equations: Vec<Equation>,
    /// Variable bound by this step.
    pub binding: Option<(Arc<str>, Value)>,
}

/// One step of unification on a single equation.
pub fn match_step(lhs: &Value, rhs: &Value) -> Result<Step, MatchFailure> {
    let is_wildcard = |v: &Value| matches!(v, Value::Pattern(Pattern::Wildcard(_)));
    if is_wildcard(lhs) || is_wildcard(rhs) {
        return Ok(Step::default());
    }

    // Put the variable, if any, on the left.
    let (lhs, rhs) = match (lhs, rhs) {
        (Value::Pattern(Pattern::Var(_)), _) => (lhs, rhs),
        (_, Value::Pattern(Pattern::Var(_))) => (rhs, lhs),
        _ => (lhs, rhs),
    };

    match (lhs, rhs) {
        (Value::Pattern(Pattern::Var(var)), _) => {
            if rhs.var_name() == Some(var.name()) {
                return Ok(Step::default());
            }
            if occurs(var.name(), rhs) {
                return Err(MatchFailure::Circular {
                    var: var.name().to_string(),
                    tree: rhs.to_string(),
                });
            }
            Ok(Step {
                equations: Vec::new(),
                binding: Some((var.name_shared().clone(), rhs.clone())),
            })
        }

        (Value::Node(left), Value::Node(right)) => {
            if left.node_type() != right.node_type() {
                return Err(MatchFailure::NodeMismatch {
                    left: left.type_name().to_string(),
                    right: right.type_name().to_string(),
                });
            }
            Ok(Step {
                equations: pairs(left.values(), right.values()),
                binding: None,
            })
        }
        (Value::Node(node), other) | (other, Value::Node(node)) => {
            Err(MatchFailure::NodeVsNonNode {
                node: node.type_name().to_string(),
                other: other.to_string(),
            })
        }

        (Value::Seq(left), Value::Seq(right)) => {
            if left.len() != right.len() {
                return Err(MatchFailure::LengthMismatch {
                    left: left.len(),
                    right: right.len(),
                });
            }
            Ok(Step {
                equations: pairs(left, right),
                binding: None,
            })
        }
        (Value::Seq(_), other) | (other, Value::Seq(_)) => Err(MatchFailure::SeqVsNonSeq {
            other: other.to_string(),
        }),

        (left, right) if left == right => Ok(Step::default()),
        (left, right) => Err(MatchFailure::Constant {
            left: left.to_string(),
            right: right.to_string(),
        }),
    }
}

fn pairs(left: &[Value], right: &[Value]) -> Vec<Equation> {
    left.iter().cloned().zip(right.iter().cloned()).collect()
}

/// Solve a list of equations.
pub fn unify_eqs(equations: Vec<Equation>) -> Result<Substitution, MatchFailure> {
    let mut worklist = equations;
    let mut result = Substitution::new();

    while let Some((lhs, rhs)) = worklist.pop() {
        let step = match_step(&lhs, &rhs)?;
        worklist.extend(step.equations);

        if let Some((name, value)) = step.binding {
            trace!("bind {name} := {value}");
            let binding = singleton(name, value);
            for (lhs, rhs) in worklist.iter_mut() {
                *lhs = expand_unchecked(&binding, lhs);
                *rhs = expand_unchecked(&binding, rhs);
            }
            result.bind(binding);
        }
    }
    Ok(result)
}

/// Unify two trees.
pub fn unify(lhs: &Value, rhs: &Value) -> Result<Substitution, MatchFailure> {
    unify_eqs(vec![(lhs.clone(), rhs.clone())])
}

/// Unify two trees, `None` on failure.
pub fn try_unify(lhs: &Value, rhs: &Value) -> Option<Substitution> {
    unify(lhs, rhs).ok()
}

struct OccursCheck<'a> {
    var: &'a str,
    found: bool,
}

impl Visitor for OccursCheck<'_> {
    fn visit_node(&mut self, cx: &mut VisitContext, node: &Node) {
        if !self.found {
            self.generic_visit(cx, node);
        }
    }

    fn visit_pattern(&mut self, _cx: &mut VisitContext, pattern: &Pattern) {
        if pattern.var_name() == Some(self.var) {
            self.found = true;
        }
    }
}

/// Whether the variable `var` occurs anywhere in `tree`.
pub fn occurs(var: &str, tree: &Value) -> bool {
    let mut check = OccursCheck { var, found: false };
    check.process(tree);
    check.found
}

#[derive(Default)]
struct VariableCollector(BTreeSet<String>);

impl Visitor for VariableCollector {
    fn visit_pattern(&mut self, _cx: &mut VisitContext, pattern: &Pattern) {
        if let Some(name) = pattern.var_name() {
            self.0.insert(name.to_string());
        }
    }
}

/// Names of every pattern variable in `tree`.
pub fn variables(tree: &Value) -> BTreeSet<String> {
    let mut collector = VariableCollector::default();
    collector.process(tree);
    collector.0
}
