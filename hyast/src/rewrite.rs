//! Bottom-up rule rewriting.
//!
//! Role
//! - A [`Rewriter`] is a [`Transformer`] holding an ordered list of [`Rule`]s.
//! - Each node is rewritten after its children. The first rule whose pattern
//!   unifies with the (child-rewritten) node is asked for an outcome:
//!   [`RuleOutcome::Replace`] ends the search with a new tree,
//!   [`RuleOutcome::Defer`] moves on to the next rule, and
//!   [`RuleOutcome::NoChange`] ends the search keeping the node.
//! - Rule order is the only tie-break.
//!
//! Fixpoint mode
//! - With [`RewriteOptions::fixpoint`], rules are tried again on each
//!   replacement at its position, and the whole tree is rewritten in further
//!   bottom-up passes until a pass performs no replacement. Every replacement
//!   is one step; going past [`RewriteOptions::step_limit`] aborts with
//!   [`RewriteError::StepLimitExceeded`].
//! - Both loops are iterative: stack use is bounded by tree depth, not by the
//!   number of steps.
//!
//! Example: fold additions of literals
//! ```
//! use hyast::prelude::*;
//! use hyast::grammar::{Grammar, constructor, field};
//!
//! let grammar = Grammar::new().sum("expr", [
//!     constructor("Add", [field("expr", "left"), field("expr", "right")]),
//!     constructor("Num", [field("int", "n")]),
//! ]);
//! let lang = generate(&grammar, GeneratorOptions::default()).unwrap();
//! let num = |n: i64| lang.make("Num", [Value::int(n)]).unwrap();
//! let add = |a: Value, b: Value| lang.make("Add", [a, b]).unwrap();
//!
//! let pattern = add(
//!     lang.make("Num", [Value::var("a")]).unwrap(),
//!     lang.make("Num", [Value::var("b")]).unwrap(),
//! );
//! let rule = Rule::new(pattern, |s: &Substitution| {
//!     Ok(RuleOutcome::Replace(lang.make("Num", [Value::int(s.int("a")? + s.int("b")?)])?))
//! });
//!
//! let tree = add(num(1), add(num(2), num(3)));
//! let result = Rewriter::new(vec![rule]).process(&tree).unwrap();
//! assert_eq!(result, num(6));
//! ```

use std::fmt;

use log::{debug, trace};
use strum::EnumIs;

use crate::error::{AstResult, RewriteError};
use crate::pattern::{Substitution, try_unify};
use crate::value::{Node, Value};
use crate::walker::{Transformed, Transformer, VisitContext};

/// What a rule decided for a matched node.
#[derive(Debug, Clone, PartialEq, EnumIs)]
pub enum RuleOutcome {
    Replace(Value),
    /// Let the next rule try.
    Defer,
    /// Keep the node and stop trying rules.
    NoChange,
}

type Action<'r> = Box<dyn Fn(&Substitution) -> AstResult<RuleOutcome> + 'r>;

/// A pattern and what to do with the nodes it matches.
pub struct Rule<'r> {
    name: Option<String>,
    pattern: Value,
    action: Action<'r>,
}

impl<'r> Rule<'r> {
    pub fn new<F>(pattern: Value, action: F) -> Self
    where
        F: Fn(&Substitution) -> AstResult<RuleOutcome> + 'r,
    {
        Rule {
            name: None,
            pattern,
            action: Box::new(action),
        }
    }

    /// Replace every match by `template`, instantiated with the match's bindings.
    pub fn template(pattern: Value, template: Value) -> Self {
        Rule::new(pattern, move |subst| {
            Ok(RuleOutcome::Replace(subst.apply(&template)?))
        })
    }

    /// Name shown in logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn pattern(&self) -> &Value {
        &self.pattern
    }

    /// Unify with `value` and run the action on success.
    pub fn apply(&self, value: &Value) -> AstResult<Option<RuleOutcome>> {
        match try_unify(&self.pattern, value) {
            Some(subst) => (self.action)(&subst).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for Rule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Rule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.pattern),
        }
    }
}

/// Options of a [`Rewriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Rewrite replacements again until no rule applies.
    pub fixpoint: bool,
    /// Maximum number of replacements per `process` call in fixpoint mode.
    pub step_limit: usize,
}

impl RewriteOptions {
    pub const DEFAULT_STEP_LIMIT: usize = 1000;

    pub fn fixpoint(mut self, fixpoint: bool) -> Self {
        self.fixpoint = fixpoint;
        self
    }

    pub fn step_limit(mut self, step_limit: usize) -> Self {
        self.step_limit = step_limit;
        self
    }
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            fixpoint: false,
            step_limit: Self::DEFAULT_STEP_LIMIT,
        }
    }
}

/// Transformer applying rules bottom-up.
pub struct Rewriter<'r> {
    rules: Vec<Rule<'r>>,
    options: RewriteOptions,
    steps: usize,
}

impl<'r> Rewriter<'r> {
    pub fn new(rules: Vec<Rule<'r>>) -> Self {
        Self::with_options(rules, RewriteOptions::default())
    }

    pub fn with_options(rules: Vec<Rule<'r>>, options: RewriteOptions) -> Self {
        Rewriter {
            rules,
            options,
            steps: 0,
        }
    }

    pub fn rules(&self) -> &[Rule<'r>] {
        &self.rules
    }

    pub fn options(&self) -> RewriteOptions {
        self.options
    }

    /// Replacements performed by the last `process` call.
    pub fn steps(&self) -> usize {
        self.steps
    }

    fn count_step(&mut self) -> AstResult<()> {
        self.steps += 1;
        if self.options.fixpoint && self.steps > self.options.step_limit {
            return Err(RewriteError::StepLimitExceeded {
                limit: self.options.step_limit,
            }
            .into());
        }
        Ok(())
    }

    /// Try the rules in order on one node whose children are already rewritten.
    fn rewrite_node(&self, node: &Node) -> AstResult<Option<Value>> {
        let value = Value::Node(node.clone());
        for rule in &self.rules {
            match rule.apply(&value)? {
                None => continue,
                Some(RuleOutcome::Defer) => trace!("rule {rule} deferred on {}", node.type_name()),
                Some(RuleOutcome::NoChange) => return Ok(None),
                Some(RuleOutcome::Replace(replacement)) => {
                    debug!("rule {rule} rewrote {}", node.type_name());
                    return Ok(Some(replacement));
                }
            }
        }
        Ok(None)
    }
}

impl Transformer for Rewriter<'_> {
    fn process(&mut self, tree: &Value) -> AstResult<Value> {
        self.steps = 0;
        let mut current = tree.clone();
        for pass in 1.. {
            let before = self.steps;
            let mut cx = VisitContext::new();
            current = self.visit(&mut cx, &current)?.resolve(&current);
            debug!(
                "rewrite pass {pass}: {} values visited, {} changed, {} replacements",
                cx.stats().visited,
                cx.stats().changed,
                self.steps - before
            );
            if !self.options.fixpoint || self.steps == before {
                break;
            }
        }
        Ok(current)
    }

    fn visit_node(&mut self, cx: &mut VisitContext, node: &Node) -> AstResult<Transformed> {
        let rewritten = self.generic_visit(cx, node)?;
        let Some(mut replacement) = self.rewrite_node(&rewritten)? else {
            return Ok(if rewritten.ptr_eq(node) {
                Transformed::Unchanged
            } else {
                Transformed::Replace(rewritten.into())
            });
        };
        self.count_step()?;

        // Rules keep firing at this position; the children of a replacement
        // are rewritten by the next pass.
        if self.options.fixpoint {
            while let Value::Node(next) = &replacement {
                match self.rewrite_node(next)? {
                    Some(value) => {
                        self.count_step()?;
                        replacement = value;
                    }
                    None => break,
                }
            }
        }
        Ok(Transformed::Replace(replacement))
    }
}
