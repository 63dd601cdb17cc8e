use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{AstError, AstResult};
use crate::value::{FieldValues, Node, Value};
use crate::variable::Pattern;
use crate::walker::{Transformed, Transformer, VisitContext};

/// Mapping from pattern variable names to trees.
///
/// Substitutions produced by unification are idempotent: no bound variable
/// occurs in any bound tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Substitution {
    bindings: BTreeMap<Arc<str>, Value>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (&**name, value))
    }

    pub fn insert(&mut self, name: impl Into<Arc<str>>, value: Value) -> Option<Value> {
        self.bindings.insert(name.into(), value)
    }

    /// Bound value of `name`, or an error naming it.
    pub fn value(&self, name: &str) -> AstResult<&Value> {
        self.get(name).ok_or_else(|| AstError::Unbound {
            name: name.to_string(),
        })
    }

    /// Bound value of `name`, which must be a node.
    pub fn node(&self, name: &str) -> AstResult<&Node> {
        let value = self.value(name)?;
        value.as_node().ok_or_else(|| AstError::Binding {
            name: name.to_string(),
            expected: "a node",
            found: value.describe(),
        })
    }

    /// Bound value of `name`, which must be an integer.
    pub fn int(&self, name: &str) -> AstResult<i64> {
        let value = self.value(name)?;
        value.as_int().ok_or_else(|| AstError::Binding {
            name: name.to_string(),
            expected: "an int",
            found: value.describe(),
        })
    }

    /// Bound value of `name`, which must be a string.
    pub fn str(&self, name: &str) -> AstResult<&str> {
        let value = self.value(name)?;
        value.as_str().ok_or_else(|| AstError::Binding {
            name: name.to_string(),
            expected: "a str",
            found: value.describe(),
        })
    }

    /// Instantiate `template`: every bound variable is replaced by its value.
    ///
    /// Rebuilt nodes go through the checked constructors.
    pub fn apply(&self, template: &Value) -> AstResult<Value> {
        Expander {
            bindings: &self.bindings,
            checked: true,
        }
        .process(template)
    }

    /// Substitute `binding` through every bound tree, then add it.
    pub(crate) fn bind(&mut self, binding: BTreeMap<Arc<str>, Value>) {
        for bound in self.bindings.values_mut() {
            *bound = expand_unchecked(&binding, bound);
        }
        self.bindings.extend(binding);
    }
}

impl FromIterator<(Arc<str>, Value)> for Substitution {
    fn from_iter<T: IntoIterator<Item = (Arc<str>, Value)>>(iter: T) -> Self {
        Substitution {
            bindings: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Substitution {
    fn from_iter<T: IntoIterator<Item = (&'a str, Value)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(name, value)| (Arc::from(name), value))
            .collect()
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        f.write_str("}")
    }
}

/// Replaces bound pattern variables.
struct Expander<'a> {
    bindings: &'a BTreeMap<Arc<str>, Value>,
    checked: bool,
}

impl Transformer for Expander<'_> {
    fn visit_pattern(&mut self, _cx: &mut VisitContext, pattern: &Pattern) -> AstResult<Transformed> {
        Ok(match pattern {
            Pattern::Var(var) => match self.bindings.get(var.name()) {
                Some(value) => Transformed::Replace(value.clone()),
                None => Transformed::Unchanged,
            },
            Pattern::Wildcard(_) => Transformed::Unchanged,
        })
    }

    fn rebuild(&mut self, node: &Node, values: FieldValues) -> AstResult<Node> {
        if self.checked {
            Ok(Node::new(node.node_type().clone(), values)?)
        } else {
            Ok(Node::new_unchecked(node.node_type().clone(), values))
        }
    }
}

/// Substitution on intermediate terms of unification. Those may be
/// transiently ill-typed, so nodes are rebuilt without type checks.
pub(crate) fn expand_unchecked(bindings: &BTreeMap<Arc<str>, Value>, tree: &Value) -> Value {
    let mut expander = Expander {
        bindings,
        checked: false,
    };
    // Unchecked rebuilding cannot fail.
    expander.process(tree).unwrap_or_else(|_| tree.clone())
}

pub(crate) fn singleton(name: Arc<str>, value: Value) -> BTreeMap<Arc<str>, Value> {
    BTreeMap::from([(name, value)])
}
