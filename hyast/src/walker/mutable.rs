use strum::EnumIs;

use crate::error::AstResult;
use crate::value::{FieldValues, Node, Seq, Value};
use crate::variable::Pattern;
use crate::walker::VisitContext;

/// Result of transforming one value.
#[derive(Debug, Clone, PartialEq, EnumIs)]
pub enum Transformed {
    /// Keep the input as is.
    Unchanged,
    Replace(Value),
    /// Inside a sequence, stands for zero or more elements in place of the
    /// input; anywhere else, becomes a sequence value.
    Splice(Vec<Value>),
}

impl Transformed {
    /// The value this result stands for, given the `original` input.
    pub fn resolve(self, original: &Value) -> Value {
        match self {
            Transformed::Unchanged => original.clone(),
            Transformed::Replace(value) => value,
            Transformed::Splice(values) => Value::Seq(Seq::from(values)),
        }
    }

    /// `Unchanged` when `value` is `original` itself, `Replace` otherwise.
    pub fn from_value(original: &Value, value: Value) -> Self {
        if value.ptr_eq(original) {
            Transformed::Unchanged
        } else {
            Transformed::Replace(value)
        }
    }

    fn changes(&self, original: &Value) -> bool {
        match self {
            Transformed::Unchanged => false,
            Transformed::Replace(value) => !value.ptr_eq(original),
            Transformed::Splice(_) => true,
        }
    }
}

/// Copy-on-write traversal.
///
/// Handlers return [`Transformed`]. A node or sequence is rebuilt only when
/// one of its children's results differs from the child by reference
/// identity; otherwise the original `Arc` is returned as is.
pub trait Transformer {
    /// Transform `tree` with a fresh context.
    fn process(&mut self, tree: &Value) -> AstResult<Value> {
        let mut cx = VisitContext::new();
        let result = self.visit(&mut cx, tree)?;
        Ok(result.resolve(tree))
    }

    /// Dispatch on the kind of `value`, maintaining the ancestor stack.
    fn visit(&mut self, cx: &mut VisitContext, value: &Value) -> AstResult<Transformed> {
        cx.stats.visited += 1;
        let slot = cx.take_slot();
        let result = match value {
            Value::Node(node) => {
                cx.enter(node, slot);
                let result = self.visit_node(cx, node);
                cx.leave();
                result?
            }
            Value::Seq(seq) => {
                let saved = cx.begin_seq(slot);
                let result = self.seq_visit(cx, seq);
                cx.end_seq(saved);
                let seq = result?;
                Transformed::from_value(value, Value::Seq(seq))
            }
            Value::Pattern(pattern) => self.visit_pattern(cx, pattern)?,
            Value::Prim(_) | Value::Absent => self.visit_leaf(cx, value)?,
        };
        if result.changes(value) {
            cx.stats.changed += 1;
        }
        Ok(result)
    }

    fn visit_node(&mut self, cx: &mut VisitContext, node: &Node) -> AstResult<Transformed> {
        let rebuilt = self.generic_visit(cx, node)?;
        Ok(if rebuilt.ptr_eq(node) {
            Transformed::Unchanged
        } else {
            Transformed::Replace(rebuilt.into())
        })
    }

    fn visit_pattern(&mut self, _cx: &mut VisitContext, _pattern: &Pattern) -> AstResult<Transformed> {
        Ok(Transformed::Unchanged)
    }

    /// Primitives and absence.
    fn visit_leaf(&mut self, _cx: &mut VisitContext, _value: &Value) -> AstResult<Transformed> {
        Ok(Transformed::Unchanged)
    }

    /// Transform every element, splicing `Splice` results in place.
    fn seq_visit(&mut self, cx: &mut VisitContext, seq: &Seq) -> AstResult<Seq> {
        let mut items: Option<Vec<Value>> = None;
        for (index, item) in seq.iter().enumerate() {
            cx.at_index(index);
            let result = self.visit(cx, item)?;
            if items.is_none() && !result.changes(item) {
                continue;
            }
            let items = items.get_or_insert_with(|| seq[..index].to_vec());
            match result {
                Transformed::Unchanged => items.push(item.clone()),
                Transformed::Replace(value) => items.push(value),
                Transformed::Splice(values) => items.extend(values),
            }
        }
        Ok(items.map_or_else(|| seq.clone(), Seq::from))
    }

    /// Transform every field of `node`; rebuild it only if a field changed.
    fn generic_visit(&mut self, cx: &mut VisitContext, node: &Node) -> AstResult<Node> {
        let mut values: Option<FieldValues> = None;
        for (index, (field, value)) in node
            .node_type()
            .fields()
            .iter()
            .zip(node.values())
            .enumerate()
        {
            cx.at_field(field.name_shared().clone());
            let result = self.visit(cx, value)?;
            if result.changes(value) {
                let values = values.get_or_insert_with(|| node.values().iter().cloned().collect());
                values[index] = result.resolve(value);
            }
        }
        match values {
            Some(values) => self.rebuild(node, values),
            None => Ok(node.clone()),
        }
    }

    /// Build the replacement of `node` from its transformed field values.
    fn rebuild(&mut self, node: &Node, values: FieldValues) -> AstResult<Node> {
        Ok(Node::new(node.node_type().clone(), values)?)
    }
}
