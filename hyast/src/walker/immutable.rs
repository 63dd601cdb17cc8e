use crate::value::{Node, Seq, Value};
use crate::variable::Pattern;
use crate::walker::VisitContext;

/// Read-only traversal.
///
/// Override `visit_node` to act on nodes (typically matching on
/// [`Node::type_name`]) and call [`Visitor::generic_visit`] to descend.
pub trait Visitor {
    /// Walk `tree` with a fresh context.
    fn process(&mut self, tree: &Value) {
        let mut cx = VisitContext::new();
        self.visit(&mut cx, tree);
        debug_assert!(cx.stack().is_empty(), "visit stack left unbalanced");
    }

    /// Dispatch on the kind of `value`, maintaining the ancestor stack.
    fn visit(&mut self, cx: &mut VisitContext, value: &Value) {
        cx.stats.visited += 1;
        let slot = cx.take_slot();
        match value {
            Value::Node(node) => {
                cx.enter(node, slot);
                self.visit_node(cx, node);
                cx.leave();
            }
            Value::Seq(seq) => {
                let saved = cx.begin_seq(slot);
                self.seq_visit(cx, seq);
                cx.end_seq(saved);
            }
            Value::Pattern(pattern) => self.visit_pattern(cx, pattern),
            Value::Prim(_) | Value::Absent => self.visit_leaf(cx, value),
        }
    }

    fn visit_node(&mut self, cx: &mut VisitContext, node: &Node) {
        self.generic_visit(cx, node);
    }

    fn visit_pattern(&mut self, _cx: &mut VisitContext, _pattern: &Pattern) {}

    /// Primitives and absence.
    fn visit_leaf(&mut self, _cx: &mut VisitContext, _value: &Value) {}

    /// Visit every element in order.
    fn seq_visit(&mut self, cx: &mut VisitContext, seq: &Seq) {
        for (index, item) in seq.iter().enumerate() {
            cx.at_index(index);
            self.visit(cx, item);
        }
    }

    /// Visit every field of `node` in declaration order.
    fn generic_visit(&mut self, cx: &mut VisitContext, node: &Node) {
        for (field, value) in node.node_type().fields().iter().zip(node.values()) {
            cx.at_field(field.name_shared().clone());
            self.visit(cx, value);
        }
    }
}
