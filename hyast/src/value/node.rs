use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::ConstructionError;
use crate::lang::NodeType;
use crate::value::Value;

/// Inline capacity of a node's field storage.
pub const INLINE_FIELDS: usize = 4;

/// Field storage of a node; small nodes keep their fields inline.
pub type FieldValues = SmallVec<[Value; INLINE_FIELDS]>;

struct NodeData {
    ty: NodeType,
    values: FieldValues,
}

/// An immutable instance of a concrete node type.
///
/// Cloning is an `Arc` clone. Equality is structural (type, then field
/// values in declaration order) with a pointer-equality fast path.
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

impl Node {
    /// Validate `values` against `ty` and build the node.
    pub(crate) fn new(ty: NodeType, values: FieldValues) -> Result<Self, ConstructionError> {
        ty.validate(&values)?;
        Ok(Node(Arc::new(NodeData { ty, values })))
    }

    /// Build without arity or type checks; the field count is still asserted.
    pub(crate) fn new_unchecked(ty: NodeType, values: FieldValues) -> Self {
        debug_assert_eq!(ty.fields().len(), values.len());
        Node(Arc::new(NodeData { ty, values }))
    }

    pub fn node_type(&self) -> &NodeType {
        &self.0.ty
    }

    pub fn type_name(&self) -> &str {
        self.0.ty.name()
    }

    /// Field values in declaration order.
    pub fn values(&self) -> &[Value] {
        &self.0.values
    }

    /// `(field name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .ty
            .fields()
            .iter()
            .map(|f| f.name())
            .zip(self.0.values.iter())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.ty.field_index(field).map(|i| &self.0.values[i])
    }

    pub fn len(&self) -> usize {
        self.0.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values.is_empty()
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Copy of this node with one field replaced, validated like a fresh construction.
    pub fn replace(&self, field: &str, value: Value) -> Result<Node, ConstructionError> {
        let index = self
            .0
            .ty
            .field_index(field)
            .ok_or_else(|| ConstructionError::UnknownField {
                ty: self.type_name().to_string(),
                field: field.to_string(),
            })?;
        let mut values = self.0.values.clone();
        values[index] = value;
        Node::new(self.0.ty.clone(), values)
    }

    /// Same type, new field values.
    pub fn with_values(&self, values: impl IntoIterator<Item = Value>) -> Result<Node, ConstructionError> {
        Node::new(self.0.ty.clone(), values.into_iter().collect())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.0.ty == other.0.ty && self.0.values == other.0.values)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.ty.hash(state);
        self.0.values.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Node {
    /// One-line form of the dump grammar.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.type_name())?;
        for (i, (name, value)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        f.write_str(")")
    }
}
