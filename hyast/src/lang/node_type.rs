use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::ConstructionError;
use crate::grammar::{Arity, TypeKind};
use crate::lang::{LanguageId, PrimitiveKind};
use crate::value::{Node, Value};

/// What a field's declared type resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTarget {
    /// Index of a node type in the same language.
    Node(usize),
    Primitive(PrimitiveKind),
}

/// A resolved field of a node type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub(crate) name: Arc<str>,
    pub(crate) type_name: Arc<str>,
    pub(crate) arity: Arity,
    pub(crate) target: FieldTarget,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_shared(&self) -> &Arc<str> {
        &self.name
    }

    /// The type name as written in the grammar.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn target(&self) -> FieldTarget {
        self.target
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", self.type_name, self.arity, self.name)
    }
}

pub(crate) struct NodeTypeData {
    pub(crate) name: Arc<str>,
    pub(crate) language: LanguageId,
    pub(crate) index: usize,
    pub(crate) kind: TypeKind,
    pub(crate) base: Option<NodeType>,
    /// Own index first, then every base index up to the root.
    pub(crate) ancestry: Vec<usize>,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) checked: bool,
}

/// Shared handle on an immutable node type descriptor.
///
/// Two handles are equal iff they denote the same type of the same language.
#[derive(Clone)]
pub struct NodeType(Arc<NodeTypeData>);

impl NodeType {
    pub(crate) fn new(data: NodeTypeData) -> Self {
        NodeType(Arc::new(data))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn language(&self) -> LanguageId {
        self.0.language
    }

    /// Position of this type in its language's generation order (root is 0).
    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    pub fn is_abstract(&self) -> bool {
        self.0.kind.is_abstract()
    }

    /// Whether constructors validate field arity and types.
    pub fn is_checked(&self) -> bool {
        self.0.checked
    }

    /// Direct supertype; `None` only for the root.
    pub fn base(&self) -> Option<&NodeType> {
        self.0.base.as_ref()
    }

    /// Iterator over this type and its supertypes, ending at the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &NodeType> {
        std::iter::successors(Some(self), |ty| ty.base())
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.0.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.fields.iter().map(|f| f.name())
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.0.fields.iter().position(|f| &*f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.0.fields.iter().find(|f| &*f.name == name)
    }

    /// `true` if `self` is `other` or one of its descendants.
    pub fn is_subtype_of(&self, other: &NodeType) -> bool {
        self.language() == other.language() && self.0.ancestry.contains(&other.index())
    }

    pub(crate) fn has_ancestor_index(&self, index: usize) -> bool {
        self.0.ancestry.contains(&index)
    }

    pub(crate) fn ancestry(&self) -> &[usize] {
        &self.0.ancestry
    }

    /// Build a node from positional field values.
    pub fn construct(&self, values: impl IntoIterator<Item = Value>) -> Result<Node, ConstructionError> {
        Node::new(self.clone(), values.into_iter().collect())
    }

    /// Build a node from `(field, value)` pairs, in any order.
    ///
    /// Every field must be given exactly once.
    pub fn construct_named<'a>(
        &self,
        values: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Node, ConstructionError> {
        let mut slots: SmallVec<[Option<Value>; 4]> = self.fields().iter().map(|_| None).collect();
        for (name, value) in values {
            let index = self.field_index(name).ok_or_else(|| ConstructionError::UnknownField {
                ty: self.name().to_string(),
                field: name.to_string(),
            })?;
            if slots[index].replace(value).is_some() {
                return Err(ConstructionError::RepeatedField {
                    ty: self.name().to_string(),
                    field: name.to_string(),
                });
            }
        }

        let values = slots
            .into_iter()
            .zip(self.fields())
            .map(|(slot, field)| {
                slot.ok_or_else(|| ConstructionError::MissingValue {
                    ty: self.name().to_string(),
                    field: field.name().to_string(),
                })
            })
            .collect::<Result<_, _>>()?;
        Node::new(self.clone(), values)
    }

    /// Validate a full set of field values for an instance of this type.
    pub(crate) fn validate(&self, values: &[Value]) -> Result<(), ConstructionError> {
        if self.is_abstract() {
            return Err(ConstructionError::AbstractType {
                ty: self.name().to_string(),
            });
        }
        if values.len() != self.fields().len() {
            return Err(ConstructionError::FieldCount {
                ty: self.name().to_string(),
                expected: self.fields().len(),
                found: values.len(),
            });
        }
        if self.is_checked() {
            for (field, value) in self.fields().iter().zip(values) {
                self.check_field(field, value)?;
            }
        }
        Ok(())
    }

    pub(crate) fn check_field(
        &self,
        field: &FieldDescriptor,
        value: &Value,
    ) -> Result<(), ConstructionError> {
        if value.as_metasyntactic().is_some() {
            return Ok(());
        }
        match field.arity {
            Arity::Sequence => match value {
                Value::Seq(items) => items
                    .iter()
                    .filter(|item| item.as_metasyntactic().is_none())
                    .try_for_each(|item| self.check_element(field, item)),
                other => Err(ConstructionError::ExpectedSequence {
                    ty: self.name().to_string(),
                    field: field.name().to_string(),
                    found: other.describe(),
                }),
            },
            Arity::Optional if value.is_absent() => Ok(()),
            Arity::Optional | Arity::Single => self.check_element(field, value),
        }
    }

    fn check_element(&self, field: &FieldDescriptor, value: &Value) -> Result<(), ConstructionError> {
        let accepted = match field.target {
            FieldTarget::Primitive(PrimitiveKind::Object) => return Ok(()),
            _ if value.is_seq() => {
                return Err(ConstructionError::UnexpectedSequence {
                    ty: self.name().to_string(),
                    field: field.name().to_string(),
                    found: value.describe(),
                });
            }
            FieldTarget::Node(index) => value.as_node().is_some_and(|node| {
                node.node_type().language() == self.language()
                    && node.node_type().has_ancestor_index(index)
            }),
            FieldTarget::Primitive(kind) => kind.accepts(value),
        };

        match accepted {
            true => Ok(()),
            false if value.is_absent() && field.arity.is_single() => {
                Err(ConstructionError::MissingValue {
                    ty: self.name().to_string(),
                    field: field.name().to_string(),
                })
            }
            false => Err(ConstructionError::WrongType {
                ty: self.name().to_string(),
                field: field.name().to_string(),
                expected: field.type_name().to_string(),
                found: value.describe(),
            }),
        }
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.language() == other.language() && self.index() == other.index())
    }
}

impl Eq for NodeType {}

impl Hash for NodeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.language().hash(state);
        self.index().hash(state);
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeType({}#{})", self.name(), self.language())
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
