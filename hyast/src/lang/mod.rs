//! Type generator: turns a [`Grammar`] into a [`Language`].
//!
//! Role
//! - Validate the grammar (unknown names, duplicates, cycles, reserved names).
//! - Produce one immutable [`NodeType`] per entry, plus the implicit root type
//!   [`ROOT_TYPE`], organized in a single-inheritance hierarchy.
//! - Resolve every field's declared type to a node type or a [`PrimitiveKind`].
//!
//! Generation order
//! - Abstract entries first (declaration order), then concrete entries
//!   (declaration order); an entry whose base is not generated yet waits for it.
//! - Field targets are resolved after every name has an index, so fields may
//!   refer to types generated later (mutually recursive grammars).
//!
//! Example
//! ```
//! use hyast::grammar::{Grammar, constructor, field};
//! use hyast::lang::{GeneratorOptions, generate};
//! use hyast::value::Value;
//!
//! let grammar = Grammar::new()
//!     .sum("expr", [
//!         constructor("Add", [field("expr", "left"), field("expr", "right")]),
//!         constructor("Num", [field("int", "n")]),
//!     ]);
//! let lang = generate(&grammar, GeneratorOptions::default().type_checked(true)).unwrap();
//!
//! let one = lang["Num"].construct([Value::int(1)]).unwrap();
//! let sum = lang["Add"].construct([Value::from(one.clone()), Value::from(one)]).unwrap();
//! assert!(sum.node_type().is_subtype_of(&lang["expr"]));
//! assert!(lang["Num"].construct([Value::str("x")]).is_err());
//! ```

mod node_type;
mod primitive;

pub use node_type::{FieldDescriptor, FieldTarget, NodeType};
pub use primitive::{PrimitiveKind, asdl_primitives};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::ops::Index;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace};

use crate::error::{AstError, AstResult, GrammarError};
use crate::grammar::{FieldSpec, Grammar, TypeKind, TypeSpec};
use crate::value::Value;
use node_type::NodeTypeData;

/// Name of the implicit root type every generated type derives from.
pub const ROOT_TYPE: &str = "AST";

/// Names a grammar may not define: the root and the pattern term constructors.
pub const RESERVED_NAMES: [&str; 3] = [ROOT_TYPE, "PatVar", "Wildcard"];

/// Process-unique identifier of a generated language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageId(u64);

impl LanguageId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        LanguageId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Options of [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Validate field arity and types on construction.
    pub checked: bool,
    /// Type names resolved to primitive kinds rather than node types.
    pub primitive_types: BTreeMap<String, PrimitiveKind>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            checked: false,
            primitive_types: asdl_primitives(),
        }
    }
}

impl GeneratorOptions {
    pub fn type_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_primitive(mut self, name: &str, kind: PrimitiveKind) -> Self {
        self.primitive_types.insert(name.to_string(), kind);
        self
    }

    /// Replace the whole primitive table.
    pub fn with_primitives(mut self, table: BTreeMap<String, PrimitiveKind>) -> Self {
        self.primitive_types = table;
        self
    }
}

/// A generated family of node types.
///
/// Lookup is by name; iteration follows generation order, root first.
pub struct Language {
    id: LanguageId,
    types: Vec<NodeType>,
    by_name: HashMap<Arc<str>, usize>,
    checked: bool,
}

impl Language {
    pub fn id(&self) -> LanguageId {
        self.id
    }

    pub fn get(&self, name: &str) -> Option<&NodeType> {
        self.by_name.get(name).map(|&index| &self.types[index])
    }

    /// Like [`Language::get`] but with an error naming the missing type.
    pub fn node_type(&self, name: &str) -> AstResult<&NodeType> {
        self.get(name).ok_or_else(|| AstError::UnknownType {
            name: name.to_string(),
        })
    }

    pub fn root(&self) -> &NodeType {
        &self.types[0]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeType> {
        self.types.iter()
    }

    /// Number of types, root included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Look up `name` and construct an instance, wrapped as a [`Value`].
    pub fn make(&self, name: &str, values: impl IntoIterator<Item = Value>) -> AstResult<Value> {
        Ok(self.node_type(name)?.construct(values)?.into())
    }
}

impl Index<&str> for Language {
    type Output = NodeType;

    /// Panics if the language has no type named `name`.
    fn index(&self, name: &str) -> &NodeType {
        match self.get(name) {
            Some(ty) => ty,
            None => panic!("language {} has no node type named '{name}'", self.id),
        }
    }
}

impl<'a> IntoIterator for &'a Language {
    type Item = &'a NodeType;
    type IntoIter = std::slice::Iter<'a, NodeType>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("id", &self.id)
            .field("types", &self.types.iter().map(NodeType::name).collect::<Vec<_>>())
            .field("checked", &self.checked)
            .finish()
    }
}

/// Generate the node types described by `grammar`.
pub fn generate(grammar: &Grammar, options: GeneratorOptions) -> Result<Language, GrammarError> {
    let specs = grammar.entries();
    check_names(specs)?;
    let order = generation_order(specs)?;

    // Phase one: every name gets its index.
    let mut by_name: HashMap<Arc<str>, usize> = HashMap::with_capacity(order.len() + 1);
    by_name.insert(Arc::from(ROOT_TYPE), 0);
    for (index, spec) in order.iter().enumerate() {
        by_name.insert(Arc::from(spec.name.as_str()), index + 1);
    }

    // Phase two: resolve field targets.
    let fields = order
        .iter()
        .map(|spec| {
            spec.fields
                .iter()
                .map(|field| resolve_field(spec, field, &by_name, &options))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let id = LanguageId::fresh();
    let mut types = Vec::with_capacity(order.len() + 1);
    types.push(NodeType::new(NodeTypeData {
        name: Arc::from(ROOT_TYPE),
        language: id,
        index: 0,
        kind: TypeKind::Abstract,
        base: None,
        ancestry: vec![0],
        fields: Vec::new(),
        checked: options.checked,
    }));

    for (index, (spec, fields)) in order.iter().zip(fields).enumerate() {
        let index = index + 1;
        let base_index = spec
            .base
            .as_deref()
            .and_then(|base| by_name.get(base).copied())
            .unwrap_or(0);
        // Bases always precede their subtypes in `order`.
        let base: NodeType = types[base_index].clone();
        let mut ancestry = Vec::with_capacity(base.ancestry().len() + 1);
        ancestry.push(index);
        ancestry.extend_from_slice(base.ancestry());

        trace!("type #{index} {spec}");
        types.push(NodeType::new(NodeTypeData {
            name: Arc::from(spec.name.as_str()),
            language: id,
            index,
            kind: spec.kind,
            base: Some(base),
            ancestry,
            fields,
            checked: options.checked,
        }));
    }

    debug!(
        "generated language {id}: {} node types, {} checked",
        types.len(),
        if options.checked { "type" } else { "not" }
    );

    Ok(Language {
        id,
        types,
        by_name,
        checked: options.checked,
    })
}

fn check_names(specs: &[TypeSpec]) -> Result<(), GrammarError> {
    let mut seen = HashSet::with_capacity(specs.len());
    for spec in specs {
        if RESERVED_NAMES.contains(&spec.name.as_str()) {
            return Err(GrammarError::ReservedName {
                name: spec.name.clone(),
            });
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(GrammarError::DuplicateType {
                name: spec.name.clone(),
            });
        }
        let mut fields = HashSet::with_capacity(spec.fields.len());
        for field in &spec.fields {
            if !fields.insert(field.name.as_str()) {
                return Err(GrammarError::DuplicateField {
                    name: spec.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
    }

    for spec in specs {
        if let Some(base) = &spec.base
            && base != ROOT_TYPE
            && !seen.contains(base.as_str())
        {
            return Err(GrammarError::UnknownBase {
                name: spec.name.clone(),
                base: base.clone(),
            });
        }
    }
    Ok(())
}

/// Abstract entries, then concrete ones, each waiting for its base.
fn generation_order(specs: &[TypeSpec]) -> Result<Vec<&TypeSpec>, GrammarError> {
    let mut pending: Vec<&TypeSpec> = specs
        .iter()
        .filter(|s| s.kind.is_abstract())
        .chain(specs.iter().filter(|s| s.kind.is_concrete()))
        .collect();
    let mut generated: HashSet<&str> = HashSet::from([ROOT_TYPE]);
    let mut order = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let before = pending.len();
        pending.retain(|&spec| {
            let ready = spec
                .base
                .as_deref()
                .is_none_or(|base| generated.contains(base));
            if ready {
                generated.insert(spec.name.as_str());
                order.push(spec);
            }
            !ready
        });

        if pending.len() == before {
            return Err(GrammarError::InheritanceCycle {
                names: pending.iter().map(|s| s.name.clone()).collect(),
            });
        }
    }
    Ok(order)
}

fn resolve_field(
    spec: &TypeSpec,
    field: &FieldSpec,
    by_name: &HashMap<Arc<str>, usize>,
    options: &GeneratorOptions,
) -> Result<FieldDescriptor, GrammarError> {
    let target = if let Some(&index) = by_name.get(field.type_name.as_str()) {
        FieldTarget::Node(index)
    } else if let Some(&kind) = options.primitive_types.get(&field.type_name) {
        FieldTarget::Primitive(kind)
    } else {
        return Err(GrammarError::UnknownFieldType {
            name: spec.name.clone(),
            field: field.name.clone(),
            field_type: field.type_name.clone(),
        });
    };

    Ok(FieldDescriptor {
        name: Arc::from(field.name.as_str()),
        type_name: Arc::from(field.type_name.as_str()),
        arity: field.arity,
        target,
    })
}
