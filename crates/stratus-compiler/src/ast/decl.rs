use indexmap::{IndexMap, IndexSet};

use super::NodeId;
use super::invariants;

/// An item declaration: a named unit of the module tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Decl {
    pub local_name: String,
    full_name: Option<String>,
    pub kind: DeclKind,
    /// Expression substituted wherever this item is referenced (aliases, imports).
    pub reference_expression: Option<NodeId>,
    /// Outgoing edges, filled by the dependency resolver.
    pub dependencies: Vec<Dependency>,
    /// Incoming edges, filled by the dependency resolver.
    pub reverse_dependencies: Vec<Dependency>,
}

impl Decl {
    pub fn new(local_name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            local_name: local_name.into(),
            full_name: None,
            kind,
            reference_expression: None,
            dependencies: Vec::new(),
            reverse_dependencies: Vec::new(),
        }
    }

    /// Dot-scoped name through enclosing groups.
    ///
    /// # Panics
    /// Panics if the binder has not assigned it yet.
    pub fn full_name(&self) -> &str {
        invariants::ensure_full_name(self.full_name.as_deref(), &self.local_name)
    }

    pub fn try_full_name(&self) -> Option<&str> {
        self.full_name.as_deref()
    }

    /// Assign the full name. Happens exactly once, during binding.
    pub(crate) fn set_full_name(&mut self, full_name: String) {
        invariants::assert_full_name_unset(self.full_name.as_deref(), &full_name);
        self.full_name = Some(full_name);
    }

    /// Expression that replaces references to this item during folding.
    ///
    /// An explicit reference expression wins; variables otherwise stand for
    /// their value.
    pub fn alias_source(&self) -> Option<NodeId> {
        self.reference_expression.or(match &self.kind {
            DeclKind::Variable(v) => Some(v.value),
            _ => None,
        })
    }

    /// Whether this item becomes a template resource.
    pub fn is_resource(&self) -> bool {
        match &self.kind {
            DeclKind::Resource(r) => r.resource_type.is_some() && r.value.is_none(),
            DeclKind::Function(_) | DeclKind::Nested(_) => true,
            _ => false,
        }
    }

    /// Declaration-level condition of a resource or function.
    pub fn if_condition(&self) -> Option<NodeId> {
        match &self.kind {
            DeclKind::Resource(r) => r.if_condition,
            DeclKind::Function(f) => f.if_condition,
            _ => None,
        }
    }

    /// Declarations nested inside this one.
    pub fn nested_items(&self) -> &[NodeId] {
        match &self.kind {
            DeclKind::Group(g) => &g.items,
            _ => &[],
        }
    }

    /// Dependencies with one entry per target, in first-seen order.
    ///
    /// A target reached unconditionally on any path is unguarded; otherwise
    /// only the guards common to every path are kept.
    pub fn unique_dependencies(&self) -> Vec<Dependency> {
        let mut merged: IndexMap<&str, Dependency> = IndexMap::new();
        for dep in &self.dependencies {
            match merged.get_mut(dep.target.as_str()) {
                Some(existing) => {
                    existing.guards.retain(|g| dep.guards.contains(g));
                }
                None => {
                    merged.insert(dep.target.as_str(), dep.clone());
                }
            }
        }
        merged.into_values().collect()
    }

    /// Child ids in source order: declared fields, the reference expression,
    /// then nested declarations.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = self.kind.field_children();
        out.extend(self.reference_expression);
        out.extend(self.nested_items().iter().copied());
        out
    }

    pub(crate) fn child_slots_mut(&mut self) -> Vec<&mut NodeId> {
        let Decl {
            kind,
            reference_expression,
            ..
        } = self;
        let mut out = Vec::new();
        let mut nested = Vec::new();
        match kind {
            DeclKind::Parameter(p) => out.extend(p.default.as_mut()),
            DeclKind::Variable(v) => out.push(&mut v.value),
            DeclKind::Resource(r) => {
                out.extend(r.if_condition.as_mut());
                out.extend(r.properties.as_mut());
                out.extend(r.value.as_mut());
            }
            DeclKind::Function(f) => {
                out.extend(f.if_condition.as_mut());
                out.extend(f.properties.as_mut());
                out.extend(f.environment.as_mut());
            }
            DeclKind::Condition(c) => out.push(&mut c.value),
            DeclKind::Mapping(m) => out.push(&mut m.value),
            DeclKind::ResourceType(t) => out.push(&mut t.handler),
            DeclKind::Macro(m) => out.push(&mut m.handler),
            DeclKind::Nested(n) => out.extend(n.parameters.as_mut()),
            DeclKind::Group(g) => nested.extend(g.items.iter_mut()),
            DeclKind::Package(_) | DeclKind::Import(_) => {}
        }
        out.extend(reference_expression.as_mut());
        out.extend(nested);
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeclKind {
    Parameter(ParameterDecl),
    Variable(VariableDecl),
    Resource(ResourceDecl),
    Function(FunctionDecl),
    Condition(ConditionDecl),
    Mapping(MappingDecl),
    ResourceType(ResourceTypeDecl),
    Macro(MacroDecl),
    Nested(NestedDecl),
    Package(PackageDecl),
    Group(GroupDecl),
    Import(ImportDecl),
}

impl DeclKind {
    /// Keyword used in diagnostics and dumps.
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclKind::Parameter(_) => "parameter",
            DeclKind::Variable(_) => "variable",
            DeclKind::Resource(_) => "resource",
            DeclKind::Function(_) => "function",
            DeclKind::Condition(_) => "condition",
            DeclKind::Mapping(_) => "mapping",
            DeclKind::ResourceType(_) => "resource-type",
            DeclKind::Macro(_) => "macro",
            DeclKind::Nested(_) => "nested",
            DeclKind::Package(_) => "package",
            DeclKind::Group(_) => "group",
            DeclKind::Import(_) => "import",
        }
    }

    /// Expression children of the declared fields, in source order.
    pub fn field_children(&self) -> Vec<NodeId> {
        match self {
            DeclKind::Parameter(p) => p.default.into_iter().collect(),
            DeclKind::Variable(v) => vec![v.value],
            DeclKind::Resource(r) => [r.if_condition, r.properties, r.value]
                .into_iter()
                .flatten()
                .collect(),
            DeclKind::Function(f) => [f.if_condition, f.properties, f.environment]
                .into_iter()
                .flatten()
                .collect(),
            DeclKind::Condition(c) => vec![c.value],
            DeclKind::Mapping(m) => vec![m.value],
            DeclKind::ResourceType(t) => vec![t.handler],
            DeclKind::Macro(m) => vec![m.handler],
            DeclKind::Nested(n) => n.parameters.into_iter().collect(),
            DeclKind::Package(_) | DeclKind::Group(_) | DeclKind::Import(_) => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterDecl {
    pub type_name: String,
    pub default: Option<NodeId>,
    pub allowed_values: Vec<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDecl {
    pub type_name: Option<String>,
    pub value: NodeId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceDecl {
    pub resource_type: Option<String>,
    pub if_condition: Option<NodeId>,
    /// Object expression of resource properties.
    pub properties: Option<NodeId>,
    /// Full names of items this resource explicitly depends on.
    pub depends_on: Vec<String>,
    /// Existing resource reference instead of a new resource.
    pub value: Option<NodeId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionDecl {
    pub if_condition: Option<NodeId>,
    pub properties: Option<NodeId>,
    pub environment: Option<NodeId>,
    pub runtime: Option<String>,
    pub handler: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConditionDecl {
    pub value: NodeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MappingDecl {
    pub value: NodeId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResourceTypeDecl {
    pub handler: NodeId,
    pub properties: Vec<String>,
    pub attributes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MacroDecl {
    pub handler: NodeId,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NestedDecl {
    pub module: String,
    pub parameters: Option<NodeId>,
    pub depends_on: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackageDecl {
    pub files: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupDecl {
    pub items: Vec<NodeId>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImportDecl {
    pub module: String,
    pub type_name: Option<String>,
}

/// Condition under which a dependency edge applies.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Guard {
    /// A named condition declaration.
    Condition { name: String, negated: bool },
    /// An inline condition expression.
    Expr { node: NodeId, negated: bool },
}

impl Guard {
    pub fn condition(name: impl Into<String>) -> Self {
        Guard::Condition {
            name: name.into(),
            negated: false,
        }
    }

    pub fn negated(self) -> Self {
        match self {
            Guard::Condition { name, negated } => Guard::Condition {
                name,
                negated: !negated,
            },
            Guard::Expr { node, negated } => Guard::Expr {
                node,
                negated: !negated,
            },
        }
    }
}

/// Edge from one item to another, created by the dependency resolver.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Dependency {
    /// Full name of the other item.
    pub target: String,
    /// All guards must hold for the edge to apply. Empty means unconditional.
    pub guards: IndexSet<Guard>,
    /// Expression (or declaration) the edge was found at.
    pub origin: NodeId,
}

impl Dependency {
    pub fn is_conditional(&self) -> bool {
        !self.guards.is_empty()
    }
}
