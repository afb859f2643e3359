use crate::Span;

use super::{Decl, Expr};

/// Stable handle to a node in an [`Ast`](super::Ast) arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, serde::Serialize)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The three node families of a module tree.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Module(Module),
    Decl(Decl),
    Expr(Expr),
}

impl NodeKind {
    /// Child ids in traversal order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Module(module) => module.children(),
            NodeKind::Decl(decl) => decl.children(),
            NodeKind::Expr(expr) => expr.children(),
        }
    }

    /// Mutable child slots, in the same order as [`NodeKind::children`].
    pub(crate) fn child_slots_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            NodeKind::Module(module) => module.child_slots_mut(),
            NodeKind::Decl(decl) => decl.child_slots_mut(),
            NodeKind::Expr(expr) => expr.child_slots_mut(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Module root: header information plus the top-level item declarations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Module {
    pub name: String,
    pub version: Option<String>,
    pub pragmas: Vec<NodeId>,
    pub secrets: Vec<String>,
    pub usings: Vec<UsingModule>,
    pub items: Vec<NodeId>,
}

/// `Using` clause: a module this module depends on, with optional parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct UsingModule {
    pub module: String,
    pub parameters: Option<NodeId>,
}

impl Module {
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = self.pragmas.clone();
        out.extend(self.usings.iter().filter_map(|u| u.parameters));
        out.extend(self.items.iter().copied());
        out
    }

    fn child_slots_mut(&mut self) -> Vec<&mut NodeId> {
        let mut out: Vec<&mut NodeId> = self.pragmas.iter_mut().collect();
        out.extend(self.usings.iter_mut().filter_map(|u| u.parameters.as_mut()));
        out.extend(self.items.iter_mut());
        out
    }
}
