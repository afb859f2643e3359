use indexmap::IndexMap;

use crate::Span;

use super::invariants;
use super::{Decl, Expr, Module, Node, NodeId, NodeKind};

/// Arena holding every node of one module tree.
///
/// Nodes are never freed. Substitution points a child slot at another node;
/// the old subtree stays allocated but is no longer reachable from the root.
#[derive(Clone, Debug)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Empty arena. The root is fixed by [`Ast::set_root`].
    pub(crate) fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId::from_raw(0),
        }
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        invariants::ensure_module(&self.node(root).kind);
        self.root = root;
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn module(&self) -> &Module {
        invariants::ensure_module(&self.node(self.root).kind)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        invariants::assert_node_exists(id, self.nodes.len());
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn get_expr(&self, id: NodeId) -> Option<&Expr> {
        match self.kind(id) {
            NodeKind::Expr(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn get_decl(&self, id: NodeId) -> Option<&Decl> {
        match self.kind(id) {
            NodeKind::Decl(decl) => Some(decl),
            _ => None,
        }
    }

    /// # Panics
    /// Panics if `id` is not an expression.
    pub fn expr(&self, id: NodeId) -> &Expr {
        invariants::ensure_expr(self.get_expr(id), id)
    }

    /// # Panics
    /// Panics if `id` is not a declaration.
    pub fn decl(&self, id: NodeId) -> &Decl {
        invariants::ensure_decl(self.get_decl(id), id)
    }

    /// # Panics
    /// Panics if `id` is not a declaration.
    pub fn decl_mut(&mut self, id: NodeId) -> &mut Decl {
        invariants::assert_node_exists(id, self.nodes.len());
        let decl = match &mut self.nodes[id.index()].kind {
            NodeKind::Decl(decl) => Some(decl),
            _ => None,
        };
        invariants::ensure_decl(decl, id)
    }

    pub(crate) fn expr_mut(&mut self, id: NodeId) -> &mut Expr {
        invariants::assert_node_exists(id, self.nodes.len());
        let expr = match &mut self.nodes[id.index()].kind {
            NodeKind::Expr(expr) => Some(expr),
            _ => None,
        };
        invariants::ensure_expr(expr, id)
    }

    /// Allocate a node and link its children to it.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        let children = kind.children();
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
        });
        for child in children {
            self.link_child(id, child);
        }
        id
    }

    pub fn alloc_expr(&mut self, expr: Expr, span: Span) -> NodeId {
        self.alloc(NodeKind::Expr(expr), span)
    }

    pub(crate) fn link_child(&mut self, parent: NodeId, child: NodeId) {
        invariants::assert_node_exists(child, self.nodes.len());
        self.nodes[child.index()].parent = Some(parent);
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// `id` and everything below it, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Visit every reachable node in document order.
    pub fn inspect(&self, mut action: impl FnMut(&Ast, NodeId)) {
        for id in self.descendants(self.root) {
            action(self, id);
        }
    }

    /// Reachable expression nodes in document order.
    pub fn exprs(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| matches!(self.kind(id), NodeKind::Expr(_)))
            .collect()
    }

    /// Reachable declarations in document order, nested ones included.
    pub fn decls(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| matches!(self.kind(id), NodeKind::Decl(_)))
            .collect()
    }

    /// Closest declaration containing `id`, `id` itself included.
    pub fn enclosing_decl(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if matches!(self.kind(node), NodeKind::Decl(_)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Rewrite child slots across the whole tree.
    ///
    /// For every child slot reached from the root, `rewrite` may return a
    /// different node to put there. The replacement is offered to `rewrite`
    /// again before traversal descends into it. Final literals are never
    /// replaced. Returns the number of slots that changed.
    pub fn substitute<F>(&mut self, mut rewrite: F) -> usize
    where
        F: FnMut(&Ast, NodeId) -> Option<NodeId>,
    {
        let chain_limit = self.nodes.len();
        let mut replaced = 0;
        let mut stack = vec![self.root];

        while let Some(parent) = stack.pop() {
            let children = self.children(parent);
            let mut visit = Vec::with_capacity(children.len());

            for (slot, child) in children.into_iter().enumerate() {
                let mut current = child;
                for _ in 0..chain_limit {
                    if self.is_final(current) {
                        break;
                    }
                    match rewrite(self, current) {
                        Some(next) if next != current => current = next,
                        _ => break,
                    }
                }
                if current != child {
                    self.replace_slot(parent, slot, child, current);
                    replaced += 1;
                }
                visit.push(current);
            }

            stack.extend(visit.into_iter().rev());
        }

        replaced
    }

    /// Apply a batch of staged replacements in one walk.
    pub fn apply(&mut self, replacements: &IndexMap<NodeId, NodeId>) -> usize {
        if replacements.is_empty() {
            return 0;
        }
        self.substitute(|_, id| replacements.get(&id).copied())
    }

    /// Copy the subtree rooted at `id` into fresh nodes.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let Node { mut kind, span, .. } = self.node(id).clone();
        let copies: Vec<NodeId> = kind
            .children()
            .into_iter()
            .map(|child| self.deep_copy(child))
            .collect();
        for (slot, copy) in kind.child_slots_mut().into_iter().zip(copies) {
            *slot = copy;
        }
        self.alloc(kind, span)
    }

    /// Remove `id` from its parent's list of children.
    ///
    /// Only list-like slots (items, list elements, object fields, parameters)
    /// can lose a child; returns `false` for fixed operand slots.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        let removed = match &mut self.nodes[parent.index()].kind {
            NodeKind::Module(module) => {
                remove_id(&mut module.items, id) || remove_id(&mut module.pragmas, id)
            }
            NodeKind::Decl(decl) => match &mut decl.kind {
                super::DeclKind::Group(group) => remove_id(&mut group.items, id),
                _ => false,
            },
            NodeKind::Expr(expr) => match expr {
                Expr::List(items) | Expr::Join { values: items, .. } => remove_id(items, id),
                Expr::Object(fields) => remove_value(fields, id),
                Expr::Sub(sub) => remove_value(&mut sub.parameters, id),
                _ => false,
            },
        };
        if removed {
            self.nodes[id.index()].parent = None;
        }
        removed
    }

    fn is_final(&self, id: NodeId) -> bool {
        self.get_expr(id).is_some_and(Expr::is_final)
    }

    fn replace_slot(&mut self, parent: NodeId, slot: usize, old: NodeId, new: NodeId) {
        let mut slots = self.nodes[parent.index()].kind.child_slots_mut();
        *slots[slot] = new;
        if self.nodes[old.index()].parent == Some(parent) {
            self.nodes[old.index()].parent = None;
        }
        self.link_child(parent, new);
    }
}

fn remove_id(ids: &mut Vec<NodeId>, id: NodeId) -> bool {
    let before = ids.len();
    ids.retain(|&other| other != id);
    ids.len() != before
}

fn remove_value(fields: &mut IndexMap<String, NodeId>, id: NodeId) -> bool {
    let before = fields.len();
    fields.retain(|_, other| *other != id);
    fields.len() != before
}
