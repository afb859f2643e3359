//! Read-only tree visitor.
//!
//! # Usage
//!
//! Implement `Visitor` for your struct. Override `visit_*` methods to add logic.
//! Call `walk_*` within your override to continue recursion (or omit it to stop).
//!
//! ```ignore
//! impl Visitor for MyPass {
//!     fn visit_expr(&mut self, ast: &Ast, id: NodeId, expr: &Expr) {
//!         // Pre-order logic
//!         walk_expr(self, ast, id, expr);
//!         // Post-order logic
//!     }
//! }
//! ```

use super::{Ast, Decl, Expr, Module, NodeId, NodeKind};

pub trait Visitor: Sized {
    fn visit_module(&mut self, ast: &Ast, id: NodeId, module: &Module) {
        walk_module(self, ast, id, module);
    }

    fn visit_decl(&mut self, ast: &Ast, id: NodeId, decl: &Decl) {
        walk_decl(self, ast, id, decl);
    }

    fn visit_expr(&mut self, ast: &Ast, id: NodeId, expr: &Expr) {
        walk_expr(self, ast, id, expr);
    }
}

/// Dispatch to the `visit_*` method matching the node's kind.
pub fn walk_node<V: Visitor>(visitor: &mut V, ast: &Ast, id: NodeId) {
    match ast.kind(id) {
        NodeKind::Module(module) => visitor.visit_module(ast, id, module),
        NodeKind::Decl(decl) => visitor.visit_decl(ast, id, decl),
        NodeKind::Expr(expr) => visitor.visit_expr(ast, id, expr),
    }
}

pub fn walk_module<V: Visitor>(visitor: &mut V, ast: &Ast, _id: NodeId, module: &Module) {
    for child in module.children() {
        walk_node(visitor, ast, child);
    }
}

pub fn walk_decl<V: Visitor>(visitor: &mut V, ast: &Ast, _id: NodeId, decl: &Decl) {
    for child in decl.children() {
        walk_node(visitor, ast, child);
    }
}

pub fn walk_expr<V: Visitor>(visitor: &mut V, ast: &Ast, _id: NodeId, expr: &Expr) {
    for child in expr.children() {
        walk_node(visitor, ast, child);
    }
}
