//! Declaration and expression model.
//!
//! The module tree lives in an arena ([`Ast`]) and nodes are addressed by
//! stable [`NodeId`]s. Child slots hold ids, parents are plain back-links,
//! and rewriting a subtree means pointing a slot at a different node.

mod arena;
mod builder;
mod decl;
mod expr;
mod invariants;
mod node;
pub mod printer;
pub mod visitor;

#[cfg(test)]
mod arena_tests;

pub use arena::Ast;
pub use builder::AstBuilder;
pub use decl::{
    ConditionDecl, Decl, DeclKind, Dependency, FunctionDecl, GroupDecl, Guard, ImportDecl,
    MacroDecl, MappingDecl, NestedDecl, PackageDecl, ParameterDecl, ResourceDecl,
    ResourceTypeDecl, VariableDecl,
};
pub use expr::{Expr, Literal, Sub, Value, is_pseudo_parameter, NO_VALUE, PSEUDO_PARAMETERS};
pub use node::{Module, Node, NodeId, NodeKind, UsingModule};
pub use visitor::{Visitor, walk_decl, walk_expr, walk_module, walk_node};
