//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use super::{NodeId, NodeKind};

#[inline]
pub fn ensure_full_name<'a>(full_name: Option<&'a str>, local_name: &str) -> &'a str {
    match full_name {
        Some(name) => name,
        None => panic!("full_name: `{local_name}` read before binding (binder assigns every name)"),
    }
}

#[inline]
pub fn assert_full_name_unset(current: Option<&str>, new: &str) {
    if let Some(current) = current {
        panic!("full_name: `{current}` reassigned to `{new}` (full names are assigned once)");
    }
}

#[inline]
pub fn assert_node_exists(id: NodeId, len: usize) {
    assert!(
        id.index() < len,
        "arena: {id} out of bounds (arena holds {len} nodes)"
    );
}

#[inline]
pub fn ensure_decl<T>(node: Option<T>, id: NodeId) -> T {
    match node {
        Some(decl) => decl,
        None => panic!("arena: {id} is not a declaration"),
    }
}

#[inline]
pub fn ensure_expr<T>(node: Option<T>, id: NodeId) -> T {
    match node {
        Some(expr) => expr,
        None => panic!("arena: {id} is not an expression"),
    }
}

#[inline]
pub fn ensure_module(kind: &NodeKind) -> &super::Module {
    match kind {
        NodeKind::Module(module) => module,
        _ => panic!("arena: root is not a module (builder always allocates a module root)"),
    }
}
