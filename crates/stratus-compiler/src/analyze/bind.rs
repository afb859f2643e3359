//! Full-name assignment and item directory construction.
//!
//! Every declaration is named by the path of enclosing groups plus its own
//! name (`Storage.Bucket`). The first declaration of a full name wins;
//! later ones are reported and left out of the directory.

use stratus_core::utils::scoped_name;

use crate::Diagnostics;
use crate::ast::{Ast, NodeId};
use crate::diagnostics::DiagnosticKind;

use super::ItemDirectory;

pub fn bind(ast: &mut Ast, diag: &mut Diagnostics) -> ItemDirectory {
    let mut directory = ItemDirectory::new();
    let items = ast.module().items.clone();
    for item in items {
        bind_decl(ast, item, None, &mut directory, diag);
    }
    directory
}

fn bind_decl(
    ast: &mut Ast,
    id: NodeId,
    scope: Option<&str>,
    directory: &mut ItemDirectory,
    diag: &mut Diagnostics,
) {
    let full_name = scoped_name(scope, &ast.decl(id).local_name);
    ast.decl_mut(id).set_full_name(full_name.clone());

    if let Err(first) = directory.insert(&full_name, id) {
        diag.report(DiagnosticKind::DuplicateDefinition, ast.span(id))
            .message(&full_name)
            .related_to("first defined here", ast.span(first))
            .emit();
    }

    let nested = ast.decl(id).nested_items().to_vec();
    for child in nested {
        bind_decl(ast, child, Some(&full_name), directory, diag);
    }
}
