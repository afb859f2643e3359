//! Handler validation for macros and custom resource types.
//!
//! A handler must point at a function declaration. Handlers naming nothing
//! are left to the dependency resolver, which already reported them.

use crate::ast::{Ast, DeclKind, Expr, NodeId};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

use crate::analyze::ItemDirectory;

pub fn validate_handlers(ast: &Ast, directory: &ItemDirectory, diag: &mut Diagnostics) {
    for id in ast.decls() {
        let handler = match &ast.decl(id).kind {
            DeclKind::Macro(m) => m.handler,
            DeclKind::ResourceType(t) => t.handler,
            _ => continue,
        };
        if let Some(found) = handler_mismatch(ast, directory, handler) {
            diag.report(DiagnosticKind::HandlerNotFunction, ast.span(handler))
                .message(found)
                .emit();
        }
    }
}

/// Description of what the handler points at, when it is not a function.
fn handler_mismatch(ast: &Ast, directory: &ItemDirectory, handler: NodeId) -> Option<String> {
    let name = match ast.get_expr(handler) {
        Some(Expr::Reference { name }) => name,
        // `getatt(Function, Arn)` names the function too.
        Some(Expr::GetAtt { name, .. }) => name,
        Some(other) => return Some(other.keyword().to_string()),
        None => return Some("a declaration".to_string()),
    };
    let target = directory.get(name)?;
    let kind = &ast.decl(target).kind;
    match kind {
        DeclKind::Function(_) => None,
        _ => Some(format!("{} `{name}`", kind.keyword())),
    }
}
