//! Helpers shared by the unit tests.

use rowan::TextRange;
use stratus_core::SourceMap;

use crate::ast::Ast;
use crate::ast::printer::render_expr;
use crate::{ModuleBound, ModuleBuilder, ModuleFolded, ModuleResolved};

pub fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

pub fn bound(ast: Ast) -> ModuleBound {
    ModuleBuilder::new(ast, SourceMap::new()).bind()
}

pub fn folded(ast: Ast) -> ModuleFolded {
    bound(ast).fold().expect("folding should reach a fixed point")
}

pub fn resolved(ast: Ast) -> ModuleResolved {
    folded(ast).resolve()
}

/// Rendered first field of the item `full_name` (a variable's value, a
/// condition's value, ...).
pub fn value(stage: &ModuleBound, full_name: &str) -> String {
    let id = stage
        .directory()
        .get(full_name)
        .unwrap_or_else(|| panic!("no item `{full_name}`"));
    let decl = stage.ast().decl(id);
    let field = decl
        .kind
        .field_children()
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("`{full_name}` has no expression field"));
    render_expr(stage.ast(), field)
}

/// Diagnostics as plain lines.
pub fn diagnostics(stage: &ModuleBound) -> String {
    stage.diagnostics().printer().render()
}
