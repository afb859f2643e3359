//! Interpolated-string syntax validation.

use crate::ast::{Ast, Expr};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

use crate::analyze::interpolation;

/// Report every `sub` whose format cannot be split into segments.
pub fn validate_interpolations(ast: &Ast, diag: &mut Diagnostics) {
    for id in ast.exprs() {
        let Expr::Sub(sub) = ast.expr(id) else {
            continue;
        };
        if let Err(err) = interpolation::segments(&sub.format) {
            let span = ast.span(id).sub_span(err.offset, err.len);
            diag.report(DiagnosticKind::MalformedInterpolation, span).emit();
        }
    }
}
