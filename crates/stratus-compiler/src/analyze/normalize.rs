//! Interpolated-string desugaring.
//!
//! Every placeholder of a `sub` that does not name one of its local
//! parameters is pulled out into a fresh parameter (`P1`, `P2`, ...) bound to
//! an explicit reference or attribute lookup. After this pass, later passes
//! only deal with placeholders that name local parameters.

use indexmap::{IndexMap, IndexSet};

use crate::Diagnostics;
use crate::ast::{Ast, Expr, NodeId, Sub, is_pseudo_parameter};
use crate::diagnostics::DiagnosticKind;

use super::ItemDirectory;
use super::interpolation::{self, SegmentKind};

/// Rewrite all interpolated strings. Returns the number of rewritten nodes.
pub fn normalize(ast: &mut Ast, directory: &ItemDirectory, diag: &mut Diagnostics) -> usize {
    let mut replacements = IndexMap::new();

    for id in ast.exprs() {
        let Expr::Sub(sub) = ast.expr(id) else {
            continue;
        };
        let sub = sub.clone();
        if let Some(normalized) = normalize_sub(ast, id, &sub, directory, diag) {
            replacements.insert(id, normalized);
        }
    }

    ast.apply(&replacements)
}

fn normalize_sub(
    ast: &mut Ast,
    id: NodeId,
    sub: &Sub,
    directory: &ItemDirectory,
    diag: &mut Diagnostics,
) -> Option<NodeId> {
    // Malformed formats are reported by validation and left alone here.
    let segments = interpolation::segments(&sub.format).ok()?;
    let span = ast.span(id);

    let mut taken: IndexSet<String> = sub.parameters.keys().cloned().collect();
    let mut extracted: IndexMap<String, String> = IndexMap::new();
    let mut parameters = sub.parameters.clone();
    let mut counter = 0;

    for segment in segments {
        let SegmentKind::Placeholder(name) = segment.kind else {
            continue;
        };
        if sub.parameters.contains_key(name) || extracted.contains_key(name) {
            continue;
        }
        let placeholder_span = span.sub_span(segment.offset, segment.raw.len());

        if let Some(prefix) = local_attribute_owner(name, &sub.parameters) {
            diag.report(DiagnosticKind::AttributeOnLocalParameter, placeholder_span)
                .message(prefix)
                .emit();
            continue;
        }

        let param = loop {
            counter += 1;
            let candidate = format!("P{counter}");
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        taken.insert(param.clone());

        let expr = placeholder_expr(name, directory);
        let node = ast.alloc_expr(expr, placeholder_span);
        parameters.insert(param.clone(), node);
        extracted.insert(name.to_owned(), param);
    }

    if extracted.is_empty() {
        return None;
    }

    let format = interpolation::replace_placeholders(&sub.format, |name| {
        extracted.get(name).map(|param| format!("${{{param}}}"))
    })
    .ok()?;

    Some(ast.alloc_expr(Expr::Sub(Sub { format, parameters }), span))
}

/// The local parameter named by `${Local.Attribute}`, if any.
///
/// Such placeholders are invalid and every pass leaves them as written.
pub(crate) fn local_attribute_owner<'n>(
    name: &'n str,
    parameters: &IndexMap<String, NodeId>,
) -> Option<&'n str> {
    if parameters.contains_key(name) {
        return None;
    }
    let (prefix, _) = name.split_once('.')?;
    parameters.contains_key(prefix).then_some(prefix)
}

/// Reference or attribute lookup for a placeholder name.
fn placeholder_expr(name: &str, directory: &ItemDirectory) -> Expr {
    match split_placeholder(name, directory) {
        (target, Some(attribute)) => Expr::GetAtt {
            name: target.to_owned(),
            attribute: attribute.to_owned(),
        },
        (target, None) => Expr::Reference {
            name: target.to_owned(),
        },
    }
}

/// Split a placeholder name into the referenced item and an optional attribute.
///
/// A known full name (or pseudo parameter) is taken whole; otherwise the
/// last dotted segment is the attribute.
pub(crate) fn split_placeholder<'n>(
    name: &'n str,
    directory: &ItemDirectory,
) -> (&'n str, Option<&'n str>) {
    if directory.contains(name) || is_pseudo_parameter(name) {
        return (name, None);
    }
    match name.rsplit_once('.') {
        Some((target, attribute)) => (target, Some(attribute)),
        None => (name, None),
    }
}
