//! Dependency edges between item declarations.
//!
//! Each declaration's own expressions are walked (nested declarations and the
//! reference expression are not: they belong to other items or are only
//! copied at use sites). Every reference to another item becomes a
//! [`Dependency`] on the source and a reverse edge on the target, guarded by
//! the conditions in effect where the reference appears:
//! - a resource or function `if` condition guards all its other fields,
//! - the branches of an `if` expression are guarded by its condition,
//!   the false branch negated.

use indexmap::{IndexMap, IndexSet};

use crate::Diagnostics;
use crate::ast::{
    Ast, DeclKind, Dependency, Expr, Guard, NodeId, Visitor, is_pseudo_parameter, walk_expr,
    walk_node,
};
use crate::diagnostics::DiagnosticKind;

use super::ItemDirectory;
use super::interpolation::SegmentKind;
use super::normalize::{local_attribute_owner, split_placeholder};

pub fn resolve_dependencies(ast: &mut Ast, directory: &ItemDirectory, diag: &mut Diagnostics) {
    for id in ast.decls() {
        let edges = collect_edges(ast, id, directory);
        let source_name = ast.decl(id).full_name().to_owned();
        let mut reported: IndexSet<&str> = IndexSet::new();

        for edge in &edges {
            match directory.get(&edge.target) {
                Some(target) => {
                    record_edge(ast, id, &source_name, target, edge.clone());
                }
                None => {
                    if reported.insert(edge.target.as_str()) {
                        diag.report(DiagnosticKind::UndefinedReference, ast.span(edge.origin))
                            .message(&edge.target)
                            .emit();
                    }
                }
            }
        }
    }
}

/// Append `edge` to `source` and the matching reverse edge to `target`.
pub(crate) fn record_edge(
    ast: &mut Ast,
    source: NodeId,
    source_name: &str,
    target: NodeId,
    edge: Dependency,
) {
    let reverse = Dependency {
        target: source_name.to_owned(),
        guards: edge.guards.clone(),
        origin: edge.origin,
    };
    ast.decl_mut(source).dependencies.push(edge);
    ast.decl_mut(target).reverse_dependencies.push(reverse);
}

/// Guard that holds when `condition` is true.
pub(crate) fn guard_for(ast: &Ast, condition: NodeId) -> Guard {
    match ast.get_expr(condition) {
        Some(Expr::ConditionRef { name }) => Guard::condition(name.clone()),
        _ => Guard::Expr {
            node: condition,
            negated: false,
        },
    }
}

fn collect_edges(ast: &Ast, id: NodeId, directory: &ItemDirectory) -> Vec<Dependency> {
    let decl = ast.decl(id);
    let mut collector = EdgeCollector {
        directory,
        guards: Vec::new(),
        edges: Vec::new(),
    };

    let if_condition = decl.if_condition();
    if let Some(condition) = if_condition {
        walk_node(&mut collector, ast, condition);
        let always = ast
            .get_expr(condition)
            .and_then(Expr::as_literal)
            .and_then(|lit| lit.as_bool())
            == Some(true);
        if !always {
            collector.guards.push(guard_for(ast, condition));
        }
    }

    for child in decl.kind.field_children() {
        if Some(child) != if_condition {
            walk_node(&mut collector, ast, child);
        }
    }

    let depends_on = match &decl.kind {
        DeclKind::Resource(resource) => resource.depends_on.as_slice(),
        DeclKind::Nested(nested) => nested.depends_on.as_slice(),
        _ => &[],
    };
    for target in depends_on {
        collector.edge(target, id);
    }

    collector.edges
}

struct EdgeCollector<'a> {
    directory: &'a ItemDirectory,
    guards: Vec<Guard>,
    edges: Vec<Dependency>,
}

impl EdgeCollector<'_> {
    fn edge(&mut self, target: &str, origin: NodeId) {
        if is_pseudo_parameter(target) {
            return;
        }
        self.edges.push(Dependency {
            target: target.to_owned(),
            guards: self.guards.iter().cloned().collect(),
            origin,
        });
    }

    /// Placeholders not bound to a local parameter name items directly.
    fn sub_edges(&mut self, id: NodeId, format: &str, parameters: &IndexMap<String, NodeId>) {
        let Ok(segments) = super::interpolation::segments(format) else {
            return;
        };
        for segment in segments {
            let SegmentKind::Placeholder(name) = segment.kind else {
                continue;
            };
            if parameters.contains_key(name) || local_attribute_owner(name, parameters).is_some() {
                continue;
            }
            let (target, _) = split_placeholder(name, self.directory);
            self.edge(target, id);
        }
    }
}

impl Visitor for EdgeCollector<'_> {
    fn visit_decl(&mut self, _ast: &Ast, _id: NodeId, _decl: &crate::ast::Decl) {
        // Nested declarations record their own edges.
    }

    fn visit_expr(&mut self, ast: &Ast, id: NodeId, expr: &Expr) {
        match expr {
            Expr::Reference { name } | Expr::GetAtt { name, .. } | Expr::ConditionRef { name } => {
                self.edge(name, id);
            }
            Expr::FindInMap { map_name, .. } => self.edge(map_name, id),
            Expr::Sub(sub) => self.sub_edges(id, &sub.format, &sub.parameters),
            Expr::If {
                condition,
                if_true,
                if_false,
            } => {
                walk_node(self, ast, *condition);
                let guard = guard_for(ast, *condition);

                self.guards.push(guard.clone());
                walk_node(self, ast, *if_true);
                self.guards.pop();

                self.guards.push(guard.negated());
                walk_node(self, ast, *if_false);
                self.guards.pop();
                return;
            }
            _ => {}
        }
        walk_expr(self, ast, id, expr);
    }
}
