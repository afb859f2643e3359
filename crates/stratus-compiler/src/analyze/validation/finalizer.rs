//! Finalizer dependencies.
//!
//! The finalizer invocation resource must be created after, and deleted
//! before, every other resource of the module. Unconditional resources go
//! into its `depends_on` list. A conditional resource cannot, since it may not
//! exist; it is referenced from the `DependsOn` property instead, as
//! `if(condition, ref(Resource), ref(AWS::NoValue))`.

use indexmap::IndexSet;

use crate::analyze::ItemDirectory;
use crate::analyze::resolve::{guard_for, record_edge};
use crate::ast::{Ast, DeclKind, Dependency, Expr, Literal, NO_VALUE, NodeId};

const DEPENDS_ON: &str = "DependsOn";

/// Outcome of the finalizer analysis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FinalizerDependencies {
    pub unconditional: Vec<String>,
    pub conditional: Vec<String>,
}

/// Wire the finalizer invocation resource `finalizer` to every other resource.
///
/// Returns `None` when the module has no such resource.
pub fn analyze_finalizer(
    ast: &mut Ast,
    directory: &ItemDirectory,
    finalizer: &str,
) -> Option<FinalizerDependencies> {
    let finalizer_id = directory.get(finalizer)?;
    if !matches!(ast.decl(finalizer_id).kind, DeclKind::Resource(_)) {
        return None;
    }

    let mut unconditional: IndexSet<String> = IndexSet::new();
    let mut conditional: Vec<(String, NodeId, NodeId)> = Vec::new();
    for (name, id) in directory.iter() {
        if id == finalizer_id {
            continue;
        }
        let decl = ast.decl(id);
        if !decl.is_resource() {
            continue;
        }
        match decl.if_condition() {
            None => {
                unconditional.insert(name.to_owned());
            }
            Some(condition) => match literal_bool(ast, condition) {
                Some(true) => {
                    unconditional.insert(name.to_owned());
                }
                Some(false) => {}
                None => conditional.push((name.to_owned(), id, condition)),
            },
        }
    }

    let mut result = FinalizerDependencies::default();

    let depends_on = {
        let DeclKind::Resource(resource) = &mut ast.decl_mut(finalizer_id).kind else {
            return None;
        };
        let mut all: Vec<String> = resource.depends_on.clone();
        all.extend(unconditional.iter().cloned());
        all.sort();
        all.dedup();
        resource.depends_on = all.clone();
        all
    };
    for name in &unconditional {
        if let Some(target) = directory.get(name) {
            let edge = Dependency {
                target: name.clone(),
                guards: IndexSet::new(),
                origin: finalizer_id,
            };
            record_edge(ast, finalizer_id, finalizer, target, edge);
        }
    }
    result.unconditional = depends_on;

    let mut items = Vec::with_capacity(conditional.len());
    for (name, id, condition) in conditional {
        let span = ast.span(id);
        let condition_copy = ast.deep_copy(condition);
        let reference = match ast.decl(id).reference_expression {
            Some(expr) => ast.deep_copy(expr),
            None => ast.alloc_expr(Expr::Reference { name: name.clone() }, span),
        };
        let no_value = ast.alloc_expr(
            Expr::Reference {
                name: NO_VALUE.to_owned(),
            },
            span,
        );
        let item = ast.alloc_expr(
            Expr::If {
                condition: condition_copy,
                if_true: reference,
                if_false: no_value,
            },
            span,
        );

        let edge = Dependency {
            target: name.clone(),
            guards: IndexSet::from([guard_for(ast, condition_copy)]),
            origin: reference,
        };
        record_edge(ast, finalizer_id, finalizer, id, edge);
        items.push(item);
        result.conditional.push(name);
    }

    if !items.is_empty() {
        append_depends_on_items(ast, finalizer_id, items);
    }

    Some(result)
}

fn literal_bool(ast: &Ast, id: NodeId) -> Option<bool> {
    ast.get_expr(id)?.as_literal().and_then(Literal::as_bool)
}

/// Append `items` to the list under `DependsOn` in the finalizer's properties,
/// creating the properties object and the list as needed.
fn append_depends_on_items(ast: &mut Ast, finalizer_id: NodeId, items: Vec<NodeId>) {
    let span = ast.span(finalizer_id);

    let properties = match &ast.decl(finalizer_id).kind {
        DeclKind::Resource(resource) => resource.properties,
        _ => return,
    };
    let properties = match properties {
        Some(id) if matches!(ast.get_expr(id), Some(Expr::Object(_))) => id,
        _ => {
            let id = ast.alloc_expr(Expr::Object(Default::default()), span);
            if let DeclKind::Resource(resource) = &mut ast.decl_mut(finalizer_id).kind {
                resource.properties = Some(id);
            }
            ast.link_child(finalizer_id, id);
            id
        }
    };

    let existing = match ast.expr(properties) {
        Expr::Object(fields) => fields.get(DEPENDS_ON).copied(),
        _ => None,
    };
    let list = match existing {
        Some(id) if matches!(ast.expr(id), Expr::List(_)) => id,
        other => {
            let list = ast.alloc_expr(Expr::List(other.into_iter().collect()), span);
            if let Expr::Object(fields) = ast.expr_mut(properties) {
                fields.insert(DEPENDS_ON.to_owned(), list);
            }
            ast.link_child(properties, list);
            list
        }
    };

    if let Expr::List(values) = ast.expr_mut(list) {
        values.extend(items.iter().copied());
    }
    for item in items {
        ast.link_child(list, item);
    }
}
