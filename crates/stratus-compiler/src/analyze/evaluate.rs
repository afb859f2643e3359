//! Constant folding of template built-in functions.
//!
//! Each pass enumerates all reachable expressions in document order, stages
//! a replacement for every one that can be simplified, and applies the batch.
//! Passes repeat until one stages nothing (the fixed point). A last pass then
//! turns `sub` parameters that are still plain references back into `${Name}`
//! placeholders.
//!
//! The number of passes is bounded by the evaluation fuel. Running out is a
//! fatal [`Error::EvaluationFuelExhausted`]; the tree keeps whatever was
//! folded so far.

use indexmap::{IndexMap, IndexSet};

use crate::ast::{Ast, DeclKind, Expr, Literal, NodeId, Sub, is_pseudo_parameter};
use crate::diagnostics::DiagnosticKind;
use crate::{Diagnostics, Error, Result, Span};

use super::ItemDirectory;
use super::cycles::NameGraph;
use super::interpolation::{self, escape_literal};
use super::normalize::local_attribute_owner;

/// Counters reported by the evaluator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FoldStats {
    /// Folding passes run, the last one being the pass that found nothing.
    pub passes: u32,
    /// Child slots replaced across all folding passes.
    pub substitutions: usize,
    /// `sub` nodes whose reference parameters were turned back into placeholders.
    pub reinlined: usize,
}

/// Fold all expressions to a fixed point.
pub fn evaluate(
    ast: &mut Ast,
    directory: &ItemDirectory,
    fuel: u32,
    diag: &mut Diagnostics,
) -> Result<FoldStats> {
    let mut evaluator = Evaluator {
        directory,
        diag,
        reported_cycles: IndexSet::new(),
        warned: IndexSet::new(),
    };
    let mut stats = FoldStats::default();

    loop {
        if stats.passes >= fuel {
            return Err(Error::EvaluationFuelExhausted {
                passes: stats.passes,
            });
        }
        stats.passes += 1;
        let replaced = evaluator.pass(ast);
        stats.substitutions += replaced;
        if replaced == 0 {
            break;
        }
    }

    stats.reinlined = reinline_references(ast);
    Ok(stats)
}

struct Evaluator<'a, 'd> {
    directory: &'a ItemDirectory,
    diag: &'d mut Diagnostics,
    /// Aliases already reported as circular.
    reported_cycles: IndexSet<String>,
    /// Conditions already warned about. Copies of an expression share its span.
    warned: IndexSet<Span>,
}

impl Evaluator<'_, '_> {
    fn pass(&mut self, ast: &mut Ast) -> usize {
        let cyclic = self.alias_cycles(ast);
        let mut staged = IndexMap::new();
        for id in ast.exprs() {
            if let Some(replacement) = self.fold(ast, id, &cyclic) {
                staged.insert(id, replacement);
            }
        }
        ast.apply(&staged)
    }

    /// Aliases whose substitution would never terminate. Reported once each.
    fn alias_cycles(&mut self, ast: &Ast) -> IndexSet<String> {
        let mut graph = NameGraph::new();
        for (name, id) in self.directory.iter() {
            let Some(source) = ast.decl(id).alias_source() else {
                continue;
            };
            graph.add_node(name);
            for node in ast.descendants(source) {
                let Some(Expr::Reference { name: target }) = ast.get_expr(node) else {
                    continue;
                };
                if self.substitution_source(ast, target).is_some() {
                    graph.add_edge(name, target);
                }
            }
        }

        let cyclic = graph.cyclic_names();
        for name in &cyclic {
            if self.reported_cycles.contains(name) {
                continue;
            }
            self.reported_cycles.insert(name.clone());
            if let Some(decl) = self.directory.get(name) {
                self.diag
                    .report(DiagnosticKind::CircularReference, ast.span(decl))
                    .message(name)
                    .emit();
            }
        }
        cyclic
    }

    /// Expression a reference to `name` is replaced with, skipping self-aliases.
    fn substitution_source(&self, ast: &Ast, name: &str) -> Option<NodeId> {
        let target = self.directory.get(name)?;
        let source = ast.decl(target).alias_source()?;
        match ast.get_expr(source) {
            Some(Expr::Reference { name: own }) if own == name => None,
            _ => Some(source),
        }
    }

    fn fold(&mut self, ast: &mut Ast, id: NodeId, cyclic: &IndexSet<String>) -> Option<NodeId> {
        let span = ast.span(id);
        let expr = ast.expr(id).clone();

        match expr {
            Expr::Literal(_)
            | Expr::GetAtt { .. }
            | Expr::Base64(_)
            | Expr::ImportValue(_)
            | Expr::List(_)
            | Expr::Object(_) => None,

            Expr::Reference { name } => {
                if cyclic.contains(&name) {
                    return None;
                }
                let source = self.substitution_source(ast, &name)?;
                Some(ast.deep_copy(source))
            }

            Expr::ConditionRef { name } => {
                let target = self.directory.get(&name)?;
                let DeclKind::Condition(condition) = &ast.decl(target).kind else {
                    return None;
                };
                let value = condition.value;
                literal(ast, value)?.as_bool()?;
                Some(ast.deep_copy(value))
            }

            Expr::IsDefined { name } => {
                let defined = self.directory.contains(&name) || is_pseudo_parameter(&name);
                let lit = Literal::bool(defined).with_existence_check(true);
                Some(ast.alloc_expr(Expr::Literal(lit), span))
            }

            Expr::Not(inner) => {
                let lit = literal(ast, inner)?;
                let value = lit.as_bool()?;
                let folded = Literal::bool(!value).with_existence_check(lit.from_existence_check);
                Some(ast.alloc_expr(Expr::Literal(folded), span))
            }

            Expr::Equals { lhs, rhs } => {
                let l = literal(ast, lhs)?;
                let r = literal(ast, rhs)?;
                let folded = Literal::bool(l.value == r.value)
                    .with_existence_check(l.from_existence_check || r.from_existence_check);
                Some(ast.alloc_expr(Expr::Literal(folded), span))
            }

            Expr::And { lhs, rhs } => fold_logic(ast, lhs, rhs, false),
            Expr::Or { lhs, rhs } => fold_logic(ast, lhs, rhs, true),

            Expr::If {
                condition,
                if_true,
                if_false,
            } => {
                let lit = literal(ast, condition)?;
                let value = lit.as_bool()?;
                if !lit.from_existence_check && self.warned.insert(span) {
                    self.diag
                        .report(DiagnosticKind::ConstantCondition, span)
                        .message(value.to_string())
                        .emit();
                }
                Some(if value { if_true } else { if_false })
            }

            Expr::Join { delimiter, values } => fold_join(ast, span, &delimiter, &values),

            Expr::Select { index, values } => {
                let index = literal(ast, index)?.value.as_index()?;
                values.get(index).copied()
            }

            Expr::Split { delimiter, source } => {
                let delimiter = literal(ast, delimiter)?.value.as_str()?.to_owned();
                let source = literal(ast, source)?.value.as_str()?.to_owned();
                if delimiter.is_empty() {
                    return None;
                }
                let items: Vec<NodeId> = source
                    .split(delimiter.as_str())
                    .map(|part| ast.alloc_expr(Expr::Literal(Literal::string(part)), span))
                    .collect();
                Some(ast.alloc_expr(Expr::List(items), span))
            }

            Expr::FindInMap {
                map_name,
                top_key,
                second_key,
            } => {
                let top = literal(ast, top_key)?.value.to_text();
                let second = literal(ast, second_key)?.value.to_text();
                let target = self.directory.get(&map_name)?;
                let DeclKind::Mapping(mapping) = &ast.decl(target).kind else {
                    return None;
                };
                let top_level = object_field(ast, mapping.value, &top)?;
                let found = object_field(ast, top_level, &second)?;
                if !is_literal_tree(ast, found) {
                    return None;
                }
                Some(ast.deep_copy(found))
            }

            Expr::Sub(sub) => fold_sub(ast, span, &sub),
        }
    }
}

fn literal(ast: &Ast, id: NodeId) -> Option<&Literal> {
    ast.get_expr(id)?.as_literal()
}

/// `and` (dominant `false`) and `or` (dominant `true`).
fn fold_logic(ast: &Ast, lhs: NodeId, rhs: NodeId, dominant: bool) -> Option<NodeId> {
    let l = literal(ast, lhs).and_then(Literal::as_bool);
    let r = literal(ast, rhs).and_then(Literal::as_bool);
    match (l, r) {
        (Some(v), _) if v == dominant => Some(lhs),
        (_, Some(v)) if v == dominant => Some(rhs),
        (Some(_), _) => Some(rhs),
        (_, Some(_)) => Some(lhs),
        _ => None,
    }
}

fn fold_join(ast: &mut Ast, span: Span, delimiter: &str, values: &[NodeId]) -> Option<NodeId> {
    match values {
        [] => return Some(ast.alloc_expr(Expr::Literal(Literal::string("")), span)),
        [single] => return Some(*single),
        _ => {}
    }

    if values.iter().all(|&value| literal(ast, value).is_some()) {
        let text = join_text(ast, values, delimiter);
        return Some(ast.alloc_expr(Expr::Literal(Literal::string(text)), span));
    }

    // Merge runs of adjacent literals, keep everything else in place.
    let mut merged: Vec<NodeId> = Vec::with_capacity(values.len());
    let mut run: Vec<NodeId> = Vec::new();
    let mut changed = false;

    let mut flush = |ast: &mut Ast, run: &mut Vec<NodeId>, merged: &mut Vec<NodeId>| {
        if run.len() > 1 {
            let text = join_text(ast, run, delimiter);
            let first_span = ast.span(run[0]);
            merged.push(ast.alloc_expr(Expr::Literal(Literal::string(text)), first_span));
            changed = true;
            run.clear();
        } else {
            merged.append(run);
        }
    };

    for &value in values {
        if literal(ast, value).is_some() {
            run.push(value);
        } else {
            flush(ast, &mut run, &mut merged);
            merged.push(value);
        }
    }
    flush(ast, &mut run, &mut merged);

    if !changed {
        return None;
    }
    Some(ast.alloc_expr(
        Expr::Join {
            delimiter: delimiter.to_owned(),
            values: merged,
        },
        span,
    ))
}

fn join_text(ast: &Ast, ids: &[NodeId], delimiter: &str) -> String {
    ids.iter()
        .filter_map(|&id| literal(ast, id))
        .map(|lit| lit.value.to_text())
        .collect::<Vec<_>>()
        .join(delimiter)
}

fn fold_sub(ast: &mut Ast, span: Span, sub: &Sub) -> Option<NodeId> {
    if has_local_attribute(sub) {
        return None;
    }
    let mut inlined: IndexMap<&str, String> = IndexMap::new();
    let mut remaining = IndexMap::new();
    for (name, &value) in &sub.parameters {
        match literal(ast, value) {
            Some(lit) => {
                inlined.insert(name, escape_literal(&lit.value.to_text()));
            }
            None => {
                remaining.insert(name.clone(), value);
            }
        }
    }

    let format = if inlined.is_empty() {
        sub.format.clone()
    } else {
        interpolation::replace_placeholders(&sub.format, |name| inlined.get(name).cloned()).ok()?
    };

    if remaining.is_empty() && interpolation::placeholders(&format).ok()?.is_empty() {
        let text = interpolation::unescape(&format).ok()?;
        return Some(ast.alloc_expr(Expr::Literal(Literal::string(text)), span));
    }
    if inlined.is_empty() {
        return None;
    }
    Some(ast.alloc_expr(
        Expr::Sub(Sub {
            format,
            parameters: remaining,
        }),
        span,
    ))
}

fn object_field(ast: &Ast, object: NodeId, key: &str) -> Option<NodeId> {
    match ast.get_expr(object)? {
        Expr::Object(fields) => fields.get(key).copied(),
        _ => None,
    }
}

fn is_literal_tree(ast: &Ast, id: NodeId) -> bool {
    match ast.get_expr(id) {
        Some(Expr::Literal(_)) => true,
        Some(Expr::List(items)) => items.iter().all(|&item| is_literal_tree(ast, item)),
        Some(Expr::Object(fields)) => fields.values().all(|&field| is_literal_tree(ast, field)),
        _ => false,
    }
}

/// `${Local.Attribute}` placeholders are reported elsewhere; such subs are left alone.
fn has_local_attribute(sub: &Sub) -> bool {
    interpolation::placeholders(&sub.format).is_ok_and(|names| {
        names
            .iter()
            .any(|name| local_attribute_owner(name, &sub.parameters).is_some())
    })
}

/// Turn reference parameters of `sub` nodes back into placeholders.
///
/// A parameter stays when its placeholder would read as another parameter
/// that is kept, either by the same name or as its attribute.
fn reinline_references(ast: &mut Ast) -> usize {
    let mut staged = IndexMap::new();
    for id in ast.exprs() {
        let Expr::Sub(sub) = ast.expr(id).clone() else {
            continue;
        };
        if has_local_attribute(&sub) {
            continue;
        }
        let mut targets: IndexMap<&str, String> = IndexMap::new();
        for (param, &value) in &sub.parameters {
            match ast.expr(value) {
                Expr::Reference { name } => {
                    targets.insert(param, name.clone());
                }
                Expr::GetAtt { name, attribute } => {
                    targets.insert(param, format!("{name}.{attribute}"));
                }
                _ => {}
            }
        }

        // Keeping a parameter can shadow another target, so repeat until stable.
        loop {
            let kept = |key: &str| sub.parameters.contains_key(key) && !targets.contains_key(key);
            let shadowed: Vec<&str> = targets
                .iter()
                .filter(|(_, target)| {
                    kept(target.as_str())
                        || target
                            .split_once('.')
                            .is_some_and(|(prefix, _)| kept(prefix))
                })
                .map(|(&param, _)| param)
                .collect();
            if shadowed.is_empty() {
                break;
            }
            for param in shadowed {
                targets.shift_remove(param);
            }
        }
        if targets.is_empty() {
            continue;
        }

        let Ok(format) = interpolation::replace_placeholders(&sub.format, |name| {
            targets.get(name).map(|target| format!("${{{target}}}"))
        }) else {
            continue;
        };
        let remaining = sub
            .parameters
            .iter()
            .filter(|(param, _)| !targets.contains_key(param.as_str()))
            .map(|(param, &value)| (param.clone(), value))
            .collect();
        let span = ast.span(id);
        let replacement = ast.alloc_expr(
            Expr::Sub(Sub {
                format,
                parameters: remaining,
            }),
            span,
        );
        staged.insert(id, replacement);
    }
    ast.apply(&staged)
}
