//! Cycle detection over item graphs.
//!
//! [`NameGraph`] is a directed graph over interned item names. Its strongly
//! connected components are computed with Tarjan's algorithm and exposed in
//! reverse topological order (leaves first). A component is cyclic if it has
//! more than one member, or one member with an edge to itself.
//!
//! The evaluator uses it for alias chains; [`validate_dependency_cycles`]
//! uses it for the resolved dependency edges.

use indexmap::{IndexMap, IndexSet};
use stratus_core::{Interner, Symbol};

use crate::Diagnostics;
use crate::ast::Ast;
use crate::diagnostics::DiagnosticKind;

use super::ItemDirectory;

#[derive(Clone, Debug, Default)]
pub struct NameGraph {
    interner: Interner,
    edges: IndexMap<Symbol, IndexSet<Symbol>>,
}

impl NameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: &str) -> Symbol {
        let sym = self.interner.intern(name);
        self.edges.entry(sym).or_default();
        sym
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.edges.entry(from).or_default().insert(to);
    }

    pub fn has_edge(&self, from: Symbol, to: Symbol) -> bool {
        self.edges.get(&from).is_some_and(|targets| targets.contains(&to))
    }

    pub fn name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }

    /// Strongly connected components in reverse topological order.
    pub fn sccs(&self) -> Vec<Vec<Symbol>> {
        SccFinder::find(self)
    }

    /// Components that form a cycle, members in insertion order.
    pub fn cycles(&self) -> Vec<Vec<Symbol>> {
        self.sccs()
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.has_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort_by_key(|sym| self.edges.get_index_of(sym));
                scc
            })
            .collect()
    }

    /// Names that are part of any cycle.
    pub fn cyclic_names(&self) -> IndexSet<String> {
        self.cycles()
            .into_iter()
            .flatten()
            .map(|sym| self.name(sym).to_owned())
            .collect()
    }

    /// A closed path through `scc`, starting and ending at its first member.
    pub fn cycle_path(&self, scc: &[Symbol]) -> Vec<Symbol> {
        let Some(&start) = scc.first() else {
            return Vec::new();
        };
        let members: IndexSet<Symbol> = scc.iter().copied().collect();

        // Breadth-first search back to `start`, staying inside the component.
        let mut came_from: IndexMap<Symbol, Symbol> = IndexMap::new();
        let mut queue = std::collections::VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for &next in self.edges.get(&node).into_iter().flatten() {
                if !members.contains(&next) {
                    continue;
                }
                if next == start {
                    let mut path = vec![start, node];
                    let mut cursor = node;
                    while let Some(&prev) = came_from.get(&cursor) {
                        path.push(prev);
                        cursor = prev;
                    }
                    path.reverse();
                    return path;
                }
                if !came_from.contains_key(&next) {
                    came_from.insert(next, node);
                    queue.push_back(next);
                }
            }
        }
        vec![start]
    }
}

struct SccFinder<'a> {
    graph: &'a NameGraph,
    index: usize,
    stack: Vec<Symbol>,
    on_stack: IndexSet<Symbol>,
    indices: IndexMap<Symbol, usize>,
    lowlinks: IndexMap<Symbol, usize>,
    sccs: Vec<Vec<Symbol>>,
}

impl<'a> SccFinder<'a> {
    fn find(graph: &'a NameGraph) -> Vec<Vec<Symbol>> {
        let mut finder = Self {
            graph,
            index: 0,
            stack: Vec::new(),
            on_stack: IndexSet::new(),
            indices: IndexMap::new(),
            lowlinks: IndexMap::new(),
            sccs: Vec::new(),
        };

        for &node in graph.edges.keys() {
            if !finder.indices.contains_key(&node) {
                finder.strongconnect(node);
            }
        }

        finder.sccs
    }

    fn strongconnect(&mut self, node: Symbol) {
        self.indices.insert(node, self.index);
        self.lowlinks.insert(node, self.index);
        self.index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        let graph = self.graph;
        for &next in graph.edges.get(&node).into_iter().flatten() {
            if !self.indices.contains_key(&next) {
                self.strongconnect(next);
                let lowlink = self.lowlinks[&node].min(self.lowlinks[&next]);
                self.lowlinks.insert(node, lowlink);
            } else if self.on_stack.contains(&next) {
                let lowlink = self.lowlinks[&node].min(self.indices[&next]);
                self.lowlinks.insert(node, lowlink);
            }
        }

        if self.lowlinks[&node] == self.indices[&node] {
            let mut scc = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.swap_remove(&member);
                scc.push(member);
                if member == node {
                    break;
                }
            }
            self.sccs.push(scc);
        }
    }
}

/// Report every cycle in the resolved dependency edges.
pub fn validate_dependency_cycles(ast: &Ast, directory: &ItemDirectory, diag: &mut Diagnostics) {
    let mut graph = NameGraph::new();
    for (name, id) in directory.iter() {
        graph.add_node(name);
        for dep in ast.decl(id).unique_dependencies() {
            if directory.contains(&dep.target) {
                graph.add_edge(name, &dep.target);
            }
        }
    }

    for scc in graph.cycles() {
        let path = graph.cycle_path(&scc);
        let chain: Vec<&str> = path.iter().map(|&sym| graph.name(sym)).collect();
        let Some(first) = directory.get(chain[0]) else {
            continue;
        };

        let mut report = diag
            .report(DiagnosticKind::CircularDependency, ast.span(first))
            .message(chain.join(" -> "));
        for name in chain.iter().skip(1).collect::<IndexSet<_>>() {
            if let Some(member) = directory.get(name)
                && member != first
            {
                report = report.related_to(format!("`{name}` is part of the cycle"), ast.span(member));
            }
        }
        report.emit();
    }
}
