//! Name interning for graph passes.
//!
//! Dependency graphs key their nodes by [`Symbol`] so edge sets hash a
//! `u32` instead of a full name.

use std::collections::HashMap;

/// Handle to a name held by an [`Interner`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Symbol(u32);

/// Deduplicating name table. Symbols are handed out in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    symbols: HashMap<String, Symbol>,
    names: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Symbol for `name`, allocating one on first sight.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&sym) = self.symbols.get(name) {
            return sym;
        }
        let sym = Symbol(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.symbols.insert(name.to_owned(), sym);
        sym
    }

    /// Name behind `sym`.
    ///
    /// # Panics
    /// Panics if `sym` came from another interner.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.names[sym.0 as usize]
    }
}
