use indexmap::IndexMap;

use crate::ast::NodeId;

/// Item declarations by full name, in declaration order.
///
/// Built once by the binder; later passes only read it.
#[derive(Clone, Debug, Default)]
pub struct ItemDirectory {
    items: IndexMap<String, NodeId>,
}

impl ItemDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration.
    ///
    /// Returns the earlier declaration if the name was already taken; the
    /// directory keeps the first one.
    pub fn insert(&mut self, full_name: &str, decl: NodeId) -> Result<(), NodeId> {
        if let Some(&existing) = self.items.get(full_name) {
            return Err(existing);
        }
        self.items.insert(full_name.to_owned(), decl);
        Ok(())
    }

    pub fn get(&self, full_name: &str) -> Option<NodeId> {
        self.items.get(full_name).copied()
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.items.contains_key(full_name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.items.iter().map(|(k, &v)| (k.as_str(), v))
    }
}
