//! Source storage for a compilation session.
//!
//! The compiler core never reads files; the front end registers module
//! sources here so diagnostics can be rendered against the original text.

/// Lightweight handle to a source in a compilation session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, serde::Serialize)]
pub struct SourceId(u32);

impl SourceId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Describes the origin of a source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SourceKind {
    /// Module text built in memory (tests, generated modules).
    Inline,
    /// A module file with its path.
    File(String),
}

impl SourceKind {
    /// Returns the display name for diagnostics.
    pub fn display_name(&self) -> &str {
        match self {
            SourceKind::Inline => "<module>",
            SourceKind::File(path) => path,
        }
    }
}

/// A borrowed view of a source: id, kind, and content.
#[derive(Clone, Debug)]
pub struct Source<'a> {
    pub id: SourceId,
    pub kind: &'a SourceKind,
    pub content: &'a str,
}

#[derive(Clone, Debug)]
struct SourceEntry {
    kind: SourceKind,
    content: String,
}

/// Registry of all sources.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    entries: Vec<SourceEntry>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_inline(&mut self, content: &str) -> SourceId {
        self.push_entry(SourceKind::Inline, content)
    }

    pub fn add_file(&mut self, path: &str, content: &str) -> SourceId {
        self.push_entry(SourceKind::File(path.to_owned()), content)
    }

    /// Create a SourceMap with a single inline source.
    pub fn inline(content: &str) -> Self {
        let mut map = Self::new();
        map.add_inline(content);
        map
    }

    pub fn get(&self, id: SourceId) -> Option<Source<'_>> {
        self.entries.get(id.0 as usize).map(|e| Source {
            id,
            kind: &e.kind,
            content: &e.content,
        })
    }

    /// Content of a source, or `None` for an id from another session.
    pub fn content(&self, id: SourceId) -> Option<&str> {
        self.get(id).map(|s| s.content)
    }

    /// File path if this source is a file.
    pub fn path(&self, id: SourceId) -> Option<&str> {
        match self.get(id)?.kind {
            SourceKind::File(path) => Some(path),
            SourceKind::Inline => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Source<'_>> {
        self.entries.iter().enumerate().map(|(i, e)| Source {
            id: SourceId(i as u32),
            kind: &e.kind,
            content: &e.content,
        })
    }

    fn push_entry(&mut self, kind: SourceKind, content: &str) -> SourceId {
        let id = SourceId(self.entries.len() as u32);
        self.entries.push(SourceEntry {
            kind,
            content: content.to_owned(),
        });
        id
    }
}
