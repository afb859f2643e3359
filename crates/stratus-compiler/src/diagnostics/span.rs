use rowan::{TextRange, TextSize};
use stratus_core::SourceId;

/// Source location of a node: which source, and which byte range in it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub source: SourceId,
    pub range: TextRange,
}

impl Span {
    pub fn new(source: SourceId, range: TextRange) -> Self {
        Self { source, range }
    }

    /// Span of `len` bytes starting `offset` bytes into this span.
    ///
    /// Used to point at a fragment of a string node, such as one
    /// placeholder inside an interpolated string.
    pub fn sub_span(&self, offset: usize, len: usize) -> Self {
        let start = self.range.start() + TextSize::from(offset as u32);
        Self {
            source: self.source,
            range: TextRange::at(start, TextSize::from(len as u32)),
        }
    }

    pub fn start(&self) -> u32 {
        self.range.start().into()
    }

    pub fn end(&self) -> u32 {
        self.range.end().into()
    }
}
