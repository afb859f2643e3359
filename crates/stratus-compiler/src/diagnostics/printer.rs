//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;
use stratus_core::SourceMap;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};

/// Renders diagnostics either against their sources (annotated snippets) or,
/// without a source map, as one plain line per diagnostic.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    sources: Option<&'s SourceMap>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            sources: None,
            colored: false,
        }
    }

    pub fn sources(mut self, sources: &'s SourceMap) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let Some(sources) = self.sources else {
            return self.format_plain(w);
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }

            let Some(source) = sources.get(diag.span.source) else {
                write!(w, "{}", diag)?;
                continue;
            };

            let report = annotated_report(diag, source.content, source.kind.display_name());
            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write) -> std::fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", diag)?;
        }
        Ok(())
    }
}

fn annotated_report<'a>(
    diag: &'a DiagnosticMessage,
    content: &'a str,
    path: &'a str,
) -> Vec<Group<'a>> {
    let range = adjust_range(diag.span.range, content.len());

    let mut snippet = Snippet::source(content).line_start(1).path(path).annotation(
        AnnotationKind::Primary
            .span(range)
            .label(diag.message.as_str()),
    );

    for related in &diag.related {
        if related.span.source != diag.span.source {
            continue;
        }
        snippet = snippet.annotation(
            AnnotationKind::Context
                .span(adjust_range(related.span.range, content.len()))
                .label(related.message.as_str()),
        );
    }

    let mut group = severity_to_level(diag.severity())
        .primary_title(diag.message.as_str())
        .element(snippet);

    for hint in &diag.hints {
        group = group.element(Level::HELP.message(hint.as_str()));
    }

    vec![group]
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

fn adjust_range(range: TextRange, limit: usize) -> std::ops::Range<usize> {
    let start: usize = usize::from(range.start()).min(limit);
    let end: usize = usize::from(range.end()).min(limit);

    if start == end {
        return start..(start + 1).min(limit);
    }

    start..end
}
