//! Lexer for interpolated-string formats.
//!
//! A format is literal text with `${Name}` / `${Name.Attribute}` placeholders.
//! `${!` is an escape for a literal `${`, so `${!Text}` reads as `${Text}`.
//! The escape needs no closing brace. A lone `$` is ordinary text.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    #[token("${!")]
    Escaped,

    #[regex(r"\$\{[^!}][^}]*\}")]
    Placeholder,

    /// `${` without a valid closing brace, or `${}`.
    #[token("${")]
    Unterminated,

    #[token("$")]
    Dollar,

    #[regex(r"[^$]+")]
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind<'a> {
    Text,
    /// `${!`, a literal `${`.
    Escaped,
    /// `${name}`, holding `name`.
    Placeholder(&'a str),
}

/// One piece of a format, with its byte offset in the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind<'a>,
    pub offset: usize,
    pub raw: &'a str,
}

impl<'a> Segment<'a> {
    pub fn placeholder(&self) -> Option<&'a str> {
        match self.kind {
            SegmentKind::Placeholder(name) => Some(name),
            _ => None,
        }
    }
}

/// Byte range of the offending part of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed placeholder at offset {offset}")]
pub struct MalformedInterpolation {
    pub offset: usize,
    pub len: usize,
}

/// Split a format into text, escape and placeholder segments.
pub fn segments(format: &str) -> Result<Vec<Segment<'_>>, MalformedInterpolation> {
    let mut out = Vec::new();
    let mut lexer = Token::lexer(format);

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        let raw = lexer.slice();
        let malformed = MalformedInterpolation {
            offset: span.start,
            len: span.len(),
        };
        let kind = match token {
            Ok(Token::Text) | Ok(Token::Dollar) => SegmentKind::Text,
            Ok(Token::Escaped) => SegmentKind::Escaped,
            Ok(Token::Placeholder) => {
                let name = &raw[2..raw.len() - 1];
                if !is_valid_placeholder(name) {
                    return Err(malformed);
                }
                SegmentKind::Placeholder(name)
            }
            Ok(Token::Unterminated) => {
                return Err(MalformedInterpolation {
                    offset: span.start,
                    len: format.len() - span.start,
                });
            }
            Err(()) => return Err(malformed),
        };
        out.push(Segment {
            kind,
            offset: span.start,
            raw,
        });
    }

    Ok(out)
}

fn is_valid_placeholder(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-'))
}

/// Names of all placeholders, in order of appearance.
pub fn placeholders(format: &str) -> Result<Vec<&str>, MalformedInterpolation> {
    Ok(segments(format)?
        .iter()
        .filter_map(|s| s.placeholder())
        .collect())
}

/// Make literal text safe to splice into a format.
pub fn escape_literal(text: &str) -> String {
    text.replace("${", "${!")
}

/// Rebuild a format, replacing placeholders for which `replace` returns text.
///
/// Returned text is inserted verbatim; callers escape literal text first.
pub fn replace_placeholders(
    format: &str,
    mut replace: impl FnMut(&str) -> Option<String>,
) -> Result<String, MalformedInterpolation> {
    let mut out = String::with_capacity(format.len());
    for segment in segments(format)? {
        match segment.kind {
            SegmentKind::Placeholder(name) => match replace(name) {
                Some(text) => out.push_str(&text),
                None => out.push_str(segment.raw),
            },
            _ => out.push_str(segment.raw),
        }
    }
    Ok(out)
}

/// Final text of a format without placeholders: escapes resolved.
///
/// Placeholders, if any remain, are kept as written.
pub fn unescape(format: &str) -> Result<String, MalformedInterpolation> {
    let mut out = String::with_capacity(format.len());
    for segment in segments(format)? {
        match segment.kind {
            SegmentKind::Escaped => out.push_str("${"),
            _ => out.push_str(segment.raw),
        }
    }
    Ok(out)
}
