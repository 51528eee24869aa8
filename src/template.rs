//! Message template grammar and rendering.
//!
//! A template is plain text with named placeholders:
//!
//! - `{name}` where `name` matches `[A-Za-z_][A-Za-z0-9_]*` is substituted
//! - `{{` renders a literal `{`, `}}` a literal `}`
//! - any other brace is kept as-is (`{0}`, `{ x }`, a lone `}`)
//!
//! Rendering never fails half-way: every placeholder is visited, and if any
//! name is unknown the whole set of missing names is reported at once so the
//! caller can fall back to the raw text.

use smallvec::SmallVec;
use std::fmt;

// ============================================================================
// Parameter Lookup
// ============================================================================

/// Source of values for placeholders.
pub trait Lookup {
    /// Append the value of `name` to `out`. Returns `false` when unknown.
    fn write_param(&self, name: &str, out: &mut String) -> bool;
}

impl Lookup for [(&str, &str)] {
    fn write_param(&self, name: &str, out: &mut String) -> bool {
        match self.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => {
                out.push_str(value);
                true
            }
            None => false,
        }
    }
}

/// Lookup that consults `inner` first, then a static defaults table.
pub struct WithDefaults<'a, L: ?Sized> {
    inner: &'a L,
    defaults: &'static [(&'static str, &'static str)],
}

impl<'a, L: Lookup + ?Sized> WithDefaults<'a, L> {
    /// Layer `defaults` under `inner`.
    #[inline]
    pub fn new(inner: &'a L, defaults: &'static [(&'static str, &'static str)]) -> Self {
        Self { inner, defaults }
    }
}

impl<L: Lookup + ?Sized> Lookup for WithDefaults<'_, L> {
    fn write_param(&self, name: &str, out: &mut String) -> bool {
        self.inner.write_param(name, out) || self.defaults.write_param(name, out)
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

struct Tokens<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }
}

fn ident_len(bytes: &[u8]) -> Option<usize> {
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    let len = bytes
        .iter()
        .position(|b| !(b.is_ascii_alphanumeric() || *b == b'_'))
        .unwrap_or(bytes.len());
    Some(len)
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        // Braces are ASCII, so every slice boundary below is a char boundary.
        match bytes[start] {
            b'{' => {
                if bytes.get(start + 1) == Some(&b'{') {
                    self.pos = start + 2;
                    return Some(Token::Literal(&self.src[start..start + 1]));
                }
                if let Some(len) = ident_len(&bytes[start + 1..]) {
                    let close = start + 1 + len;
                    if bytes.get(close) == Some(&b'}') {
                        self.pos = close + 1;
                        return Some(Token::Placeholder(&self.src[start + 1..close]));
                    }
                }
                self.pos = start + 1;
                Some(Token::Literal(&self.src[start..start + 1]))
            }
            b'}' => {
                self.pos = if bytes.get(start + 1) == Some(&b'}') {
                    start + 2
                } else {
                    start + 1
                };
                Some(Token::Literal(&self.src[start..start + 1]))
            }
            _ => {
                let end = bytes[start..]
                    .iter()
                    .position(|b| *b == b'{' || *b == b'}')
                    .map_or(bytes.len(), |offset| start + offset);
                self.pos = end;
                Some(Token::Literal(&self.src[start..end]))
            }
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// True if `raw` contains at least one `{name}` placeholder.
pub fn has_placeholders(raw: &str) -> bool {
    Tokens::new(raw).any(|token| matches!(token, Token::Placeholder(_)))
}

/// Distinct placeholder names in order of first appearance.
pub fn placeholders(raw: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for token in Tokens::new(raw) {
        if let Token::Placeholder(name) = token {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Substitute every placeholder of `raw` from `lookup`.
///
/// Values are inserted verbatim and never re-scanned.
///
/// # Errors
///
/// Returns [`MissingParams`] naming every placeholder `lookup` could not
/// supply. Nothing partially rendered escapes.
pub fn render<L: Lookup + ?Sized>(raw: &str, lookup: &L) -> Result<String, MissingParams> {
    let mut out = String::with_capacity(raw.len() + 16);
    let mut missing = MissingParams::default();

    for token in Tokens::new(raw) {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Placeholder(name) => {
                if !lookup.write_param(name, &mut out) {
                    missing.push(name);
                }
            }
        }
    }

    if missing.is_empty() {
        Ok(out)
    } else {
        Err(missing)
    }
}

// ============================================================================
// Missing Parameters
// ============================================================================

/// Placeholder names a template referenced but the parameters lacked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingParams {
    names: SmallVec<[String; 2]>,
}

impl MissingParams {
    fn push(&mut self, name: &str) {
        if !self.names.iter().any(|known| known == name) {
            self.names.push(name.to_owned());
        }
    }

    /// Missing names, in order of first appearance.
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// True when nothing is missing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Display for MissingParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>(pairs: &'a [(&'a str, &'a str)]) -> &'a [(&'a str, &'a str)] {
        pairs
    }

    #[test]
    fn renders_named_placeholders() {
        let out = render("Could not find user: {user_id}", params(&[("user_id", "42")])).unwrap();
        assert_eq!(out, "Could not find user: 42");
    }

    #[test]
    fn escapes_and_stray_braces_are_literal() {
        let out = render("{{x}} {0} { a } }{", params(&[("x", "no")])).unwrap();
        assert_eq!(out, "{x} {0} { a } }{");
    }

    #[test]
    fn values_are_not_rescanned() {
        let out = render("{a}", params(&[("a", "{b}")])).unwrap();
        assert_eq!(out, "{b}");
    }

    #[test]
    fn reports_every_missing_name_once() {
        let err = render("{a} {b} {a} {c}", params(&[("b", "1")])).unwrap_err();
        assert_eq!(err.names(), ["a".to_string(), "c".to_string()]);
        assert_eq!(err.to_string(), "a, c");
    }

    #[test]
    fn discovers_placeholders() {
        assert!(has_placeholders("hello {name}"));
        assert!(!has_placeholders("hello {{name}} {1}"));
        assert_eq!(placeholders("{b} {a} {b}"), vec!["b", "a"]);
    }

    #[test]
    fn defaults_fill_gaps_after_explicit_values() {
        let explicit = params(&[("exception", "boom")]);
        let layered = WithDefaults::new(explicit, &[("exception", ""), ("other", "x")]);
        assert_eq!(render("{exception}/{other}", &layered).unwrap(), "boom/x");

        let empty: &[(&str, &str)] = &[];
        let layered = WithDefaults::new(empty, &[("exception", "")]);
        assert_eq!(render("failed: {exception}", &layered).unwrap(), "failed: ");
    }

    #[test]
    fn multibyte_text_survives() {
        let out = render("ünïcödé {x} ✓", params(&[("x", "ß")])).unwrap();
        assert_eq!(out, "ünïcödé ß ✓");
    }
}
