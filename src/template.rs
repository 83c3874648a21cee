//! Placeholder tokens and value substitution.
//!
//! A placeholder is a `{name}` or `{name:regex}` token embedded in any URI
//! component. The regex part may itself contain balanced braces (counted
//! repetitions like `{2,7}`), so tokens are located by tracking brace depth
//! rather than by naive delimiter search.

use crate::{
    encoding::{self, table::Table, Mode},
    error::ResolveError,
};
use regex::Regex;
use std::collections::HashMap;

/// A placeholder located in a component string.
///
/// `start..end` spans the token including both braces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) name: &'a str,
    pub(crate) pattern: Option<&'a str>,
}

enum TokenAt<'a> {
    Found(Token<'a>),
    Malformed,
    Unterminated,
}

fn token_at(text: &str, start: usize) -> TokenAt<'_> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut close = None;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
        i += 1;
    }
    let Some(close) = close else {
        return TokenAt::Unterminated;
    };

    let interior = &text[start + 1..close];
    let (name, pattern) = match interior.find(':') {
        Some(i) => (&interior[..i], Some(interior[i + 1..].trim())),
        None => (interior, None),
    };
    let name = name.trim();
    if !is_param_name(name) || pattern.is_some_and(str::is_empty) {
        return TokenAt::Malformed;
    }
    TokenAt::Found(Token {
        start,
        end: close + 1,
        name,
        pattern,
    })
}

fn is_param_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    let Some(&first) = bytes.first() else {
        return false;
    };
    (first.is_ascii_alphanumeric() || first == b'_')
        && bytes[1..]
            .iter()
            .all(|&x| x.is_ascii_alphanumeric() || matches!(x, b'_' | b'.' | b'-'))
}

/// An iterator over the placeholder tokens of a component string.
pub(crate) struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

pub(crate) fn tokens(text: &str) -> Tokens<'_> {
    Tokens { text, pos: 0 }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        while let Some(off) = self.text[self.pos..].find('{') {
            let open = self.pos + off;
            match token_at(self.text, open) {
                TokenAt::Found(tok) => {
                    self.pos = tok.end;
                    return Some(tok);
                }
                TokenAt::Malformed => self.pos = open + 1,
                TokenAt::Unterminated => {
                    self.pos = self.text.len();
                    return None;
                }
            }
        }
        None
    }
}

/// Appends every yet-unseen placeholder name of `text` to `names`.
pub(crate) fn collect_names(text: &str, names: &mut Vec<String>) {
    for tok in tokens(text) {
        if !names.iter().any(|n| n == tok.name) {
            names.push(tok.name.to_owned());
        }
    }
}

/// A source of placeholder values.
pub(crate) enum Values<'a> {
    Named(&'a HashMap<String, String>),
    Positional(Positional),
}

/// The ordered positional binder: names bind to the next unused value in
/// first-encounter order, and repeats reuse the first binding.
pub(crate) struct Positional {
    values: Vec<String>,
    bound: Vec<(String, usize)>,
    next: usize,
}

impl Positional {
    fn get(&mut self, name: &str) -> Option<&str> {
        if let Some(&(_, i)) = self.bound.iter().find(|(n, _)| n == name) {
            return Some(&self.values[i]);
        }
        if self.next < self.values.len() {
            let i = self.next;
            self.next += 1;
            self.bound.push((name.to_owned(), i));
            Some(&self.values[i])
        } else {
            None
        }
    }
}

impl<'a> Values<'a> {
    pub(crate) fn named(map: &'a HashMap<String, String>) -> Self {
        Values::Named(map)
    }

    pub(crate) fn positional(values: Vec<String>) -> Values<'static> {
        Values::Positional(Positional {
            values,
            bound: Vec::new(),
            next: 0,
        })
    }

    /// A source with no bindings at all.
    pub(crate) fn none() -> Values<'static> {
        Values::positional(Vec::new())
    }

    fn get(&mut self, name: &str) -> Option<&str> {
        match self {
            Values::Named(map) => map.get(name).map(String::as_str),
            Values::Positional(binder) => binder.get(name),
        }
    }
}

/// Resolves the placeholders of `text` from `values`, encoding each
/// substituted value against `table` with the given mode.
///
/// With `keep_unresolved`, tokens without a binding are left literal;
/// otherwise they fail with a missing-parameter error.
pub(crate) fn substitute(
    text: &str,
    table: &'static Table,
    mode: Mode,
    keep_unresolved: bool,
    values: &mut Values<'_>,
) -> Result<String, ResolveError> {
    if !text.contains('{') {
        return Ok(text.to_owned());
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for tok in tokens(text) {
        out.push_str(&text[last..tok.start]);
        last = tok.end;

        let value = match values.get(tok.name) {
            Some(v) => v.to_owned(),
            None => {
                if keep_unresolved {
                    out.push_str(&text[tok.start..tok.end]);
                    continue;
                }
                return Err(ResolveError::missing(tok.name));
            }
        };
        if let Some(pattern) = tok.pattern {
            validate_pattern(tok.name, pattern, &value)?;
        }
        encoding::encode_into(&mut out, &value, table, mode);
    }
    out.push_str(&text[last..]);
    Ok(out)
}

fn validate_pattern(name: &str, pattern: &str, value: &str) -> Result<(), ResolveError> {
    let re = Regex::new(&format!(r"\A(?:{pattern})\z"))
        .map_err(|_| ResolveError::invalid_pattern(name, pattern))?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(ResolveError::mismatch(name, pattern))
    }
}

/// Resolves only the occurrences of one named placeholder, leaving every
/// other token intact. The value must already be encoded by the caller.
pub(crate) fn substitute_one(text: &str, name: &str, encoded_value: &str) -> String {
    if !text.contains('{') {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for tok in tokens(text) {
        out.push_str(&text[last..tok.start]);
        if tok.name == name {
            out.push_str(encoded_value);
        } else {
            out.push_str(&text[tok.start..tok.end]);
        }
        last = tok.end;
    }
    out.push_str(&text[last..]);
    out
}

/// Encodes the literal stretches of `text` against `table`, passing
/// placeholder tokens through untouched.
pub(crate) fn encode_template_aware(text: &str, table: &'static Table, mode: Mode) -> String {
    if !text.contains('{') {
        return encoding::encode(text, table, mode);
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for tok in tokens(text) {
        encoding::encode_into(&mut out, &text[last..tok.start], table, mode);
        out.push_str(&text[tok.start..tok.end]);
        last = tok.end;
    }
    encoding::encode_into(&mut out, &text[last..], table, mode);
    out
}

const TOKEN_SENTINEL: &str = "_templated_uri_parameter";

/// Replaces every placeholder token with an opaque sentinel, returning the
/// masked text and the tokens in order of appearance.
///
/// Structural edits that split on `;`, `=` or `/` must run on the masked
/// text, since a token's regex may contain any of those characters.
pub(crate) fn mask_tokens(text: &str) -> (String, Vec<String>) {
    if !text.contains('{') {
        return (text.to_owned(), Vec::new());
    }

    let mut masked = String::with_capacity(text.len());
    let mut saved = Vec::new();
    let mut last = 0;
    for tok in tokens(text) {
        masked.push_str(&text[last..tok.start]);
        masked.push_str(TOKEN_SENTINEL);
        saved.push(text[tok.start..tok.end].to_owned());
        last = tok.end;
    }
    masked.push_str(&text[last..]);
    (masked, saved)
}

/// Substitutes the sentinels of a masked string back with the saved tokens,
/// in their original order.
pub(crate) fn restore_tokens(masked: &str, saved: &[String]) -> String {
    let mut out = String::with_capacity(masked.len());
    let mut rest = masked;
    let mut saved = saved.iter();
    while let Some(i) = rest.find(TOKEN_SENTINEL) {
        out.push_str(&rest[..i]);
        match saved.next() {
            Some(tok) => out.push_str(tok),
            None => out.push_str(TOKEN_SENTINEL),
        }
        rest = &rest[i + TOKEN_SENTINEL.len()..];
    }
    out.push_str(rest);
    out
}
