//! Structural parsing of URI template strings.
//!
//! A template is first tried against the opaque form `scheme:ssp` and then
//! against the hierarchical form
//! `[scheme ":"] ["//" authority] path ["?" query] ["#" fragment]`.
//! Splitting the text after the authority is not a plain delimiter search:
//! a placeholder's regex may itself contain `?`, `#` or `/`
//! (e.g. `/{row:[a-z?]+}/c`), so every candidate delimiter is checked
//! against the surrounding text before it is accepted.

use crate::{
    builder::UriBuilder,
    error::{TemplateError, TemplateErrorKind},
};
use once_cell::sync::Lazy;
use regex::Regex;

static OPAQUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^:/?#{]+):([^/].*)$").unwrap());

static HIERARCHICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(([^:/?#{]+):)?(//([^/?#]*))?([^?#]*)(\?([^#]*))?(#(.*))?$").unwrap()
});

static HOST_PORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^/:]+):(\d+)$").unwrap());

// Bracketed IPv6 literals such as "[::1]" or "[fe80::1234%eth0]".
static IPV6_HOST_PORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\[(?:[0-9A-Fa-f]{0,4}:){2,7}[0-9A-Fa-f]{0,4}(?:%[^\]]*)?\]):(\d+)$").unwrap()
});

static PARAM_WITH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(/\{[^:]+:.*\}/?)?$").unwrap());

/// Parses `template` into `builder`, merging with its current state:
/// components absent from the template are left as they are.
pub(crate) fn parse_into(builder: &mut UriBuilder, template: &str) -> Result<(), TemplateError> {
    if let Some(caps) = OPAQUE.captures(template) {
        builder.set_opaque(caps[1].to_owned(), caps[2].to_owned());
        return Ok(());
    }

    let caps = HIERARCHICAL
        .captures(template)
        .ok_or(TemplateError(TemplateErrorKind::Malformed))?;
    builder.clear_ssp();

    let has_scheme = caps.get(2).is_some();
    if let Some(scheme) = caps.get(2) {
        builder.scheme = Some(scheme.as_str().to_owned());
    }
    if caps.get(3).is_some() {
        let authority = caps.get(4).map_or("", |m| m.as_str());
        parse_authority(builder, authority)?;
    }

    let path_text = caps.get(5).map_or("", |m| m.as_str());
    let (path, query, fragment) = if caps.get(6).is_none() && caps.get(8).is_none() {
        (path_text.to_owned(), None, None)
    } else {
        let mut tail = String::from(path_text);
        if let Some(m) = caps.get(6) {
            tail.push_str(m.as_str());
        }
        if let Some(m) = caps.get(8) {
            tail.push_str(m.as_str());
        }
        split_components(&tail)
    };

    if !has_scheme
        && !path.is_empty()
        && !path.starts_with('/')
        && matches!((path.find(':'), path.find('/')), (Some(c), Some(s)) if c < s)
    {
        return Err(TemplateError(TemplateErrorKind::Malformed));
    }

    if !path.is_empty() {
        builder.replace_path(Some(&path));
    }
    if let Some(query) = query {
        builder.replace_query(Some(&query));
    }
    if let Some(fragment) = fragment {
        builder.set_fragment(Some(&fragment));
    }
    Ok(())
}

fn parse_authority(builder: &mut UriBuilder, authority: &str) -> Result<(), TemplateError> {
    builder.authority = None;

    let mut host = authority;
    if let Some(at) = host.find('@') {
        builder.userinfo = Some(host[..at].to_owned());
        host = &host[at + 1..];
    }

    if let Some(caps) = HOST_PORT.captures(host) {
        builder.host = Some(caps[1].to_owned());
        builder.port = Some(parse_port(&caps[2])?);
        return Ok(());
    }
    if host.starts_with('[') {
        if let Some(caps) = IPV6_HOST_PORT.captures(host) {
            builder.host = Some(caps[1].to_owned());
            builder.port = Some(parse_port(&caps[2])?);
            return Ok(());
        }
    }
    builder.host = Some(host.to_owned());
    Ok(())
}

fn parse_port(digits: &str) -> Result<u32, TemplateError> {
    digits
        .parse()
        .map_err(|_| TemplateError(TemplateErrorKind::InvalidPort))
}

/// Splits raw path+query+fragment text on its non-ambiguous delimiters.
fn split_components(tail: &str) -> (String, Option<String>, Option<String>) {
    let (fragment, rest) = split_fragment(tail);
    let (query, path) = split_query(rest);
    (path.to_owned(), query, fragment)
}

/// The fragment starts at the last `#` that is not regex text.
fn split_fragment(text: &str) -> (Option<String>, &str) {
    if let Some(pound) = text.rfind('#') {
        if !is_param_with_regex(text, pound) {
            let fragment = &text[pound + 1..];
            let fragment = (!fragment.is_empty()).then(|| fragment.to_owned());
            return (fragment, &text[..pound]);
        }
    }
    (None, text)
}

/// The query starts after the first `?` that is not regex text.
fn split_query(text: &str) -> (Option<String>, &str) {
    let mut from = 0;
    while let Some(off) = text[from..].find('?') {
        let mark = from + off;
        if !is_param_with_regex(text, mark) {
            let query = &text[mark + 1..];
            let query = (!query.is_empty()).then(|| query.to_owned());
            return (query, &text[..mark]);
        }
        from = mark + 1;
    }
    (None, text)
}

/// Returns `true` when the delimiter candidate at byte index `delim` sits
/// inside a `{name:regex}` placeholder and is therefore regex text, not a
/// URI delimiter.
///
/// The check is local: the nearest `/` before the candidate and the nearest
/// `}/` (or `}`) after it bound a substring that must look like a
/// regex-bearing placeholder segment. This is a heuristic — a regex with
/// unbalanced braces next to a delimiter can defeat it, in which case the
/// split is implementation-defined.
pub(crate) fn is_param_with_regex(text: &str, delim: usize) -> bool {
    let Some(behind) = text[..=delim].rfind('/') else {
        return false;
    };
    let ahead = match text[delim..].find("}/") {
        Some(i) => delim + i + 2,
        None => match text[delim..].find('}') {
            Some(i) => delim + i + 1,
            None => return false,
        },
    };
    PARAM_WITH_REGEX.is_match(&text[behind..ahead])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_mark_in_regex_is_not_a_delimiter() {
        let text = "/{row:[a-z?]+}/c";
        let mark = text.find('?').unwrap();
        assert!(is_param_with_regex(text, mark));

        let (query, path) = split_query(text);
        assert_eq!(query, None);
        assert_eq!(path, text);
    }

    #[test]
    fn real_query_after_regex_placeholder() {
        let text = "/{row:[a-z?]+}/c?q=1";
        let (query, path) = split_query(text);
        assert_eq!(query.as_deref(), Some("q=1"));
        assert_eq!(path, "/{row:[a-z?]+}/c");
    }

    #[test]
    fn pound_in_regex_is_not_a_delimiter() {
        let text = "/x/{f:[a-z#]*}";
        let pound = text.rfind('#').unwrap();
        assert!(is_param_with_regex(text, pound));

        let (fragment, rest) = split_fragment(text);
        assert_eq!(fragment, None);
        assert_eq!(rest, text);
    }

    #[test]
    fn real_fragment_after_regex_placeholder() {
        let (fragment, rest) = split_fragment("/a/{p:[0-9#]+}/b#sec");
        assert_eq!(fragment.as_deref(), Some("sec"));
        assert_eq!(rest, "/a/{p:[0-9#]+}/b");
    }

    #[test]
    fn plain_delimiters_split_normally() {
        let (path, query, fragment) = split_components("/a/b?x=1&y=2#frag");
        assert_eq!(path, "/a/b");
        assert_eq!(query.as_deref(), Some("x=1&y=2"));
        assert_eq!(fragment.as_deref(), Some("frag"));
    }

    #[test]
    fn empty_query_text_is_dropped_but_delimits() {
        let (path, query, _) = split_components("/a?");
        assert_eq!(path, "/a");
        assert_eq!(query, None);
    }

    #[test]
    fn delimiter_without_any_placeholder_context() {
        assert!(!is_param_with_regex("abc?def", 3));
        assert!(!is_param_with_regex("/abc?def", 4));
    }
}
