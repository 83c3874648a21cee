use templated_uri::{error::TemplateErrorKind, UriBuilder};

#[test]
fn parses_full_hierarchical_template() {
    let b = UriBuilder::from_template("http://bill@example.com:8080/a/{b}/c?x={y}#frag").unwrap();
    assert_eq!(b.scheme(), Some("http"));
    assert_eq!(b.userinfo(), Some("bill"));
    assert_eq!(b.host(), Some("example.com"));
    assert_eq!(b.port(), Some(8080));
    assert_eq!(b.path(), Some("/a/{b}/c"));
    assert_eq!(b.query(), Some("x={y}"));
    assert_eq!(b.fragment(), Some("frag"));
    assert_eq!(b.scheme_specific_part(), None);
    assert_eq!(b.authority(), None);
}

#[test]
fn parses_opaque_template() {
    let b = UriBuilder::from_template("mailto:bill@example.com").unwrap();
    assert_eq!(b.scheme(), Some("mailto"));
    assert_eq!(b.scheme_specific_part(), Some("bill@example.com"));
    assert_eq!(b.host(), None);
    assert_eq!(b.path(), None);
    assert_eq!(b.query(), None);
}

#[test]
fn relative_colon_path_is_opaque() {
    let b = UriBuilder::from_template("a:b").unwrap();
    assert_eq!(b.scheme(), Some("a"));
    assert_eq!(b.scheme_specific_part(), Some("b"));
}

#[test]
fn ambiguous_question_mark_stays_in_path() {
    let b = UriBuilder::from_template("/{row:[a-z?]+}/c").unwrap();
    assert_eq!(b.path(), Some("/{row:[a-z?]+}/c"));
    assert_eq!(b.query(), None);
}

#[test]
fn query_after_regex_placeholder() {
    let b = UriBuilder::from_template("/{row:[a-z?]+}/c?q={s}").unwrap();
    assert_eq!(b.path(), Some("/{row:[a-z?]+}/c"));
    assert_eq!(b.query(), Some("q={s}"));
}

#[test]
fn ambiguous_pound_stays_in_path() {
    let b = UriBuilder::from_template("/x/{f:[a-z#]*}").unwrap();
    assert_eq!(b.path(), Some("/x/{f:[a-z#]*}"));
    assert_eq!(b.fragment(), None);
}

#[test]
fn fragment_after_regex_placeholder() {
    let b = UriBuilder::from_template("/a/{p:[0-9#]+}/b#sec").unwrap();
    assert_eq!(b.path(), Some("/a/{p:[0-9#]+}/b"));
    assert_eq!(b.fragment(), Some("sec"));
}

#[test]
fn ipv6_host_with_port() {
    let b = UriBuilder::from_template("http://[::1]:8042/x").unwrap();
    assert_eq!(b.host(), Some("[::1]"));
    assert_eq!(b.port(), Some(8042));
    assert_eq!(b.path(), Some("/x"));

    let b = UriBuilder::from_template("https://[fe80::1234%eth0]:443/").unwrap();
    assert_eq!(b.host(), Some("[fe80::1234%eth0]"));
    assert_eq!(b.port(), Some(443));
}

#[test]
fn bracketed_host_without_port_is_bare() {
    let b = UriBuilder::from_template("http://[::1]/x").unwrap();
    assert_eq!(b.host(), Some("[::1]"));
    assert_eq!(b.port(), None);
}

#[test]
fn host_placeholder_in_authority() {
    let b = UriBuilder::from_template("http://{host}/x").unwrap();
    assert_eq!(b.host(), Some("{host}"));
    assert_eq!(b.path(), Some("/x"));
}

#[test]
fn rejects_colon_before_slash_without_scheme() {
    let err = UriBuilder::from_template("{x}:8080/y").unwrap_err();
    assert_eq!(err.kind(), TemplateErrorKind::Malformed);
}

#[test]
fn rejects_port_out_of_range() {
    let err = UriBuilder::from_template("http://example.com:99999999999/x").unwrap_err();
    assert_eq!(err.kind(), TemplateErrorKind::InvalidPort);
}

#[test]
fn empty_authority_gives_empty_host() {
    let b = UriBuilder::from_template("file:///etc/hosts").unwrap();
    assert_eq!(b.host(), Some(""));
    assert_eq!(b.path(), Some("/etc/hosts"));
    // An empty host is rejected at build time.
    assert!(b.build::<&str>(&[]).is_err());
}

#[test]
fn merge_parse_keeps_existing_components() {
    let mut b = UriBuilder::from_template("http://example.com/a").unwrap();
    b.uri_template("/b?x=1").unwrap();
    assert_eq!(b.scheme(), Some("http"));
    assert_eq!(b.host(), Some("example.com"));
    assert_eq!(b.path(), Some("/b"));
    assert_eq!(b.query(), Some("x=1"));
}

#[test]
fn encodes_disallowed_characters_on_parse() {
    let b = UriBuilder::from_template("/a b/{p}?q=a b").unwrap();
    assert_eq!(b.path(), Some("/a%20b/{p}"));
    assert_eq!(b.query(), Some("q=a%20b"));
}

#[test]
fn parse_does_not_double_encode() {
    let b = UriBuilder::from_template("/a%20b?q=x%2Fy").unwrap();
    assert_eq!(b.path(), Some("/a%20b"));
    assert_eq!(b.query(), Some("q=x%2Fy"));
}

#[test]
fn relative_reference_without_scheme() {
    let b = UriBuilder::from_template("a/b/c").unwrap();
    assert_eq!(b.scheme(), None);
    assert_eq!(b.host(), None);
    assert_eq!(b.path(), Some("a/b/c"));
}

#[test]
fn empty_template_is_empty_builder() {
    let b = UriBuilder::from_template("").unwrap();
    assert_eq!(b.scheme(), None);
    assert_eq!(b.host(), None);
    assert_eq!(b.path(), None);
    assert_eq!(b.query(), None);
    assert_eq!(b.fragment(), None);
}
