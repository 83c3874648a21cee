use std::collections::HashMap;
use templated_uri::{
    error::{BuildErrorKind, ResolveErrorKind},
    Uri, UriBuilder,
};

#[test]
fn positional_binding_is_deterministic() {
    let b = UriBuilder::from_template("/{a}/{b}?x={a}").unwrap();
    let uri = b.build(&["1", "2"]).unwrap();
    assert_eq!(uri.as_str(), "/1/2?x=1");
    assert_eq!(uri.path().as_str(), "/1/2");
    assert_eq!(uri.query().unwrap(), "x=1");
}

#[test]
fn missing_parameter_fails() {
    let b = UriBuilder::from_template("/{a}/{b}").unwrap();
    let err = b.build(&["1"]).unwrap_err();
    match err.kind() {
        BuildErrorKind::Resolve(e) => match e.kind() {
            ResolveErrorKind::MissingParameter { name } => assert_eq!(name, "b"),
            k => panic!("unexpected resolve error: {k:?}"),
        },
        k => panic!("unexpected build error: {k:?}"),
    }
}

#[test]
fn regex_validation() {
    let b = UriBuilder::from_template("/{row:[a-z]+}").unwrap();
    assert_eq!(b.build(&["ab"]).unwrap().as_str(), "/ab");

    let err = b.build(&["42"]).unwrap_err();
    match err.kind() {
        BuildErrorKind::Resolve(e) => assert!(matches!(
            e.kind(),
            ResolveErrorKind::RegexMismatch { name, .. } if name == "row"
        )),
        k => panic!("unexpected build error: {k:?}"),
    }
}

#[test]
fn counted_repetition_in_declared_pattern() {
    let b = UriBuilder::from_template(r"/{code:\d{2,4}}").unwrap();
    assert_eq!(b.build(&["123"]).unwrap().as_str(), "/123");
    assert!(b.build(&["1"]).is_err());
}

#[test]
fn invalid_declared_pattern_is_reported() {
    let b = UriBuilder::from_template("/{x:[}").unwrap();
    let err = b.build(&["v"]).unwrap_err();
    match err.kind() {
        BuildErrorKind::Resolve(e) => assert!(matches!(
            e.kind(),
            ResolveErrorKind::InvalidPattern { name, .. } if name == "x"
        )),
        k => panic!("unexpected build error: {k:?}"),
    }
}

#[test]
fn named_build() {
    let b = UriBuilder::from_template("/{a}/{b}").unwrap();
    let mut map = HashMap::new();
    map.insert("a", "x");
    map.insert("b", "y");
    assert_eq!(b.build_from_map(&map).unwrap().as_str(), "/x/y");
    // The same map resolves identically a second time.
    assert_eq!(b.build_from_map(&map).unwrap().as_str(), "/x/y");
}

#[test]
fn encoding_modes_for_query_values() {
    let b = UriBuilder::from_template("/items?q={v}").unwrap();
    assert_eq!(b.build(&["a b"]).unwrap().as_str(), "/items?q=a%20b");
    assert_eq!(b.build(&["a%20b"]).unwrap().as_str(), "/items?q=a%2520b");
    assert_eq!(
        b.build_from_encoded(&["a%20b"]).unwrap().as_str(),
        "/items?q=a%20b"
    );
}

#[test]
fn slash_encoding_in_path_values() {
    let b = UriBuilder::from_template("/files/{p}").unwrap();
    assert_eq!(b.build(&["x/y"]).unwrap().as_str(), "/files/x%2Fy");
    assert_eq!(b.build_with(&["x/y"], false).unwrap().as_str(), "/files/x/y");
}

#[test]
fn round_trips_a_concrete_uri() {
    let b = UriBuilder::from_template("http://bill@example.com:8080/a/b?x=1&y=2#frag").unwrap();
    let uri = b.build::<&str>(&[]).unwrap();
    assert_eq!(uri.as_str(), "http://bill@example.com:8080/a/b?x=1&y=2#frag");

    let reparsed = UriBuilder::from_template(uri.as_str()).unwrap();
    assert_eq!(reparsed.scheme(), b.scheme());
    assert_eq!(reparsed.userinfo(), b.userinfo());
    assert_eq!(reparsed.host(), b.host());
    assert_eq!(reparsed.port(), b.port());
    assert_eq!(reparsed.path(), b.path());
    assert_eq!(reparsed.query(), b.query());
    assert_eq!(reparsed.fragment(), b.fragment());
}

#[test]
fn to_template_is_idempotent() {
    let b = UriBuilder::from_template(r"http://{host}/a/{b:\d+}/list?q={v}#f").unwrap();
    let t1 = b.to_template();
    let b2 = UriBuilder::from_template(&t1).unwrap();
    let t2 = b2.to_template();
    assert_eq!(t1, t2);
    assert_eq!(t1, r"http://{host}/a/{b:\d+}/list?q={v}#f");
}

#[test]
fn progressive_resolution() {
    let mut b = UriBuilder::from_template("/{a}/{b}").unwrap();
    b.resolve_template("a", "1").unwrap();
    assert_eq!(b.to_template(), "/1/{b}");
    assert_eq!(b.build(&["2"]).unwrap().as_str(), "/1/2");
}

#[test]
fn resolve_template_validates_regex() {
    let mut b = UriBuilder::from_template(r"/{n:\d+}").unwrap();
    assert!(b.resolve_template("n", "abc").is_err());
}

#[test]
fn resolve_templates_from_map() {
    let mut b = UriBuilder::from_template("http://{host}/{a}/{b}").unwrap();
    let mut map = HashMap::new();
    map.insert("host", "example.com");
    map.insert("b", "two");
    b.resolve_templates(&map).unwrap();
    assert_eq!(b.to_template(), "http://example.com/{a}/two");
}

#[test]
fn scheme_placeholder_via_setter() {
    let mut b = UriBuilder::new();
    b.set_scheme(Some("{scheme}"));
    b.set_host(Some("example.com")).unwrap();
    b.replace_path(Some("/x"));
    let uri = b.build(&["https"]).unwrap();
    assert_eq!(uri.as_str(), "https://example.com/x");
}

#[test]
fn opaque_build() {
    let b = UriBuilder::from_template("mailto:bill@example.com").unwrap();
    let uri = b.build::<&str>(&[]).unwrap();
    assert_eq!(uri.as_str(), "mailto:bill@example.com");
    assert!(uri.is_opaque());
    assert_eq!(uri.scheme(), Some("mailto"));
    assert_eq!(uri.scheme_specific_part(), Some("bill@example.com"));
    assert!(uri.authority().is_none());
}

#[test]
fn uri_component_views() {
    let uri = Uri::parse("http://bill@example.com:8080/a?x=1#f").unwrap();
    assert_eq!(uri.scheme(), Some("http"));
    let auth = uri.authority().unwrap();
    assert_eq!(auth.as_str(), "bill@example.com:8080");
    assert_eq!(auth.userinfo().unwrap(), "bill");
    assert_eq!(auth.host(), "example.com");
    assert_eq!(auth.port(), Some("8080"));
    assert_eq!(auth.port_to_u32(), Ok(Some(8080)));
    assert_eq!(uri.path().as_str(), "/a");
    assert_eq!(uri.query().unwrap(), "x=1");
    assert_eq!(uri.fragment().unwrap(), "f");
    assert_eq!(uri.to_string(), uri.as_str());
}

#[test]
fn rooted_path_is_inserted_with_host() {
    let mut b = UriBuilder::new();
    b.set_host(Some("example.com")).unwrap();
    b.replace_path(Some("x"));
    assert_eq!(b.build::<&str>(&[]).unwrap().as_str(), "//example.com/x");
}

#[test]
fn build_failure_on_invalid_component() {
    let mut b = UriBuilder::new();
    b.set_scheme(Some("not a scheme"));
    b.replace_path(Some("/x"));
    let err = b.build::<&str>(&[]).unwrap_err();
    assert!(matches!(
        err.kind(),
        BuildErrorKind::InvalidComponent { component: "scheme" }
    ));
}

#[test]
fn relative_path_colon_rejected_at_build() {
    let mut b = UriBuilder::new();
    b.replace_path(Some("a:b/c"));
    let err = b.build::<&str>(&[]).unwrap_err();
    assert!(matches!(err.kind(), BuildErrorKind::ColonInFirstPathSegment));
}

#[test]
fn declared_parameter_names() {
    let b = UriBuilder::from_template(r"http://{host}/{a}/{b:\d+}/x?y={a}#{frag}").unwrap();
    assert_eq!(b.path_param_names(), ["host", "a", "b", "frag"]);
}

#[test]
fn clone_is_independent() {
    let base = UriBuilder::from_template("/{a}").unwrap();
    let mut copy = base.clone();
    copy.query_param("x", &["1"]);
    assert_eq!(base.query(), None);
    assert_eq!(copy.query(), Some("x=1"));
}
