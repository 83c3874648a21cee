use templated_uri::{encoding::EStr, UriBuilder};

#[test]
fn estr_validates_escapes() {
    assert!(EStr::new("a%20b").is_some());
    assert!(EStr::new("%E5%BC%A0").is_some());
    assert!(EStr::new("a%2xb").is_none());
    assert!(EStr::new("abc%").is_none());
}

#[test]
fn estr_decodes() {
    let dec = EStr::new_or_panic("%E5%BC%A0%E4%B8%89").decode();
    assert!(dec.decoded_any());
    assert_eq!(dec.into_string().unwrap(), "张三");

    let dec = EStr::new_or_panic("plain").decode();
    assert!(!dec.decoded_any());
    assert_eq!(dec.as_bytes(), b"plain");
}

#[test]
fn estr_splits_query_pairs() {
    let query = EStr::new_or_panic("a=1&b=2&c");
    let pairs: Vec<_> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.as_str(), v.as_str()),
            None => (pair.as_str(), ""),
        })
        .collect();
    assert_eq!(pairs, [("a", "1"), ("b", "2"), ("c", "")]);
}

#[test]
fn built_components_are_percent_encoded() {
    let uri = UriBuilder::from_template("/x?msg={m}")
        .unwrap()
        .build(&["a b"])
        .unwrap();
    let query = uri.query().unwrap();
    assert_eq!(query.as_str(), "msg=a%20b");
    assert_eq!(query.decode().into_string().unwrap(), "msg=a b");
}

#[test]
fn multibyte_values_encode_per_byte() {
    let uri = UriBuilder::from_template("/names/{n}")
        .unwrap()
        .build(&["张"])
        .unwrap();
    assert_eq!(uri.as_str(), "/names/%E5%BC%A0");
    assert_eq!(uri.path().decode().into_string().unwrap(), "/names/张");
}

#[test]
fn fresh_and_preserve_for_path_values() {
    let b = UriBuilder::from_template("/{p}").unwrap();
    assert_eq!(b.build(&["a%2Fb"]).unwrap().as_str(), "/a%252Fb");
    assert_eq!(b.build_from_encoded(&["a%2Fb"]).unwrap().as_str(), "/a%2Fb");
}
