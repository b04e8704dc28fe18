use pretty_assertions::assert_eq;

use crate::error::Error;
use crate::protocol::xml::parse;

const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- comment -->
<a:outer xmlns:a="urn:a" xmlns="urn:default" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <inner xsi:type="xsd:int" plain="1">text &amp; &lt;more&gt; &#65;&#x42;</inner>
  <a:inner><![CDATA[<raw>]]></a:inner>
  <nested><deep>one</deep><deep>two</deep></nested>
  <undeclared:thing/>
</a:outer>"#;

#[test]
fn test_namespaces_are_resolved() {
    let root = parse(DOC.as_bytes()).unwrap();
    assert!(root.is("urn:a", "outer"));
    assert_eq!(root.qname(), "a:outer");

    let inner = root.find_child("urn:default", "inner").unwrap();
    assert_eq!(inner.namespace(), Some("urn:default"));
    assert!(root.find_child("urn:a", "inner").is_some());
    assert!(root.find_child("urn:other", "inner").is_none());
}

#[test]
fn test_undeclared_prefix_matches_nothing() {
    let root = parse(DOC.as_bytes()).unwrap();
    let thing = root
        .child_elements()
        .find(|e| e.local_name() == "thing")
        .unwrap();
    assert_eq!(thing.namespace(), None);
}

#[test]
fn test_attributes() {
    let root = parse(DOC.as_bytes()).unwrap();
    let inner = root.find_child("urn:default", "inner").unwrap();
    assert_eq!(inner.attribute("xsi:type"), Some("xsd:int"));
    assert_eq!(
        inner.attribute_ns("http://www.w3.org/2001/XMLSchema-instance", "type"),
        Some("xsd:int")
    );
    // unprefixed attributes have no namespace
    assert_eq!(inner.attribute("plain"), Some("1"));
    assert_eq!(inner.attribute_ns("urn:default", "plain"), None);
}

#[test]
fn test_text_unescapes_references() {
    let root = parse(DOC.as_bytes()).unwrap();
    let inner = root.find_child("urn:default", "inner").unwrap();
    assert_eq!(inner.text(), "text & <more> AB");

    let cdata = root.find_child("urn:a", "inner").unwrap();
    assert_eq!(cdata.text(), "<raw>");
}

#[test]
fn test_descendants_in_document_order() {
    let root = parse(DOC.as_bytes()).unwrap();
    let deep: Vec<String> = root
        .find_descendants("urn:default", "deep")
        .into_iter()
        .map(|e| e.text())
        .collect();
    assert_eq!(deep, ["one", "two"]);
    assert_eq!(
        root.find_descendant("urn:default", "deep").unwrap().text(),
        "one"
    );
    assert_eq!(
        root.find_child("urn:default", "nested")
            .unwrap()
            .child_text("urn:default", "deep")
            .as_deref(),
        Some("one")
    );
}

#[test]
fn test_pretty_print_drops_source_indentation() {
    let root = parse(b"<a>\n   <b x=\"1\">hi</b>\n   <c/>\n</a>").unwrap();
    assert_eq!(
        root.pretty_print().unwrap(),
        "<a>\n  <b x=\"1\">hi</b>\n  <c/>\n</a>"
    );
}

#[test]
fn test_malformed_documents() {
    assert!(matches!(
        parse(b"<a><b></a>"),
        Err(Error::MalformedResponse { .. })
    ));
    assert!(matches!(parse(b""), Err(Error::MalformedResponse { .. })));
    assert!(matches!(
        parse(b"<a/><b/>"),
        Err(Error::MalformedResponse { .. })
    ));
    assert!(matches!(
        parse(b"<a>"),
        Err(Error::MalformedResponse { .. })
    ));
    assert!(matches!(
        parse(b"<a>\xff</a>"),
        Err(Error::MalformedResponse { .. })
    ));
}

#[test]
fn test_pretty_print_keeps_quotes_in_text() {
    let root = parse(b"<a><b>Catalog 'Nope' is \"gone\" &amp; &lt;lost&gt;</b></a>").unwrap();
    assert_eq!(
        root.pretty_print().unwrap(),
        "<a>\n  <b>Catalog 'Nope' is \"gone\" &amp; &lt;lost&gt;</b>\n</a>"
    );
}
