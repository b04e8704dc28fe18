use pretty_assertions::assert_eq;

use crate::constant::{Format, SOAP_NS, XMLA_NS};
use crate::protocol::request::{Properties, write_discover, write_execute};
use crate::protocol::xml;

fn foodmart() -> Properties {
    Properties {
        catalog: Some("FoodMart".to_string()),
        data_source_info: Some("Provider=Mondrian;DataSource=MondrianFoodMart;".to_string()),
        roles: None,
    }
}

#[test]
fn test_execute_envelope() {
    let mut out = Vec::new();
    write_execute(
        &mut out,
        "SELECT [Measures].[Unit Sales] ON 0 FROM [Sales] WHERE [Store].[A&B <x>]",
        &foodmart(),
        Format::Multidimensional,
    )
    .unwrap();

    let envelope = xml::parse(&out).unwrap();
    assert!(envelope.is(SOAP_NS, "Envelope"));
    let execute = envelope
        .find_child(SOAP_NS, "Body")
        .unwrap()
        .find_child(XMLA_NS, "Execute")
        .unwrap();

    let statement = execute
        .find_child(XMLA_NS, "Command")
        .unwrap()
        .child_text(XMLA_NS, "Statement")
        .unwrap();
    assert_eq!(
        statement,
        "SELECT [Measures].[Unit Sales] ON 0 FROM [Sales] WHERE [Store].[A&B <x>]"
    );

    let list = execute
        .find_child(XMLA_NS, "Properties")
        .unwrap()
        .find_child(XMLA_NS, "PropertyList")
        .unwrap();
    let names: Vec<&str> = list.child_elements().map(|e| e.local_name()).collect();
    assert_eq!(names, ["DataSourceInfo", "Catalog", "Format", "AxisFormat"]);
    assert_eq!(list.child_text(XMLA_NS, "Catalog").as_deref(), Some("FoodMart"));
    assert_eq!(
        list.child_text(XMLA_NS, "Format").as_deref(),
        Some("Multidimensional")
    );
    assert_eq!(
        list.child_text(XMLA_NS, "AxisFormat").as_deref(),
        Some("TupleFormat")
    );
}

#[test]
fn test_tabular_execute_has_no_axis_format() {
    let mut out = Vec::new();
    write_execute(&mut out, "SELECT 1", &Properties::default(), Format::Tabular).unwrap();

    let envelope = xml::parse(&out).unwrap();
    let list = envelope
        .find_descendant(XMLA_NS, "PropertyList")
        .unwrap();
    let names: Vec<&str> = list.child_elements().map(|e| e.local_name()).collect();
    assert_eq!(names, ["Format"]);
    assert_eq!(list.child_text(XMLA_NS, "Format").as_deref(), Some("Tabular"));
}

#[test]
fn test_discover_envelope() {
    let mut out = Vec::new();
    write_discover(
        &mut out,
        "MDSCHEMA_CUBES",
        &[("CATALOG_NAME", "FoodMart"), ("CUBE_NAME", "Sales")],
        &foodmart(),
    )
    .unwrap();

    let envelope = xml::parse(&out).unwrap();
    let discover = envelope.find_descendant(XMLA_NS, "Discover").unwrap();
    assert_eq!(
        discover.child_text(XMLA_NS, "RequestType").as_deref(),
        Some("MDSCHEMA_CUBES")
    );

    let restrictions: Vec<(String, String)> = discover
        .find_descendant(XMLA_NS, "RestrictionList")
        .unwrap()
        .child_elements()
        .map(|e| (e.local_name().to_string(), e.text()))
        .collect();
    assert_eq!(
        restrictions,
        [
            ("CATALOG_NAME".to_string(), "FoodMart".to_string()),
            ("CUBE_NAME".to_string(), "Sales".to_string()),
        ]
    );

    let list = discover.find_descendant(XMLA_NS, "PropertyList").unwrap();
    assert_eq!(list.child_text(XMLA_NS, "Format").as_deref(), Some("Tabular"));
    assert_eq!(list.child_text(XMLA_NS, "Content").as_deref(), Some("SchemaData"));
}

#[test]
fn test_request_element_uses_default_namespace() {
    let mut out = Vec::new();
    write_discover(&mut out, "DISCOVER_DATASOURCES", &[], &Properties::default()).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(text.contains("<Discover xmlns=\"urn:schemas-microsoft-com:xml-analysis\">"));
}
