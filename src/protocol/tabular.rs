use crate::col::Column;
use crate::constant::{ROWSET_NS, SQL_NS, XSD_NS};
use crate::error::{Error, Result};
use crate::protocol::r#trait::RowSetHandler;
use crate::protocol::xml::Element;
use crate::xsd::XsdType;

/// Read a rowset payload and feed it to `handler`
///
/// ```text
/// <return>
///   <root xmlns="urn:schemas-microsoft-com:xml-analysis:rowset">
///     <xsd:schema>
///       <xsd:complexType name="row">...column declarations...</xsd:complexType>
///     </xsd:schema>
///     <row><CATALOG_NAME>FoodMart</CATALOG_NAME>...</row>
///     ...
///   </root>
/// </return>
/// ```
///
/// Rows are passed on in document order.
#[tracing::instrument(skip_all)]
pub fn read_rowset<H: RowSetHandler>(payload: Element, handler: &mut H) -> Result<()> {
    let root = payload
        .into_child(ROWSET_NS, "root")
        .ok_or_else(|| Error::malformed("return element has no rowset root"))?;

    let columns = read_columns(&root);
    handler.on_columns(&columns)?;

    let mut num_rows = 0_usize;
    for element in root.into_child_elements() {
        if element.local_name() == "row" {
            handler.on_row(&columns, element)?;
            num_rows += 1;
        }
    }
    tracing::debug!(num_columns = columns.len(), num_rows, "read rowset");

    handler.on_finish()
}

/// Column table from the `row` complex type of the inline schema.
///
/// A payload without a schema has no columns.
pub fn read_columns(root: &Element) -> Vec<Column> {
    let row_type = root
        .find_descendants(XSD_NS, "complexType")
        .into_iter()
        .find(|e| e.attribute("name") == Some("row"));
    let Some(row_type) = row_type else {
        return Vec::new();
    };

    row_type
        .find_descendants(XSD_NS, "element")
        .into_iter()
        .enumerate()
        .map(|(i, decl)| {
            let name = decl.attribute("name").unwrap_or_default().to_string();
            let label = decl
                .attribute_ns(SQL_NS, "field")
                .or_else(|| decl.attribute("sql:field"))
                .map_or_else(|| name.clone(), str::to_string);
            let xsd_type = XsdType::from_name(decl.attribute("type").unwrap_or_default());
            tracing::trace!(ordinal = i + 1, %name, %label, %xsd_type, "column");
            Column::new(i + 1, name, label, xsd_type)
        })
        .collect()
}
