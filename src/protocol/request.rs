use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::constant::{Format, Operation, SOAP_ENCODING, SOAP_NS, XMLA_NS};
use crate::error::{Error, Result, eyre};
use crate::opts::Opts;

/// Session properties sent in every `PropertyList`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pub catalog: Option<String>,
    pub data_source_info: Option<String>,
    pub roles: Option<String>,
}

impl From<&Opts> for Properties {
    fn from(opts: &Opts) -> Self {
        Self {
            catalog: opts.catalog.clone(),
            data_source_info: opts.data_source_info.clone(),
            roles: opts.roles.clone(),
        }
    }
}

/// Write an `Execute` request for `statement`
///
/// ```text
/// <SOAP-ENV:Envelope>
///   <SOAP-ENV:Body>
///     <Execute xmlns="urn:schemas-microsoft-com:xml-analysis">
///       <Command><Statement>SELECT ...</Statement></Command>
///       <Properties><PropertyList>...</PropertyList></Properties>
///     </Execute>
///   </SOAP-ENV:Body>
/// </SOAP-ENV:Envelope>
/// ```
pub fn write_execute(
    out: &mut Vec<u8>,
    statement: &str,
    properties: &Properties,
    format: Format,
) -> Result<()> {
    let mut writer = Writer::new(out);
    open_envelope(&mut writer, Operation::Execute)?;

    start(&mut writer, "Command")?;
    text_element(&mut writer, "Statement", statement)?;
    end(&mut writer, "Command")?;

    start(&mut writer, "Properties")?;
    start(&mut writer, "PropertyList")?;
    write_session_properties(&mut writer, properties)?;
    text_element(&mut writer, "Format", format.as_str())?;
    if format == Format::Multidimensional {
        text_element(&mut writer, "AxisFormat", "TupleFormat")?;
    }
    end(&mut writer, "PropertyList")?;
    end(&mut writer, "Properties")?;

    close_envelope(&mut writer, Operation::Execute)
}

/// Write a `Discover` request for the schema rowset `request_type`
///
/// Restrictions are written in the given order as `<name>value</name>`
/// children of `RestrictionList`.
pub fn write_discover(
    out: &mut Vec<u8>,
    request_type: &str,
    restrictions: &[(&str, &str)],
    properties: &Properties,
) -> Result<()> {
    let mut writer = Writer::new(out);
    open_envelope(&mut writer, Operation::Discover)?;

    text_element(&mut writer, "RequestType", request_type)?;

    start(&mut writer, "Restrictions")?;
    start(&mut writer, "RestrictionList")?;
    for (name, value) in restrictions {
        text_element(&mut writer, name, value)?;
    }
    end(&mut writer, "RestrictionList")?;
    end(&mut writer, "Restrictions")?;

    start(&mut writer, "Properties")?;
    start(&mut writer, "PropertyList")?;
    write_session_properties(&mut writer, properties)?;
    text_element(&mut writer, "Format", Format::Tabular.as_str())?;
    text_element(&mut writer, "Content", "SchemaData")?;
    end(&mut writer, "PropertyList")?;
    end(&mut writer, "Properties")?;

    close_envelope(&mut writer, Operation::Discover)
}

type XmlWriter<'a> = Writer<&'a mut Vec<u8>>;

fn open_envelope(writer: &mut XmlWriter<'_>, operation: Operation) -> Result<()> {
    write(writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write(
        writer,
        Event::Start(BytesStart::new("SOAP-ENV:Envelope").with_attributes([
            ("xmlns:SOAP-ENV", SOAP_NS),
            ("SOAP-ENV:encodingStyle", SOAP_ENCODING),
        ])),
    )?;
    start(writer, "SOAP-ENV:Body")?;
    // The transport picks the SOAPAction from this exact start tag
    write(
        writer,
        Event::Start(
            BytesStart::new(operation.request_element()).with_attributes([("xmlns", XMLA_NS)]),
        ),
    )
}

fn close_envelope(writer: &mut XmlWriter<'_>, operation: Operation) -> Result<()> {
    end(writer, operation.request_element())?;
    end(writer, "SOAP-ENV:Body")?;
    end(writer, "SOAP-ENV:Envelope")
}

fn write_session_properties(writer: &mut XmlWriter<'_>, properties: &Properties) -> Result<()> {
    if let Some(data_source_info) = &properties.data_source_info {
        text_element(writer, "DataSourceInfo", data_source_info)?;
    }
    if let Some(catalog) = &properties.catalog {
        text_element(writer, "Catalog", catalog)?;
    }
    if let Some(roles) = &properties.roles {
        text_element(writer, "Roles", roles)?;
    }
    Ok(())
}

fn text_element(writer: &mut XmlWriter<'_>, name: &str, text: &str) -> Result<()> {
    start(writer, name)?;
    write(writer, Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

fn start(writer: &mut XmlWriter<'_>, name: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))
}

fn end(writer: &mut XmlWriter<'_>, name: &str) -> Result<()> {
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut XmlWriter<'_>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::LibraryBug(eyre!("failed to write XML request: {e}")))
}
