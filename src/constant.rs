/// SOAP 1.1 envelope namespace
pub const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
/// SOAP 1.1 encoding style
pub const SOAP_ENCODING: &str = "http://schemas.xmlsoap.org/soap/encoding/";
/// XML for Analysis namespace
pub const XMLA_NS: &str = "urn:schemas-microsoft-com:xml-analysis";
/// Tabular (rowset) result namespace
pub const ROWSET_NS: &str = "urn:schemas-microsoft-com:xml-analysis:rowset";
/// Multidimensional (dataset) result namespace
pub const MDDATASET_NS: &str = "urn:schemas-microsoft-com:xml-analysis:mddataset";
/// XML schema namespace used by the inline row schema
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";
/// XML schema instance namespace (`xsi:type`)
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
/// Namespace of the `sql:field` column label attribute
pub const SQL_NS: &str = "urn:schemas-microsoft-com:xml-sql";

/// SOAPAction header values
pub const SOAP_ACTION_DISCOVER: &str = "urn:schemas-microsoft-com:xml-analysis:Discover";
pub const SOAP_ACTION_EXECUTE: &str = "urn:schemas-microsoft-com:xml-analysis:Execute";

/// Name of the axis holding the WHERE clause members
pub const SLICER_AXIS: &str = "SlicerAxis";

/// XMLA method carried in a request envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Execute,
    Discover,
}

impl Operation {
    /// Local name of the request element
    pub fn request_element(self) -> &'static str {
        match self {
            Operation::Execute => "Execute",
            Operation::Discover => "Discover",
        }
    }

    /// Local name of the response element wrapping `return`
    pub fn response_element(self) -> &'static str {
        match self {
            Operation::Execute => "ExecuteResponse",
            Operation::Discover => "DiscoverResponse",
        }
    }

    pub fn soap_action(self) -> &'static str {
        match self {
            Operation::Execute => SOAP_ACTION_EXECUTE,
            Operation::Discover => SOAP_ACTION_DISCOVER,
        }
    }
}

/// Value of the `Format` property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Tabular,
    Multidimensional,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Tabular => "Tabular",
            Format::Multidimensional => "Multidimensional",
        }
    }
}
