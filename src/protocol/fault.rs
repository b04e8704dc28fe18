use crate::error::Result;
use crate::protocol::xml::Element;

/// SOAP Fault returned in place of a result
///
/// ```text
/// <SOAP-ENV:Fault>
///   <faultcode>SOAP-ENV:Client.00HSBC01</faultcode>
///   <faultstring>XMLA connection datasource not found</faultstring>
///   <faultactor>Mondrian</faultactor>
///   <detail>...</detail>
/// </SOAP-ENV:Fault>
/// ```
#[derive(Debug, Clone, thiserror::Error)]
#[error("XMLA provider gave exception: {pretty}")]
pub struct FaultPayload {
    pub code: Option<String>,
    pub string: Option<String>,
    pub actor: Option<String>,
    pub detail: Option<String>,
    /// The whole Fault subtree, pretty-printed
    pub pretty: String,
}

impl TryFrom<&Element> for FaultPayload {
    type Error = crate::error::Error;

    fn try_from(fault: &Element) -> Result<Self> {
        // Fault children are unqualified
        let child = |name: &str| {
            fault
                .child_elements()
                .find(|e| e.local_name() == name)
                .map(|e| e.text().trim().to_string())
        };
        let detail = fault
            .child_elements()
            .find(|e| e.local_name() == "detail")
            .map(Element::pretty_print)
            .transpose()?;

        Ok(FaultPayload {
            code: child("faultcode"),
            string: child("faultstring"),
            actor: child("faultactor"),
            detail,
            pretty: fault.pretty_print()?,
        })
    }
}
