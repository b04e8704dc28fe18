use crate::constant::{Operation, SOAP_NS, XMLA_NS};
use crate::error::{Error, Result};
use crate::protocol::fault::FaultPayload;
use crate::protocol::xml::{self, Element};

/// Read a SOAP response and return its `return` payload element
///
/// ```text
/// <SOAP-ENV:Envelope>
///   <SOAP-ENV:Header/>
///   <SOAP-ENV:Body>
///     <xmla:ExecuteResponse>
///       <xmla:return>
///         <root>...</root>
///       </xmla:return>
///     </xmla:ExecuteResponse>
///   </SOAP-ENV:Body>
/// </SOAP-ENV:Envelope>
/// ```
///
/// A `Fault` under the body aborts with [`Error::ServerFault`] before the
/// response element is looked at, even if row data is present next to it.
#[tracing::instrument(skip_all, fields(operation = ?operation))]
pub fn read_response(bytes: &[u8], operation: Operation) -> Result<Element> {
    let envelope = xml::parse(bytes)?;
    read_envelope(envelope, operation)
}

/// Same as [`read_response`] for an already parsed document
pub fn read_envelope(envelope: Element, operation: Operation) -> Result<Element> {
    if !envelope.is(SOAP_NS, "Envelope") {
        return Err(Error::malformed(format!(
            "expected SOAP Envelope, found <{}>",
            envelope.qname()
        )));
    }

    let body = envelope
        .into_child(SOAP_NS, "Body")
        .ok_or_else(|| Error::malformed("SOAP Envelope has no Body"))?;

    if let Some(fault) = body.find_child(SOAP_NS, "Fault") {
        let payload = FaultPayload::try_from(fault)?;
        tracing::debug!(code = ?payload.code, "SOAP fault in response");
        return Err(payload.into());
    }

    let response_name = operation.response_element();
    body.into_child(XMLA_NS, response_name)
        .ok_or_else(|| Error::malformed(format!("SOAP Body has no {response_name}")))?
        .into_child(XMLA_NS, "return")
        .ok_or_else(|| Error::malformed(format!("{response_name} has no return element")))
}
