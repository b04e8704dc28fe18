use std::io::Read;
use std::sync::Mutex;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use simdutf8::basic::from_utf8;

use crate::constant::{SOAP_ACTION_DISCOVER, SOAP_ACTION_EXECUTE};
use crate::error::{Error, Result, eyre};
use crate::opts::Opts;
use crate::transport::Transport;

const DISCOVER_TAG: &[u8] = b"<Discover xmlns=\"urn:schemas-microsoft-com:xml-analysis\"";
const EXECUTE_TAG: &[u8] = b"<Execute xmlns=\"urn:schemas-microsoft-com:xml-analysis\"";

/// XMLA over HTTP POST
///
/// Gzip-encoded responses are decoded by the agent. With `cookies` enabled
/// one agent (and its cookie jar) serves every request; otherwise each
/// request gets a fresh agent.
pub struct HttpTransport {
    url: String,
    authorization: Option<String>,
    timeout: Option<Duration>,
    keep_cookies: bool,
    /// `None` once closed
    agent: Mutex<Option<ureq::Agent>>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .field("keep_cookies", &self.keep_cookies)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(opts: &Opts) -> Result<Self> {
        let mut url = url::Url::parse(&opts.url)
            .map_err(|e| Error::BadConfigError(format!("Failed to parse XMLA URL: {}", e)))?;

        // Explicit credentials win over the userinfo of the endpoint
        let credentials = if !opts.user.is_empty() {
            format!("{}:{}", opts.user, opts.password.as_deref().unwrap_or(""))
        } else if !url.username().is_empty() {
            format!("{}:{}", url.username(), url.password().unwrap_or(""))
        } else {
            String::new()
        };
        let authorization =
            (!credentials.is_empty()).then(|| format!("Basic {}", BASE64.encode(credentials)));

        let _ = url.set_username("");
        let _ = url.set_password(None);

        Ok(Self {
            url: url.to_string(),
            authorization,
            timeout: opts.timeout,
            keep_cookies: opts.cookies,
            agent: Mutex::new(Some(build_agent(opts.timeout))),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `Authorization` header value, `None` without credentials
    pub(crate) fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    fn agent(&self) -> Result<ureq::Agent> {
        let guard = self
            .agent
            .lock()
            .map_err(|_| Error::LibraryBug(eyre!("HTTP agent lock poisoned")))?;
        let agent = guard.as_ref().ok_or(Error::HandleClosed)?;
        if self.keep_cookies {
            Ok(agent.clone())
        } else {
            Ok(build_agent(self.timeout))
        }
    }
}

impl Transport for HttpTransport {
    #[tracing::instrument(skip_all, fields(url = %self.url))]
    fn send(&self, request: &[u8]) -> Result<Vec<u8>> {
        let mut call = self
            .agent()?
            .post(&self.url)
            .set("Content-Type", "text/xml; charset=UTF-8")
            .set("Accept", "text/xml;q=1")
            .set("Accept-Charset", "UTF-8;q=1");
        if let Some(action) = soap_action(request) {
            call = call.set("SOAPAction", action);
        }
        if let Some(authorization) = self.authorization() {
            call = call.set("Authorization", authorization);
        }

        tracing::debug!(request_len = request.len(), "POST");
        match call.send_bytes(request) {
            Ok(response) => {
                let mut body = Vec::new();
                response.into_reader().read_to_end(&mut body)?;
                Ok(body)
            }
            Err(ureq::Error::Status(status, response)) => {
                let mut body = Vec::new();
                response.into_reader().read_to_end(&mut body)?;
                let body = match from_utf8(&body) {
                    Ok(text) => text.to_string(),
                    Err(_) => String::from_utf8_lossy(&body).into_owned(),
                };
                Err(Error::HttpStatus { status, body })
            }
            Err(ureq::Error::Transport(e)) => Err(Error::transport(e)),
        }
    }

    fn close(&self) -> Result<()> {
        let mut guard = self
            .agent
            .lock()
            .map_err(|_| Error::LibraryBug(eyre!("HTTP agent lock poisoned")))?;
        guard.take();
        Ok(())
    }
}

fn build_agent(timeout: Option<Duration>) -> ureq::Agent {
    let mut builder = ureq::AgentBuilder::new();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// SOAPAction for a request, chosen from its method element
pub fn soap_action(request: &[u8]) -> Option<&'static str> {
    if contains(request, DISCOVER_TAG) {
        Some(SOAP_ACTION_DISCOVER)
    } else if contains(request, EXECUTE_TAG) {
        Some(SOAP_ACTION_EXECUTE)
    } else {
        None
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
