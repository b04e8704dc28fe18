//! Moving request bytes to the server and response bytes back.

mod handle;
mod http;

pub use handle::TransportHandle;
pub use http::HttpTransport;

use auto_impl::auto_impl;

use crate::error::Result;

/// One request/response round trip of complete SOAP documents
///
/// `close` releases whatever the transport holds open. It is called at most
/// once, by the [`TransportHandle`] owning the transport.
#[auto_impl(&, Box, Arc)]
pub trait Transport: Send + Sync {
    fn send(&self, request: &[u8]) -> Result<Vec<u8>>;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod http_test;
