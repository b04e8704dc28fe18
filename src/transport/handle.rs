use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Error, Result};
use crate::transport::Transport;

/// A transport shared by several connections
///
/// The retain count starts at 1 for the creator. The release that takes the
/// count from 1 to 0 closes the transport; no other call ever does, so the
/// transport is closed exactly once.
#[derive(Debug)]
pub struct TransportHandle<T> {
    transport: T,
    count: AtomicUsize,
}

impl<T: Transport> TransportHandle<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            count: AtomicUsize::new(1),
        }
    }

    pub fn ref_count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.ref_count() == 0
    }

    /// Add one owner and return the new count
    ///
    /// A closed handle cannot be revived.
    pub fn retain(&self) -> Result<usize> {
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                if count == 0 {
                    None
                } else {
                    count.checked_add(1)
                }
            })
            .map(|previous| previous + 1)
            .map_err(|_| Error::HandleClosed)
    }

    /// Drop one owner. Returns `true` if this call closed the transport.
    pub fn release(&self) -> Result<bool> {
        let previous = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            })
            .map_err(|_| Error::HandleClosed)?;

        if previous == 1 {
            tracing::debug!("closing transport");
            self.transport.close()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    #[tracing::instrument(skip_all, fields(request_len = request.len()))]
    pub fn send(&self, request: &[u8]) -> Result<Vec<u8>> {
        if self.is_closed() {
            return Err(Error::HandleClosed);
        }
        let response = self.transport.send(request)?;
        tracing::debug!(response_len = response.len(), "received response");
        Ok(response)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
