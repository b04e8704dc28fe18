use std::sync::Arc;

use crate::cellset::CellSet;
use crate::constant::{Format, Operation};
use crate::error::{Error, Result};
use crate::handler::FirstRowHandler;
use crate::opts::Opts;
use crate::protocol::envelope::read_response;
use crate::protocol::request::{Properties, write_discover, write_execute};
use crate::protocol::r#trait::{CellSetHandler, RowSetHandler};
use crate::protocol::{read_cellset, read_rowset};
use crate::rowset::RowSet;
use crate::transport::{HttpTransport, Transport, TransportHandle};
use crate::value::Value;

type SharedHandle = Arc<TransportHandle<Box<dyn Transport>>>;

/// A blocking XMLA connection
///
/// Each `Conn` owns one count on a shared [`TransportHandle`]. Clones made
/// with [`Conn::try_clone`] share the transport, which is closed when the
/// last of them is dropped.
pub struct Conn {
    handle: SharedHandle,
    properties: Properties,
    /// Reusable buffer for building requests
    write_buffer: Vec<u8>,
}

impl Conn {
    /// Create a new connection from connection options
    pub fn new<O: TryInto<Opts>>(opts: O) -> Result<Self>
    where
        Error: From<O::Error>,
    {
        let opts: Opts = opts.try_into()?;
        let transport = HttpTransport::new(&opts)?;
        Ok(Self::with_transport(transport, &opts))
    }

    /// Create a connection over an existing transport
    pub fn with_transport<T: Transport + 'static>(transport: T, opts: &Opts) -> Self {
        let transport: Box<dyn Transport> = Box::new(transport);
        Self {
            handle: Arc::new(TransportHandle::new(transport)),
            properties: Properties::from(opts),
            write_buffer: Vec::new(),
        }
    }

    /// A second connection sharing this one's transport
    pub fn try_clone(&self) -> Result<Self> {
        self.handle.retain()?;
        Ok(Self {
            handle: Arc::clone(&self.handle),
            properties: self.properties.clone(),
            write_buffer: Vec::new(),
        })
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// Number of connections sharing the transport
    pub fn ref_count(&self) -> usize {
        self.handle.ref_count()
    }

    /// Execute an MDX statement and return the multidimensional result
    pub fn execute(&mut self, mdx: &str) -> Result<CellSet> {
        let mut cell_set = CellSet::new();
        self.execute_cellset_with(mdx, &mut cell_set)?;
        Ok(cell_set)
    }

    pub fn execute_cellset_with<H: CellSetHandler>(
        &mut self,
        mdx: &str,
        handler: &mut H,
    ) -> Result<()> {
        self.write_buffer.clear();
        write_execute(
            &mut self.write_buffer,
            mdx,
            &self.properties,
            Format::Multidimensional,
        )?;
        let response = self.handle.send(&self.write_buffer)?;
        let payload = read_response(&response, Operation::Execute)?;
        read_cellset(payload, handler)
    }

    /// Execute a statement and return the result flattened into rows
    pub fn execute_rowset(&mut self, statement: &str) -> Result<RowSet> {
        let mut row_set = RowSet::new();
        self.execute_with(statement, &mut row_set)?;
        Ok(row_set)
    }

    /// Execute a statement with a tabular result, feeding it to `handler`
    pub fn execute_with<H: RowSetHandler>(&mut self, statement: &str, handler: &mut H) -> Result<()> {
        self.write_buffer.clear();
        write_execute(
            &mut self.write_buffer,
            statement,
            &self.properties,
            Format::Tabular,
        )?;
        let response = self.handle.send(&self.write_buffer)?;
        let payload = read_response(&response, Operation::Execute)?;
        read_rowset(payload, handler)
    }

    /// Values of the first row, `None` for an empty result
    pub fn execute_first(&mut self, statement: &str) -> Result<Option<Vec<Value>>> {
        let mut row_set = RowSet::new();
        let mut handler = FirstRowHandler::new(&mut row_set);
        self.execute_with(statement, &mut handler)?;
        row_set.rows().next().map(|row| row.values()).transpose()
    }

    /// Fetch the schema rowset `request_type`, e.g. `MDSCHEMA_CUBES`
    pub fn discover(&mut self, request_type: &str, restrictions: &[(&str, &str)]) -> Result<RowSet> {
        let mut row_set = RowSet::new();
        self.discover_with(request_type, restrictions, &mut row_set)?;
        Ok(row_set)
    }

    pub fn discover_with<H: RowSetHandler>(
        &mut self,
        request_type: &str,
        restrictions: &[(&str, &str)],
        handler: &mut H,
    ) -> Result<()> {
        self.write_buffer.clear();
        write_discover(
            &mut self.write_buffer,
            request_type,
            restrictions,
            &self.properties,
        )?;
        let response = self.handle.send(&self.write_buffer)?;
        let payload = read_response(&response, Operation::Discover)?;
        read_rowset(payload, handler)
    }
}

impl Drop for Conn {
    fn drop(&mut self) {
        if let Err(e) = self.handle.release() {
            tracing::warn!(error = %e, "failed to release transport handle");
        }
    }
}
