pub mod dataset;
pub mod envelope;
pub mod fault;
pub mod request;
pub mod tabular;
pub mod r#trait;
pub mod xml;

pub use dataset::read_cellset;
pub use envelope::read_response;
pub use tabular::read_rowset;
pub use r#trait::{CellSetHandler, RowCursor, RowSetHandler, ScrollableCursor};

#[cfg(test)]
mod request_test;
#[cfg(test)]
mod xml_test;
