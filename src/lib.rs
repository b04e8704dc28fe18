pub mod cellset;
pub mod col;
mod opts;
pub mod constant;
pub mod cursor;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod raw;
pub mod rowset;
pub mod transport;
pub mod value;
pub mod xsd;

pub use cellset::CellSet;
pub use opts::Opts;
pub use protocol::r#trait::{RowCursor, ScrollableCursor};
pub use rowset::RowSet;
pub use value::Value;

#[cfg(feature = "sync")]
pub mod sync;

#[cfg(feature = "tokio")]
pub mod tokio;
