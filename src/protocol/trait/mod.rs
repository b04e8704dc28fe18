use crate::cellset::{Axis, OlapInfo};
use crate::col::Column;
use crate::error::Result;
use crate::protocol::xml::Element;
use crate::value::Value;

/// Event callbacks for a tabular (rowset) payload
///
/// `on_columns` is called once with the schema, then `on_row` once per row in
/// document order, then `on_finish`.
pub trait RowSetHandler {
    fn on_columns(&mut self, columns: &[Column]) -> Result<()>;
    fn on_row(&mut self, columns: &[Column], row: Element) -> Result<()>;
    fn on_finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Event callbacks for a multidimensional (dataset) payload
///
/// Axes arrive in document order (the slicer axis included), then every
/// cell present in the payload. Cells that are absent are NULL.
pub trait CellSetHandler {
    fn on_olap_info(&mut self, info: OlapInfo) -> Result<()>;
    fn on_axis(&mut self, axis: Axis) -> Result<()>;
    fn on_cell(&mut self, ordinal: usize, cell: Element) -> Result<()>;
    fn on_finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Forward-only access to a tabular result
pub trait RowCursor {
    /// Advance to the next row; `false` once past the last row
    fn next(&mut self) -> bool;
    fn columns(&self) -> &[Column];
    /// 1-based ordinal of the column with this label
    fn find_column(&self, label: &str) -> Result<usize>;
    /// Value of column `ordinal` (1-based) in the current row
    fn value(&self, ordinal: usize) -> Result<Value>;
}

/// Random access to a tabular result
pub trait ScrollableCursor: RowCursor {
    /// Step back one row. Returns `true` only once the cursor is before the
    /// first row.
    fn previous(&mut self) -> bool;
    /// `row > 0` counts from the start (1-based), `row < 0` from the end
    fn absolute(&mut self, row: isize) -> bool;
    fn relative(&mut self, delta: isize) -> bool;
    fn first(&mut self) -> bool;
    fn last(&mut self) -> bool;
    fn before_first(&mut self);
    fn after_last(&mut self);
}
