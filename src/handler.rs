use crate::col::Column;
use crate::error::Result;
use crate::protocol::r#trait::RowSetHandler;
use crate::protocol::xml::Element;

/// A handler that discards rows and only counts them
///
/// Useful for checking the size of a Discover rowset without keeping it.
#[derive(Default)]
pub struct CountHandler {
    num_columns: usize,
    num_rows: usize,
}

impl CountHandler {
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }
}

impl RowSetHandler for CountHandler {
    fn on_columns(&mut self, columns: &[Column]) -> Result<()> {
        self.num_columns = columns.len();
        self.num_rows = 0;
        Ok(())
    }

    fn on_row(&mut self, _: &[Column], _: Element) -> Result<()> {
        self.num_rows += 1;
        Ok(())
    }
}

/// A wrapper handler that forwards calls to an inner handler but stops after the first row
///
/// Useful for `execute_first()` which only looks at the first row.
pub struct FirstRowHandler<'a, H> {
    pub inner: &'a mut H,
    pub found_row: bool,
}

impl<'a, H> FirstRowHandler<'a, H> {
    pub fn new(inner: &'a mut H) -> Self {
        Self {
            inner,
            found_row: false,
        }
    }
}

impl<'a, H: RowSetHandler> RowSetHandler for FirstRowHandler<'a, H> {
    fn on_columns(&mut self, columns: &[Column]) -> Result<()> {
        self.inner.on_columns(columns)
    }

    fn on_row(&mut self, columns: &[Column], row: Element) -> Result<()> {
        if !self.found_row {
            self.found_row = true;
            self.inner.on_row(columns, row)
        } else {
            Ok(()) // Ignore subsequent rows
        }
    }

    fn on_finish(&mut self) -> Result<()> {
        self.inner.on_finish()
    }
}
