use crate::col::Column;
use crate::constant::ROWSET_NS;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::protocol::r#trait::{RowCursor, RowSetHandler, ScrollableCursor};
use crate::protocol::xml::Element;
use crate::raw::{self, FromXsdValue};
use crate::value::Value;

/// A fully buffered tabular result with a scrollable cursor
///
/// Also used as the handler that collects the result.
#[derive(Debug, Clone)]
pub struct RowSet {
    columns: Vec<Column>,
    rows: Vec<Element>,
    cursor: Cursor,
}

impl Default for RowSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RowSet {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            cursor: Cursor::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column by 1-based ordinal
    pub fn column(&self, ordinal: usize) -> Result<&Column> {
        column_at(&self.columns, ordinal)
    }

    /// 1-based number of the current row, 0 when not on a row
    pub fn row(&self) -> usize {
        self.cursor.row()
    }

    pub fn is_before_first(&self) -> bool {
        self.cursor.is_before_first()
    }

    pub fn is_after_last(&self) -> bool {
        self.cursor.is_after_last()
    }

    pub fn is_first(&self) -> bool {
        self.cursor.is_first()
    }

    pub fn is_last(&self) -> bool {
        self.cursor.is_last()
    }

    /// The row under the cursor
    pub fn current(&self) -> Result<Row<'_>> {
        let index = self.cursor.index()?;
        Ok(Row {
            columns: &self.columns,
            element: &self.rows[index],
        })
    }

    /// Typed value of column `ordinal` in the current row
    pub fn get<T: FromXsdValue>(&self, ordinal: usize) -> Result<T> {
        self.current()?.get(ordinal)
    }

    pub fn get_by_label<T: FromXsdValue>(&self, label: &str) -> Result<T> {
        self.current()?.get_by_label(label)
    }

    /// Iterate over all rows, independent of the cursor
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|element| Row {
            columns: &self.columns,
            element,
        })
    }
}

impl RowSetHandler for RowSet {
    fn on_columns(&mut self, columns: &[Column]) -> Result<()> {
        self.columns = columns.to_vec();
        self.rows.clear();
        self.cursor = Cursor::new(0);
        Ok(())
    }

    fn on_row(&mut self, _: &[Column], row: Element) -> Result<()> {
        self.rows.push(row);
        self.cursor = Cursor::new(self.rows.len());
        Ok(())
    }
}

impl RowCursor for RowSet {
    fn next(&mut self) -> bool {
        self.cursor.next()
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn find_column(&self, label: &str) -> Result<usize> {
        find_column(&self.columns, label)
    }

    fn value(&self, ordinal: usize) -> Result<Value> {
        self.current()?.value(ordinal)
    }
}

impl ScrollableCursor for RowSet {
    fn previous(&mut self) -> bool {
        self.cursor.previous()
    }

    fn absolute(&mut self, row: isize) -> bool {
        self.cursor.absolute(row)
    }

    fn relative(&mut self, delta: isize) -> bool {
        self.cursor.relative(delta)
    }

    fn first(&mut self) -> bool {
        self.cursor.first()
    }

    fn last(&mut self) -> bool {
        self.cursor.last()
    }

    fn before_first(&mut self) {
        self.cursor.before_first();
    }

    fn after_last(&mut self) {
        self.cursor.after_last();
    }
}

/// One row of a [`RowSet`]
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [Column],
    element: &'a Element,
}

impl<'a> Row<'a> {
    pub fn columns(&self) -> &'a [Column] {
        self.columns
    }

    /// The `<row>` element as received
    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Value of column `ordinal` (1-based). An absent field is NULL.
    pub fn value(&self, ordinal: usize) -> Result<Value> {
        let column = column_at(self.columns, ordinal)?;
        raw::extract(self.element, ROWSET_NS, &column.name, column.xsd_type)
    }

    pub fn value_by_label(&self, label: &str) -> Result<Value> {
        self.value(find_column(self.columns, label)?)
    }

    pub fn get<T: FromXsdValue>(&self, ordinal: usize) -> Result<T> {
        raw::decode(self.value(ordinal)?)
    }

    pub fn get_by_label<T: FromXsdValue>(&self, label: &str) -> Result<T> {
        raw::decode(self.value_by_label(label)?)
    }

    /// All values in column order
    pub fn values(&self) -> Result<Vec<Value>> {
        (1..=self.columns.len()).map(|ordinal| self.value(ordinal)).collect()
    }
}

fn column_at(columns: &[Column], ordinal: usize) -> Result<&Column> {
    ordinal
        .checked_sub(1)
        .and_then(|index| columns.get(index))
        .ok_or_else(|| Error::BadUsageError(format!("Invalid column ordinal {ordinal}")))
}

fn find_column(columns: &[Column], label: &str) -> Result<usize> {
    columns
        .iter()
        .find(|c| c.label == label)
        .map(|c| c.ordinal)
        .ok_or_else(|| Error::BadUsageError(format!("Invalid column label {label}")))
}
