use crate::error::{Error, Result};

/// Position of a scrollable cursor over `len` rows
///
/// The position ranges over `-1..=len`: `-1` is before the first row and
/// `len` is after the last one. Only `0..len` can be read. `relative` is the
/// one move that may leave that range; the caller must check its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: isize,
    len: usize,
}

impl Cursor {
    /// A cursor before the first of `len` rows
    pub fn new(len: usize) -> Self {
        Self { position: -1, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw position, `-1` before the first row
    pub fn position(&self) -> isize {
        self.position
    }

    fn end(&self) -> isize {
        isize::try_from(self.len).unwrap_or(isize::MAX)
    }

    pub fn is_valid(&self) -> bool {
        self.position >= 0 && self.position < self.end()
    }

    /// 0-based index of the current row
    pub fn index(&self) -> Result<usize> {
        match usize::try_from(self.position) {
            Ok(index) if index < self.len => Ok(index),
            _ => Err(Error::InvalidCursorPosition {
                position: self.position,
                row_count: self.len,
            }),
        }
    }

    /// 1-based number of the current row, 0 when not on a row
    pub fn row(&self) -> usize {
        self.index().map_or(0, |index| index + 1)
    }

    /// Advance one row. Stops at the after-last position.
    pub fn next(&mut self) -> bool {
        if self.position < self.end() {
            self.position += 1;
        }
        self.position < self.end()
    }

    /// Step back one row, stopping at before-first.
    ///
    /// Returns `true` only when the cursor is now before the first row, not
    /// when it landed on a row. Callers depend on this reading; check
    /// [`Cursor::is_valid`] to learn whether a row is available.
    pub fn previous(&mut self) -> bool {
        self.position = self.position.saturating_sub(1).max(-1);
        self.position == -1
    }

    /// Move to row `row` (1-based). Negative values count from the end,
    /// `-1` being the last row. `0` moves before the first row.
    pub fn absolute(&mut self, row: isize) -> bool {
        self.position = if row < 0 {
            self.end().saturating_add(row).max(-1)
        } else {
            (row - 1).min(self.end())
        };
        self.is_valid()
    }

    /// Move by `delta` rows without clamping
    pub fn relative(&mut self, delta: isize) -> bool {
        self.position = self.position.saturating_add(delta);
        self.is_valid()
    }

    pub fn first(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        self.position = 0;
        true
    }

    pub fn last(&mut self) -> bool {
        self.position = self.end() - 1;
        self.is_valid()
    }

    pub fn before_first(&mut self) {
        self.position = -1;
    }

    pub fn after_last(&mut self) {
        if self.len > 0 {
            self.position = self.end();
        }
    }

    pub fn is_before_first(&self) -> bool {
        self.len > 0 && self.position == -1
    }

    pub fn is_after_last(&self) -> bool {
        self.len > 0 && self.position == self.end()
    }

    pub fn is_first(&self) -> bool {
        self.len > 0 && self.position == 0
    }

    pub fn is_last(&self) -> bool {
        self.len > 0 && self.position == self.end() - 1
    }
}
