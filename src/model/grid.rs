//! Aligned view of a table, derived on demand and never stored.

use super::{ColumnBoundary, Field, Row};
use serde::Serialize;

/// A table whose ragged rows have been snapped to a fixed set of columns.
///
/// The grid borrows from the [`super::Table`] it was built from. It always
/// holds at least one row: `rows[0]` is the header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedGrid<'a> {
    /// Column intervals taken from the template row, in its field order.
    /// `None` marks a template field that had no box.
    pub columns: Vec<Option<ColumnBoundary>>,

    /// Index of the template row within the source table
    pub template_row: usize,

    /// Aligned rows in source order; the first is the header
    pub rows: Vec<AlignedRow<'a>>,

    /// Number of fields discarded because their column was already taken
    pub dropped: usize,
}

impl<'a> AlignedGrid<'a> {
    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The header row.
    pub fn header(&self) -> &AlignedRow<'a> {
        &self.rows[0]
    }

    /// Body rows (everything after the header).
    pub fn body(&self) -> &[AlignedRow<'a>] {
        &self.rows[1..]
    }

    /// Field at a row (header = 0) and column.
    pub fn cell(&self, row: usize, column: usize) -> Option<&'a Field> {
        self.rows.get(row).and_then(|r| r.cell(column))
    }
}

/// One source row spread over the grid's columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRow<'a> {
    /// Index of this row within the source table
    pub source_index: usize,

    /// The source row (for locating the row as a whole)
    #[serde(skip)]
    pub row: &'a Row,

    /// One slot per column; `None` where no field landed
    pub cells: Vec<Option<&'a Field>>,
}

impl<'a> AlignedRow<'a> {
    /// Field in a column, if one was assigned.
    pub fn cell(&self, column: usize) -> Option<&'a Field> {
        self.cells.get(column).copied().flatten()
    }

    /// Number of occupied slots.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Cell texts, empty strings for vacant slots.
    pub fn texts(&self) -> Vec<&'a str> {
        self.cells
            .iter()
            .map(|c| c.map(|f| f.text.as_str()).unwrap_or(""))
            .collect()
    }
}
