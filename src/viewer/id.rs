//! Identifiers of locatable items on the current page.
//!
//! Indices refer to the page's full element list, so an id stays valid while
//! a search filters what is shown. Row indices count body rows only; column
//! indices are aligned-grid columns.

use std::fmt;
use std::str::FromStr;

use crate::align::{reconstruct_with_options, AlignOptions};
use crate::error::{Error, Result};
use crate::model::{BoundingBox, ExtractedElement, Locatable};

/// One locatable item: a text block, a table, a table row or a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    /// Text block, `d-{i}`
    Text(usize),
    /// Whole table, `t-{i}`
    Table(usize),
    /// Header cell, `t{i}-h-{c}`
    HeaderCell {
        /// Table element index
        table: usize,
        /// Aligned column
        column: usize,
    },
    /// Body row, `t{i}-r{r}`
    Row {
        /// Table element index
        table: usize,
        /// Body row index
        row: usize,
    },
    /// Body cell, `t{i}-r{r}-c{c}`
    Cell {
        /// Table element index
        table: usize,
        /// Body row index
        row: usize,
        /// Aligned column
        column: usize,
    },
}

impl ElementId {
    /// Index of the page element the id points into.
    pub fn element(&self) -> usize {
        match *self {
            ElementId::Text(i) | ElementId::Table(i) => i,
            ElementId::HeaderCell { table, .. }
            | ElementId::Row { table, .. }
            | ElementId::Cell { table, .. } => table,
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Text(i) => write!(f, "d-{}", i),
            ElementId::Table(i) => write!(f, "t-{}", i),
            ElementId::HeaderCell { table, column } => write!(f, "t{}-h-{}", table, column),
            ElementId::Row { table, row } => write!(f, "t{}-r{}", table, row),
            ElementId::Cell { table, row, column } => {
                write!(f, "t{}-r{}-c{}", table, row, column)
            }
        }
    }
}

impl FromStr for ElementId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidElementId(s.to_string());

        if let Some(rest) = s.strip_prefix("d-") {
            return index(rest).map(ElementId::Text).ok_or_else(invalid);
        }
        let rest = s.strip_prefix('t').ok_or_else(invalid)?;
        if let Some(rest) = rest.strip_prefix('-') {
            return index(rest).map(ElementId::Table).ok_or_else(invalid);
        }

        let (table, rest) = rest.split_once('-').ok_or_else(invalid)?;
        let table = index(table).ok_or_else(invalid)?;

        if let Some(column) = rest.strip_prefix("h-") {
            let column = index(column).ok_or_else(invalid)?;
            return Ok(ElementId::HeaderCell { table, column });
        }

        let rest = rest.strip_prefix('r').ok_or_else(invalid)?;
        match rest.split_once("-c") {
            Some((row, column)) => Ok(ElementId::Cell {
                table,
                row: index(row).ok_or_else(invalid)?,
                column: index(column).ok_or_else(invalid)?,
            }),
            None => Ok(ElementId::Row {
                table,
                row: index(rest).ok_or_else(invalid)?,
            }),
        }
    }
}

fn index(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Box designated by `id` among one page's elements, if any.
///
/// Cells are resolved through the aligned grid, so a field dropped by
/// alignment has no cell and resolves to `None`.
pub fn resolve_box(
    elements: &[&ExtractedElement],
    id: ElementId,
    options: &AlignOptions,
) -> Option<BoundingBox> {
    let element = elements.get(id.element())?;
    match id {
        ElementId::Text(_) => element.as_text()?.bbox(),
        ElementId::Table(_) => element.as_table()?.bbox(),
        ElementId::Row { row, .. } => element.as_table()?.body().get(row)?.bbox(),
        ElementId::HeaderCell { column, .. } => {
            let grid = reconstruct_with_options(element.as_table()?, options)?;
            grid.header().cell(column)?.bbox()
        }
        ElementId::Cell { row, column, .. } => {
            let grid = reconstruct_with_options(element.as_table()?, options)?;
            grid.body().get(row)?.cell(column)?.bbox()
        }
    }
}
