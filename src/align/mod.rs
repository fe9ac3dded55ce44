//! Column alignment of ragged table rows.
//!
//! Extraction emits each table row as an unordered, possibly incomplete list
//! of positioned fields. The row with the most fields (first one on ties)
//! becomes the template: its fields define the columns, in field order. Every
//! row, the header included, is then spread over those columns by comparing
//! each field's horizontal midpoint with each column's midpoint.

mod options;

pub use options::{AlignOptions, CollisionPolicy};

use rayon::prelude::*;

use crate::model::{AlignedGrid, AlignedRow, ColumnBoundary, Field, Row, Table};

/// Aligns tables to a column grid.
pub struct TableReconstructor {
    options: AlignOptions,
}

impl TableReconstructor {
    /// Create a reconstructor with default options.
    pub fn new() -> Self {
        Self {
            options: AlignOptions::default(),
        }
    }

    /// Create a reconstructor with custom options.
    pub fn with_options(options: AlignOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &AlignOptions {
        &self.options
    }

    /// Align one table.
    ///
    /// Returns `None` when the table has no rows or no row has any field.
    pub fn reconstruct<'a>(&self, table: &'a Table) -> Option<AlignedGrid<'a>> {
        let (template_row, template) = select_template(&table.rows)?;
        if template.fields.is_empty() {
            log::debug!("TableReconstructor: every row is empty, nothing to align");
            return None;
        }

        let columns: Vec<Option<ColumnBoundary>> = template
            .fields
            .iter()
            .map(|f| f.bbox.map(|b| b.horizontal_span()))
            .collect();

        let mut dropped = 0;
        let rows = table
            .rows
            .iter()
            .enumerate()
            .map(|(source_index, row)| {
                let (cells, lost) = self.align_row(row, &columns);
                dropped += lost;
                AlignedRow {
                    source_index,
                    row,
                    cells,
                }
            })
            .collect();

        if dropped > 0 {
            log::debug!(
                "TableReconstructor: dropped {} colliding field(s) across {} columns",
                dropped,
                columns.len()
            );
        }

        Some(AlignedGrid {
            columns,
            template_row,
            rows,
            dropped,
        })
    }

    /// Align several tables, in parallel when enabled.
    pub fn reconstruct_all<'a>(&self, tables: &[&'a Table]) -> Vec<Option<AlignedGrid<'a>>> {
        if self.options.parallel && tables.len() > 1 {
            tables.par_iter().map(|t| self.reconstruct(*t)).collect()
        } else {
            tables.iter().map(|t| self.reconstruct(*t)).collect()
        }
    }

    /// Spread one row over the columns. Returns the slots and the number of
    /// fields that found no slot.
    fn align_row<'a>(
        &self,
        row: &'a Row,
        columns: &[Option<ColumnBoundary>],
    ) -> (Vec<Option<&'a Field>>, usize) {
        let mut cells: Vec<Option<&'a Field>> = vec![None; columns.len()];
        let mut dropped = 0;

        for field in &row.fields {
            let Some(bbox) = field.bbox else {
                continue;
            };
            let midpoint = bbox.center_x();

            let Some(best) = nearest_column(columns, midpoint, |_| true) else {
                continue;
            };
            if cells[best].is_none() {
                cells[best] = Some(field);
                continue;
            }

            let fallback = match self.options.collision {
                CollisionPolicy::Drop => None,
                CollisionPolicy::NearestFree => {
                    nearest_column(columns, midpoint, |i| cells[i].is_none())
                }
            };
            match fallback {
                Some(slot) => cells[slot] = Some(field),
                None => {
                    log::debug!(
                        "TableReconstructor: column {} already taken, dropping {:?}",
                        best,
                        field.text
                    );
                    dropped += 1;
                }
            }
        }

        (cells, dropped)
    }
}

impl Default for TableReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

/// Align one table with default options.
pub fn reconstruct(table: &Table) -> Option<AlignedGrid<'_>> {
    TableReconstructor::new().reconstruct(table)
}

/// Align one table with custom options.
pub fn reconstruct_with_options<'a>(
    table: &'a Table,
    options: &AlignOptions,
) -> Option<AlignedGrid<'a>> {
    TableReconstructor::with_options(options.clone()).reconstruct(table)
}

/// Row with the greatest field count; the earliest wins ties.
fn select_template(rows: &[Row]) -> Option<(usize, &Row)> {
    rows.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, &Row)>, (i, row)| match best {
            Some((_, b)) if b.fields.len() >= row.fields.len() => best,
            _ => Some((i, row)),
        })
}

/// Index of the eligible column whose midpoint is closest to `midpoint`.
/// Exact ties go to the lowest index; columns without a boundary are never
/// chosen.
fn nearest_column(
    columns: &[Option<ColumnBoundary>],
    midpoint: f32,
    eligible: impl Fn(usize) -> bool,
) -> Option<usize> {
    let mut best = None;
    let mut smallest = f32::INFINITY;

    for (index, column) in columns.iter().enumerate() {
        let Some(column) = column else {
            continue;
        };
        if !eligible(index) {
            continue;
        }
        let distance = (midpoint - column.midpoint()).abs();
        if distance < smallest {
            smallest = distance;
            best = Some(index);
        }
    }

    best
}
