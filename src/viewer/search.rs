//! Case-insensitive substring filter over one page's elements.

use super::ElementId;
use crate::model::{ExtractedElement, Row};

/// An element that survived a search.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMatch<'a> {
    /// Index in the unfiltered page list
    pub index: usize,

    /// The element
    pub element: &'a ExtractedElement,

    /// For tables under a non-blank term, the body rows that matched.
    /// `None` means every row is shown.
    pub rows: Option<Vec<usize>>,
}

impl<'a> PageMatch<'a> {
    /// Id of the element as a whole.
    pub fn id(&self) -> ElementId {
        match self.element {
            ExtractedElement::Text(_) => ElementId::Text(self.index),
            ExtractedElement::Table(_) => ElementId::Table(self.index),
        }
    }

    /// Body rows to show with their body row index. Empty for text blocks.
    pub fn body_rows(&self) -> Vec<(usize, &'a Row)> {
        let Some(table) = self.element.as_table() else {
            return Vec::new();
        };
        match &self.rows {
            Some(rows) => rows
                .iter()
                .filter_map(|&r| table.body().get(r).map(|row| (r, row)))
                .collect(),
            None => table.body().iter().enumerate().collect(),
        }
    }
}

/// Filter a page's elements by `term`.
///
/// A blank term keeps everything. Otherwise text blocks match on their text,
/// and a table is kept with its header and the body rows having a matching
/// field; a table without one is left out.
pub fn search<'a>(elements: &[&'a ExtractedElement], term: &str) -> Vec<PageMatch<'a>> {
    if term.trim().is_empty() {
        return elements
            .iter()
            .enumerate()
            .map(|(index, &element)| PageMatch {
                index,
                element,
                rows: None,
            })
            .collect();
    }

    let needle = term.to_lowercase();
    let matches = |text: &str| text.to_lowercase().contains(&needle);

    elements
        .iter()
        .enumerate()
        .filter_map(|(index, &element)| match element {
            ExtractedElement::Text(block) => matches(&block.text).then_some(PageMatch {
                index,
                element,
                rows: None,
            }),
            ExtractedElement::Table(table) => {
                let rows: Vec<usize> = table
                    .body()
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| row.fields.iter().any(|f| matches(&f.text)))
                    .map(|(r, _)| r)
                    .collect();
                (!rows.is_empty()).then_some(PageMatch {
                    index,
                    element,
                    rows: Some(rows),
                })
            }
        })
        .collect()
}
