//! Extracted content: text blocks and tables, each optionally grounded by a box.

use super::BoundingBox;
use serde::{Deserialize, Serialize};

/// Anything the viewer can highlight on the page.
pub trait Locatable {
    /// The element's box in document space, if it has spatial grounding.
    fn bbox(&self) -> Option<BoundingBox>;

    /// Whether the element can be located at all.
    fn is_locatable(&self) -> bool {
        self.bbox().is_some()
    }
}

/// One element of an extraction response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractedElement {
    /// A run of text
    Text(TextBlock),

    /// A table of rows and fields
    Table(Table),
}

impl ExtractedElement {
    /// Zero-based page the element belongs to.
    pub fn page_index(&self) -> u32 {
        match self {
            ExtractedElement::Text(t) => t.page_index,
            ExtractedElement::Table(t) => t.page_index,
        }
    }

    /// Borrow as a text block.
    pub fn as_text(&self) -> Option<&TextBlock> {
        match self {
            ExtractedElement::Text(t) => Some(t),
            ExtractedElement::Table(_) => None,
        }
    }

    /// Borrow as a table.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            ExtractedElement::Table(t) => Some(t),
            ExtractedElement::Text(_) => None,
        }
    }

    /// Check if this element is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, ExtractedElement::Table(_))
    }

    /// Plain text of the element; tables are rendered row per line, tab separated.
    pub fn plain_text(&self) -> String {
        match self {
            ExtractedElement::Text(t) => t.text.clone(),
            ExtractedElement::Table(t) => t.plain_text(),
        }
    }
}

impl Locatable for ExtractedElement {
    fn bbox(&self) -> Option<BoundingBox> {
        match self {
            ExtractedElement::Text(t) => t.bbox,
            ExtractedElement::Table(t) => t.bbox,
        }
    }
}

impl From<TextBlock> for ExtractedElement {
    fn from(block: TextBlock) -> Self {
        ExtractedElement::Text(block)
    }
}

impl From<Table> for ExtractedElement {
    fn from(table: Table) -> Self {
        ExtractedElement::Table(table)
    }
}

/// A text fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Text content
    pub text: String,

    /// Position on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    /// Zero-based page index
    #[serde(rename = "pageIndex", alias = "page_index", default)]
    pub page_index: u32,
}

impl TextBlock {
    /// Create a text block without spatial grounding.
    pub fn new(text: impl Into<String>, page_index: u32) -> Self {
        Self {
            text: text.into(),
            bbox: None,
            page_index,
        }
    }

    /// Set the box and return self.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

impl Locatable for TextBlock {
    fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }
}

/// An extracted table. Rows keep their extraction order; the first row is
/// the header.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Position of the whole table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    /// Zero-based page index
    #[serde(rename = "pageIndex", alias = "page_index", default)]
    pub page_index: u32,

    /// Rows in extraction order
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    /// Create an empty table on a page.
    pub fn new(page_index: u32) -> Self {
        Self {
            bbox: None,
            page_index,
            rows: Vec::new(),
        }
    }

    /// Set the box and return self.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Builder-style row append.
    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row (first row), if any.
    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Body rows (everything after the header).
    pub fn body(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Locatable for Table {
    fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }
}

/// A table row: an ordered, possibly ragged list of fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    /// Position of the row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    /// Fields in extraction order
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Row {
    /// Create a row from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { bbox: None, fields }
    }

    /// Set the box and return self.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

impl Locatable for Row {
    fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }
}

/// A single table field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field text
    pub text: String,

    /// Position of the field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
}

impl Field {
    /// Create a field positioned by its left edge and width.
    pub fn at(text: impl Into<String>, left: f32, width: f32) -> Self {
        Self {
            text: text.into(),
            bbox: Some(BoundingBox::new(left, 0.0, width, 0.0)),
        }
    }

    /// Create a field with a full box.
    pub fn with_box(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox: Some(bbox),
        }
    }

    /// Create a field without spatial grounding.
    pub fn unplaced(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bbox: None,
        }
    }
}

impl Locatable for Field {
    fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }
}
