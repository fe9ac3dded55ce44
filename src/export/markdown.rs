//! Markdown output for aligned tables and page content.

use crate::align::{AlignOptions, TableReconstructor};
use crate::model::{AlignedGrid, AlignedRow, ExtractedElement};

/// Render an aligned grid as a Markdown table. Vacant slots become empty
/// cells.
pub fn to_markdown(grid: &AlignedGrid<'_>) -> String {
    let mut output = String::new();

    render_row(&mut output, grid.header());
    output.push('|');
    for _ in 0..grid.column_count() {
        output.push_str(" --- |");
    }
    output.push('\n');

    for row in grid.body() {
        render_row(&mut output, row);
    }

    output
}

/// Render one page's elements: text blocks as paragraphs, tables aligned.
/// Tables that cannot be aligned are skipped.
pub fn page_to_markdown(elements: &[&ExtractedElement], options: &AlignOptions) -> String {
    let reconstructor = TableReconstructor::with_options(options.clone());
    let mut output = String::new();

    for element in elements {
        match element {
            ExtractedElement::Text(block) => {
                let text = block.text.trim();
                if !text.is_empty() {
                    output.push_str(text);
                    output.push_str("\n\n");
                }
            }
            ExtractedElement::Table(table) => {
                if let Some(grid) = reconstructor.reconstruct(table) {
                    output.push_str(&to_markdown(&grid));
                    output.push('\n');
                }
            }
        }
    }

    output.trim_end().to_string()
}

fn render_row(output: &mut String, row: &AlignedRow<'_>) {
    output.push('|');
    for text in row.texts() {
        output.push_str(&format!(" {} |", escape_cell(text)));
    }
    output.push('\n');
}

fn escape_cell(text: &str) -> String {
    text.replace('\n', " ").trim().replace('|', "\\|")
}
