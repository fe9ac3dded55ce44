//! Grouping of positioned words into text blocks in reading order.
//!
//! Words are bucketed into lines by their rounded top edge. Within a line a
//! horizontal gap wider than the line's threshold starts a new block, so
//! columns of a form or invoice come out as separate blocks.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::BlockOptions;
use crate::model::{BoundingBox, ExtractedElement, TextBlock};

/// A word with its page position, as reported by a text extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Word text
    pub text: String,
    /// Left edge
    pub x0: f32,
    /// Right edge
    pub x1: f32,
    /// Top edge
    pub top: f32,
    /// Bottom edge
    pub bottom: f32,
}

impl Word {
    /// Create a word.
    pub fn new(text: impl Into<String>, x0: f32, x1: f32, top: f32, bottom: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            x1,
            top,
            bottom,
        }
    }
}

/// Group words into text blocks for one page, top to bottom, left to right.
pub fn group_words(
    words: &[Word],
    page_index: u32,
    options: &BlockOptions,
) -> Vec<ExtractedElement> {
    let mut lines: BTreeMap<i64, Vec<&Word>> = BTreeMap::new();
    for word in words {
        lines.entry(word.top.round() as i64).or_default().push(word);
    }

    let mut blocks = Vec::new();
    for mut line in lines.into_values() {
        line.sort_by(|a, b| a.x0.partial_cmp(&b.x0).unwrap_or(Ordering::Equal));
        let threshold = gap_threshold(&line, options);

        let mut current: Vec<&Word> = Vec::new();
        for word in line {
            if let Some(prev) = current.last() {
                if word.x0 - prev.x1 > threshold {
                    blocks.push(make_block(&current, page_index));
                    current.clear();
                }
            }
            current.push(word);
        }
        if !current.is_empty() {
            blocks.push(make_block(&current, page_index));
        }
    }

    log::debug!(
        "Grouped {} words into {} blocks on page {}",
        words.len(),
        blocks.len(),
        page_index + 1
    );
    blocks
}

fn gap_threshold(line: &[&Word], options: &BlockOptions) -> f32 {
    if line.len() < 2 {
        return options.min_gap;
    }

    let mut gaps: Vec<f32> = line.windows(2).map(|w| w[1].x0 - w[0].x1).collect();
    gaps.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let median = gaps[gaps.len() / 2];
    options.min_gap.max(median * options.gap_factor)
}

fn make_block(words: &[&Word], page_index: u32) -> ExtractedElement {
    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let x0 = words.iter().map(|w| w.x0).fold(f32::INFINITY, f32::min);
    let top = words.iter().map(|w| w.top).fold(f32::INFINITY, f32::min);
    let x1 = words.iter().map(|w| w.x1).fold(f32::NEG_INFINITY, f32::max);
    let bottom = words.iter().map(|w| w.bottom).fold(f32::NEG_INFINITY, f32::max);

    ExtractedElement::Text(TextBlock {
        text,
        bbox: BoundingBox::try_new(x0, top, x1 - x0, bottom - top),
        page_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Locatable;

    fn texts(blocks: &[ExtractedElement]) -> Vec<String> {
        blocks.iter().map(|b| b.plain_text()).collect()
    }

    #[test]
    fn test_single_line_splits_on_wide_gap() {
        let words = vec![
            Word::new("Invoice", 10.0, 50.0, 100.2, 110.0),
            Word::new("No.", 52.0, 70.0, 99.8, 110.0),
            Word::new("1234", 72.0, 100.0, 100.0, 110.0),
            Word::new("Total", 300.0, 330.0, 100.0, 110.0),
        ];
        let blocks = group_words(&words, 0, &BlockOptions::default());
        assert_eq!(texts(&blocks), vec!["Invoice No. 1234", "Total"]);

        let bbox = blocks[0].bbox().unwrap();
        assert_eq!(bbox.left, 10.0);
        assert_eq!(bbox.top, 99.8);
        assert_eq!(bbox.width, 90.0);
        assert_eq!(bbox.bottom(), 110.0);
    }

    #[test]
    fn test_lines_ordered_top_to_bottom_and_words_left_to_right() {
        let words = vec![
            Word::new("world", 40.0, 70.0, 50.0, 60.0),
            Word::new("second", 10.0, 50.0, 80.0, 90.0),
            Word::new("hello", 10.0, 38.0, 50.0, 60.0),
        ];
        let blocks = group_words(&words, 2, &BlockOptions::default());
        assert_eq!(texts(&blocks), vec!["hello world", "second"]);
        assert!(blocks.iter().all(|b| b.page_index() == 2));
    }

    #[test]
    fn test_threshold_uses_median_gap() {
        // gaps 4, 4, 9: median 4, threshold max(5, 8) = 8, so 9 breaks
        let words = vec![
            Word::new("a", 0.0, 10.0, 0.0, 5.0),
            Word::new("b", 14.0, 20.0, 0.0, 5.0),
            Word::new("c", 24.0, 30.0, 0.0, 5.0),
            Word::new("d", 39.0, 45.0, 0.0, 5.0),
        ];
        let blocks = group_words(&words, 0, &BlockOptions::default());
        assert_eq!(texts(&blocks), vec!["a b c", "d"]);

        let blocks = group_words(&words, 0, &BlockOptions::new().with_min_gap(10.0));
        assert_eq!(texts(&blocks), vec!["a b c d"]);
    }

    #[test]
    fn test_gap_equal_to_threshold_stays_joined() {
        // gaps 5, 5, 10: threshold 10, and only a strictly wider gap breaks
        let words = vec![
            Word::new("a", 0.0, 10.0, 0.0, 5.0),
            Word::new("b", 15.0, 20.0, 0.0, 5.0),
            Word::new("c", 25.0, 30.0, 0.0, 5.0),
            Word::new("d", 40.0, 45.0, 0.0, 5.0),
        ];
        let blocks = group_words(&words, 0, &BlockOptions::default());
        assert_eq!(texts(&blocks), vec!["a b c d"]);
    }

    #[test]
    fn test_no_words() {
        assert!(group_words(&[], 0, &BlockOptions::default()).is_empty());
    }
}
