//! Decoding of extraction service responses.
//!
//! A response body is a JSON object carrying either `extracted_data` or an
//! `error` message. `extracted_data` is a flat array of elements stamped with
//! a zero-based `pageIndex`, or an object keyed by one-based page number.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::{DecodeOptions, ErrorMode};
use crate::error::{Error, Result};
use crate::model::{BoundingBox, BoxRepr, ExtractedElement, Field, Row, Table, TextBlock};

/// Decode an extraction response received with HTTP `status`.
///
/// A non-success status, or a success body carrying an `error` field,
/// becomes [`Error::Extraction`] with a readable message.
pub fn decode_response(
    status: u16,
    body: &str,
    options: &DecodeOptions,
) -> Result<Vec<ExtractedElement>> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|payload| error_message(&payload))
            .unwrap_or_else(|| format!("Server error: {}", status));
        return Err(Error::Extraction(message));
    }

    let payload: Value = serde_json::from_str(body)?;
    decode_payload(&payload, options)
}

/// Decode an already parsed success payload.
pub fn decode_payload(payload: &Value, options: &DecodeOptions) -> Result<Vec<ExtractedElement>> {
    if let Some(message) = error_message(payload) {
        return Err(Error::Extraction(message));
    }

    let data = payload
        .get("extracted_data")
        .ok_or_else(|| Error::MalformedPayload("missing extracted_data".to_string()))?;

    let decoder = Decoder {
        mode: options.error_mode,
    };

    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decoder.element(item, None, &format!("element {}", i)))
            .collect(),
        Value::Object(pages) => {
            let mut keyed = Vec::with_capacity(pages.len());
            for (key, items) in pages {
                let number = key
                    .parse::<u32>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| {
                        Error::MalformedPayload(format!("invalid page key {:?}", key))
                    })?;
                let items = items.as_array().ok_or_else(|| {
                    Error::MalformedPayload(format!("page {} is not an array", key))
                })?;
                keyed.push((number, items));
            }
            keyed.sort_by_key(|(number, _)| *number);

            let mut elements = Vec::new();
            for (number, items) in keyed {
                for (i, item) in items.iter().enumerate() {
                    let at = format!("page {}, element {}", number, i);
                    elements.push(decoder.element(item, Some(number - 1), &at)?);
                }
            }
            Ok(elements)
        }
        _ => Err(Error::MalformedPayload(
            "extracted_data must be an array or an object keyed by page number".to_string(),
        )),
    }
}

/// Decode a saved response body from a file.
pub fn read_extraction_file<P: AsRef<Path>>(
    path: P,
    options: &DecodeOptions,
) -> Result<Vec<ExtractedElement>> {
    let body = fs::read_to_string(path)?;
    decode_response(200, &body, options)
}

fn error_message(payload: &Value) -> Option<String> {
    payload
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

#[derive(Deserialize)]
struct RawElement {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    bbox: Option<Value>,
    #[serde(rename = "pageIndex", alias = "page_index", default)]
    page_index: Option<u32>,
    #[serde(default)]
    rows: Option<Vec<RawRow>>,
}

#[derive(Deserialize)]
struct RawRow {
    #[serde(default)]
    bbox: Option<Value>,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Deserialize)]
struct RawField {
    #[serde(default)]
    text: String,
    #[serde(default)]
    bbox: Option<Value>,
}

struct Decoder {
    mode: ErrorMode,
}

impl Decoder {
    fn element(&self, value: &Value, page: Option<u32>, at: &str) -> Result<ExtractedElement> {
        let raw = RawElement::deserialize(value)
            .map_err(|e| Error::MalformedPayload(format!("{}: {}", at, e)))?;

        let page_index = page.or(raw.page_index).unwrap_or(0);
        let bbox = self.bbox(raw.bbox, at)?;

        if raw.kind.as_deref() == Some("table") || raw.rows.is_some() {
            let mut table = Table::new(page_index);
            table.bbox = bbox;
            for (r, raw_row) in raw.rows.unwrap_or_default().into_iter().enumerate() {
                let row_at = format!("{}, row {}", at, r);
                let mut fields = Vec::with_capacity(raw_row.fields.len());
                for (f, raw_field) in raw_row.fields.into_iter().enumerate() {
                    let field_at = format!("{}, field {}", row_at, f);
                    fields.push(Field {
                        text: raw_field.text,
                        bbox: self.bbox(raw_field.bbox, &field_at)?,
                    });
                }
                table.add_row(Row {
                    bbox: self.bbox(raw_row.bbox, &row_at)?,
                    fields,
                });
            }
            return Ok(ExtractedElement::Table(table));
        }

        let text = raw.text.ok_or_else(|| {
            Error::MalformedPayload(format!("{}: element has neither text nor rows", at))
        })?;
        Ok(ExtractedElement::Text(TextBlock {
            text,
            bbox,
            page_index,
        }))
    }

    fn bbox(&self, value: Option<Value>, at: &str) -> Result<Option<BoundingBox>> {
        let Some(value) = value else {
            return Ok(None);
        };

        let parsed = BoxRepr::deserialize(&value)
            .map_err(|e| e.to_string())
            .and_then(BoundingBox::try_from);

        match parsed {
            Ok(bbox) => Ok(Some(bbox)),
            Err(reason) => match self.mode {
                ErrorMode::Strict => Err(Error::MalformedPayload(format!("{}: {}", at, reason))),
                ErrorMode::Lenient => {
                    log::warn!("Dropping bounding box of {}: {}", at, reason);
                    Ok(None)
                }
            },
        }
    }
}
