//! Extraction boundary: response decoding and word-to-block grouping.

mod blocks;
mod options;
mod response;

pub use blocks::{group_words, Word};
pub use options::{BlockOptions, DecodeOptions, ErrorMode};
pub use response::{decode_payload, decode_response, read_extraction_file};
