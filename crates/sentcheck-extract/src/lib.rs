//! # SentCheck – Spreadsheet Address Extraction
//!
//! Turns an uploaded spreadsheet into a deduplicated list of well-formed
//! email addresses, ready for sent-mail verification.
//!
//! ## Features
//!
//! - **Tabular decode** – delimited text (comma, semicolon, tab) into a
//!   row-major cell grid, with decode failures surfaced to the caller
//! - **Schema-free scanning** – every cell is a candidate; no column
//!   layout is assumed
//! - **Address grammar** – anchored `local@domain` validation, domain
//!   must contain a dot, no embedded whitespace
//! - **Order-stable dedup** – first occurrence wins, extraction is
//!   deterministic for byte-identical input

pub mod error;
pub mod grid;
pub mod address;

pub use address::{extract_addresses, extract_from_grid, is_valid_address};
pub use error::{ExtractError, ExtractResult};
pub use grid::decode_grid;
