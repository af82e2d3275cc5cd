//! Tabular decode for uploaded spreadsheets.
//!
//! Accepts delimited text and produces a row-major cell grid. The
//! delimiter is sniffed from the first line (semicolon, tab, then comma),
//! mirroring the fallback order used by common spreadsheet exports.
//! Binary workbook formats must be converted to delimited text by the
//! caller before reaching this layer; anything that is not valid UTF-8
//! text is a decode error, not a silently-empty grid.

use log::debug;

use crate::error::{ExtractError, ExtractResult};

/// Decode a byte blob into a two-dimensional grid of cells.
///
/// Rows may be ragged; quoting and embedded delimiters follow CSV rules.
/// An empty input decodes to an empty grid.
pub fn decode_grid(bytes: &[u8]) -> ExtractResult<Vec<Vec<String>>> {
    if bytes.contains(&0) {
        return Err(ExtractError::Decode(
            "input contains NUL bytes; not a delimited text file".into(),
        ));
    }
    let content = std::str::from_utf8(bytes)
        .map_err(|e| ExtractError::Decode(format!("input is not valid UTF-8: {}", e)))?;

    let delimiter = sniff_delimiter(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ExtractError::CsvParse(e.to_string()))?;
        grid.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    debug!("Decoded {} rows (delimiter {:?})", grid.len(), delimiter as char);
    Ok(grid)
}

/// Pick the cell delimiter from the first line.
fn sniff_delimiter(content: &str) -> u8 {
    match content.lines().next() {
        Some(line) if line.contains(';') => b';',
        Some(line) if line.contains('\t') => b'\t',
        _ => b',',
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
