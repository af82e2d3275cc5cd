//! Address extraction from a decoded cell grid.
//!
//! Addresses may appear in any column or row, so every cell is treated as
//! a candidate and tested against the address grammar; no schema is
//! assumed. Cells that fail the grammar are skipped silently. Duplicates
//! are removed by exact string equality after trimming, keeping the first
//! occurrence's position.

use std::collections::HashSet;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::error::ExtractResult;
use crate::grid;

/// Anchored address grammar: local part, single `@`, domain containing at
/// least one dot, no whitespace anywhere.
const ADDRESS_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

fn address_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ADDRESS_PATTERN).expect("address pattern compiles"))
}

/// Whether a single cell (already trimmed) is a well-formed address.
pub fn is_valid_address(cell: &str) -> bool {
    address_regex().is_match(cell)
}

/// Scan a cell grid in row-major order and collect unique addresses,
/// first occurrence first.
pub fn extract_from_grid(grid: &[Vec<String>]) -> Vec<String> {
    let re = address_regex();
    let mut seen = HashSet::new();
    let mut addresses = Vec::new();
    for row in grid {
        for cell in row {
            let candidate = cell.trim();
            if candidate.is_empty() || !re.is_match(candidate) {
                continue;
            }
            if seen.insert(candidate.to_string()) {
                addresses.push(candidate.to_string());
            }
        }
    }
    addresses
}

/// Decode a spreadsheet byte blob and extract its unique addresses.
///
/// Only total decode failure is an error; malformed individual cells are
/// dropped without being reported.
pub fn extract_addresses(bytes: &[u8]) -> ExtractResult<Vec<String>> {
    let grid = grid::decode_grid(bytes)?;
    let addresses = extract_from_grid(&grid);
    debug!(
        "Extracted {} unique addresses from {} rows",
        addresses.len(),
        grid.len()
    );
    Ok(addresses)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
