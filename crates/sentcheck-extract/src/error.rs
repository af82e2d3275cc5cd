//! Error types for the extraction crate.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtractError {
    /// Input bytes are not decodable as delimited text
    Decode(String),
    /// CSV structure error
    CsvParse(String),
    /// File I/O error
    Io(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(msg) => write!(f, "Decode error: {}", msg),
            Self::CsvParse(msg) => write!(f, "CSV parse error: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ExtractError {}

pub type ExtractResult<T> = Result<T, ExtractError>;

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for ExtractError {
    fn from(e: csv::Error) -> Self {
        Self::CsvParse(e.to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_variants() {
        assert_eq!(
            ExtractError::Decode("bad bytes".into()).to_string(),
            "Decode error: bad bytes"
        );
        assert_eq!(
            ExtractError::CsvParse("row 3".into()).to_string(),
            "CSV parse error: row 3"
        );
        assert_eq!(ExtractError::Io("eof".into()).to_string(), "I/O error: eof");
    }

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let e: ExtractError = io.into();
        assert!(matches!(e, ExtractError::Io(_)));
    }

    #[test]
    fn serde_roundtrip() {
        let e = ExtractError::Decode("not utf-8".into());
        let json = serde_json::to_string(&e).unwrap();
        let back: ExtractError = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, ExtractError::Decode(msg) if msg == "not utf-8"));
    }

    #[test]
    fn std_error_trait() {
        let e = ExtractError::CsvParse("oops".into());
        let _: &dyn std::error::Error = &e;
    }
}
