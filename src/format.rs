//! Format-code interpretation for definition-file fields.
//!
//! GDF2 format codes are compact Fortran-style tokens such as `30F10.5`,
//! `I6` or `A76`: an optional repeat count, a format letter, the width in
//! characters of one value, and an optional precision tail. The letter
//! decides the data kind a column is read as.

use std::sync::LazyLock;

use polars::prelude::DataType;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `[count]letter width[.precision]`, anchored at the start of the token.
static FORMAT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]*)([A-Za-z])([0-9]+)").expect("format code pattern"));

/// Data kind inferred from a format-code letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Integer,
    Real,
}

/// Format letters with a non-text interpretation. Teaching the interpreter
/// a new letter means adding a row here; call sites only see [`FieldKind`].
const KIND_LETTERS: &[(char, FieldKind)] = &[
    ('f', FieldKind::Real),
    ('e', FieldKind::Real),
    ('d', FieldKind::Real),
    ('g', FieldKind::Real),
    ('i', FieldKind::Integer),
];

impl FieldKind {
    /// Classify a format letter. Letters absent from the table are text.
    pub fn from_letter(letter: char) -> Self {
        let letter = letter.to_ascii_lowercase();
        KIND_LETTERS
            .iter()
            .find(|(l, _)| *l == letter)
            .map(|(_, kind)| *kind)
            .unwrap_or(FieldKind::Text)
    }

    /// Polars dtype used when reading columns of this kind.
    pub fn dtype(&self) -> DataType {
        match self {
            FieldKind::Text => DataType::String,
            FieldKind::Integer => DataType::Int64,
            FieldKind::Real => DataType::Float64,
        }
    }
}

/// A format token with no recognizable `letter width` part.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no field width found in format code {0:?}")]
pub struct FormatCodeError(pub String);

/// A parsed format code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatCode {
    /// The token as written in the definition file.
    pub raw: String,
    /// Physical values per record; at least 1.
    pub repeat: usize,
    /// Format letter, as written.
    pub letter: char,
    /// Characters per physical value.
    pub width: u32,
    /// Anything after the width, e.g. `.5` in `F10.5`.
    pub tail: String,
}

impl FormatCode {
    /// Parse a format token.
    ///
    /// A missing or non-numeric repeat prefix defaults to 1; a literal `0`
    /// is clamped to 1. Failure to find a `letter width` part at all is a
    /// schema-integrity problem for the caller to report.
    pub fn parse(token: &str) -> Result<Self, FormatCodeError> {
        let token = token.trim();
        let caps = FORMAT_CODE
            .captures(token)
            .ok_or_else(|| FormatCodeError(token.to_string()))?;
        let repeat = caps[1].parse::<usize>().unwrap_or(1).max(1);
        let letter = caps[2]
            .chars()
            .next()
            .ok_or_else(|| FormatCodeError(token.to_string()))?;
        let width = caps[3]
            .parse::<u32>()
            .map_err(|_| FormatCodeError(token.to_string()))?;
        let end = caps.get(3).map(|m| m.end()).unwrap_or(token.len());
        Ok(Self {
            raw: token.to_string(),
            repeat,
            letter,
            width,
            tail: token[end..].to_string(),
        })
    }

    /// Data kind this code's letter maps to.
    pub fn kind(&self) -> FieldKind {
        FieldKind::from_letter(self.letter)
    }

    /// The code for a single value, with the repeat prefix stripped
    /// (`30F10.5` becomes `F10.5`).
    pub fn column_format(&self) -> String {
        format!("{}{}{}", self.letter, self.width, self.tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_real() {
        let code = FormatCode::parse("30F10.5").unwrap();
        assert_eq!(code.repeat, 30);
        assert_eq!(code.letter, 'F');
        assert_eq!(code.width, 10);
        assert_eq!(code.tail, ".5");
        assert_eq!(code.kind(), FieldKind::Real);
    }

    #[test]
    fn test_parse_integer_defaults_repeat() {
        let code = FormatCode::parse("I6").unwrap();
        assert_eq!(code.repeat, 1);
        assert_eq!(code.width, 6);
        assert_eq!(code.kind(), FieldKind::Integer);
    }

    #[test]
    fn test_parse_text() {
        let code = FormatCode::parse("A76").unwrap();
        assert_eq!(code.kind(), FieldKind::Text);
        assert_eq!(code.width, 76);
    }

    #[test]
    fn test_parse_lowercase_letter() {
        let code = FormatCode::parse("f12.2").unwrap();
        assert_eq!(code.kind(), FieldKind::Real);
    }

    #[test]
    fn test_parse_zero_repeat_clamped() {
        let code = FormatCode::parse("0F10.5").unwrap();
        assert_eq!(code.repeat, 1);
    }

    #[test]
    fn test_parse_rejects_missing_width() {
        assert!(FormatCode::parse("F").is_err());
        assert!(FormatCode::parse("").is_err());
        assert!(FormatCode::parse("10.5").is_err());
    }

    #[test]
    fn test_column_format_strips_repeat() {
        let code = FormatCode::parse("30F10.5").unwrap();
        assert_eq!(code.column_format(), "F10.5");
        let code = FormatCode::parse("I6").unwrap();
        assert_eq!(code.column_format(), "I6");
    }

    #[test]
    fn test_kind_dtypes() {
        assert_eq!(FieldKind::Real.dtype(), DataType::Float64);
        assert_eq!(FieldKind::Integer.dtype(), DataType::Int64);
        assert_eq!(FieldKind::Text.dtype(), DataType::String);
    }
}
