//! Field metadata micro-grammar.
//!
//! The third segment of a field clause is a comma-separated list of
//! optional `UNIT=` / `NAME=` / `NULL=` entries. Keys are case-sensitive
//! and matched anywhere in a chunk; anything unrecognized lands in the
//! single comment slot, last one wins. That last-wins behavior is an
//! accepted quirk of the source format, kept for compatibility.

use std::sync::LazyLock;

use regex::Regex;

static UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"UNITS? *= *(.*)").expect("unit pattern"));
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NAME *= *(.*)").expect("name pattern"));
static NULL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NULL *= *(.*)").expect("null pattern"));

/// Metadata parsed from one field clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMetadata {
    pub unit: Option<String>,
    pub long_name: Option<String>,
    pub null_value: Option<String>,
    pub comment: Option<String>,
}

/// Parse the metadata segment of a field clause.
pub fn parse_metadata(segment: &str) -> FieldMetadata {
    let mut meta = FieldMetadata::default();
    for chunk in segment.split(',') {
        let chunk = chunk.trim();
        if let Some(caps) = UNIT_RE.captures(chunk) {
            meta.unit = Some(caps[1].to_string());
            continue;
        }
        if let Some(caps) = NAME_RE.captures(chunk) {
            meta.long_name = Some(caps[1].to_string());
            continue;
        }
        if let Some(caps) = NULL_RE.captures(chunk) {
            meta.null_value = Some(caps[1].to_string());
            continue;
        }
        if !chunk.is_empty() {
            meta.comment = Some(chunk.to_string());
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_keys() {
        let meta = parse_metadata("UNIT=m, NAME=Easting, NULL=-9999");
        assert_eq!(meta.unit.as_deref(), Some("m"));
        assert_eq!(meta.long_name.as_deref(), Some("Easting"));
        assert_eq!(meta.null_value.as_deref(), Some("-9999"));
        assert!(meta.comment.is_none());
    }

    #[test]
    fn test_units_spelling() {
        let meta = parse_metadata("UNITS = mS/m");
        assert_eq!(meta.unit.as_deref(), Some("mS/m"));
    }

    #[test]
    fn test_key_matched_anywhere_in_chunk() {
        // the key pattern is a search, so a prefixed key still matches
        let meta = parse_metadata("LONG NAME = Fiducial number");
        assert_eq!(meta.long_name.as_deref(), Some("Fiducial number"));
    }

    #[test]
    fn test_unrecognized_chunk_becomes_comment() {
        let meta = parse_metadata("some free text");
        assert_eq!(meta.comment.as_deref(), Some("some free text"));
    }

    #[test]
    fn test_last_unmatched_chunk_wins() {
        let meta = parse_metadata("first comment, NULL=-9999, second comment");
        assert_eq!(meta.null_value.as_deref(), Some("-9999"));
        assert_eq!(meta.comment.as_deref(), Some("second comment"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let meta = parse_metadata("unit=m");
        assert!(meta.unit.is_none());
        assert_eq!(meta.comment.as_deref(), Some("unit=m"));
    }
}
