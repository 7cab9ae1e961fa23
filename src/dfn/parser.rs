//! Line-by-line parser for GDF2 definition files.
//!
//! The grammar is loose: every line should begin with `DEFN`, may carry an
//! `RT=<tag>` marker anywhere, and everything after the first `;` is a
//! `;`-separated list of `name:format[:metadata]` field clauses. Lines
//! that break the grammar are warned about and skipped; only failing to
//! read the file at all is an error.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::dfn::catalogue::{FieldDef, RecordTypeCatalogue};
use crate::dfn::diagnostics::{DfnDiagnostics, WarningKind};
use crate::dfn::metadata::parse_metadata;
use crate::error::Result;
use crate::format::FormatCode;

static RT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"RT=(\w*)").expect("record type pattern"));

/// Marker clause closing a record type's field list.
const END_DEFN: &str = "END DEFN";

/// Parser options.
#[derive(Debug, Clone)]
pub struct DfnParseOptions {
    /// Fold the literal `DATA` tag onto the default empty tag, so
    /// explicitly-tagged and untagged data records share one catalogue
    /// entry.
    pub fold_data_tag: bool,
}

impl Default for DfnParseOptions {
    fn default() -> Self {
        Self {
            fold_data_tag: true,
        }
    }
}

/// Result of parsing a definition file.
#[derive(Debug, Clone)]
pub struct DfnParse {
    pub catalogue: RecordTypeCatalogue,
    pub diagnostics: DfnDiagnostics,
    /// Raw definition-file text, kept for caller inspection.
    pub contents: String,
}

/// Parse a definition file from disk.
pub fn parse_dfn(path: &Path, options: &DfnParseOptions) -> Result<DfnParse> {
    let contents = fs::read_to_string(path)?;
    let (catalogue, diagnostics) = parse_dfn_str(&contents, options);
    Ok(DfnParse {
        catalogue,
        diagnostics,
        contents,
    })
}

/// Parse definition-file text into a catalogue plus diagnostics.
pub fn parse_dfn_str(
    contents: &str,
    options: &DfnParseOptions,
) -> (RecordTypeCatalogue, DfnDiagnostics) {
    let mut catalogue = RecordTypeCatalogue::default();
    let mut diagnostics = DfnDiagnostics::default();
    // Lines without an RT= marker continue the most recently seen tag.
    let mut current_tag = String::new();

    for (index, line) in contents.lines().enumerate() {
        let line_no = index + 1;

        if !line.starts_with("DEFN") {
            warn!("line {} does not begin with DEFN: {}", line_no, line);
            diagnostics.push(
                Some(line_no),
                WarningKind::NotDefn,
                format!("line does not begin with DEFN: {line}"),
            );
            continue;
        }

        if let Some(caps) = RT_TAG.captures(line) {
            let mut tag = caps[1].to_string();
            if options.fold_data_tag && tag == "DATA" {
                tag = String::new();
            }
            current_tag = tag;
        }

        let Some((_, field_part)) = line.split_once(';') else {
            // Declaration only: the line defines the tag, zero fields.
            debug!("line {}: no field definitions: {}", line_no, line);
            if !catalogue.contains(&current_tag) {
                info!("line {}: added record type RT={:?}", line_no, current_tag);
                catalogue.register(&current_tag);
            }
            continue;
        };

        if !catalogue.contains(&current_tag) {
            info!("line {}: added record type RT={:?}", line_no, current_tag);
        }
        let record = catalogue.register(&current_tag);

        for clause in field_part.split(';') {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            if clause == END_DEFN {
                debug!(
                    "line {}: end of field definitions for RT={:?}",
                    line_no, current_tag
                );
                continue;
            }

            let Some((name, remainder)) = clause.split_once(':') else {
                warn!("line {}: field clause has no format code: {}", line_no, clause);
                diagnostics.push(
                    Some(line_no),
                    WarningKind::MissingFormatCode,
                    format!("field clause has no format code: {clause}"),
                );
                record.fields.push(FieldDef::named(clause, ""));
                continue;
            };

            let remainder = remainder.trim();
            let (format_token, metadata) = match remainder.split_once(':') {
                Some((format_token, metadata)) => (format_token, Some(metadata)),
                None => (remainder, None),
            };

            let mut field = FieldDef::named(name, format_token.trim());
            if let Some(metadata) = metadata {
                let meta = parse_metadata(metadata);
                field.unit = meta.unit;
                field.long_name = meta.long_name;
                field.null_value = meta.null_value;
                field.comment = meta.comment;
            }

            match FormatCode::parse(&field.format) {
                Ok(code) => {
                    field.repeat = code.repeat;
                    field.width = Some(code.width);
                    field.kind = Some(code.kind());
                }
                Err(err) => {
                    warn!("line {}: {}", line_no, err);
                    diagnostics.push(Some(line_no), WarningKind::BadFormatCode, err.to_string());
                }
            }

            debug!(
                "line {}: adding field {:?} to record type RT={:?}",
                line_no, field.name, current_tag
            );
            if field.name == "RT" {
                record.format = Some(field.format.clone());
            }
            record.fields.push(field);
        }
    }

    let duplicates = catalogue.find_duplicate_field_names();
    if !duplicates.is_empty() {
        let mut names: Vec<&str> = duplicates.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        warn!("definition file has duplicate fields: {:?}", names);
        diagnostics.push(
            None,
            WarningKind::DuplicateFieldNames,
            format!("duplicate field names: {}", names.join(", ")),
        );
    }

    (catalogue, diagnostics)
}
