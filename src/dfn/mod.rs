//! Definition-file (.dfn) parsing.
//!
//! A GDF2 definition file describes the layout of its companion data file:
//! one or more record types, each an ordered list of fields with format
//! codes, units, long names and null sentinels. The grammar is informal
//! and irregular, so parsing is deliberately forgiving: recoverable issues
//! become [`diagnostics`] entries instead of errors.
//!
//! The module is organized into:
//! - [`parser`] - line-level grammar handling
//! - [`catalogue`] - the record-type/field model the parse produces
//! - [`metadata`] - the `UNIT`/`NAME`/`NULL` micro-grammar
//! - [`diagnostics`] - structured warnings collected during a parse

pub mod catalogue;
pub mod diagnostics;
pub mod metadata;
pub mod parser;

#[cfg(test)]
mod tests;

pub use catalogue::{DEFAULT_RECORD_TYPE, FieldDef, RecordType, RecordTypeCatalogue};
pub use diagnostics::{DfnDiagnostics, DfnWarning, WarningKind};
pub use metadata::FieldMetadata;
pub use parser::{DfnParse, DfnParseOptions, parse_dfn, parse_dfn_str};
