//! Structured diagnostics for definition-file parsing.
//!
//! Recoverable schema issues never abort a parse. They are logged through
//! `tracing` and collected here, so callers can inspect what the parser
//! tolerated without scraping log output.

use serde::{Deserialize, Serialize};

/// Category of a recoverable definition-file issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A line did not begin with the `DEFN` marker.
    NotDefn,
    /// A field's format code did not match the `[count]letter width`
    /// grammar; the field was kept with width and kind unset.
    BadFormatCode,
    /// A field clause carried no format code at all.
    MissingFormatCode,
    /// The default record type declares the same field name more than
    /// once.
    DuplicateFieldNames,
    /// No sibling data file was found next to the definition file.
    MissingDataFile,
}

/// One recoverable issue, tied to a 1-based definition-file line where
/// applicable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DfnWarning {
    pub line: Option<usize>,
    pub kind: WarningKind,
    pub message: String,
}

/// Warnings collected over one definition-file parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DfnDiagnostics {
    pub warnings: Vec<DfnWarning>,
}

impl DfnDiagnostics {
    pub fn push(&mut self, line: Option<usize>, kind: WarningKind, message: impl Into<String>) {
        self.warnings.push(DfnWarning {
            line,
            kind,
            message: message.into(),
        });
    }

    /// True when the parse raised no warnings at all.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Warnings of one category.
    pub fn of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &DfnWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}
