//! Error handling for GDF2 package access.
//!
//! Provides typed errors for package discovery, catalogue lookups,
//! and data-file decoding failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("No GDF2 data package found at: {path}")]
    PackageNotFound { path: PathBuf },

    #[error("No data file located for definition file: {path}")]
    DataFileNotFound { path: PathBuf },

    #[error("Record type not found in catalogue: RT={tag:?}")]
    RecordTypeNotFound { tag: String },

    #[error("Field not found in catalogue: {name}")]
    FieldNotFound { name: String },

    #[error("No field width available for fixed-width read of field: {field}")]
    MissingWidth { field: String },

    #[error("Data row {row} decoded to {found} columns, expected {expected}")]
    RowDecode {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, GdfError>;
