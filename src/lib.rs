//! ASEG-GDF2 Package Reader
//!
//! A Rust library for reading ASEG-GDF2 geophysical survey data packages:
//! a definition (`.dfn`) file describing record types, fields, format
//! codes, units and null sentinels, paired with a data (`.dat`) file of
//! fixed-width or whitespace-delimited records.
//!
//! This library provides tools for:
//! - Locating the `.dfn`/`.dat` pair from a base path or any package file
//! - Parsing the loose definition-file grammar into a record-type
//!   catalogue, with structured diagnostics instead of hard failures
//! - Expanding multi-valued fields onto their physical data columns
//! - Reading the data file in bulk, by column subset, or in bounded
//!   chunks, through in-memory or streaming engines built on polars
//! - Extracting typed per-field arrays with null sentinels applied
//!
//! ```no_run
//! # fn main() -> aseg_gdf2::Result<()> {
//! let gdf = aseg_gdf2::read("surveys/GA1286_Waveforms")?;
//! println!("{} records", gdf.nrecords()?);
//!
//! let table = gdf.data_selected(&["LINE", "CON"])?;
//! println!("{} columns read", table.width());
//! # Ok(())
//! # }
//! ```

pub mod columns;
pub mod dfn;
pub mod engine;
pub mod error;
pub mod format;
pub mod gdf;
pub mod locator;

// Re-export commonly used types
pub use columns::{ColumnDef, ColumnMapping, column_definitions};
pub use dfn::{
    DEFAULT_RECORD_TYPE, DfnDiagnostics, DfnParse, DfnParseOptions, DfnWarning, FieldDef,
    RecordType, RecordTypeCatalogue, WarningKind, parse_dfn, parse_dfn_str,
};
pub use engine::{
    ColumnReadSpec, DecodeMethod, EngineKind, MemoryEngine, ReadConfig, StreamingEngine,
    TableEngine,
};
pub use error::{GdfError, Result};
pub use format::{FieldKind, FormatCode, FormatCodeError};
pub use gdf::{CellValue, FieldData, Gdf2, OpenOptions, Row, read, read_with};
pub use locator::{GdfPackage, locate_package};
