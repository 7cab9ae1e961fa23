//! Pluggable table-reading engines.
//!
//! The facade describes *what* to read as a [`ReadConfig`]; an engine
//! decides *how*: [`MemoryEngine`] materializes the whole data file at
//! once, [`StreamingEngine`] pulls it through a buffered reader in
//! bounded batches. Both decode lines with the shared [`decode`] logic
//! and produce polars `DataFrame`s.

pub mod decode;
pub mod memory;
pub mod streaming;

pub use memory::MemoryEngine;
pub use streaming::StreamingEngine;

use std::collections::HashMap;
use std::path::PathBuf;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::format::FieldKind;

/// How data-file lines are decoded into columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DecodeMethod {
    /// Split each line on runs of whitespace.
    #[default]
    Whitespace,
    /// Slice each line at the field widths declared in the definition
    /// file.
    FixedWidth,
}

/// Read configuration for one physical column.
#[derive(Debug, Clone)]
pub struct ColumnReadSpec {
    pub name: String,
    pub width: Option<u32>,
    pub kind: Option<FieldKind>,
}

/// Everything an engine needs to read the data file.
#[derive(Debug, Clone)]
pub struct ReadConfig {
    pub dat_path: PathBuf,
    pub method: DecodeMethod,
    /// Full physical column layout in declaration order. The layout stays
    /// complete even under subsetting, so fixed-width offsets remain
    /// derivable.
    pub columns: Vec<ColumnReadSpec>,
    /// Optional output subset of column names.
    pub usecols: Option<Vec<String>>,
    /// Null sentinels keyed by column name, restricted to the columns
    /// actually requested.
    pub null_values: HashMap<String, String>,
}

/// Batches produced by a chunked read.
pub type ChunkIter = Box<dyn Iterator<Item = Result<DataFrame>>>;

/// Capability contract for the tabular backend.
pub trait TableEngine {
    /// Read the whole table (or the configured subset) as one frame.
    fn read(&self, config: &ReadConfig) -> Result<DataFrame>;

    /// Read the table as a lazy, finite sequence of row batches of
    /// `chunk_size` rows each, the final batch possibly shorter. The
    /// sequence restarts from the first record on every call.
    fn read_chunked(&self, config: &ReadConfig, chunk_size: usize) -> Result<ChunkIter>;
}

/// Selects a concrete engine implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineKind {
    /// Materialize the data file in memory. Fastest for files that fit.
    #[default]
    Memory,
    /// Stream from disk in bounded batches, for files that do not fit.
    Streaming,
}

impl EngineKind {
    pub(crate) fn engine(&self) -> &'static dyn TableEngine {
        match self {
            EngineKind::Memory => &MemoryEngine,
            EngineKind::Streaming => &StreamingEngine,
        }
    }
}
