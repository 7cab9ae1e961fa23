//! Top-level GDF2 package handle.
//!
//! [`Gdf2`] ties the pieces together: the locator finds the file pair, the
//! definition parser builds the catalogue, the column projector derives
//! the physical layout, and reads are delegated to a table engine with a
//! configuration derived from all of the above.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use polars::prelude::*;
use tracing::{debug, info};

use crate::columns::{ColumnDef, ColumnMapping, column_definitions};
use crate::dfn::{
    DEFAULT_RECORD_TYPE, DfnDiagnostics, DfnParseOptions, FieldDef, RecordType,
    RecordTypeCatalogue, WarningKind, parse_dfn,
};
use crate::engine::{ChunkIter, ColumnReadSpec, DecodeMethod, EngineKind, ReadConfig};
use crate::error::{GdfError, Result};
use crate::locator::locate_package;

/// Block size for the record-count newline scan.
const COUNT_BLOCK_SIZE: usize = 65536;

/// Options accepted by [`read_with`].
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// How data-file lines are decoded; fixed for the handle's lifetime.
    pub method: DecodeMethod,
    /// Which table engine serves reads; switchable on the handle.
    pub engine: EngineKind,
    /// Fold the `DATA` record-type tag onto the default empty tag.
    pub fold_data_tag: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            method: DecodeMethod::Whitespace,
            engine: EngineKind::Memory,
            fold_data_tag: true,
        }
    }
}

/// Open the GDF2 package found at or near `path` with default options.
pub fn read(path: impl AsRef<Path>) -> Result<Gdf2> {
    read_with(path, &OpenOptions::default())
}

/// Open a GDF2 package with explicit options.
pub fn read_with(path: impl AsRef<Path>, options: &OpenOptions) -> Result<Gdf2> {
    Gdf2::open(path.as_ref(), options)
}

/// Handle on a parsed GDF2 package.
#[derive(Debug)]
pub struct Gdf2 {
    dfn_path: PathBuf,
    dat_path: Option<PathBuf>,
    catalogue: RecordTypeCatalogue,
    diagnostics: DfnDiagnostics,
    dfn_contents: String,
    method: DecodeMethod,
    engine: EngineKind,
    nrecords: OnceLock<usize>,
}

impl Gdf2 {
    pub fn open(path: &Path, options: &OpenOptions) -> Result<Self> {
        let package = locate_package(path)?;
        info!("opening GDF2 package: {}", package.dfn_path.display());

        let parse = parse_dfn(
            &package.dfn_path,
            &DfnParseOptions {
                fold_data_tag: options.fold_data_tag,
            },
        )?;
        let mut diagnostics = parse.diagnostics;
        if package.dat_path.is_none() {
            diagnostics.push(
                None,
                WarningKind::MissingDataFile,
                format!("no data file located for {}", package.dfn_path.display()),
            );
        }

        Ok(Self {
            dfn_path: package.dfn_path,
            dat_path: package.dat_path,
            catalogue: parse.catalogue,
            diagnostics,
            dfn_contents: parse.contents,
            method: options.method,
            engine: options.engine,
            nrecords: OnceLock::new(),
        })
    }

    pub fn dfn_path(&self) -> &Path {
        &self.dfn_path
    }

    pub fn dat_path(&self) -> Option<&Path> {
        self.dat_path.as_deref()
    }

    /// Raw definition-file text.
    pub fn dfn_contents(&self) -> &str {
        &self.dfn_contents
    }

    /// Warnings collected while parsing the definition file.
    pub fn diagnostics(&self) -> &DfnDiagnostics {
        &self.diagnostics
    }

    pub fn record_types(&self) -> &RecordTypeCatalogue {
        &self.catalogue
    }

    pub fn method(&self) -> DecodeMethod {
        self.method
    }

    pub fn engine_kind(&self) -> EngineKind {
        self.engine
    }

    /// Switch the table engine serving subsequent reads.
    pub fn set_engine(&mut self, engine: EngineKind) {
        self.engine = engine;
    }

    fn record_type(&self, tag: &str) -> Result<&RecordType> {
        self.catalogue
            .get(tag)
            .ok_or_else(|| GdfError::RecordTypeNotFound {
                tag: tag.to_string(),
            })
    }

    fn data_file(&self) -> Result<&Path> {
        self.dat_path
            .as_deref()
            .ok_or_else(|| GdfError::DataFileNotFound {
                path: self.dfn_path.clone(),
            })
    }

    /// Field names declared for a record type.
    pub fn field_names(&self, tag: &str) -> Result<Vec<&str>> {
        Ok(self.record_type(tag)?.field_names())
    }

    /// Physical column names for a record type, multi-valued fields
    /// expanded.
    pub fn column_names(&self, tag: &str) -> Result<Vec<String>> {
        Ok(ColumnMapping::for_record_type(self.record_type(tag)?)
            .names()
            .to_vec())
    }

    /// First field with the given name, if any.
    pub fn get_field_definition(&self, name: &str, tag: &str) -> Option<&FieldDef> {
        self.catalogue.get(tag)?.get_field(name)
    }

    /// Per-column projections for a record type.
    pub fn get_column_definitions(&self, tag: &str) -> Result<Vec<ColumnDef>> {
        Ok(column_definitions(self.record_type(tag)?))
    }

    /// Duplicate field names in the default record type.
    pub fn find_duplicate_field_names(&self) -> HashMap<String, usize> {
        self.catalogue.find_duplicate_field_names()
    }

    /// Rewrite duplicated field names using a `{n}` suffix template. See
    /// [`RecordTypeCatalogue::fix_duplicate_field_names`].
    pub fn fix_duplicate_field_names(&mut self, suffix: &str) {
        self.catalogue.fix_duplicate_field_names(suffix);
    }

    /// Number of records in the data file.
    ///
    /// Computed once by counting line terminators over fixed-size blocks
    /// (a final line without a trailing terminator still counts as one
    /// record) and cached for the handle's lifetime.
    pub fn nrecords(&self) -> Result<usize> {
        if let Some(count) = self.nrecords.get() {
            return Ok(*count);
        }
        let count = count_records(self.data_file()?)?;
        Ok(*self.nrecords.get_or_init(|| count))
    }

    /// Derive the engine configuration for a read of the default record
    /// type. Null sentinels are restricted to the columns actually
    /// requested.
    fn read_config(&self, selection: Option<&[&str]>) -> Result<ReadConfig> {
        let dat_path = self.data_file()?.to_path_buf();
        let record = self.record_type(DEFAULT_RECORD_TYPE)?;
        let definitions = column_definitions(record);

        let usecols = match selection {
            Some(names) => {
                let mapping = ColumnMapping::for_record_type(record);
                Some(mapping.expand_selection(names)?)
            }
            None => None,
        };

        let mut null_values = HashMap::new();
        for definition in &definitions {
            if let Some(null_value) = &definition.null_value {
                let requested = usecols
                    .as_ref()
                    .is_none_or(|cols| cols.contains(&definition.name));
                if requested {
                    null_values.insert(definition.name.clone(), null_value.clone());
                }
            }
        }

        let columns = definitions
            .into_iter()
            .map(|definition| ColumnReadSpec {
                name: definition.name,
                width: definition.width,
                kind: definition.kind,
            })
            .collect();

        debug!(
            "read configuration: method={:?}, usecols={:?}, null_values={:?}",
            self.method, usecols, null_values
        );
        Ok(ReadConfig {
            dat_path,
            method: self.method,
            columns,
            usecols,
            null_values,
        })
    }

    /// Read the whole data table for the default record type.
    pub fn data(&self) -> Result<DataFrame> {
        let config = self.read_config(None)?;
        self.engine.engine().read(&config)
    }

    /// Read a subset of fields and/or columns. Bare field names expand to
    /// their full column lists.
    pub fn data_selected(&self, selection: &[&str]) -> Result<DataFrame> {
        let config = self.read_config(Some(selection))?;
        self.engine.engine().read(&config)
    }

    /// Read the data table as a lazy sequence of row batches. The
    /// sequence restarts from the first record on every call.
    pub fn data_chunked(&self, chunk_size: usize) -> Result<ChunkIter> {
        let config = self.read_config(None)?;
        self.engine.engine().read_chunked(&config, chunk_size)
    }

    /// Chunked read of a subset of fields and/or columns.
    pub fn data_selected_chunked(&self, selection: &[&str], chunk_size: usize) -> Result<ChunkIter> {
        let config = self.read_config(Some(selection))?;
        self.engine.engine().read_chunked(&config, chunk_size)
    }

    /// Typed values for one field. Multi-valued fields come back as a
    /// matrix with one column per slot.
    pub fn get_field_data(&self, field_name: &str) -> Result<FieldData> {
        let mut values = self.get_fields_data(&[field_name])?;
        debug_assert_eq!(values.len(), 1);
        Ok(values.swap_remove(0))
    }

    /// Typed values for several fields in one read. Requesting an unknown
    /// field name is a lookup error, surfaced before any file access.
    pub fn get_fields_data(&self, field_names: &[&str]) -> Result<Vec<FieldData>> {
        let record = self.record_type(DEFAULT_RECORD_TYPE)?;
        let mapping = ColumnMapping::for_record_type(record);

        let mut field_columns = Vec::with_capacity(field_names.len());
        for name in field_names {
            field_columns.push((*name, mapping.field_columns(name)?));
        }

        let frame = self.data_selected(field_names)?;
        let mut out = Vec::with_capacity(field_columns.len());
        for (_, columns) in &field_columns {
            if columns.len() == 1 {
                let series = frame
                    .column(columns[0].as_str())?
                    .as_materialized_series()
                    .clone();
                out.push(FieldData::Column(series));
            } else {
                let sub = frame.select(columns.iter().map(|c| c.as_str()))?;
                out.push(FieldData::Matrix(sub));
            }
        }
        Ok(out)
    }

    /// Iterate over data rows as column-name → value maps, reconstructed
    /// from successive chunks of `chunk_size` rows. Restart by calling
    /// again.
    pub fn iter_rows(&self, chunk_size: usize) -> Result<impl Iterator<Item = Result<Row>>> {
        let chunks = self.data_chunked(chunk_size)?;
        Ok(RowIter {
            chunks,
            current: None,
            index: 0,
        })
    }
}

/// One data row: column name → decoded value.
pub type Row = HashMap<String, CellValue>;

/// A single decoded cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    fn from_any(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => CellValue::Null,
            AnyValue::Int64(v) => CellValue::Int(v),
            AnyValue::Float64(v) => CellValue::Float(v),
            AnyValue::String(v) => CellValue::Text(v.to_string()),
            AnyValue::StringOwned(v) => CellValue::Text(v.to_string()),
            other => CellValue::Text(format!("{other:?}")),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Typed values for one field.
#[derive(Debug, Clone)]
pub enum FieldData {
    /// Field with one value per record.
    Column(Series),
    /// Field spanning several columns, one frame column per slot.
    Matrix(DataFrame),
}

impl FieldData {
    /// Number of records.
    pub fn height(&self) -> usize {
        match self {
            FieldData::Column(series) => series.len(),
            FieldData::Matrix(frame) => frame.height(),
        }
    }

    /// Number of physical columns.
    pub fn width(&self) -> usize {
        match self {
            FieldData::Column(_) => 1,
            FieldData::Matrix(frame) => frame.width(),
        }
    }
}

/// Flattens chunked frames into rows.
struct RowIter {
    chunks: ChunkIter,
    current: Option<DataFrame>,
    index: usize,
}

impl Iterator for RowIter {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(frame) = &self.current {
                if self.index < frame.height() {
                    let row = row_from_frame(frame, self.index);
                    self.index += 1;
                    return Some(row);
                }
                self.current = None;
            }
            match self.chunks.next()? {
                Ok(frame) => {
                    self.current = Some(frame);
                    self.index = 0;
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

fn row_from_frame(frame: &DataFrame, index: usize) -> Result<Row> {
    let mut row = Row::with_capacity(frame.width());
    for column in frame.get_columns() {
        let value = column.as_materialized_series().get(index)?;
        row.insert(column.name().to_string(), CellValue::from_any(value));
    }
    Ok(row)
}

/// Count records by scanning for line terminators in fixed-size blocks.
fn count_records(path: &Path) -> Result<usize> {
    let mut file = File::open(path)?;
    let mut block = [0u8; COUNT_BLOCK_SIZE];
    let mut newlines = 0usize;
    let mut last_byte = None;

    loop {
        let read = file.read(&mut block)?;
        if read == 0 {
            break;
        }
        newlines += block[..read].iter().filter(|b| **b == b'\n').count();
        last_byte = Some(block[read - 1]);
    }

    match last_byte {
        None => Ok(0),
        Some(b'\n') | Some(b'\r') => Ok(newlines),
        // a final line with no terminator is still a record
        Some(_) => Ok(newlines + 1),
    }
}
