//! Row decoding shared by the table engines.
//!
//! Turns raw data-file lines into typed polars columns: fixed-width
//! slicing or whitespace splitting, null-sentinel application, and
//! kind-directed value parsing. A line that disagrees with the declared
//! layout fails the read with its row number; columns are never silently
//! misaligned.

use polars::prelude::*;

use crate::engine::{DecodeMethod, ReadConfig};
use crate::error::{GdfError, Result};
use crate::format::FieldKind;

/// One column selected for output.
struct OutputColumn {
    name: String,
    kind: Option<FieldKind>,
    null_value: Option<String>,
    /// Byte offset of this column's slice (fixed-width only).
    start: usize,
    /// Slice width in bytes (fixed-width only).
    width: usize,
    /// Position among all physical columns (whitespace token index).
    index: usize,
}

/// Decodes batches of lines according to one [`ReadConfig`].
pub struct RowDecoder {
    method: DecodeMethod,
    /// Count of physical columns a row must provide.
    total_columns: usize,
    /// Start offset of every physical column (fixed-width only).
    starts: Vec<usize>,
    outputs: Vec<OutputColumn>,
}

impl RowDecoder {
    pub fn new(config: &ReadConfig) -> Result<Self> {
        let mut outputs = Vec::new();
        let mut starts = Vec::with_capacity(config.columns.len());
        let mut offset = 0usize;

        for (index, column) in config.columns.iter().enumerate() {
            let width = match config.method {
                DecodeMethod::FixedWidth => {
                    // every width is needed: offsets depend on all
                    // preceding columns, selected or not
                    Some(column.width.ok_or_else(|| GdfError::MissingWidth {
                        field: column.name.clone(),
                    })? as usize)
                }
                DecodeMethod::Whitespace => column.width.map(|w| w as usize),
            };
            starts.push(offset);

            let selected = config
                .usecols
                .as_ref()
                .is_none_or(|cols| cols.iter().any(|c| c == &column.name));
            if selected {
                outputs.push(OutputColumn {
                    name: column.name.clone(),
                    kind: column.kind,
                    null_value: config.null_values.get(&column.name).cloned(),
                    start: offset,
                    width: width.unwrap_or(0),
                    index,
                });
            }

            if config.method == DecodeMethod::FixedWidth {
                offset += width.unwrap_or(0);
            }
        }

        Ok(Self {
            method: config.method,
            total_columns: config.columns.len(),
            starts,
            outputs,
        })
    }

    /// Decode `(row_number, line)` pairs into one frame. Row numbers are
    /// 1-based positions in the data file, used for error reporting.
    pub fn decode_batch<'a, I>(&self, lines: I) -> Result<DataFrame>
    where
        I: IntoIterator<Item = (usize, &'a str)>,
    {
        let mut builders: Vec<ColumnBuilder> =
            self.outputs.iter().map(ColumnBuilder::new).collect();

        for (row, line) in lines {
            match self.method {
                DecodeMethod::Whitespace => {
                    let tokens: Vec<&str> = line.split_whitespace().collect();
                    if tokens.len() != self.total_columns {
                        return Err(GdfError::RowDecode {
                            row,
                            expected: self.total_columns,
                            found: tokens.len(),
                        });
                    }
                    for (output, builder) in self.outputs.iter().zip(builders.iter_mut()) {
                        builder.push(output, tokens[output.index]);
                    }
                }
                DecodeMethod::FixedWidth => {
                    // every physical column must at least begin on the
                    // line; a truncated final slice is tolerated since
                    // trailing blanks are commonly stripped
                    if self.starts.last().is_some_and(|last| line.len() <= *last) {
                        return Err(GdfError::RowDecode {
                            row,
                            expected: self.total_columns,
                            found: self.starts.iter().filter(|s| **s < line.len()).count(),
                        });
                    }
                    for (output, builder) in self.outputs.iter().zip(builders.iter_mut()) {
                        let end = output.start + output.width;
                        let token = line
                            .get(output.start..end)
                            .or_else(|| line.get(output.start..))
                            .unwrap_or("");
                        builder.push(output, token);
                    }
                }
            }
        }

        let columns: Vec<Column> = self
            .outputs
            .iter()
            .zip(builders)
            .map(|(output, builder)| builder.into_column(&output.name))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// Does a trimmed token hit the column's null sentinel?
///
/// Matches the literal trimmed sentinel, and for numeric columns also a
/// numerically equal rendering (`-99.90000` hits `-99.9`).
fn matches_null(token: &str, null_value: Option<&str>, numeric: bool) -> bool {
    let Some(null_value) = null_value else {
        return false;
    };
    let null_value = null_value.trim();
    if token == null_value {
        return true;
    }
    if numeric {
        if let (Ok(a), Ok(b)) = (token.parse::<f64>(), null_value.parse::<f64>()) {
            return a == b;
        }
    }
    false
}

/// Typed value accumulator for one output column.
enum ColumnBuilder {
    Real(Vec<Option<f64>>),
    Integer(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
}

impl ColumnBuilder {
    fn new(output: &OutputColumn) -> Self {
        match output.kind {
            Some(FieldKind::Real) => Self::Real(Vec::new()),
            Some(FieldKind::Integer) => Self::Integer(Vec::new()),
            // no parsed kind reads as text, like the original engines
            Some(FieldKind::Text) | None => Self::Text(Vec::new()),
        }
    }

    fn push(&mut self, output: &OutputColumn, raw: &str) {
        let token = raw.trim();
        match self {
            Self::Real(values) => {
                if token.is_empty() || matches_null(token, output.null_value.as_deref(), true) {
                    values.push(None);
                } else {
                    // unparseable numerics (e.g. Fortran overflow
                    // asterisks) read as missing
                    values.push(token.parse::<f64>().ok());
                }
            }
            Self::Integer(values) => {
                if token.is_empty() || matches_null(token, output.null_value.as_deref(), true) {
                    values.push(None);
                } else {
                    values.push(token.parse::<i64>().ok());
                }
            }
            Self::Text(values) => {
                if token.is_empty() || matches_null(token, output.null_value.as_deref(), false) {
                    values.push(None);
                } else {
                    values.push(Some(token.to_string()));
                }
            }
        }
    }

    fn into_column(self, name: &str) -> Column {
        match self {
            Self::Real(values) => Series::new(name.into(), values).into_column(),
            Self::Integer(values) => Series::new(name.into(), values).into_column(),
            Self::Text(values) => Series::new(name.into(), values).into_column(),
        }
    }
}
