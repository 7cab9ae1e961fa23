//! Column projection: fields onto physical data columns.
//!
//! A field whose format code carries a repeat count owns several physical
//! columns: `CON` declared as `30F10.5` fills `CON[0]` through `CON[29]`.
//! This module derives the ordered column layout of a record type and
//! keeps the field/column mapping bidirectional, so data-table columns
//! can always be traced back to their definition-file field.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::dfn::catalogue::RecordType;
use crate::error::{GdfError, Result};
use crate::format::{FieldKind, FormatCode};

static INDEXED_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d+\]$").expect("indexed column pattern"));

/// Column name for one slot of a multi-valued field.
fn slot_name(field: &str, slot: usize) -> String {
    format!("{field}[{slot}]")
}

/// Ordered column layout for one record type, with field↔column lookup.
///
/// Derived on demand from the catalogue and never stored on it, so a
/// duplicate-name repair automatically invalidates old layouts.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    names: Vec<String>,
    name_to_index: HashMap<String, usize>,
    field_to_columns: HashMap<String, Vec<String>>,
    column_to_field: HashMap<String, String>,
}

impl ColumnMapping {
    pub fn for_record_type(record: &RecordType) -> Self {
        let mut mapping = Self::default();
        for field in &record.fields {
            if field.repeat == 1 {
                mapping.insert(field.name.clone(), &field.name);
            } else {
                for slot in 0..field.repeat {
                    mapping.insert(slot_name(&field.name, slot), &field.name);
                }
            }
        }
        mapping
    }

    fn insert(&mut self, column: String, field: &str) {
        self.name_to_index.insert(column.clone(), self.names.len());
        self.column_to_field.insert(column.clone(), field.to_string());
        self.field_to_columns
            .entry(field.to_string())
            .or_default()
            .push(column.clone());
        self.names.push(column);
    }

    /// Column names in physical order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a column in the physical layout.
    pub fn get_index(&self, column: &str) -> Option<usize> {
        self.name_to_index.get(column).copied()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.name_to_index.contains_key(column)
    }

    /// Expand a field name into its physical column names.
    ///
    /// A name already in `name[i]` form resolves to itself. Unknown names
    /// are a lookup error, never a silent empty result.
    pub fn field_columns(&self, name: &str) -> Result<Vec<String>> {
        if let Some(columns) = self.field_to_columns.get(name) {
            Ok(columns.clone())
        } else if self.name_to_index.contains_key(name) {
            Ok(vec![name.to_string()])
        } else {
            Err(GdfError::FieldNotFound {
                name: name.to_string(),
            })
        }
    }

    /// Owning field for a column name: exact match on an emitted column,
    /// or a `name[i]` pattern traced back to its bare field name.
    pub fn field_for_column(&self, column: &str) -> Option<&str> {
        if let Some(field) = self.column_to_field.get(column) {
            return Some(field.as_str());
        }
        let bare = INDEXED_COLUMN.replace(column, "");
        self.field_to_columns
            .get_key_value(bare.as_ref())
            .map(|(name, _)| name.as_str())
    }

    /// Expand a mixed selection of field and column names in place,
    /// preserving order and dropping repeats.
    pub fn expand_selection(&self, selection: &[&str]) -> Result<Vec<String>> {
        let mut expanded = Vec::new();
        for name in selection {
            for column in self.field_columns(name)? {
                if !expanded.contains(&column) {
                    expanded.push(column);
                }
            }
        }
        Ok(expanded)
    }
}

/// Fully-resolved definition of one physical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub unit: Option<String>,
    pub null_value: Option<String>,
    pub width: Option<u32>,
    /// Format code for a single value, repeat prefix stripped.
    pub column_format: String,
    pub kind: Option<FieldKind>,
    pub field_name: String,
    pub field_format: String,
    pub field_long_name: Option<String>,
    pub field_comment: Option<String>,
    pub field_repeat: usize,
}

/// Per-column projections of every field in a record type, in physical
/// order.
pub fn column_definitions(record: &RecordType) -> Vec<ColumnDef> {
    let mut definitions = Vec::new();
    for field in &record.fields {
        let column_format = FormatCode::parse(&field.format)
            .map(|code| code.column_format())
            .unwrap_or_else(|_| field.format.clone());
        let columns: Vec<String> = if field.repeat == 1 {
            vec![field.name.clone()]
        } else {
            (0..field.repeat)
                .map(|slot| slot_name(&field.name, slot))
                .collect()
        };
        for name in columns {
            definitions.push(ColumnDef {
                name,
                unit: field.unit.clone(),
                null_value: field.null_value.clone(),
                width: field.width,
                column_format: column_format.clone(),
                kind: field.kind,
                field_name: field.name.clone(),
                field_format: field.format.clone(),
                field_long_name: field.long_name.clone(),
                field_comment: field.comment.clone(),
                field_repeat: field.repeat,
            });
        }
    }
    definitions
}
