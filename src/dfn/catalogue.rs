//! Record-type catalogue built from a definition file.
//!
//! The catalogue maps record-type tags to ordered field layouts. It is
//! immutable after the parse, with one exception: the explicit
//! duplicate-name repair, which rewrites field names in place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::format::FieldKind;

/// Reserved tag for the default data record type after null-tag folding.
pub const DEFAULT_RECORD_TYPE: &str = "";

/// One named entry in a record type's field layout.
///
/// A field may span several physical columns when its format code carries
/// a repeat count: `CON` declared as `30F10.5` fills thirty columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name as declared, not normalized.
    pub name: String,
    /// Raw format code token, e.g. `F12.2`.
    pub format: String,
    /// Unit of measure from `UNIT=`/`UNITS=` metadata.
    pub unit: Option<String>,
    /// Descriptive name from `NAME=` metadata.
    pub long_name: Option<String>,
    /// Null sentinel literal from `NULL=` metadata.
    pub null_value: Option<String>,
    /// Last metadata chunk that matched no known key.
    pub comment: Option<String>,
    /// Physical values per record; at least 1.
    pub repeat: usize,
    /// Characters per physical value; absent when the format code did not
    /// parse.
    pub width: Option<u32>,
    /// Data kind inferred from the format letter; absent when the format
    /// code did not parse.
    pub kind: Option<FieldKind>,
}

impl FieldDef {
    /// A field with nothing but a name and a raw format token. The parser
    /// fills in whatever the format code and metadata yield.
    pub(crate) fn named(name: &str, format: &str) -> Self {
        Self {
            name: name.to_string(),
            format: format.to_string(),
            unit: None,
            long_name: None,
            null_value: None,
            comment: None,
            repeat: 1,
            width: None,
            kind: None,
        }
    }
}

/// One record type: an ordered field layout sharing a tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    /// Fields in declaration order, which is also physical column order.
    pub fields: Vec<FieldDef>,
    /// Format code of the record type's own `RT` discriminator field, if
    /// one was declared.
    pub format: Option<String>,
}

impl RecordType {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// First field with the given name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Mapping from record-type tag to field layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordTypeCatalogue {
    record_types: HashMap<String, RecordType>,
}

impl RecordTypeCatalogue {
    pub fn get(&self, tag: &str) -> Option<&RecordType> {
        self.record_types.get(tag)
    }

    /// Layout of the default (`""`) record type.
    pub fn default_record_type(&self) -> Option<&RecordType> {
        self.get(DEFAULT_RECORD_TYPE)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.record_types.contains_key(tag)
    }

    /// Registered tags, sorted for deterministic output.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.record_types.keys().map(|t| t.as_str()).collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.record_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_types.is_empty()
    }

    /// Record type for `tag`, creating an empty one if it is new.
    pub(crate) fn register(&mut self, tag: &str) -> &mut RecordType {
        self.record_types.entry(tag.to_string()).or_default()
    }

    /// Duplicate field names in the default record type, as a map from
    /// name to occurrence count. Only counts above one are reported.
    pub fn find_duplicate_field_names(&self) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        if let Some(record) = self.default_record_type() {
            for field in &record.fields {
                *counts.entry(field.name.clone()).or_insert(0) += 1;
            }
        }
        counts.retain(|_, count| *count > 1);
        counts
    }

    /// Rewrite duplicated field names in the default record type so every
    /// name is unique.
    ///
    /// `suffix` is a template with an `{n}` placeholder for the per-group
    /// occurrence counter, starting at 1: the default `__{n}` turns two
    /// `LINE` fields into `LINE__1` and `LINE__2`. Derived column name
    /// lists must be recomputed afterwards.
    pub fn fix_duplicate_field_names(&mut self, suffix: &str) {
        let duplicates = self.find_duplicate_field_names();
        let Some(record) = self.record_types.get_mut(DEFAULT_RECORD_TYPE) else {
            return;
        };
        for name in duplicates.keys() {
            let mut n = 1usize;
            for field in record.fields.iter_mut() {
                if field.name == *name {
                    field.name = format!("{}{}", name, suffix.replace("{n}", &n.to_string()));
                    n += 1;
                }
            }
        }
    }
}
