//! Record and collection types.

use std::ops::Index;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::document::{Document, Row};
use crate::error::Result;
use crate::filetime::Filetime;
use crate::newline::NewlineStyle;
use crate::objects;
use crate::value::Value;

/// Column holding the full path.
pub const FILENAME: &str = "Filename";
/// Column holding the size in bytes (empty for directories).
pub const SIZE: &str = "Size";
/// Column holding the modification FILETIME.
pub const DATE_MODIFIED: &str = "Date Modified";
/// Column holding the creation FILETIME.
pub const DATE_CREATED: &str = "Date Created";
/// Column holding the attribute bitmask.
pub const ATTRIBUTES: &str = "Attributes";

/// Header written by the indexing tool's file list export.
pub const STANDARD_COLUMNS: [&str; 5] = [FILENAME, SIZE, DATE_MODIFIED, DATE_CREATED, ATTRIBUTES];

/// An ordered column → value mapping.
pub type Object = IndexMap<String, Value>;

/// Tracking data kept alongside a record, never written to the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// When the entry was first observed.
    pub first_seen: Filetime,
    /// When the entry was last observed.
    pub last_seen: Filetime,
    /// When the entry was last found missing.
    pub last_lost: Filetime,
    /// Identifier of the root the entry was collected under.
    pub root: Option<String>,
}

impl Provenance {
    /// Provenance for an entry observed now for the first time.
    pub fn seen_at(time: Filetime, root: Option<String>) -> Self {
        Self {
            first_seen: time,
            last_seen: time,
            last_lost: Filetime::default(),
            root,
        }
    }
}

/// One EFU entry.
///
/// The key order of `fields` is the record's schema: a record created from a
/// header has every column present, set to [`Value::Null`], and keeps that
/// order. Keys inserted later are appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfuRecord {
    fields: Object,
    #[serde(default)]
    provenance: Provenance,
}

impl EfuRecord {
    /// Create a record with every column set to null.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: columns
                .into_iter()
                .map(|c| (c.into(), Value::Null))
                .collect(),
            provenance: Provenance::default(),
        }
    }

    /// Create a record and fill it from `data`.
    pub fn with_data<I, S, D, K, V>(columns: I, data: D) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        D: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Self::new(columns);
        record.extend(data);
        record
    }

    /// Create a record from a decoded row.
    pub fn from_row<S: AsRef<str>>(columns: &[S], row: &[String]) -> Self {
        let mut record = Self::new(columns.iter().map(|c| c.as_ref()));
        for (column, field) in columns.iter().zip(row) {
            record.set(column.as_ref(), Value::from_field(field));
        }
        record
    }

    /// Replace the provenance.
    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Set a value, returning the previous one. Unknown columns are appended.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(column.into(), value.into())
    }

    /// Set a value only if the column is part of the record.
    pub fn set_existing(&mut self, column: &str, value: impl Into<Value>) -> bool {
        match self.fields.get_mut(column) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Set several values.
    pub fn extend<D, K, V>(&mut self, data: D)
    where
        D: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in data {
            self.set(key, value);
        }
    }

    /// Check if a column is present.
    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Column/value pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The underlying mapping.
    pub fn fields(&self) -> &Object {
        &self.fields
    }

    /// Consume the record, keeping only the mapping.
    pub fn into_fields(self) -> Object {
        self.fields
    }

    /// Tracking data.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Mutable tracking data.
    pub fn provenance_mut(&mut self) -> &mut Provenance {
        &mut self.provenance
    }

    /// Render as raw fields in the order of `columns`.
    pub fn to_row<S: AsRef<str>>(&self, columns: &[S]) -> Row {
        columns
            .iter()
            .map(|c| {
                self.get(c.as_ref())
                    .map(|v| v.to_field().into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl Index<&str> for EfuRecord {
    type Output = Value;

    /// Panics if the column is missing.
    fn index(&self, column: &str) -> &Value {
        &self.fields[column]
    }
}

/// Ordered collection of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EfuRecords {
    records: Vec<EfuRecord>,
}

impl EfuRecords {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build typed records from a decoded document.
    pub fn from_document(document: &Document) -> Self {
        document
            .rows
            .iter()
            .map(|row| EfuRecord::from_row(&document.header, row))
            .collect()
    }

    /// Header and rows for this collection, keyed by the first record.
    pub fn to_document(&self, newline: NewlineStyle) -> Result<Document> {
        let (header, rows) = objects::objects_to_rows(&self.records)?;
        Ok(Document::new(header, rows, newline))
    }

    /// Append a record.
    pub fn push(&mut self, record: EfuRecord) {
        self.records.push(record);
    }

    /// Get a record by position.
    pub fn get(&self, index: usize) -> Option<&EfuRecord> {
        self.records.get(index)
    }

    /// Iterate over records.
    pub fn iter(&self) -> std::slice::Iter<'_, EfuRecord> {
        self.records.iter()
    }

    /// Iterate mutably over records.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, EfuRecord> {
        self.records.iter_mut()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records as a slice.
    pub fn as_slice(&self) -> &[EfuRecord] {
        &self.records
    }

    /// Sort records by a column's raw field text.
    pub fn sort_by_column(&mut self, column: &str) {
        self.records.sort_by(|a, b| {
            let a = a.get(column).map(|v| v.to_field()).unwrap_or_default();
            let b = b.get(column).map(|v| v.to_field()).unwrap_or_default();
            a.cmp(&b)
        });
    }

    /// Consume the collection.
    pub fn into_inner(self) -> Vec<EfuRecord> {
        self.records
    }
}

impl Index<usize> for EfuRecords {
    type Output = EfuRecord;

    fn index(&self, index: usize) -> &EfuRecord {
        &self.records[index]
    }
}

impl From<Vec<EfuRecord>> for EfuRecords {
    fn from(records: Vec<EfuRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<EfuRecord> for EfuRecords {
    fn from_iter<I: IntoIterator<Item = EfuRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<EfuRecord> for EfuRecords {
    fn extend<I: IntoIterator<Item = EfuRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl IntoIterator for EfuRecords {
    type Item = EfuRecord;
    type IntoIter = std::vec::IntoIter<EfuRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a EfuRecords {
    type Item = &'a EfuRecord;
    type IntoIter = std::slice::Iter<'a, EfuRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
