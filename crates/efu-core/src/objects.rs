//! Conversion between raw rows and typed column → value objects.

use std::path::Path;

use encoding_rs::Encoding;

use crate::decode;
use crate::document::Row;
use crate::encode;
use crate::error::{EfuError, Result};
use crate::newline::NewlineStyle;
use crate::record::{EfuRecord, Object};
use crate::value::Value;

/// Something that maps column names to values in a fixed order.
pub trait FieldMap {
    /// Column names in order.
    fn column_names(&self) -> Vec<&str>;

    /// Value for a column, if present.
    fn value(&self, column: &str) -> Option<&Value>;
}

impl FieldMap for Object {
    fn column_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn value(&self, column: &str) -> Option<&Value> {
        self.get(column)
    }
}

impl FieldMap for EfuRecord {
    fn column_names(&self) -> Vec<&str> {
        self.columns().collect()
    }

    fn value(&self, column: &str) -> Option<&Value> {
        self.get(column)
    }
}

/// Type every row against the header.
///
/// Short rows read as null for the missing columns; extra fields are ignored.
pub fn rows_to_objects<S: AsRef<str>>(header: &[S], rows: &[Row]) -> Vec<Object> {
    rows.iter()
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let field = row.get(i).map(String::as_str).unwrap_or("");
                    (column.as_ref().to_string(), Value::from_field(field))
                })
                .collect()
        })
        .collect()
}

/// Decode a file into typed objects.
pub fn efu_to_objects(path: impl AsRef<Path>, encoding: &'static Encoding) -> Result<Vec<Object>> {
    let document = decode::decode_file(path, encoding)?;
    Ok(rows_to_objects(&document.header, &document.rows))
}

/// Flatten objects to a header and raw rows.
///
/// The header is the first object's column order; later objects are read by
/// name, with missing columns written as empty fields.
pub fn objects_to_rows<T: FieldMap>(objects: &[T]) -> Result<(Vec<String>, Vec<Row>)> {
    let first = objects.first().ok_or(EfuError::EmptyRecordSet)?;
    let header: Vec<String> = first.column_names().into_iter().map(String::from).collect();

    let rows = objects
        .iter()
        .map(|object| {
            header
                .iter()
                .map(|column| {
                    object
                        .value(column)
                        .map(|v| v.to_field().into_owned())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    Ok((header, rows))
}

/// Write objects to an EFU file. The newline defaults to LF.
pub fn objects_to_efu<T: FieldMap>(
    objects: &[T],
    path: impl AsRef<Path>,
    newline: Option<NewlineStyle>,
    encoding: &'static Encoding,
) -> Result<()> {
    let (header, rows) = objects_to_rows(objects)?;
    encode::encode_to_file(path, &header, &rows, newline.unwrap_or_default(), encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(pairs: &[(&str, Value)]) -> Object {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_rows_to_objects_short_row() {
        let header = ["A", "B", "C"];
        let rows = vec![vec!["x".to_string(), "12".to_string()]];
        let objects = rows_to_objects(&header, &rows);

        assert_eq!(
            objects,
            vec![object(&[
                ("A", Value::from("x")),
                ("B", Value::Integer(12)),
                ("C", Value::Null),
            ])]
        );
    }

    #[test]
    fn test_objects_to_rows_uses_first_keys() {
        let objects = vec![
            object(&[("A", Value::from("x")), ("B", Value::Null)]),
            object(&[("B", Value::Integer(3)), ("Z", Value::from("ignored"))]),
        ];
        let (header, rows) = objects_to_rows(&objects).unwrap();

        assert_eq!(header, vec!["A", "B"]);
        assert_eq!(rows, vec![vec!["x", ""], vec!["", "3"]]);
    }

    #[test]
    fn test_empty_objects_rejected() {
        let objects: Vec<Object> = Vec::new();
        assert!(matches!(
            objects_to_rows(&objects),
            Err(EfuError::EmptyRecordSet)
        ));
    }
}
