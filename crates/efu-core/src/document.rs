//! Decoded EFU document.

use std::path::Path;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::newline::NewlineStyle;
use crate::{decode, encode};

/// One data line: the fields in column order.
pub type Row = Vec<String>;

/// Header, rows and the newline style they were read with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Column names, in file order.
    pub header: Vec<String>,
    /// Data rows, in file order. Lengths are not checked against the header.
    pub rows: Vec<Row>,
    /// Line terminator for the whole file.
    pub newline: NewlineStyle,
}

impl Document {
    /// Create a document.
    pub fn new(header: Vec<String>, rows: Vec<Row>, newline: NewlineStyle) -> Self {
        Self {
            header,
            rows,
            newline,
        }
    }

    /// Decode a document from bytes.
    pub fn from_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<Self> {
        decode::decode(bytes, encoding)
    }

    /// Read and decode a document from a file.
    pub fn read(path: impl AsRef<Path>, encoding: &'static Encoding) -> Result<Self> {
        decode::decode_file(path, encoding)
    }

    /// Encode with the document's own newline style.
    pub fn to_bytes(&self, encoding: &'static Encoding) -> Result<Vec<u8>> {
        encode::encode(&self.header, &self.rows, self.newline, encoding)
    }

    /// Write the document to a file with its own newline style.
    pub fn write(&self, path: impl AsRef<Path>, encoding: &'static Encoding) -> Result<()> {
        encode::encode_to_file(path, &self.header, &self.rows, self.newline, encoding)
    }

    /// Rows whose field count differs from the header's column count.
    pub fn ragged_rows(&self) -> impl Iterator<Item = (usize, &Row)> {
        let width = self.header.len();
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, row)| row.len() != width)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the document has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_rows() {
        let doc = Document::new(
            vec!["A".into(), "B".into()],
            vec![
                vec!["1".into(), "2".into()],
                vec!["3".into()],
                vec!["4".into(), "5".into(), "6".into()],
            ],
            NewlineStyle::Lf,
        );

        let ragged: Vec<usize> = doc.ragged_rows().map(|(i, _)| i).collect();
        assert_eq!(ragged, vec![1, 2]);
        assert_eq!(doc.len(), 3);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let source = b"Filename,Size\r\n\"a\",1\r\n\"b\",\r\n";
        let doc = Document::from_bytes(source, encoding_rs::UTF_8).unwrap();
        assert_eq!(doc.newline, NewlineStyle::CrLf);
        assert_eq!(doc.to_bytes(encoding_rs::UTF_8).unwrap(), source);
    }
}
