//! Core codec and types for Everything EFU file lists.
//!
//! EFU files are CSV exports with a fixed quoting convention: header names
//! are never quoted, empty and all-digit fields are written bare, and every
//! other field is quoted with inner quotes doubled. Decoding and re-encoding
//! a file that follows the convention reproduces it byte for byte.
//!
//! # Example
//!
//! ```rust
//! use efu_core::{Document, NewlineStyle, UTF_8};
//!
//! let source = b"Filename,Size\r\n\"C:\\msys64\",\r\n";
//! let doc = Document::from_bytes(source, UTF_8).unwrap();
//!
//! assert_eq!(doc.newline, NewlineStyle::CrLf);
//! assert_eq!(doc.rows[0], vec!["C:\\msys64", ""]);
//! assert_eq!(doc.to_bytes(UTF_8).unwrap(), source);
//! ```

mod config;
mod decode;
mod document;
mod encode;
mod error;
mod filetime;
mod newline;
mod objects;
mod record;
mod value;

pub use config::{CodecConfig, CodecConfigBuilder, resolve_encoding};
pub use decode::{decode, decode_file, decode_str, decode_text, parse_header, parse_row};
pub use document::{Document, Row};
pub use encode::{
    Encoder, encode, encode_text, encode_to_file, header_line, needs_quote, push_field, row_line,
};
pub use error::{EfuError, Result};
pub use filetime::{Filetime, TICKS_PER_SECOND, UNIX_EPOCH_TICKS};
pub use newline::NewlineStyle;
pub use objects::{FieldMap, efu_to_objects, objects_to_efu, objects_to_rows, rows_to_objects};
pub use record::{
    ATTRIBUTES, DATE_CREATED, DATE_MODIFIED, EfuRecord, EfuRecords, FILENAME, Object, Provenance,
    SIZE, STANDARD_COLUMNS,
};
pub use value::Value;

pub use encoding_rs::{Encoding, UTF_8};
