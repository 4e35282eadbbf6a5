//! EFU decoder.
//!
//! Decoding happens in two phases. The newline style is a property of the
//! whole buffer and is decided from the raw bytes first; only then is the
//! text split into lines and each line scanned for quoted fields.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::Encoding;
use tracing::debug;

use crate::document::{Document, Row};
use crate::error::{EfuError, Result};
use crate::newline::NewlineStyle;

/// Scanner state while walking one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InQuote,
}

/// Split one data line into fields.
///
/// `""` inside a quoted section is an escaped quote; any other `"` toggles
/// quoting. Commas only separate fields outside quotes. Malformed quoting is
/// not reported: an unterminated quote keeps the rest of the line in the
/// current field.
pub fn parse_row(line: &str) -> Row {
    let mut row = Vec::new();
    let mut field = String::new();
    let mut state = ScanState::Normal;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match (state, ch) {
            (ScanState::InQuote, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            (ScanState::InQuote, '"') => state = ScanState::Normal,
            (ScanState::Normal, '"') => state = ScanState::InQuote,
            (ScanState::Normal, ',') => row.push(std::mem::take(&mut field)),
            (_, ch) => field.push(ch),
        }
    }

    row.push(field);
    row
}

/// Split the header line on commas, without quote handling.
pub fn parse_header(line: &str) -> Vec<String> {
    line.trim_end_matches(['\r', '\n'])
        .split(',')
        .map(str::to_string)
        .collect()
}

/// Split text into the header line (terminator included) and the rest.
///
/// The header ends at the first `\n`, `\r` or `\r\n`, whatever the file's
/// detected style is.
fn split_header(text: &str) -> (&str, &str) {
    match text.find(['\r', '\n']) {
        Some(pos) => {
            let end = if text[pos..].starts_with("\r\n") {
                pos + 2
            } else {
                pos + 1
            };
            text.split_at(end)
        }
        None => (text, ""),
    }
}

/// Decode already-decoded text with a known newline style.
pub fn decode_str(text: &str, newline: NewlineStyle) -> Document {
    let (header_line, rest) = split_header(text);
    let header = parse_header(header_line);

    let rows: Vec<Row> = rest
        .split(newline.as_str())
        .filter(|line| !line.is_empty())
        .map(parse_row)
        .collect();

    Document::new(header, rows, newline)
}

/// Decode raw bytes into text, without BOM handling or newline translation.
pub fn decode_text<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Result<Cow<'a, str>> {
    if encoding == encoding_rs::UTF_8 {
        return std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|e| EfuError::Decode {
                encoding: encoding.name(),
                offset: Some(e.valid_up_to()),
            });
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or(EfuError::Decode {
            encoding: encoding.name(),
            offset: None,
        })
}

/// Decode an EFU buffer.
///
/// For ASCII-compatible encodings the newline style comes from the raw bytes;
/// for UTF-16 it comes from the decoded text.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<Document> {
    let text = decode_text(bytes, encoding)?;
    let newline = if encoding.is_ascii_compatible() {
        NewlineStyle::detect(bytes)
    } else {
        NewlineStyle::detect_text(&text)
    };
    let document = decode_str(&text, newline);

    debug!(
        bytes = bytes.len(),
        rows = document.rows.len(),
        columns = document.header.len(),
        newline = %newline,
        "decoded EFU data"
    );

    Ok(document)
}

/// Read and decode an EFU file.
pub fn decode_file(path: impl AsRef<Path>, encoding: &'static Encoding) -> Result<Document> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| EfuError::io(path, e))?;
    decode(&bytes, encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> Row {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_parse_row_plain_and_quoted() {
        assert_eq!(
            parse_row(r#""C:\msys64",,133876022280081366,133739602603410395,16"#),
            row(&["C:\\msys64", "", "133876022280081366", "133739602603410395", "16"])
        );
    }

    #[test]
    fn test_parse_row_escaped_quote() {
        assert_eq!(
            parse_row(r#""he said ""hi""",1"#),
            row(&[r#"he said "hi""#, "1"])
        );
    }

    #[test]
    fn test_parse_row_comma_in_quotes() {
        assert_eq!(parse_row(r#""a,b",c"#), row(&["a,b", "c"]));
    }

    #[test]
    fn test_parse_row_trailing_empty_field() {
        assert_eq!(parse_row("1,"), row(&["1", ""]));
        assert_eq!(parse_row(","), row(&["", ""]));
    }

    #[test]
    fn test_parse_row_unterminated_quote_swallows_rest() {
        assert_eq!(parse_row(r#""abc,1,2"#), row(&["abc,1,2"]));
    }

    #[test]
    fn test_parse_row_quote_in_middle_of_bare_field() {
        // Quotes toggle state wherever they appear.
        assert_eq!(parse_row(r#"ab"c,d"e,f"#), row(&["abc,de", "f"]));
    }

    #[test]
    fn test_parse_header_ignores_quotes() {
        assert_eq!(
            parse_header("Filename,\"Size\"\r\n"),
            vec!["Filename".to_string(), "\"Size\"".to_string()]
        );
    }

    #[test]
    fn test_split_header_terminators() {
        assert_eq!(split_header("a,b\r\nrest"), ("a,b\r\n", "rest"));
        assert_eq!(split_header("a,b\nrest"), ("a,b\n", "rest"));
        assert_eq!(split_header("a,b\rrest"), ("a,b\r", "rest"));
        assert_eq!(split_header("a,b"), ("a,b", ""));
    }

    #[test]
    fn test_decode_skips_blank_lines() {
        let doc = decode(b"A,B\n1,2\n\n3,4\n", encoding_rs::UTF_8).unwrap();
        assert_eq!(doc.rows, vec![row(&["1", "2"]), row(&["3", "4"])]);
    }

    #[test]
    fn test_decode_empty_input() {
        let doc = decode(b"", encoding_rs::UTF_8).unwrap();
        assert_eq!(doc.header, vec![String::new()]);
        assert!(doc.rows.is_empty());
        assert_eq!(doc.newline, NewlineStyle::Lf);
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode(b"A,B\n\xff\n", encoding_rs::UTF_8).unwrap_err();
        assert!(matches!(
            err,
            EfuError::Decode {
                offset: Some(4),
                ..
            }
        ));
    }

    #[test]
    fn test_decode_keeps_bom_in_header() {
        let doc = decode(b"\xEF\xBB\xBFFilename,Size\n", encoding_rs::UTF_8).unwrap();
        assert_eq!(doc.header[0], "\u{feff}Filename");
    }

    #[test]
    fn test_decode_utf16le_crlf() {
        let bytes: Vec<u8> = "A\r\n\"x\"\r\n"
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();
        let doc = decode(&bytes, encoding_rs::UTF_16LE).unwrap();
        assert_eq!(doc.newline, NewlineStyle::CrLf);
        assert_eq!(doc.header, vec!["A"]);
        assert_eq!(doc.rows, vec![row(&["x"])]);
    }

    #[test]
    fn test_decode_windows_1252() {
        let doc = decode(b"Filename\n\"caf\xe9\"\n", encoding_rs::WINDOWS_1252).unwrap();
        assert_eq!(doc.rows, vec![row(&["café"])]);
    }
}
