//! EFU encoder.

use std::borrow::Cow;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use encoding_rs::Encoding;
use tracing::debug;

use crate::error::{EfuError, Result};
use crate::newline::NewlineStyle;

/// Whether a field must be written inside double quotes.
///
/// Only empty fields (the "no value" sentinel) and fields made entirely of
/// ASCII digits are left bare.
pub fn needs_quote(field: &str) -> bool {
    !field.is_empty() && !field.bytes().all(|b| b.is_ascii_digit())
}

/// Append one field to `out`, quoting and escaping as required.
pub fn push_field(out: &mut String, field: &str) {
    if needs_quote(field) {
        out.push('"');
        for ch in field.chars() {
            if ch == '"' {
                out.push('"');
            }
            out.push(ch);
        }
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// Render the header line. Header names are written verbatim.
pub fn header_line<S: AsRef<str>>(header: &[S], newline: NewlineStyle) -> String {
    let mut line = String::new();
    for (i, name) in header.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(name.as_ref());
    }
    line.push_str(newline.as_str());
    line
}

/// Render one data line.
pub fn row_line<S: AsRef<str>>(row: &[S], newline: NewlineStyle) -> String {
    let mut line = String::new();
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        push_field(&mut line, field.as_ref());
    }
    line.push_str(newline.as_str());
    line
}

/// Convert text to bytes under `encoding`, failing on unmappable characters.
///
/// UTF-16 is written without a BOM; a leading U+FEFF in `text` is encoded
/// like any other character. Encodings with no encoder of their own (such as
/// `replacement`) are rejected.
pub fn encode_text<'a>(text: &'a str, encoding: &'static Encoding) -> Result<Cow<'a, [u8]>> {
    if encoding == encoding_rs::UTF_8 {
        return Ok(Cow::Borrowed(text.as_bytes()));
    }
    if encoding == encoding_rs::UTF_16LE {
        return Ok(Cow::Owned(text.encode_utf16().flat_map(u16::to_le_bytes).collect()));
    }
    if encoding == encoding_rs::UTF_16BE {
        return Ok(Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect()));
    }
    if encoding.output_encoding() != encoding {
        return Err(EfuError::Encode {
            encoding: encoding.name(),
        });
    }

    let (bytes, _, had_unmappable) = encoding.encode(text);
    if had_unmappable {
        return Err(EfuError::Encode {
            encoding: encoding.name(),
        });
    }
    Ok(bytes)
}

/// Streaming EFU writer.
///
/// The header is written on construction; rows follow one at a time, so the
/// whole document never has to be held in memory.
pub struct Encoder<W: Write> {
    writer: W,
    newline: NewlineStyle,
    encoding: &'static Encoding,
    rows_written: usize,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder and write the header line.
    pub fn new<S: AsRef<str>>(
        mut writer: W,
        header: &[S],
        newline: NewlineStyle,
        encoding: &'static Encoding,
    ) -> Result<Self> {
        let line = header_line(header, newline);
        writer
            .write_all(&encode_text(&line, encoding)?)
            .map_err(|source| EfuError::Write { source })?;

        Ok(Self {
            writer,
            newline,
            encoding,
            rows_written: 0,
        })
    }

    /// Write one data row.
    pub fn write_row<S: AsRef<str>>(&mut self, row: &[S]) -> Result<()> {
        let line = row_line(row, self.newline);
        self.writer
            .write_all(&encode_text(&line, self.encoding)?)
            .map_err(|source| EfuError::Write { source })?;
        self.rows_written += 1;
        Ok(())
    }

    /// Write several rows.
    pub fn write_rows<I, R, S>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        for row in rows {
            self.write_row(row.as_ref())?;
        }
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|source| EfuError::Write { source })?;
        Ok(self.writer)
    }
}

/// Encode a header and rows into bytes.
pub fn encode<H, R, S>(
    header: &[H],
    rows: &[R],
    newline: NewlineStyle,
    encoding: &'static Encoding,
) -> Result<Vec<u8>>
where
    H: AsRef<str>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut encoder = Encoder::new(Vec::new(), header, newline, encoding)?;
    for row in rows {
        encoder.write_row(row.as_ref())?;
    }
    let bytes = encoder.finish()?;

    debug!(bytes = bytes.len(), rows = rows.len(), newline = %newline, "encoded EFU data");
    Ok(bytes)
}

/// Encode straight into a file.
///
/// Output goes to a temporary file next to `path` which replaces `path` only
/// once every row has been written, so a failure never leaves a partial file.
pub fn encode_to_file<H, R, S>(
    path: impl AsRef<Path>,
    header: &[H],
    rows: &[R],
    newline: NewlineStyle,
    encoding: &'static Encoding,
) -> Result<()>
where
    H: AsRef<str>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let existing = fs::metadata(path).ok().map(|m| m.permissions());
    let mut builder = tempfile::Builder::new();
    if let (None, Some(permissions)) = (&existing, new_file_permissions()) {
        builder.permissions(permissions);
    }

    let temp = builder.tempfile_in(dir).map_err(|e| EfuError::io(dir, e))?;
    let mut encoder = Encoder::new(BufWriter::new(temp), header, newline, encoding)?;
    for row in rows {
        encoder.write_row(row.as_ref())?;
    }
    let temp = encoder
        .finish()?
        .into_inner()
        .map_err(|e| EfuError::io(path, e.into_error()))?;

    // Replacing a file keeps its mode.
    if let Some(permissions) = existing {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|e| EfuError::io(path, e))?;
    }

    temp.persist(path).map_err(|e| EfuError::io(path, e.error))?;

    debug!(path = %path.display(), rows = rows.len(), "wrote EFU file");
    Ok(())
}

/// Mode for a freshly created output file: what a plain create would get
/// after the process umask.
#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_quote() {
        assert!(!needs_quote(""));
        assert!(!needs_quote("0"));
        assert!(!needs_quote("007"));
        assert!(!needs_quote("133876022280081366"));
        assert!(needs_quote("abc"));
        assert!(needs_quote("-1"));
        assert!(needs_quote("1.5"));
        assert!(needs_quote(" 1"));
        assert!(needs_quote(","));
        // Non-ASCII digits are not digits here.
        assert!(needs_quote("١٢٣"));
        assert!(needs_quote("²"));
    }

    #[test]
    fn test_push_field_escapes_quotes() {
        let mut out = String::new();
        push_field(&mut out, r#"he said "hi""#);
        assert_eq!(out, r#""he said ""hi""""#);
    }

    #[test]
    fn test_header_never_quoted() {
        assert_eq!(
            header_line(&["Filename", "Date Modified"], NewlineStyle::CrLf),
            "Filename,Date Modified\r\n"
        );
    }

    #[test]
    fn test_row_line() {
        assert_eq!(
            row_line(&["C:\\msys64", "", "16"], NewlineStyle::Lf),
            "\"C:\\msys64\",,16\n"
        );
    }

    #[test]
    fn test_encoder_counts_rows() {
        let mut encoder =
            Encoder::new(Vec::new(), &["A"], NewlineStyle::Lf, encoding_rs::UTF_8).unwrap();
        encoder.write_row(&["x"]).unwrap();
        encoder.write_row(&["1"]).unwrap();
        assert_eq!(encoder.rows_written(), 2);
        assert_eq!(encoder.finish().unwrap(), b"A\n\"x\"\n1\n");
    }

    #[test]
    fn test_encode_unmappable_character() {
        let rows = vec![vec!["日本"]];
        let err = encode(&["A"], &rows, NewlineStyle::Lf, encoding_rs::WINDOWS_1252).unwrap_err();
        assert!(matches!(err, EfuError::Encode { .. }));
    }

    #[test]
    fn test_encode_utf16() {
        let rows = vec![vec!["x"]];
        let le = encode(&["A"], &rows, NewlineStyle::Lf, encoding_rs::UTF_16LE).unwrap();
        assert_eq!(le, [65, 0, 10, 0, 34, 0, 120, 0, 34, 0, 10, 0]);

        let be = encode(&["A"], &rows, NewlineStyle::Lf, encoding_rs::UTF_16BE).unwrap();
        assert_eq!(be, [0, 65, 0, 10, 0, 34, 0, 120, 0, 34, 0, 10]);
    }

    #[test]
    fn test_utf16_document_roundtrip() {
        let source: Vec<u8> = "\u{feff}Filename,Size\r\n\"日本\",12\r\n"
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();
        let doc = crate::decode::decode(&source, encoding_rs::UTF_16LE).unwrap();
        assert_eq!(doc.newline, NewlineStyle::CrLf);

        let bytes = encode(&doc.header, &doc.rows, doc.newline, encoding_rs::UTF_16LE).unwrap();
        assert_eq!(bytes, source);
    }

    #[test]
    fn test_encode_without_encoder_rejected() {
        let rows: Vec<Vec<&str>> = Vec::new();
        let err = encode(&["A"], &rows, NewlineStyle::Lf, encoding_rs::REPLACEMENT).unwrap_err();
        assert!(matches!(err, EfuError::Encode { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_encode_to_file_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("out.efu");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let rows = vec![vec!["x"]];
        encode_to_file(&path, &["A"], &rows, NewlineStyle::Lf, encoding_rs::UTF_8).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert_eq!(fs::read(&path).unwrap(), b"A\n\"x\"\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_encode_to_file_new_file_follows_umask() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let plain = temp.path().join("plain.txt");
        fs::write(&plain, "").unwrap();
        let path = temp.path().join("out.efu");

        let rows = vec![vec!["x"]];
        encode_to_file(&path, &["A"], &rows, NewlineStyle::Lf, encoding_rs::UTF_8).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&plain));
    }

    #[test]
    fn test_encode_to_missing_directory_leaves_nothing() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("missing").join("out.efu");
        let rows: Vec<Vec<&str>> = Vec::new();

        let err = encode_to_file(&path, &["A"], &rows, NewlineStyle::Lf, encoding_rs::UTF_8)
            .unwrap_err();
        assert!(err.is_filesystem());
        assert!(!path.exists());
    }
}
