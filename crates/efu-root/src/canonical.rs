//! RFC 8785 (JCS) canonical JSON and the short hash built on it.

use std::fmt::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde_json::{Number, Value};
use sha1::{Digest, Sha1};

use crate::error::RootError;

/// Length of a canonical hash, in base64 characters.
pub const HASH_LEN: usize = 10;

/// Serialize `value` as canonical JSON.
///
/// Object members are sorted by their UTF-16 code units, no whitespace is
/// emitted, and strings are escaped minimally. Floats are printed the way
/// ECMAScript's `Number.prototype.toString` prints them. Integers are printed
/// exactly, including those beyond 2^53.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, RootError> {
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    write_value(&mut out, &value);
    Ok(out)
}

/// Short content hash: SHA-1 of the canonical JSON, URL-safe base64 without
/// padding, first ten characters.
pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, RootError> {
    let json = canonical_json(value)?;
    Ok(hash_bytes(json.as_bytes()))
}

pub(crate) fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha1::digest(bytes);
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(HASH_LEN);
    encoded
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut members: Vec<_> = map.iter().collect();
            members.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

            out.push('{');
            for (i, (key, item)) in members.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_number(out: &mut String, n: &Number) {
    if n.is_i64() || n.is_u64() {
        let _ = write!(out, "{n}");
        return;
    }
    match n.as_f64() {
        Some(f) => write_f64(out, f),
        None => {
            let _ = write!(out, "{n}");
        }
    }
}

/// ECMAScript number formatting for a finite double.
fn write_f64(out: &mut String, f: f64) {
    if f == 0.0 {
        out.push('0');
        return;
    }
    if f < 0.0 {
        out.push('-');
    }

    // Shortest round-trip digits and decimal exponent, e.g. "1.23e-18".
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exp.parse::<i32>().unwrap_or(0) + 1;

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat_n('0', (n - k) as usize));
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', (-n) as usize));
        out.push_str(&digits);
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        let e = n - 1;
        let _ = write!(out, "e{}{}", if e < 0 { '-' } else { '+' }, e.abs());
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{0c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if c < ' ' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sorted_compact() {
        let value = json!({"b": 2, "a": 1, "c": [true, null, "x"]});
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#"{"a":1,"b":2,"c":[true,null,"x"]}"#
        );
    }

    #[test]
    fn test_string_escapes() {
        let value = json!("q\"b\\n\nt\tc\u{01}é/");
        assert_eq!(
            canonical_json(&value).unwrap(),
            "\"q\\\"b\\\\n\\nt\\tc\\u0001é/\""
        );
    }

    #[test]
    fn test_utf16_key_order() {
        // U+1F600 sorts before U+FB01 by UTF-16 code units, after it by
        // code points.
        let value = json!({"\u{fb01}": 1, "\u{1f600}": 2});
        assert_eq!(
            canonical_json(&value).unwrap(),
            "{\"\u{1f600}\":2,\"\u{fb01}\":1}"
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(canonical_json(&json!(1.0)).unwrap(), "1");
        assert_eq!(canonical_json(&json!(-0.0)).unwrap(), "0");
        assert_eq!(canonical_json(&json!(2.5)).unwrap(), "2.5");
        assert_eq!(canonical_json(&json!(u64::MAX)).unwrap(), "18446744073709551615");
    }

    #[test]
    fn test_float_exponent_forms() {
        let cases = [
            (1e21, "1e+21"),
            (1e20, "100000000000000000000"),
            (123456789012345680000.0, "123456789012345680000"),
            (1e-7, "1e-7"),
            (0.000001, "0.000001"),
            (0.0000015, "0.0000015"),
            (1.23e-18, "1.23e-18"),
            (-2.5e30, "-2.5e+30"),
            (0.1, "0.1"),
            (123.456, "123.456"),
            (5e-324, "5e-324"),
            (f64::MAX, "1.7976931348623157e+308"),
        ];
        for (value, expected) in cases {
            assert_eq!(canonical_json(&json!(value)).unwrap(), expected, "{value:e}");
        }
    }

    #[test]
    fn test_canonical_hash() {
        let value = json!({"b": 2, "a": 1});
        assert_eq!(canonical_hash(&value).unwrap(), "Ssxx4FRxEu");
        assert_eq!(canonical_hash(&value).unwrap().len(), HASH_LEN);
    }
}
