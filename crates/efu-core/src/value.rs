//! Typed field values.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A field value as seen by the objects layer.
///
/// The codec only knows strings; this typing is applied on top of it. An
/// empty field is `Null`, an all-digit field that fits in 64 bits is
/// `Integer`, anything else is `Text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Empty field.
    #[default]
    Null,
    /// Unsigned decimal number.
    Integer(u64),
    /// Any other text.
    Text(String),
}

impl Value {
    /// Type a raw field.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            return Self::Null;
        }
        if field.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = field.parse::<u64>() {
                return Self::Integer(n);
            }
        }
        Self::Text(field.to_string())
    }

    /// Render back to a raw field.
    pub fn to_field(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Integer(n) => Cow::Owned(n.to_string()),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }

    /// Check if this is the empty value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the integer, if any.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the text, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_field())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Integer(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Integer(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
