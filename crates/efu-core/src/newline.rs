//! Record separator handling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Line terminator used for every line of an EFU file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineStyle {
    /// `"\n"`.
    #[default]
    Lf,
    /// `"\r\n"`.
    CrLf,
}

impl NewlineStyle {
    /// Detect the style of a whole buffer.
    ///
    /// Any CR LF pair anywhere makes the buffer CRLF; everything else is LF.
    pub fn detect(raw: &[u8]) -> Self {
        if raw.windows(2).any(|pair| pair == b"\r\n") {
            Self::CrLf
        } else {
            Self::Lf
        }
    }

    /// Detect the style of already-decoded text.
    ///
    /// Used for encodings where a CR LF pair is not the bytes `0D 0A`.
    pub fn detect_text(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::CrLf
        } else {
            Self::Lf
        }
    }

    /// The terminator as text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Short name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Lf => "lf",
            Self::CrLf => "crlf",
        }
    }
}

impl fmt::Display for NewlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NewlineStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lf" | "unix" => Ok(Self::Lf),
            "crlf" | "windows" => Ok(Self::CrLf),
            other => Err(format!("unknown newline style: {other}")),
        }
    }
}
