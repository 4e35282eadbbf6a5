//! Codec configuration types.

use derive_builder::Builder;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::{EfuError, Result};
use crate::newline::NewlineStyle;

/// Configuration shared by decoding and encoding calls.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CodecConfig {
    /// WHATWG label of the text encoding (e.g. `utf-8`, `windows-1252`).
    #[builder(default = "default_encoding()")]
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Newline style for writing. `None` means "as detected" when
    /// re-encoding a decoded document and LF otherwise.
    #[builder(default)]
    #[serde(default)]
    pub newline: Option<NewlineStyle>,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

impl CodecConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref label) = self.encoding {
            if Encoding::for_label(label.as_bytes()).is_none() {
                return Err(format!("Unknown encoding label: {label}"));
            }
        }
        Ok(())
    }
}

impl CodecConfig {
    /// Create a new codec config builder.
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }

    /// Resolve the configured label to an encoding.
    pub fn encoding(&self) -> Result<&'static Encoding> {
        resolve_encoding(&self.encoding)
    }

    /// Newline style to write with, falling back to `detected`.
    pub fn newline_or(&self, detected: NewlineStyle) -> NewlineStyle {
        self.newline.unwrap_or(detected)
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            newline: None,
        }
    }
}

/// Look up an encoding by its WHATWG label.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| EfuError::InvalidConfig {
        message: format!("Unknown encoding label: {label}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = CodecConfig::builder()
            .encoding("windows-1252")
            .newline(NewlineStyle::CrLf)
            .build()
            .unwrap();

        assert_eq!(config.encoding().unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(config.newline, Some(NewlineStyle::CrLf));
    }

    #[test]
    fn test_config_defaults() {
        let config = CodecConfig::builder().build().unwrap();
        assert_eq!(config, CodecConfig::default());
        assert_eq!(config.encoding().unwrap(), encoding_rs::UTF_8);
        assert_eq!(config.newline_or(NewlineStyle::CrLf), NewlineStyle::CrLf);
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert!(CodecConfig::builder().encoding("klingon").build().is_err());
        assert!(matches!(
            resolve_encoding("klingon"),
            Err(EfuError::InvalidConfig { .. })
        ));
    }
}
