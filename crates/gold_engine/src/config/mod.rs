//! Configuration system
//!
//! Two concerns live here:
//! - [`Config`]: engine settings files (TOML or RON, chosen by extension)
//! - [`DataFormat`]: the structured-data decoder used for prefab and scene documents

use std::path::Path;

pub use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match extension(path).as_deref() {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Load configuration from file, or fall back to defaults when the file does not exist
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path).as_deref() {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Structured-data format of a prefab or scene document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// JSON via `serde_json`
    #[default]
    Json,
    /// RON via `ron`
    Ron,
}

impl DataFormat {
    /// Pick the format from a file name: `.ron` is RON, anything else is JSON
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match extension(path.as_ref()).as_deref() {
            Some("ron") => Self::Ron,
            _ => Self::Json,
        }
    }

    /// Decode a document
    pub fn decode<T: DeserializeOwned>(self, text: &str) -> Result<T, DecodeError> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| DecodeError {
                format: self,
                message: e.to_string(),
            }),
            Self::Ron => ron::from_str(text).map_err(|e| DecodeError {
                format: self,
                message: e.to_string(),
            }),
        }
    }
}

/// A document failed to decode
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed {format:?} document: {message}")]
pub struct DecodeError {
    /// Format that was being decoded
    pub format: DataFormat,
    /// Decoder message (includes the position when the decoder reports one)
    pub message: String,
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
