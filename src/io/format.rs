//! Checkpoint file formats

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// On-disk encoding of a checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointFormat {
    /// JSON (default)
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl CheckpointFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            CheckpointFormat::Json => "json",
            CheckpointFormat::Yaml => "yaml",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(CheckpointFormat::Json),
            "yaml" | "yml" => Some(CheckpointFormat::Yaml),
            _ => None,
        }
    }

    pub(crate) fn encode<T: Serialize>(&self, value: &T, pretty: bool) -> Result<String> {
        match self {
            CheckpointFormat::Json if pretty => serde_json::to_string_pretty(value)
                .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}"))),
            CheckpointFormat::Json => serde_json::to_string(value)
                .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}"))),
            CheckpointFormat::Yaml => serde_yaml::to_string(value)
                .map_err(|e| Error::Serialization(format!("YAML serialization failed: {e}"))),
        }
    }

    pub(crate) fn decode<T: for<'de> Deserialize<'de>>(&self, text: &str) -> Result<T> {
        match self {
            CheckpointFormat::Json => serde_json::from_str(text)
                .map_err(|e| Error::Serialization(format!("JSON deserialization failed: {e}"))),
            CheckpointFormat::Yaml => serde_yaml::from_str(text)
                .map_err(|e| Error::Serialization(format!("YAML deserialization failed: {e}"))),
        }
    }
}

impl FromStr for CheckpointFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(CheckpointFormat::Json),
            "yaml" | "yml" => Ok(CheckpointFormat::Yaml),
            other => Err(Error::ConfigError(format!("unknown checkpoint format '{other}'"))),
        }
    }
}
