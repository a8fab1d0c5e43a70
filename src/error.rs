//! Crate-wide error type

use thiserror::Error;

/// Errors raised while building, training or persisting item embeddings
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization / deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A parameter outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Tensor shapes that do not line up
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Item index outside `[0, vocab_size)`
    #[error("Index {index} out of range for vocabulary of size {vocab_size}")]
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Vocabulary size of the table being indexed
        vocab_size: usize,
    },

    /// Vocabulary or frequency data with no usable items
    #[error("Empty vocabulary: {0}")]
    EmptyVocabulary(String),

    /// Loss became NaN or infinite
    #[error("Non-finite loss {loss} at epoch {epoch}, step {step}")]
    NonFiniteLoss {
        /// Epoch (1-indexed)
        epoch: usize,
        /// Batch index within the epoch
        step: usize,
        /// The offending value
        loss: f32,
    },

    /// Checkpoint could not be written or read back
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Requested device has no backend in this build
    #[error("Unsupported device: {0}")]
    UnsupportedDevice(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_out_of_range_message() {
        let e = Error::IndexOutOfRange { index: 7, vocab_size: 5 };
        assert_eq!(e.to_string(), "Index 7 out of range for vocabulary of size 5");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: Error = io.into();
        assert!(matches!(e, Error::Io(_)));
    }

    #[test]
    fn test_json_conversion() {
        let bad: std::result::Result<u32, _> = serde_json::from_str::<u32>("not json");
        let e: Error = bad.unwrap_err().into();
        assert!(matches!(e, Error::Serialization(_)));
    }
}
