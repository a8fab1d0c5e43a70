//! Validation error types
//!
//! Defines all validation error variants for training specifications.

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Training data path does not exist: {0}")]
    TrainDataNotFound(String),

    #[error("Validation data path does not exist: {0}")]
    ValDataNotFound(String),

    #[error("Test data path does not exist: {0}")]
    TestDataNotFound(String),

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid embedding size: {0} (must be > 0)")]
    InvalidEmbeddingSize(usize),

    #[error("Invalid window size: {0} (must be > 0)")]
    InvalidWindowSize(usize),

    #[error("Invalid negative count: {0} (must be > 0)")]
    InvalidNegatives(usize),

    #[error("Invalid patience: {0} (must be > 0)")]
    InvalidPatience(usize),

    #[error("Invalid improvement epsilon: {0} (must be finite and >= 0.0)")]
    InvalidEpsilon(f32),

    #[error("Invalid top-k cutoff: {0} (must be > 0)")]
    InvalidTopK(usize),

    #[error("Invalid log interval: {0} (must be > 0)")]
    InvalidLogInterval(usize),

    #[error("Invalid optimizer: {0} (must be one of: adagrad, adam, sgd)")]
    InvalidOptimizer(String),

    #[error("Mode train_evaluate needs validation data")]
    MissingValidationData,
}
