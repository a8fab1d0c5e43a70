//! Configuration validation logic
//!
//! Validates training specifications for correctness before execution.

use super::error::ValidationError;
use crate::config::schema::{RunMode, TrainSpec};
use crate::train::ImprovementPolicy;

/// Optimizers `build_optimizer` knows
const VALID_OPTIMIZERS: [&str; 3] = ["adagrad", "adam", "sgd"];

/// Validate a training specification
///
/// Checks numeric ranges, enum values and that `train_evaluate` has
/// validation data. File existence is checked by [`validate_paths`].
pub fn validate_config(spec: &TrainSpec) -> Result<(), ValidationError> {
    if spec.data.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(spec.data.batch_size));
    }
    if spec.data.window_size == 0 {
        return Err(ValidationError::InvalidWindowSize(spec.data.window_size));
    }
    if spec.data.n_negs == 0 {
        return Err(ValidationError::InvalidNegatives(spec.data.n_negs));
    }
    if spec.model.embedding_size == 0 {
        return Err(ValidationError::InvalidEmbeddingSize(spec.model.embedding_size));
    }

    // Validate learning rate (must be positive and reasonable)
    if !(spec.optimizer.lr > 0.0 && spec.optimizer.lr <= 1.0) {
        return Err(ValidationError::InvalidLearningRate(spec.optimizer.lr));
    }
    if !VALID_OPTIMIZERS.contains(&spec.optimizer.name.to_lowercase().as_str()) {
        return Err(ValidationError::InvalidOptimizer(spec.optimizer.name.clone()));
    }

    let training = &spec.training;
    if training.epochs == 0 {
        return Err(ValidationError::InvalidEpochs(training.epochs));
    }
    if training.log_interval == 0 {
        return Err(ValidationError::InvalidLogInterval(training.log_interval));
    }
    if training.k == 0 {
        return Err(ValidationError::InvalidTopK(training.k));
    }

    if training.mode == RunMode::TrainEvaluate {
        if training.patience == 0 {
            return Err(ValidationError::InvalidPatience(training.patience));
        }
        if let ImprovementPolicy::ThresholdTolerant { epsilon } = training.policy {
            if !epsilon.is_finite() || epsilon < 0.0 {
                return Err(ValidationError::InvalidEpsilon(epsilon));
            }
        }
        if spec.data.valid.is_none() {
            return Err(ValidationError::MissingValidationData);
        }
    }

    Ok(())
}

/// Check that every referenced data file exists
pub fn validate_paths(spec: &TrainSpec) -> Result<(), ValidationError> {
    let data = &spec.data;
    let train = data.resolve(&data.train);
    if !train.is_file() {
        return Err(ValidationError::TrainDataNotFound(train.display().to_string()));
    }
    if let Some(valid) = &data.valid {
        let valid = data.resolve(valid);
        if !valid.is_file() {
            return Err(ValidationError::ValDataNotFound(valid.display().to_string()));
        }
    }
    if let Some(test) = &data.test {
        let test = data.resolve(test);
        if !test.is_file() {
            return Err(ValidationError::TestDataNotFound(test.display().to_string()));
        }
    }
    Ok(())
}
