//! Training configuration and metrics tracking

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How the early-stopping controller decides an epoch improved
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImprovementPolicy {
    /// Improved iff the loss is strictly below the previous epoch's
    #[default]
    StrictDecrease,
    /// Improved iff the loss moved by more than `epsilon` since the previous
    /// epoch and is the lowest seen so far
    ThresholdTolerant {
        /// Changes of at most this size count as flat
        epsilon: f32,
    },
}

/// Fixed-length or early-stopped training
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TrainMode {
    /// Run every epoch, persist the final model once
    #[default]
    Fixed,
    /// Validate after each epoch, persist the best model, stop after
    /// `patience` consecutive epochs without improvement
    EarlyStop {
        /// Consecutive stagnant epochs tolerated
        patience: usize,
        /// Improvement test
        #[serde(default)]
        policy: ImprovementPolicy,
    },
}

/// Training configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Upper bound on epochs
    pub max_epochs: usize,

    /// Fixed or early-stopped
    pub mode: TrainMode,

    /// Log progress every N steps
    pub log_interval: usize,

    /// Abort on NaN/Inf batch loss instead of skipping the batch
    pub detect_anomaly: bool,

    /// Mask padded context slots out of the loss
    pub mask_padding: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self { max_epochs: 10, mode: TrainMode::Fixed, log_interval: 100, detect_anomaly: true, mask_padding: true }
    }
}

impl TrainConfig {
    /// Create a new training config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum number of epochs
    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    /// Set training mode
    pub fn with_mode(mut self, mode: TrainMode) -> Self {
        self.mode = mode;
        self
    }

    /// Early stopping with the given patience and policy
    pub fn with_early_stopping(self, patience: usize, policy: ImprovementPolicy) -> Self {
        self.with_mode(TrainMode::EarlyStop { patience, policy })
    }

    /// Set log interval
    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }

    /// Abort or skip on non-finite batch loss
    pub fn with_detect_anomaly(mut self, detect: bool) -> Self {
        self.detect_anomaly = detect;
        self
    }

    /// Mask padded context slots
    pub fn with_mask_padding(mut self, mask: bool) -> Self {
        self.mask_padding = mask;
        self
    }

    /// Check ranges
    pub fn validate(&self) -> Result<()> {
        if self.max_epochs == 0 {
            return Err(Error::InvalidParameter("max_epochs must be positive".into()));
        }
        if self.log_interval == 0 {
            return Err(Error::InvalidParameter("log_interval must be positive".into()));
        }
        if let TrainMode::EarlyStop { patience, policy } = self.mode {
            if patience == 0 {
                return Err(Error::InvalidParameter("patience must be positive".into()));
            }
            if let ImprovementPolicy::ThresholdTolerant { epsilon } = policy {
                if !(epsilon.is_finite() && epsilon >= 0.0) {
                    return Err(Error::InvalidParameter(format!("epsilon must be >= 0, got {epsilon}")));
                }
            }
        }
        Ok(())
    }
}

/// Per-epoch loss history and step counter
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    /// Mean training loss per epoch
    pub train_losses: Vec<f32>,
    /// Validation loss per epoch, when validated
    pub val_losses: Vec<f32>,
    /// Optimizer steps taken
    pub steps: usize,
    /// Batches skipped for a non-finite loss
    pub skipped_batches: usize,
}

impl MetricsTracker {
    /// Create new metrics tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record training loss of an epoch
    pub fn record_epoch_loss(&mut self, loss: f32) {
        self.train_losses.push(loss);
    }

    /// Record validation loss of an epoch
    pub fn record_val_loss(&mut self, loss: f32) {
        self.val_losses.push(loss);
    }

    /// Increment step counter
    pub fn increment_step(&mut self) {
        self.steps += 1;
    }

    /// Lowest validation loss so far
    pub fn best_val_loss(&self) -> Option<f32> {
        self.val_losses.iter().copied().reduce(f32::min)
    }

    /// Epochs recorded
    pub fn epochs(&self) -> usize {
        self.train_losses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainConfig::default();
        assert_eq!(config.mode, TrainMode::Fixed);
        assert!(config.detect_anomaly);
        assert!(config.mask_padding);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = TrainConfig::new()
            .with_max_epochs(3)
            .with_early_stopping(2, ImprovementPolicy::ThresholdTolerant { epsilon: 1e-3 })
            .with_log_interval(5)
            .with_detect_anomaly(false);
        assert_eq!(config.max_epochs, 3);
        assert_eq!(
            config.mode,
            TrainMode::EarlyStop { patience: 2, policy: ImprovementPolicy::ThresholdTolerant { epsilon: 1e-3 } }
        );
        assert!(!config.detect_anomaly);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(TrainConfig::new().with_max_epochs(0).validate().is_err());
        assert!(TrainConfig::new().with_log_interval(0).validate().is_err());
        assert!(TrainConfig::new().with_early_stopping(0, ImprovementPolicy::StrictDecrease).validate().is_err());
        let negative = ImprovementPolicy::ThresholdTolerant { epsilon: -1.0 };
        assert!(TrainConfig::new().with_early_stopping(1, negative).validate().is_err());
    }

    #[test]
    fn test_mode_serde_tags() {
        let mode: TrainMode = serde_yaml::from_str("mode: early_stop\npatience: 3\n").unwrap();
        assert_eq!(mode, TrainMode::EarlyStop { patience: 3, policy: ImprovementPolicy::StrictDecrease });
        let policy: ImprovementPolicy =
            serde_yaml::from_str("type: threshold_tolerant\nepsilon: 0.01\n").unwrap();
        assert_eq!(policy, ImprovementPolicy::ThresholdTolerant { epsilon: 0.01 });
    }

    #[test]
    fn test_metrics_tracker() {
        let mut m = MetricsTracker::new();
        m.record_epoch_loss(2.0);
        m.record_val_loss(1.5);
        m.record_val_loss(1.2);
        m.increment_step();
        assert_eq!(m.epochs(), 1);
        assert_eq!(m.steps, 1);
        assert_eq!(m.best_val_loss(), Some(1.2));
    }
}
