//! Training result types

/// Outcome of [`Trainer::fit`](super::Trainer::fit)
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    /// Epochs actually run
    pub epochs_run: usize,
    /// Epoch of the best checkpoint (early-stop mode)
    pub best_epoch: Option<usize>,
    /// Validation loss of the best checkpoint (early-stop mode)
    pub best_val_loss: Option<f32>,
    /// Whether patience ran out before `max_epochs`
    pub stopped_early: bool,
    /// Mean training loss per epoch
    pub train_losses: Vec<f32>,
    /// Validation loss per epoch, when validated
    pub val_losses: Vec<f32>,
    /// Checkpoints written during the run
    pub checkpoints_saved: usize,
    /// Wall-clock duration in seconds
    pub elapsed_secs: f64,
}

impl TrainReport {
    /// Mean training loss of the last epoch
    pub fn final_train_loss(&self) -> Option<f32> {
        self.train_losses.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_train_loss() {
        let report = TrainReport {
            epochs_run: 2,
            best_epoch: None,
            best_val_loss: None,
            stopped_early: false,
            train_losses: vec![2.0, 1.0],
            val_losses: vec![],
            checkpoints_saved: 1,
            elapsed_secs: 0.0,
        };
        assert_eq!(report.final_train_loss(), Some(1.0));
    }
}
