//! Multi-epoch training loop

use super::core::Trainer;
use super::result::TrainReport;
use crate::embedding::Bundler;
use crate::error::{Error, Result};
use crate::io::{CheckpointStore, Checkpointable};
use crate::train::metrics::{MetricsSink, TAG_TRAIN_LOSS, TAG_VAL_LOSS};
use crate::train::{EarlyStopping, ItemBatch, TrainMode};
use std::time::Instant;

/// Checkpoint tag of the best model in early-stop mode
pub const BEST_TAG: &str = "best";

/// Checkpoint tag of the model after the last epoch in fixed mode
pub const FINAL_TAG: &str = "final";

impl<B: Bundler + Checkpointable> Trainer<B> {
    /// Train with validation on `val_batches` after every epoch
    ///
    /// `train_fn` is called once per epoch (1-indexed) and returns that
    /// epoch's training batches, so callers can reshuffle. An error from it
    /// aborts the run. In fixed mode an empty validation set skips
    /// validation; early stopping requires one.
    pub fn fit<FT, IT>(
        &mut self,
        train_fn: FT,
        val_batches: &[ItemBatch],
        store: &mut dyn CheckpointStore,
        sink: &mut dyn MetricsSink,
    ) -> Result<TrainReport>
    where
        FT: FnMut(usize) -> Result<IT>,
        IT: IntoIterator<Item = ItemBatch>,
    {
        self.fit_with(
            train_fn,
            |trainer, _| {
                if val_batches.is_empty() {
                    Ok(None)
                } else {
                    trainer.validate(val_batches).map(Some)
                }
            },
            store,
            sink,
        )
    }

    /// Train with a caller-supplied validation step
    ///
    /// `val_fn` receives the trainer and the epoch and returns that epoch's
    /// validation loss, or `None` when there is nothing to validate.
    ///
    /// Fixed mode runs `max_epochs` epochs and saves [`FINAL_TAG`] once at
    /// the end. Early-stop mode saves [`BEST_TAG`] whenever the validation
    /// loss is the best so far and returns as soon as patience runs out.
    pub fn fit_with<FT, IT, FV>(
        &mut self,
        mut train_fn: FT,
        mut val_fn: FV,
        store: &mut dyn CheckpointStore,
        sink: &mut dyn MetricsSink,
    ) -> Result<TrainReport>
    where
        FT: FnMut(usize) -> Result<IT>,
        IT: IntoIterator<Item = ItemBatch>,
        FV: FnMut(&mut Self, usize) -> Result<Option<f32>>,
    {
        let start = Instant::now();
        let mut controller = match self.config.mode {
            TrainMode::Fixed => None,
            TrainMode::EarlyStop { patience, policy } => Some(EarlyStopping::new(patience, policy)),
        };
        let mut epochs_run = 0;
        let mut last_val_loss = None;
        let mut checkpoints_saved = 0;
        let mut stopped_early = false;

        tracing::info!(
            max_epochs = self.config.max_epochs,
            mode = ?self.config.mode,
            optimizer = self.optimizer.name(),
            lr = self.lr(),
            "training started"
        );

        for epoch in 1..=self.config.max_epochs {
            self.epoch = epoch;
            let train_loss = self.train_epoch(train_fn(epoch)?)?;
            self.metrics.record_epoch_loss(train_loss);
            sink.log_scalar(TAG_TRAIN_LOSS, train_loss, epoch);

            let val_loss = val_fn(&mut *self, epoch)?;
            if let Some(loss) = val_loss {
                if !loss.is_finite() {
                    tracing::error!(epoch, loss, "non-finite validation loss");
                    return Err(Error::NonFiniteLoss { epoch, step: 0, loss });
                }
                self.metrics.record_val_loss(loss);
                sink.log_scalar(TAG_VAL_LOSS, loss, epoch);
            }
            tracing::info!(epoch, train_loss, val_loss = ?val_loss, "epoch complete");
            epochs_run = epoch;
            last_val_loss = val_loss;

            let Some(controller) = controller.as_mut() else { continue };
            let loss = val_loss.ok_or_else(|| {
                Error::ConfigError("early stopping needs validation batches".into())
            })?;
            let decision = controller.observe(epoch, loss);
            if decision.is_best {
                store.save(BEST_TAG, &self.checkpoint(epoch, Some(loss)))?;
                checkpoints_saved += 1;
                tracing::info!(epoch, val_loss = loss, "new best model saved");
            }
            if decision.should_stop() {
                tracing::info!(
                    epoch,
                    patience = controller.patience(),
                    best_epoch = ?controller.best_epoch(),
                    "early stopping"
                );
                stopped_early = true;
                break;
            }
        }

        if controller.is_none() {
            store.save(FINAL_TAG, &self.checkpoint(epochs_run, last_val_loss))?;
            checkpoints_saved += 1;
        }

        Ok(TrainReport {
            epochs_run,
            best_epoch: controller.as_ref().and_then(EarlyStopping::best_epoch),
            best_val_loss: controller.as_ref().and_then(EarlyStopping::best_loss),
            stopped_early,
            train_losses: self.metrics.train_losses.clone(),
            val_losses: self.metrics.val_losses.clone(),
            checkpoints_saved,
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}
