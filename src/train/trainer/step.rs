//! Training step operations

use super::core::Trainer;
use crate::autograd::backward;
use crate::embedding::Bundler;
use crate::error::{Error, Result};
use crate::train::ItemBatch;

impl<B: Bundler> Trainer<B> {
    /// Perform a single training step
    ///
    /// Clears gradients, computes the SGNS loss, back-propagates and applies
    /// one optimizer update. Returns the batch loss, or `None` when the loss
    /// was non-finite and anomaly detection is off (the batch is skipped
    /// without touching the weights).
    pub fn train_step(&mut self, batch: &ItemBatch) -> Result<Option<f32>> {
        self.optimizer.zero_grad(&mut self.loss.bundler_mut().parameters_mut());

        let loss = if self.config.mask_padding {
            self.loss.forward_masked(batch)?
        } else {
            self.loss.forward(batch, None)?
        };
        let value = loss.item();

        if !value.is_finite() {
            if self.config.detect_anomaly {
                tracing::error!(epoch = self.epoch, step = self.step, loss = value, "non-finite loss");
                return Err(Error::NonFiniteLoss { epoch: self.epoch, step: self.step, loss: value });
            }
            tracing::warn!(epoch = self.epoch, step = self.step, loss = value, "skipping batch with non-finite loss");
            self.metrics.skipped_batches += 1;
            return Ok(None);
        }

        backward(&loss, None);
        self.optimizer.step(&mut self.loss.bundler_mut().parameters_mut());
        self.metrics.increment_step();

        Ok(Some(value))
    }
}
