//! Epoch-level training and validation operations

use super::core::Trainer;
use crate::embedding::Bundler;
use crate::error::{Error, Result};
use crate::train::ItemBatch;

impl<B: Bundler> Trainer<B> {
    /// Train for one epoch
    ///
    /// Returns the mean loss over the batches that produced a finite loss.
    pub fn train_epoch<I>(&mut self, batches: I) -> Result<f32>
    where
        I: IntoIterator<Item = ItemBatch>,
    {
        let mut total_loss = 0.0;
        let mut num_batches = 0usize;
        self.step = 0;

        for batch in batches {
            self.step += 1;
            if let Some(loss) = self.train_step(&batch)? {
                total_loss += loss;
                num_batches += 1;
            }

            if self.step % self.config.log_interval == 0 {
                tracing::debug!(
                    epoch = self.epoch,
                    step = self.step,
                    loss = total_loss / num_batches.max(1) as f32,
                    lr = self.lr(),
                    "training progress"
                );
            }
        }

        if self.step == 0 {
            return Err(Error::InvalidParameter(format!("epoch {} had no training batches", self.epoch)));
        }
        if num_batches == 0 {
            return Ok(f32::NAN);
        }
        Ok(total_loss / num_batches as f32)
    }

    /// Mean loss over `batches` with the bundler in eval mode
    ///
    /// No graph is recorded and no weights change. The bundler's previous
    /// mode is restored afterwards, also on error.
    pub fn validate(&mut self, batches: &[ItemBatch]) -> Result<f32> {
        if batches.is_empty() {
            return Err(Error::InvalidParameter("no validation batches".into()));
        }

        let mode = self.bundler().context();
        self.bundler_mut().eval();
        let result = self.validation_loss(batches);
        self.bundler_mut().set_context(mode);
        result
    }

    fn validation_loss(&mut self, batches: &[ItemBatch]) -> Result<f32> {
        let mut total = 0.0;
        for (i, batch) in batches.iter().enumerate() {
            let loss = if self.config.mask_padding {
                self.loss.forward_masked(batch)?
            } else {
                self.loss.forward(batch, None)?
            };
            let value = loss.item();
            if !value.is_finite() {
                tracing::error!(epoch = self.epoch, batch = i + 1, loss = value, "non-finite validation loss");
                return Err(Error::NonFiniteLoss { epoch: self.epoch, step: i + 1, loss: value });
            }
            total += value;
        }
        Ok(total / batches.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use crate::embedding::{Bundler, Item2Vec, Item2VecConfig};
    use crate::error::Error;
    use crate::optim::Adagrad;
    use crate::sampling::NegativeSampler;
    use crate::train::{ItemBatch, SgnsLoss, TrainConfig, Trainer};
    use ndarray::array;

    fn trainer() -> Trainer<Item2Vec> {
        let model = Item2Vec::new(Item2VecConfig::new(6, 3).with_seed(2)).unwrap();
        let loss = SgnsLoss::new(model, NegativeSampler::uniform(6, 3).unwrap(), 2).unwrap();
        Trainer::new(loss, Box::new(Adagrad::default_params(0.1)), TrainConfig::default().with_log_interval(1))
            .unwrap()
    }

    fn batches() -> Vec<ItemBatch> {
        vec![
            ItemBatch::new(vec![1, 2], array![[0, 3], [1, 4]]).unwrap(),
            ItemBatch::new(vec![5], array![[2, 3]]).unwrap(),
        ]
    }

    #[test]
    fn test_train_epoch_mean_loss() {
        let mut t = trainer();
        let loss = t.train_epoch(batches()).unwrap();
        assert!(loss.is_finite());
        assert_eq!(t.metrics.steps, 2);
    }

    #[test]
    fn test_train_epoch_requires_batches() {
        let mut t = trainer();
        assert!(matches!(t.train_epoch(Vec::new()), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_validate_leaves_weights_and_mode() {
        let mut t = trainer();
        let iv = t.bundler().ivectors().data().clone();
        let ov = t.bundler().ovectors().data().clone();

        let loss = t.validate(&batches()).unwrap();
        assert!(loss.is_finite());
        assert_eq!(t.bundler().ivectors().data(), &iv);
        assert_eq!(t.bundler().ovectors().data(), &ov);
        assert!(t.bundler().context().is_training());
        assert_eq!(t.metrics.steps, 0);
    }

    #[test]
    fn test_validate_restores_mode_on_error() {
        let mut t = trainer();
        let bad = vec![ItemBatch::new(vec![1], array![[9]]).unwrap()];
        assert!(t.validate(&bad).is_err());
        assert!(t.bundler().context().is_training());
    }

    #[test]
    fn test_validate_keeps_eval_mode() {
        let mut t = trainer();
        t.bundler_mut().eval();
        assert!(t.validate(&batches()).unwrap().is_finite());
        assert!(!t.bundler().context().is_training());
    }

    #[test]
    fn test_validate_requires_batches() {
        let mut t = trainer();
        assert!(t.validate(&[]).is_err());
    }
}
