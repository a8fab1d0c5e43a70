//! Core Trainer struct and basic methods

use crate::embedding::Bundler;
use crate::error::Result;
use crate::io::{Checkpointable, ModelCheckpoint};
use crate::optim::Optimizer;
use crate::train::{MetricsTracker, SgnsLoss, TrainConfig, TrainMode};

/// Drives SGNS training of a bundler with an injected optimizer
pub struct Trainer<B: Bundler> {
    /// Loss module, owns the bundler and the negative sampler
    pub(crate) loss: SgnsLoss<B>,

    /// Optimizer
    pub(crate) optimizer: Box<dyn Optimizer>,

    /// Training configuration
    pub(crate) config: TrainConfig,

    /// Metrics tracker
    pub metrics: MetricsTracker,

    /// Current epoch (1-indexed, 0 before training)
    pub(crate) epoch: usize,

    /// Current step within the epoch (1-indexed)
    pub(crate) step: usize,
}

impl<B: Bundler> Trainer<B> {
    /// Create a new trainer
    pub fn new(loss: SgnsLoss<B>, optimizer: Box<dyn Optimizer>, config: TrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { loss, optimizer, config, metrics: MetricsTracker::new(), epoch: 0, step: 0 })
    }

    /// Get current learning rate
    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }

    /// Set learning rate
    pub fn set_lr(&mut self, lr: f32) {
        self.optimizer.set_lr(lr);
    }

    /// Training configuration
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Loss module
    pub fn loss(&self) -> &SgnsLoss<B> {
        &self.loss
    }

    /// Mutable loss module
    pub fn loss_mut(&mut self) -> &mut SgnsLoss<B> {
        &mut self.loss
    }

    /// Bundler being trained
    pub fn bundler(&self) -> &B {
        self.loss.bundler()
    }

    /// Mutable bundler
    pub fn bundler_mut(&mut self) -> &mut B {
        self.loss.bundler_mut()
    }

    /// Give back the trained bundler
    pub fn into_bundler(self) -> B {
        self.loss.into_bundler()
    }
}

impl<B: Bundler + Checkpointable> Trainer<B> {
    /// Snapshot of the current tables tagged with the run's hyper-parameters
    pub fn checkpoint(&self, epoch: usize, val_loss: Option<f32>) -> ModelCheckpoint {
        let mode = match self.config.mode {
            TrainMode::Fixed => "fixed",
            TrainMode::EarlyStop { .. } => "early_stop",
        };
        let mut ckpt = self.bundler().to_checkpoint().with_n_negs(self.loss.n_negs()).at_epoch(epoch, val_loss);
        ckpt.metadata = ckpt
            .metadata
            .with_hparam("optimizer", self.optimizer.name().into())
            .with_hparam("lr", f64::from(self.lr()).into())
            .with_hparam("n_negs", self.loss.n_negs().into())
            .with_hparam("mode", mode.into());
        ckpt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{Item2Vec, Item2VecConfig};
    use crate::optim::{Adagrad, SGD};
    use crate::sampling::NegativeSampler;

    fn trainer(config: TrainConfig) -> Result<Trainer<Item2Vec>> {
        let model = Item2Vec::new(Item2VecConfig::new(6, 2)).unwrap();
        let loss = SgnsLoss::new(model, NegativeSampler::uniform(6, 0).unwrap(), 2).unwrap();
        Trainer::new(loss, Box::new(Adagrad::default_params(0.05)), config)
    }

    #[test]
    fn test_trainer_creation() {
        let t = trainer(TrainConfig::default()).unwrap();
        assert_eq!(t.lr(), 0.05);
        assert_eq!(t.bundler().vocab_size(), 6);
        assert_eq!(t.metrics.steps, 0);
    }

    #[test]
    fn test_trainer_rejects_invalid_config() {
        assert!(trainer(TrainConfig::new().with_max_epochs(0)).is_err());
    }

    #[test]
    fn test_set_lr() {
        let mut t = trainer(TrainConfig::default()).unwrap();
        t.set_lr(0.01);
        assert_eq!(t.lr(), 0.01);
    }

    #[test]
    fn test_checkpoint_carries_hparams() {
        let model = Item2Vec::new(Item2VecConfig::new(6, 2)).unwrap();
        let loss = SgnsLoss::new(model, NegativeSampler::uniform(6, 0).unwrap(), 4).unwrap();
        let t = Trainer::new(loss, Box::new(SGD::new(0.5, 0.0)), TrainConfig::default()).unwrap();
        let ckpt = t.checkpoint(3, Some(1.0));
        assert_eq!(ckpt.n_negs, 4);
        assert_eq!(ckpt.epoch, Some(3));
        assert_eq!(ckpt.metadata.hparams["optimizer"], "sgd");
        assert_eq!(ckpt.metadata.hparams["mode"], "fixed");
        assert_eq!(ckpt.metadata.hparams["lr"], 0.5);
        assert_eq!(ckpt.metadata.hparams["n_negs"], 4);
    }
}
