//! Build training components from configuration

use super::schema::{OptimSpec, RunMode, TrainSpec};
use crate::embedding::{Item2Vec, Item2VecConfig};
use crate::error::{Error, Result};
use crate::optim::{Adagrad, Adam, Optimizer, SGD};
use crate::sampling::NegativeSampler;
use crate::train::{TrainConfig, TrainMode};
use crate::vocab::Vocabulary;

// Optimizer parameter field names
const PARAM_MOMENTUM: &str = "momentum";
const PARAM_BETA1: &str = "beta1";
const PARAM_BETA2: &str = "beta2";
const PARAM_EPS: &str = "eps";
const PARAM_INITIAL_ACCUMULATOR: &str = "initial_accumulator";

fn param_or(spec: &OptimSpec, key: &str, default: f32) -> f32 {
    spec.params.get(key).and_then(serde_json::Value::as_f64).map_or(default, |v| v as f32)
}

/// Build optimizer from configuration
pub fn build_optimizer(spec: &OptimSpec) -> Result<Box<dyn Optimizer>> {
    match spec.name.to_lowercase().as_str() {
        "adagrad" => {
            let eps = param_or(spec, PARAM_EPS, 1e-10);
            let initial = param_or(spec, PARAM_INITIAL_ACCUMULATOR, 0.0);
            Ok(Box::new(Adagrad::new(spec.lr, eps, initial)))
        }
        "sgd" => Ok(Box::new(SGD::new(spec.lr, param_or(spec, PARAM_MOMENTUM, 0.0)))),
        "adam" => {
            let beta1 = param_or(spec, PARAM_BETA1, 0.9);
            let beta2 = param_or(spec, PARAM_BETA2, 0.999);
            let eps = param_or(spec, PARAM_EPS, 1e-8);
            Ok(Box::new(Adam::new(spec.lr, beta1, beta2, eps)))
        }
        name => Err(Error::ConfigError(format!("Unknown optimizer: {name}. Supported: adagrad, adam, sgd"))),
    }
}

/// Fresh model sized to `vocab`
pub fn build_model(spec: &TrainSpec, vocab: &Vocabulary) -> Result<Item2Vec> {
    let config = Item2VecConfig::new(vocab.len(), spec.model.embedding_size)
        .with_pad_idx(vocab.pad_idx())
        .with_device(spec.model.device)
        .with_seed(spec.model.seed);
    Item2Vec::new(config)
}

/// Negative sampler over `vocab`, frequency-weighted when configured
pub fn build_sampler(spec: &TrainSpec, vocab: &Vocabulary) -> Result<NegativeSampler> {
    // offset keeps the sampler stream apart from the initialisation stream
    let seed = spec.model.seed.wrapping_add(1);
    if spec.data.weighted {
        NegativeSampler::weighted(&vocab.frequencies(), seed)
    } else {
        NegativeSampler::uniform(vocab.len(), seed)
    }
}

/// Loop configuration for the run mode
pub fn build_train_config(spec: &TrainSpec) -> TrainConfig {
    let training = &spec.training;
    let config = TrainConfig::new()
        .with_max_epochs(training.epochs)
        .with_log_interval(training.log_interval)
        .with_detect_anomaly(training.detect_anomaly)
        .with_mask_padding(training.mask_padding);
    match training.mode {
        RunMode::Train => config.with_mode(TrainMode::Fixed),
        RunMode::TrainEvaluate => config.with_early_stopping(training.patience, training.policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DataSpec, ModelSpec, TrainingParams};
    use crate::embedding::Bundler;
    use crate::train::ImprovementPolicy;
    use std::collections::HashMap;

    fn optim(name: &str) -> OptimSpec {
        OptimSpec { name: name.to_string(), lr: 0.05, params: HashMap::new() }
    }

    fn spec() -> TrainSpec {
        TrainSpec {
            model: ModelSpec { embedding_size: 4, seed: 3, ..Default::default() },
            data: DataSpec::default(),
            optimizer: optim("adagrad"),
            training: TrainingParams::default(),
        }
    }

    #[test]
    fn test_build_known_optimizers() {
        for (name, expected) in [("adagrad", "adagrad"), ("SGD", "sgd"), ("adam", "adam")] {
            let opt = build_optimizer(&optim(name)).unwrap();
            assert_eq!(opt.name(), expected);
            assert!((opt.lr() - 0.05).abs() < 1e-9);
        }
    }

    #[test]
    fn test_unknown_optimizer() {
        let err = build_optimizer(&optim("lion")).err().unwrap();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_optimizer_params_are_read() {
        let mut spec = optim("sgd");
        spec.params.insert(PARAM_MOMENTUM.into(), serde_json::json!(0.9));
        assert!(build_optimizer(&spec).is_ok());
    }

    #[test]
    fn test_build_model_matches_vocab() {
        let vocab = Vocabulary::build(["a", "b", "a"], 1).unwrap();
        let model = build_model(&spec(), &vocab).unwrap();
        assert_eq!(model.vocab_size(), 3);
        assert_eq!(model.embedding_size(), 4);
        assert_eq!(model.pad_idx(), 0);
    }

    #[test]
    fn test_build_sampler_kinds() {
        let vocab = Vocabulary::build(["a", "b", "a"], 1).unwrap();
        let mut s = spec();
        assert!(build_sampler(&s, &vocab).unwrap().probabilities().is_some());
        s.data.weighted = false;
        assert!(build_sampler(&s, &vocab).unwrap().probabilities().is_none());
    }

    #[test]
    fn test_train_config_per_mode() {
        let mut s = spec();
        s.training.epochs = 7;
        assert_eq!(build_train_config(&s).mode, TrainMode::Fixed);
        assert_eq!(build_train_config(&s).max_epochs, 7);

        s.training.mode = RunMode::TrainEvaluate;
        s.training.patience = 2;
        assert_eq!(
            build_train_config(&s).mode,
            TrainMode::EarlyStop { patience: 2, policy: ImprovementPolicy::StrictDecrease }
        );
    }
}
