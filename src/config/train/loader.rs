//! Main entry points for YAML-based training

use super::data::{load_run_data, RunData};
use crate::config::builder::{build_model, build_optimizer, build_sampler, build_train_config};
use crate::config::schema::{RunMode, TrainSpec};
use crate::config::validate::{validate_config, validate_paths};
use crate::embedding::Item2Vec;
use crate::error::{Error, Result};
use crate::eval::{evaluate_ranking, RankingReport};
use crate::io::{CheckpointStore, FileCheckpointStore};
use crate::train::{
    ItemBatch, JsonlSink, MetricsSink, SgnsLoss, TracingSink, TrainReport, Trainer, BEST_TAG,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Metric name for the reloaded best model's validation loss
pub const METRIC_VALID_LOSS: &str = "valid_loss";

/// Result of `train_evaluate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluateReport {
    /// Validation loss of the reloaded best model
    pub valid_loss: f32,
    /// Epoch the best model was saved at
    pub early_stop_epoch: Option<usize>,
}

/// Outcome of a configured run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Mode that ran
    pub mode: RunMode,
    /// Loop statistics
    pub train: TrainReport,
    /// HR@k / MRR@k on the test users (`train` mode with test data)
    pub ranking: Option<RankingReport>,
    /// Reloaded-best validation (`train_evaluate` mode)
    pub evaluation: Option<EvaluateReport>,
    /// Directory holding checkpoints and the vocabulary
    pub save_dir: PathBuf,
}

/// Read, parse and validate a YAML training configuration
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<TrainSpec> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!("Failed to read config file {}: {}", config_path.as_ref().display(), e))
    })?;

    let spec: TrainSpec = serde_yaml::from_str(&yaml_content)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))?;

    validate_config(&spec).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;
    Ok(spec)
}

/// Train from a YAML configuration file
///
/// # Example
///
/// ```no_run
/// use itemvec::config::train_from_yaml;
///
/// let report = train_from_yaml("config.yaml")?;
/// println!("ran {} epochs", report.train.epochs_run);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn train_from_yaml<P: AsRef<Path>>(config_path: P) -> Result<RunReport> {
    let spec = load_config(config_path)?;
    train_from_spec(&spec)
}

/// Run a validated specification
///
/// 1. Checks the data files exist and loads every split
/// 2. Builds model, sampler, optimizer and loop configuration
/// 3. Trains in the configured mode, writing checkpoints under `save_dir`
/// 4. `train`: ranks the test users and logs HR@k / MRR@k with the run's
///    hyper-parameters. `train_evaluate`: reloads the best checkpoint and
///    reports its validation loss
pub fn train_from_spec(spec: &TrainSpec) -> Result<RunReport> {
    validate_config(spec).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;
    validate_paths(spec).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;

    tracing::info!(
        model = %spec.model.name,
        embedding_size = spec.model.embedding_size,
        optimizer = %spec.optimizer.name,
        lr = spec.optimizer.lr,
        batch_size = spec.data.batch_size,
        epochs = spec.training.epochs,
        mode = ?spec.training.mode,
        "config loaded and validated"
    );

    let data = load_run_data(spec)?;
    let save_dir = spec.training.save_dir.clone();
    fs::create_dir_all(&save_dir)?;
    data.vocab.save(save_dir.join(format!("{}_vocab.json", spec.model.name)))?;

    let mut store = FileCheckpointStore::new(&save_dir, spec.model.name.clone())
        .with_format(spec.training.format)
        .with_pretty(spec.training.pretty);
    let mut sink: Box<dyn MetricsSink> = match &spec.training.log_dir {
        Some(dir) => Box::new(JsonlSink::create(dir)?),
        None => Box::new(TracingSink),
    };

    let mut trainer = new_trainer(spec, &data, build_model(spec, &data.vocab)?)?;
    let train = fit(spec, &data, &mut trainer, &mut store, sink.as_mut())?;
    let hparams = hparams(spec, data.vocab.len());

    let mut report = RunReport { mode: spec.training.mode, train, ranking: None, evaluation: None, save_dir };
    match spec.training.mode {
        RunMode::Train => {
            if data.test.is_empty() {
                tracing::info!("no test users, skipping ranking evaluation");
                sink.log_hparams(&hparams, &BTreeMap::new());
            } else {
                let ranking = evaluate_ranking(trainer.bundler(), &data.test, spec.training.k)?;
                tracing::info!(%ranking, "test ranking");
                let metrics = BTreeMap::from([
                    (ranking.hit_ratio_tag(), ranking.hit_ratio as f32),
                    (ranking.mrr_tag(), ranking.mrr as f32),
                ]);
                sink.log_hparams(&hparams, &metrics);
                report.ranking = Some(ranking);
            }
        }
        RunMode::TrainEvaluate => {
            let best = Item2Vec::from_checkpoint(&store.load(BEST_TAG)?)?;
            let mut evaluator = new_trainer(spec, &data, best)?;
            let valid_loss = evaluator.validate(&data.valid)?;
            let evaluation = EvaluateReport { valid_loss, early_stop_epoch: report.train.best_epoch };
            tracing::info!(valid_loss, early_stop_epoch = ?evaluation.early_stop_epoch, "best model reloaded");
            sink.log_hparams(&hparams, &BTreeMap::from([(METRIC_VALID_LOSS.to_string(), valid_loss)]));
            report.evaluation = Some(evaluation);
        }
    }

    Ok(report)
}

fn new_trainer(spec: &TrainSpec, data: &RunData, model: Item2Vec) -> Result<Trainer<Item2Vec>> {
    let loss = SgnsLoss::new(model, build_sampler(spec, &data.vocab)?, spec.data.n_negs)?;
    Trainer::new(loss, build_optimizer(&spec.optimizer)?, build_train_config(spec))
}

/// Run the loop, reshuffling the training windows every epoch
fn fit(
    spec: &TrainSpec,
    data: &RunData,
    trainer: &mut Trainer<Item2Vec>,
    store: &mut dyn CheckpointStore,
    sink: &mut dyn MetricsSink,
) -> Result<TrainReport> {
    let batch_size = spec.data.batch_size;
    let mut rng = StdRng::seed_from_u64(spec.model.seed.wrapping_add(2));
    let shuffled = |epoch: usize| -> Result<Vec<ItemBatch>> {
        data.train.batches(batch_size, Some(&mut rng)).inspect_err(|e| {
            tracing::error!(epoch, error = %e, "batching failed");
        })
    };
    trainer.fit(shuffled, &data.valid, store, sink)
}

/// Hyper-parameters reported alongside the final metrics
fn hparams(spec: &TrainSpec, vocab_size: usize) -> BTreeMap<String, serde_json::Value> {
    BTreeMap::from([
        ("vocab_size".to_string(), vocab_size.into()),
        ("embedding_size".to_string(), spec.model.embedding_size.into()),
        ("optimizer".to_string(), spec.optimizer.name.clone().into()),
        ("lr".to_string(), f64::from(spec.optimizer.lr).into()),
        ("batch_size".to_string(), spec.data.batch_size.into()),
        ("window_size".to_string(), spec.data.window_size.into()),
        ("n_negs".to_string(), spec.data.n_negs.into()),
        ("weighted".to_string(), spec.data.weighted.into()),
        ("epochs".to_string(), spec.training.epochs.into()),
        ("seed".to_string(), spec.model.seed.into()),
    ])
}
