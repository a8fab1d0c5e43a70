//! YAML schema for declarative item2vec training

use crate::device::Device;
use crate::io::CheckpointFormat;
use crate::train::ImprovementPolicy;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!("expected 'true' or 'false', got '{other}'"))),
        },
    }
}

/// What a run does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Fixed number of epochs, save the final model, rank the test users
    #[default]
    Train,
    /// Early stopping on the validation users, then reload the best model
    /// and report its validation loss
    TrainEvaluate,
}

/// Complete training specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainSpec {
    /// Model configuration
    #[serde(default)]
    pub model: ModelSpec,

    /// Data configuration
    pub data: DataSpec,

    /// Optimizer configuration
    #[serde(default)]
    pub optimizer: OptimSpec,

    /// Training hyperparameters
    #[serde(default)]
    pub training: TrainingParams,
}

/// Model shape and placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    /// Name used for checkpoint files
    pub name: String,

    /// Embedding width
    pub embedding_size: usize,

    /// Table placement
    pub device: Device,

    /// Seed for initialisation, sampling and shuffling
    pub seed: u64,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self { name: "item2vec".to_string(), embedding_size: 300, device: Device::Cpu, seed: 0 }
    }
}

/// Data configuration
///
/// Relative file names resolve against `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSpec {
    /// Directory holding the data files
    #[serde(default)]
    pub data_dir: PathBuf,

    /// Training user histories
    pub train: PathBuf,

    /// Validation user histories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<PathBuf>,

    /// Held-out users for ranking evaluation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<PathBuf>,

    /// Saved vocabulary; built from the training users when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab: Option<PathBuf>,

    /// Minimum occurrences for an item to enter a built vocabulary
    #[serde(default = "default_min_count")]
    pub min_count: u64,

    /// Preceding items per context
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Batch size
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Negatives per context slot
    #[serde(default = "default_n_negs")]
    pub n_negs: usize,

    /// Sample negatives by smoothed frequency instead of uniformly
    #[serde(default = "default_true", deserialize_with = "deserialize_bool_lenient")]
    pub weighted: bool,
}

impl Default for DataSpec {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            train: PathBuf::new(),
            valid: None,
            test: None,
            vocab: None,
            min_count: default_min_count(),
            window_size: default_window_size(),
            batch_size: default_batch_size(),
            n_negs: default_n_negs(),
            weighted: true,
        }
    }
}

impl DataSpec {
    /// `path` joined onto `data_dir`
    pub fn resolve(&self, path: &std::path::Path) -> PathBuf {
        self.data_dir.join(path)
    }
}

fn default_min_count() -> u64 {
    1
}

fn default_window_size() -> usize {
    5
}

fn default_batch_size() -> usize {
    32
}

fn default_n_negs() -> usize {
    20
}

/// Optimizer specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimSpec {
    /// Optimizer name: "adagrad" | "adam" | "sgd"
    pub name: String,

    /// Learning rate
    pub lr: f32,

    /// Optimizer-specific parameters (beta1, beta2, eps, momentum, ...)
    #[serde(flatten)]
    pub params: HashMap<String, serde_json::Value>,
}

impl Default for OptimSpec {
    fn default() -> Self {
        Self { name: "adagrad".to_string(), lr: 0.01, params: HashMap::new() }
    }
}

/// Training hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Number of epochs (upper bound with early stopping)
    pub epochs: usize,

    /// Fixed training or early-stopped training with evaluation
    pub mode: RunMode,

    /// Stagnant epochs tolerated in `train_evaluate` mode
    pub patience: usize,

    /// Improvement test in `train_evaluate` mode
    pub policy: ImprovementPolicy,

    /// Log progress every N steps
    pub log_interval: usize,

    /// Abort on a non-finite batch loss
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub detect_anomaly: bool,

    /// Mask padded context slots out of the loss
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub mask_padding: bool,

    /// Output directory for checkpoints and the vocabulary
    pub save_dir: PathBuf,

    /// Metrics directory; metrics only go to the log when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Cutoff for HR@k and MRR@k
    pub k: usize,

    /// Checkpoint encoding
    pub format: CheckpointFormat,

    /// Indent JSON checkpoints
    #[serde(deserialize_with = "deserialize_bool_lenient")]
    pub pretty: bool,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            epochs: 10,
            mode: RunMode::default(),
            patience: 3,
            policy: ImprovementPolicy::default(),
            log_interval: 100,
            detect_anomaly: true,
            mask_padding: true,
            save_dir: PathBuf::from("./checkpoints"),
            log_dir: None,
            k: 10,
            format: CheckpointFormat::default(),
            pretty: false,
        }
    }
}

fn default_true() -> bool {
    true
}
