//! Checkpoint structure for serialization

use crate::embedding::{Bundler, Item2Vec, Item2VecConfig};
use crate::error::{Error, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model metadata containing architecture and training information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Model architecture type (e.g. "item2vec")
    pub architecture: String,

    /// Crate version that wrote the checkpoint
    pub version: String,

    /// Hyper-parameters of the run
    #[serde(default)]
    pub hparams: BTreeMap<String, serde_json::Value>,
}

impl ModelMetadata {
    /// Create new metadata with minimal fields
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            hparams: BTreeMap::new(),
        }
    }

    /// Add a hyper-parameter
    pub fn with_hparam(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.hparams.insert(key.into(), value);
        self
    }
}

/// Snapshot of both embedding tables and the loss settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCheckpoint {
    /// Model metadata
    pub metadata: ModelMetadata,
    /// Rows per table
    pub vocab_size: usize,
    /// Embedding width
    pub embedding_size: usize,
    /// Padding row
    pub pad_idx: usize,
    /// Negatives per context slot the model was trained with
    pub n_negs: usize,
    /// Input table, row-major
    pub ivectors: Vec<f32>,
    /// Output table, row-major
    pub ovectors: Vec<f32>,
    /// Epoch the snapshot was taken after (1-indexed)
    #[serde(default)]
    pub epoch: Option<usize>,
    /// Validation loss at that epoch
    #[serde(default)]
    pub val_loss: Option<f32>,
}

impl ModelCheckpoint {
    /// Check that both tables match the recorded shape and keep the padding
    /// row at zero
    pub fn validate(&self) -> Result<()> {
        let expected = self.vocab_size * self.embedding_size;
        for (name, table) in [("ivectors", &self.ivectors), ("ovectors", &self.ovectors)] {
            if table.len() != expected {
                return Err(Error::Checkpoint(format!(
                    "{name} holds {} values, header says {}x{}",
                    table.len(),
                    self.vocab_size,
                    self.embedding_size
                )));
            }
        }
        if self.pad_idx >= self.vocab_size {
            return Err(Error::Checkpoint(format!(
                "pad_idx {} outside vocabulary of {}",
                self.pad_idx, self.vocab_size
            )));
        }
        let pad_row = self.pad_idx * self.embedding_size..(self.pad_idx + 1) * self.embedding_size;
        for (name, table) in [("ivectors", &self.ivectors), ("ovectors", &self.ovectors)] {
            if table[pad_row.clone()].iter().any(|&x| x != 0.0) {
                return Err(Error::Checkpoint(format!("{name} padding row {} is not zero", self.pad_idx)));
            }
        }
        Ok(())
    }

    /// Record the epoch and validation loss of the snapshot
    pub fn at_epoch(mut self, epoch: usize, val_loss: Option<f32>) -> Self {
        self.epoch = Some(epoch);
        self.val_loss = val_loss;
        self
    }

    /// Record the number of negatives per slot
    pub fn with_n_negs(mut self, n_negs: usize) -> Self {
        self.n_negs = n_negs;
        self
    }
}

/// Models that can be snapshotted into and restored from a checkpoint
pub trait Checkpointable {
    /// Current tables as a checkpoint
    fn to_checkpoint(&self) -> ModelCheckpoint;

    /// Overwrite the tables from a checkpoint of the same shape
    fn load_checkpoint(&mut self, checkpoint: &ModelCheckpoint) -> Result<()>;
}

impl Checkpointable for Item2Vec {
    fn to_checkpoint(&self) -> ModelCheckpoint {
        ModelCheckpoint {
            metadata: ModelMetadata::new("item2vec", "item2vec"),
            vocab_size: self.vocab_size(),
            embedding_size: self.embedding_size(),
            pad_idx: self.pad_idx(),
            n_negs: 0,
            ivectors: self.ivectors().data().to_vec(),
            ovectors: self.ovectors().data().to_vec(),
            epoch: None,
            val_loss: None,
        }
    }

    fn load_checkpoint(&mut self, checkpoint: &ModelCheckpoint) -> Result<()> {
        checkpoint.validate()?;
        if (checkpoint.vocab_size, checkpoint.embedding_size, checkpoint.pad_idx)
            != (self.vocab_size(), self.embedding_size(), self.pad_idx())
        {
            return Err(Error::Checkpoint(format!(
                "checkpoint is {}x{} (pad {}), model is {}x{} (pad {})",
                checkpoint.vocab_size,
                checkpoint.embedding_size,
                checkpoint.pad_idx,
                self.vocab_size(),
                self.embedding_size(),
                self.pad_idx()
            )));
        }
        let (ivectors, ovectors) = self.tables_mut();
        ivectors.data_mut().assign(&ArrayView1::from(&checkpoint.ivectors[..]));
        ovectors.data_mut().assign(&ArrayView1::from(&checkpoint.ovectors[..]));
        ivectors.zero_grad();
        ovectors.zero_grad();
        Ok(())
    }
}

impl Item2Vec {
    /// Build a model from a checkpoint
    pub fn from_checkpoint(checkpoint: &ModelCheckpoint) -> Result<Self> {
        checkpoint.validate()?;
        let config = Item2VecConfig::new(checkpoint.vocab_size, checkpoint.embedding_size)
            .with_pad_idx(checkpoint.pad_idx);
        Item2Vec::from_tables(config, checkpoint.ivectors.clone(), checkpoint.ovectors.clone())
    }
}
