//! Dual-table item embedding model

use super::Bundler;
use crate::autograd::{embedding, Context, Indices};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Shape and placement of an [`Item2Vec`] model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item2VecConfig {
    /// Rows per table, padding included
    pub vocab_size: usize,
    /// Embedding width
    pub embedding_size: usize,
    /// Padding row, held at zero
    #[serde(default)]
    pub pad_idx: usize,
    /// Table placement
    #[serde(default)]
    pub device: Device,
    /// Seed for weight initialisation
    #[serde(default)]
    pub seed: u64,
}

impl Item2VecConfig {
    /// Host model with padding at row 0 and seed 0
    pub fn new(vocab_size: usize, embedding_size: usize) -> Self {
        Self { vocab_size, embedding_size, pad_idx: 0, device: Device::Cpu, seed: 0 }
    }

    /// Set the padding row
    pub fn with_pad_idx(mut self, pad_idx: usize) -> Self {
        self.pad_idx = pad_idx;
        self
    }

    /// Set the device
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Set the initialisation seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.vocab_size < 2 {
            return Err(Error::EmptyVocabulary(format!(
                "vocab_size {} leaves no items besides padding",
                self.vocab_size
            )));
        }
        if self.embedding_size == 0 {
            return Err(Error::InvalidParameter("embedding_size must be positive".into()));
        }
        if self.pad_idx >= self.vocab_size {
            return Err(Error::IndexOutOfRange { index: self.pad_idx, vocab_size: self.vocab_size });
        }
        self.device.ensure_available()
    }
}

/// Item2Vec bundler: separate input (`ivectors`) and output (`ovectors`)
/// tables of shape `(vocab_size, embedding_size)`
///
/// Every row except `pad_idx` starts uniform in `[-0.5/E, 0.5/E]`; the
/// padding row starts at zero and never receives a gradient.
#[derive(Debug)]
pub struct Item2Vec {
    config: Item2VecConfig,
    ivectors: Tensor,
    ovectors: Tensor,
    context: Context,
}

impl Item2Vec {
    /// Allocate and initialise both tables
    pub fn new(config: Item2VecConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let ivectors = init_table(&config, &mut rng)?;
        let ovectors = init_table(&config, &mut rng)?;
        Ok(Self { config, ivectors, ovectors, context: Context::new() })
    }

    /// Rebuild a model from stored tables
    ///
    /// Both tables must hold `vocab_size * embedding_size` values with the
    /// `pad_idx` row all zero.
    pub fn from_tables(config: Item2VecConfig, ivectors: Vec<f32>, ovectors: Vec<f32>) -> Result<Self> {
        config.validate()?;
        let shape = [config.vocab_size, config.embedding_size];
        let ivectors = Tensor::from_shape_vec(&shape, ivectors, true)?;
        let ovectors = Tensor::from_shape_vec(&shape, ovectors, true)?;
        for (name, table) in [("ivectors", &ivectors), ("ovectors", &ovectors)] {
            if table.row(config.pad_idx).iter().any(|&x| x != 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "{name} padding row {} must be zero",
                    config.pad_idx
                )));
            }
        }
        Ok(Self { config, ivectors, ovectors, context: Context::new() })
    }

    /// Model shape and placement
    pub fn config(&self) -> &Item2VecConfig {
        &self.config
    }

    /// Input-side table
    pub fn ivectors(&self) -> &Tensor {
        &self.ivectors
    }

    /// Output-side table
    pub fn ovectors(&self) -> &Tensor {
        &self.ovectors
    }

    pub(crate) fn tables_mut(&mut self) -> (&mut Tensor, &mut Tensor) {
        (&mut self.ivectors, &mut self.ovectors)
    }

    fn lookup(&self, table: &Tensor, indices: &Indices) -> Result<Tensor> {
        let indices = indices.clone().to_device(self.config.device);
        let out = embedding(table, &indices, Some(self.config.pad_idx))?;
        if self.context.is_training() {
            Ok(out)
        } else {
            Ok(out.detach())
        }
    }
}

fn init_table(config: &Item2VecConfig, rng: &mut StdRng) -> Result<Tensor> {
    let (v, e) = (config.vocab_size, config.embedding_size);
    let bound = 0.5 / e as f32;
    let mut data = Vec::with_capacity(v * e);
    for row in 0..v {
        if row == config.pad_idx {
            data.extend(std::iter::repeat_n(0.0, e));
        } else {
            data.extend((0..e).map(|_| rng.random_range(-bound..=bound)));
        }
    }
    Tensor::from_shape_vec(&[v, e], data, true)
}

impl Bundler for Item2Vec {
    fn forward_i(&self, indices: &Indices) -> Result<Tensor> {
        self.lookup(&self.ivectors, indices)
    }

    fn forward_o(&self, indices: &Indices) -> Result<Tensor> {
        self.lookup(&self.ovectors, indices)
    }

    fn vocab_size(&self) -> usize {
        self.config.vocab_size
    }

    fn embedding_size(&self) -> usize {
        self.config.embedding_size
    }

    fn pad_idx(&self) -> usize {
        self.config.pad_idx
    }

    fn device(&self) -> Device {
        self.config.device
    }

    fn context(&self) -> Context {
        self.context
    }

    fn set_context(&mut self, ctx: Context) {
        self.context = ctx;
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.ivectors, &mut self.ovectors]
    }
}
