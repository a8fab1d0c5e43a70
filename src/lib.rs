//! # itemvec
//!
//! Item embeddings learned from ordered user interaction histories with
//! skip-gram negative sampling (item2vec).
//!
//! ## Architecture
//!
//! - `autograd`: tape-based automatic differentiation over flat tensors
//! - `embedding`: the input/output embedding tables behind the [`embedding::Bundler`] trait
//! - `sampling`: seeded uniform or frequency-weighted negative sampling
//! - `train`: SGNS loss with padding mask, training loop, early stopping, metrics
//! - `optim`: Adagrad, SGD and Adam
//! - `io`: checkpoint formats and stores
//! - `vocab` / `data`: item vocabulary and context-window datasets
//! - `eval`: hit ratio and MRR on held-out users
//! - `config` / `cli`: YAML-driven training and the `itemvec` binary
//!
//! ## Example
//!
//! ```
//! use itemvec::embedding::{Item2Vec, Item2VecConfig};
//! use itemvec::optim::Adagrad;
//! use itemvec::sampling::NegativeSampler;
//! use itemvec::train::{ItemBatch, SgnsLoss, TrainConfig, Trainer};
//! use ndarray::array;
//!
//! let model = Item2Vec::new(Item2VecConfig::new(6, 8).with_seed(1))?;
//! let sampler = NegativeSampler::uniform(6, 2)?;
//! let loss = SgnsLoss::new(model, sampler, 3)?;
//! let mut trainer = Trainer::new(loss, Box::new(Adagrad::default_params(0.05)), TrainConfig::new())?;
//!
//! let batch = ItemBatch::new(vec![1, 2], array![[0, 3], [4, 5]])?;
//! let loss = trainer.train_epoch(vec![batch])?;
//! assert!(loss.is_finite());
//! # Ok::<(), itemvec::Error>(())
//! ```

pub mod autograd;
pub mod cli;
pub mod config;
pub mod data;
pub mod device;
pub mod embedding;
pub mod error;
pub mod eval;
pub mod io;
pub mod optim;
pub mod sampling;
pub mod train;
pub mod vocab;

pub use autograd::Tensor;
pub use device::Device;
pub use error::{Error, Result};
