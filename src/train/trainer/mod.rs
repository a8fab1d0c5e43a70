//! Trainer for SGNS item embeddings
//!
//! - [`Trainer::train_step`] - zero gradients, loss, backward, optimizer step
//! - [`Trainer::train_epoch`] - one pass over the training batches
//! - [`Trainer::validate`] - mean loss over held-out batches in eval mode
//! - [`Trainer::fit`] - the epoch loop, fixed-length or early-stopped
//!
//! # Example
//!
//! ```no_run
//! use itemvec::embedding::{Item2Vec, Item2VecConfig};
//! use itemvec::io::MemoryCheckpointStore;
//! use itemvec::optim::Adagrad;
//! use itemvec::sampling::NegativeSampler;
//! use itemvec::train::{ImprovementPolicy, SgnsLoss, TrainConfig, Trainer, TracingSink};
//!
//! let model = Item2Vec::new(Item2VecConfig::new(100, 16)).unwrap();
//! let loss = SgnsLoss::new(model, NegativeSampler::uniform(100, 0).unwrap(), 5).unwrap();
//! let config = TrainConfig::new()
//!     .with_max_epochs(50)
//!     .with_early_stopping(3, ImprovementPolicy::StrictDecrease);
//! let mut trainer = Trainer::new(loss, Box::new(Adagrad::default_params(0.1)), config).unwrap();
//!
//! # use itemvec::train::ItemBatch;
//! # let (train, valid): (Vec<ItemBatch>, Vec<ItemBatch>) = (Vec::new(), Vec::new());
//! let report = trainer
//!     .fit(|_| Ok(train.clone()), &valid, &mut MemoryCheckpointStore::new(), &mut TracingSink)
//!     .unwrap();
//! println!("best epoch: {:?}", report.best_epoch);
//! ```

mod core;
mod epoch;
mod result;
mod step;
mod train_loop;

pub use core::Trainer;
pub use result::TrainReport;
pub use train_loop::{BEST_TAG, FINAL_TAG};
