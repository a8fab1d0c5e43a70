//! Item embedding bundlers
//!
//! A bundler owns the input-side and output-side embedding tables of a
//! vocabulary and looks up rows for batches of item indices. The SGNS loss
//! only talks to the [`Bundler`] trait, so alternative bundlers (for
//! example one that aggregates a user's whole history into the input-side
//! vector) plug into the same training loop.

mod bundler;
mod item2vec;

pub use bundler::Bundler;
pub use item2vec::{Item2Vec, Item2VecConfig};
