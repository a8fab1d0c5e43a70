//! User-history datasets
//!
//! - `histories`: raw item sequences, one per user
//! - `window`: fixed-width context windows and batching for training,
//!   plus held-out cases for ranking evaluation

mod histories;
mod window;

pub use histories::UserHistories;
pub use window::{ContextWindowDataset, EvalCase};
