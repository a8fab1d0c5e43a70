//! Optimizers for training item embeddings

mod adagrad;
mod adam;
mod optimizer;
mod sgd;

pub use adagrad::Adagrad;
pub use adam::Adam;
pub use optimizer::Optimizer;
pub use sgd::SGD;
