//! Tape-based autograd engine
//!
//! Provides automatic differentiation over the handful of dense operations
//! skip-gram training needs: embedding lookup, batched dot products,
//! log-sigmoid, masking and reductions.
//!
//! ```ignore
//! use itemvec::autograd::{backward, bmm, log_sigmoid, mean, Tensor};
//!
//! let scores = bmm(&contexts, &targets)?;
//! let loss = mean(&log_sigmoid(&scores));
//! backward(&loss, None);
//! ```

mod backward;
mod context;
mod indices;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::{backward, BackwardOp};
pub use context::Context;
pub use indices::Indices;
pub use ops::*;
pub use tensor::Tensor;
