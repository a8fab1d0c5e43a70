//! Bundler trait

use crate::autograd::{Context, Indices};
use crate::device::Device;
use crate::error::Result;
use crate::Tensor;

/// Source of input-side and output-side item vectors
///
/// Lookups return a tensor with the shape of `indices` plus a trailing
/// `embedding_size` axis. Indices outside `[0, vocab_size)` are an error.
pub trait Bundler {
    /// Default lookup path, same as [`Bundler::forward_i`]
    fn forward(&self, indices: &Indices) -> Result<Tensor> {
        self.forward_i(indices)
    }

    /// Look up input-side (target) vectors
    fn forward_i(&self, indices: &Indices) -> Result<Tensor>;

    /// Look up output-side (context) vectors
    fn forward_o(&self, indices: &Indices) -> Result<Tensor>;

    /// Number of rows in each table, padding included
    fn vocab_size(&self) -> usize;

    /// Width of each embedding row
    fn embedding_size(&self) -> usize;

    /// Reserved padding row
    fn pad_idx(&self) -> usize;

    /// Device holding the tables
    fn device(&self) -> Device;

    /// Current train/eval mode
    fn context(&self) -> Context;

    /// Switch train/eval mode
    fn set_context(&mut self, ctx: Context);

    /// Enter training mode
    fn train(&mut self) {
        let mut ctx = self.context();
        ctx.train();
        self.set_context(ctx);
    }

    /// Enter evaluation mode; lookups stop recording gradients
    fn eval(&mut self) {
        let mut ctx = self.context();
        ctx.eval();
        self.set_context(ctx);
    }

    /// Trainable tables, in a stable order
    fn parameters_mut(&mut self) -> Vec<&mut Tensor>;
}
