//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms
///
/// Parameters are borrowed from their owner (the embedding bundler) for the
/// duration of one call. Implementations keep per-parameter state by
/// position, so callers must pass parameters in the same order every step.
pub trait Optimizer {
    /// Apply one update to every parameter that has a gradient
    fn step(&mut self, params: &mut [&mut Tensor]);

    /// Clear accumulated gradients
    fn zero_grad(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);

    /// Short name used in logs and checkpoint metadata
    fn name(&self) -> &'static str;
}

/// Grow a per-parameter state vector to cover `n` parameters
pub(crate) fn ensure_slots<T: Clone>(slots: &mut Vec<Option<T>>, n: usize) {
    if slots.len() < n {
        slots.resize(n, None);
    }
}
