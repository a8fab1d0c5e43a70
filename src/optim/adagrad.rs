//! Adagrad optimizer

use super::optimizer::ensure_slots;
use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// Adagrad optimizer
///
/// Keeps a running sum of squared gradients per element and scales each
/// update by its inverse square root:
///
/// G_t = G_{t-1} + g_t²
/// θ_t = θ_{t-1} - lr * g_t / (√G_t + ε)
///
/// Elements whose gradient has always been zero (such as the padding row of
/// an embedding table) never move.
pub struct Adagrad {
    lr: f32,
    epsilon: f32,
    initial_accumulator: f32,
    sums: Vec<Option<Array1<f32>>>,
}

impl Adagrad {
    /// Create a new Adagrad optimizer
    pub fn new(lr: f32, epsilon: f32, initial_accumulator: f32) -> Self {
        Self { lr, epsilon, initial_accumulator, sums: Vec::new() }
    }

    /// Adagrad with `ε = 1e-10` and a zero initial accumulator
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 1e-10, 0.0)
    }
}

impl Optimizer for Adagrad {
    fn step(&mut self, params: &mut [&mut Tensor]) {
        ensure_slots(&mut self.sums, params.len());

        for (i, param) in params.iter_mut().enumerate() {
            let Some(grad) = param.grad() else { continue };

            let init = self.initial_accumulator;
            let sum = self.sums[i].get_or_insert_with(|| Array1::from_elem(grad.len(), init));
            *sum += &grad.mapv(|g| g * g);

            let (lr, eps) = (self.lr, self.epsilon);
            let update = ndarray::Zip::from(&grad).and(&*sum).map_collect(|&g, &s| lr * g / (s.sqrt() + eps));
            *param.data_mut() -= &update;
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }

    fn set_lr(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn name(&self) -> &'static str {
        "adagrad"
    }
}
