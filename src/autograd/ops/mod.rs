//! Autograd operations with backward passes
//!
//! This module provides differentiable operations for automatic differentiation.

mod activations;
mod basic;
mod embedding;
mod matmul;

use super::tensor::{accumulate_into, GradCell};
use super::{BackwardOp, Tensor};
use crate::error::{Error, Result};
use ndarray::Array1;
use std::rc::Rc;

// Re-export all public operations
pub use activations::log_sigmoid;
pub use basic::{add, mean, mul, neg, reshape, scale, sum_last_axis};
pub use embedding::embedding;
pub use matmul::bmm;

/// Gradient sink for one input of an op
///
/// Holds only the gradient cell and producing op, never the data, so
/// recording a lookup into a large table does not copy it.
pub(crate) struct GradInput {
    grad: GradCell,
    requires_grad: bool,
    op: Option<Rc<dyn BackwardOp>>,
}

impl GradInput {
    pub(crate) fn of(t: &Tensor) -> Self {
        Self { grad: t.grad_cell(), requires_grad: t.requires_grad(), op: t.backward_op() }
    }

    pub(crate) fn accumulate(&self, grad: Array1<f32>) {
        if self.requires_grad {
            accumulate_into(&self.grad, grad);
        }
    }

    pub(crate) fn requires_grad(&self) -> bool {
        self.requires_grad
    }
}

/// Backward ops of the given inputs
pub(crate) fn upstream(inputs: &[&GradInput]) -> Vec<Rc<dyn BackwardOp>> {
    inputs.iter().filter_map(|i| i.op.clone()).collect()
}

pub(crate) fn check_same_shape(op: &str, a: &Tensor, b: &Tensor) -> Result<()> {
    if a.shape() == b.shape() {
        Ok(())
    } else {
        Err(Error::ShapeMismatch(format!(
            "{op}: {:?} vs {:?}",
            a.shape(),
            b.shape()
        )))
    }
}
