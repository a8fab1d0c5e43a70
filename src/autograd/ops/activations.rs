//! Activation functions with backward passes

use super::{upstream, GradInput};
use crate::autograd::tensor::GradCell;
use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Logistic sigmoid
pub(crate) fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Element-wise `ln σ(x)`
///
/// Evaluated as `min(x, 0) - ln(1 + e^{-|x|})`, which equals taking the
/// sigmoid then the natural log but stays finite for large `|x|`.
pub fn log_sigmoid(a: &Tensor) -> Tensor {
    let data = a.data().mapv(|x| x.min(0.0) - (-x.abs()).exp().ln_1p());
    let requires_grad = a.requires_grad();

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(LogSigmoidBackward {
            a: GradInput::of(a),
            input: a.data().clone(),
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct LogSigmoidBackward {
    a: GradInput,
    input: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for LogSigmoidBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            // d/dx ln σ(x) = 1 - σ(x) = σ(-x)
            let local = self.input.mapv(|x| sigmoid(-x));
            self.a.accumulate(grad * &local);
        }
    }

    fn inputs(&self) -> Vec<Rc<dyn BackwardOp>> {
        upstream(&[&self.a])
    }
}
