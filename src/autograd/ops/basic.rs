//! Basic autograd operations: add, mul, scale, reshape and reductions

use super::{check_same_shape, upstream, GradInput};
use crate::autograd::{BackwardOp, Tensor};
use crate::autograd::tensor::GradCell;
use crate::error::{Error, Result};
use ndarray::Array1;
use std::rc::Rc;

/// Add two tensors of identical shape
pub fn add(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    check_same_shape("add", a, b)?;
    let data = a.data() + b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(AddBackward {
            a: GradInput::of(a),
            b: GradInput::of(b),
            result_grad: result.grad_cell(),
        }));
    }

    Ok(result)
}

struct AddBackward {
    a: GradInput,
    b: GradInput,
    result_grad: GradCell,
}

impl BackwardOp for AddBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            self.a.accumulate(grad.clone());
            self.b.accumulate(grad.clone());
        }
    }

    fn inputs(&self) -> Vec<Rc<dyn BackwardOp>> {
        upstream(&[&self.a, &self.b])
    }
}

/// Multiply two tensors of identical shape element-wise
pub fn mul(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    check_same_shape("mul", a, b)?;
    let data = a.data() * b.data();
    let requires_grad = a.requires_grad() || b.requires_grad();

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(MulBackward {
            a: GradInput::of(a),
            b: GradInput::of(b),
            a_data: a.data().clone(),
            b_data: b.data().clone(),
            result_grad: result.grad_cell(),
        }));
    }

    Ok(result)
}

struct MulBackward {
    a: GradInput,
    b: GradInput,
    a_data: Array1<f32>,
    b_data: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for MulBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            // ∂L/∂a = ∂L/∂out * b
            if self.a.requires_grad() {
                self.a.accumulate(grad * &self.b_data);
            }
            // ∂L/∂b = ∂L/∂out * a
            if self.b.requires_grad() {
                self.b.accumulate(grad * &self.a_data);
            }
        }
    }

    fn inputs(&self) -> Vec<Rc<dyn BackwardOp>> {
        upstream(&[&self.a, &self.b])
    }
}

/// Scale tensor by a scalar
pub fn scale(a: &Tensor, factor: f32) -> Tensor {
    let data = a.data() * factor;
    let requires_grad = a.requires_grad();

    let mut result = Tensor::with_shape(data, a.shape().to_vec(), requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(ScaleBackward {
            a: GradInput::of(a),
            factor,
            result_grad: result.grad_cell(),
        }));
    }

    result
}

/// Negate a tensor
pub fn neg(a: &Tensor) -> Tensor {
    scale(a, -1.0)
}

struct ScaleBackward {
    a: GradInput,
    factor: f32,
    result_grad: GradCell,
}

impl BackwardOp for ScaleBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            self.a.accumulate(grad * self.factor);
        }
    }

    fn inputs(&self) -> Vec<Rc<dyn BackwardOp>> {
        upstream(&[&self.a])
    }
}

/// View the same data under a new shape with the same element count
pub fn reshape(a: &Tensor, shape: &[usize]) -> Result<Tensor> {
    let expected: usize = shape.iter().product();
    if expected != a.len() {
        return Err(Error::ShapeMismatch(format!(
            "reshape {:?} -> {shape:?}",
            a.shape()
        )));
    }
    let requires_grad = a.requires_grad();
    let mut result = Tensor::with_shape(a.data().clone(), shape.to_vec(), requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(PassThroughBackward {
            a: GradInput::of(a),
            result_grad: result.grad_cell(),
        }));
    }

    Ok(result)
}

struct PassThroughBackward {
    a: GradInput,
    result_grad: GradCell,
}

impl BackwardOp for PassThroughBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            self.a.accumulate(grad.clone());
        }
    }

    fn inputs(&self) -> Vec<Rc<dyn BackwardOp>> {
        upstream(&[&self.a])
    }
}

/// Sum over the trailing axis: `(.., N) -> (..)`
pub fn sum_last_axis(a: &Tensor) -> Result<Tensor> {
    let Some((&width, leading)) = a.shape().split_last() else {
        return Err(Error::ShapeMismatch("sum_last_axis on a scalar".to_string()));
    };
    let rows = leading.iter().product::<usize>();
    let data: Array1<f32> = if width == 0 {
        Array1::zeros(rows)
    } else {
        a.data()
            .exact_chunks(width)
            .into_iter()
            .map(|chunk| chunk.sum())
            .collect()
    };
    let requires_grad = a.requires_grad();
    let mut result = Tensor::with_shape(data, leading.to_vec(), requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(SumLastAxisBackward {
            a: GradInput::of(a),
            width,
            result_grad: result.grad_cell(),
        }));
    }

    Ok(result)
}

struct SumLastAxisBackward {
    a: GradInput,
    width: usize,
    result_grad: GradCell,
}

impl BackwardOp for SumLastAxisBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            // ∂L/∂a[.., j] = ∂L/∂out[..] for every j
            let grad_a: Array1<f32> =
                grad.iter().flat_map(|&g| std::iter::repeat_n(g, self.width)).collect();
            self.a.accumulate(grad_a);
        }
    }

    fn inputs(&self) -> Vec<Rc<dyn BackwardOp>> {
        upstream(&[&self.a])
    }
}

/// Mean of all elements as a scalar tensor
pub fn mean(a: &Tensor) -> Tensor {
    let n = a.len();
    let value = if n == 0 { 0.0 } else { a.data().sum() / n as f32 };
    let requires_grad = a.requires_grad();
    let mut result = Tensor::with_shape(Array1::from(vec![value]), Vec::new(), requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(MeanBackward {
            a: GradInput::of(a),
            len: n,
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct MeanBackward {
    a: GradInput,
    len: usize,
    result_grad: GradCell,
}

impl BackwardOp for MeanBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.len > 0 {
                let g = grad[0] / self.len as f32;
                self.a.accumulate(Array1::from_elem(self.len, g));
            }
        }
    }

    fn inputs(&self) -> Vec<Rc<dyn BackwardOp>> {
        upstream(&[&self.a])
    }
}
