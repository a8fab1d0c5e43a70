//! Batched dot products

use super::{upstream, GradInput};
use crate::autograd::tensor::GradCell;
use crate::autograd::{BackwardOp, Tensor};
use crate::error::{Error, Result};
use ndarray::{Array1, ArrayView2, ArrayView3};
use std::rc::Rc;

/// Batched dot product of `(B, K, E)` vectors against one `(B, 1, E)` query per batch row
///
/// Returns `(B, K)` with `out[b, k] = Σ_e vectors[b, k, e] · query[b, 0, e]`.
/// A `(B, E)` query is accepted as well.
pub fn bmm(vectors: &Tensor, query: &Tensor) -> Result<Tensor> {
    let &[batch, k, dim] = vectors.shape() else {
        return Err(Error::ShapeMismatch(format!(
            "bmm expects (B, K, E) vectors, got {:?}",
            vectors.shape()
        )));
    };
    let query_ok = matches!(query.shape(), &[b, 1, e] | &[b, e] if b == batch && e == dim);
    if !query_ok {
        return Err(Error::ShapeMismatch(format!(
            "bmm query {:?} does not match vectors {:?}",
            query.shape(),
            vectors.shape()
        )));
    }

    let v = view3(vectors, batch, k, dim)?;
    let q = view2(query, batch, dim)?;

    let mut out = Array1::zeros(batch * k);
    for b in 0..batch {
        let scores = v.index_axis(ndarray::Axis(0), b).dot(&q.row(b));
        out.slice_mut(ndarray::s![b * k..(b + 1) * k]).assign(&scores);
    }

    let requires_grad = vectors.requires_grad() || query.requires_grad();
    let mut result = Tensor::with_shape(out, vec![batch, k], requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(BmmBackward {
            vectors: GradInput::of(vectors),
            query: GradInput::of(query),
            vectors_data: vectors.data().clone(),
            query_data: query.data().clone(),
            batch,
            k,
            dim,
            result_grad: result.grad_cell(),
        }));
    }

    Ok(result)
}

fn view3(t: &Tensor, b: usize, k: usize, e: usize) -> Result<ArrayView3<'_, f32>> {
    let flat = t
        .data()
        .as_slice()
        .ok_or_else(|| Error::ShapeMismatch("non-contiguous tensor".to_string()))?;
    ArrayView3::from_shape((b, k, e), flat).map_err(|e| Error::ShapeMismatch(e.to_string()))
}

fn view2(t: &Tensor, rows: usize, cols: usize) -> Result<ArrayView2<'_, f32>> {
    let flat = t
        .data()
        .as_slice()
        .ok_or_else(|| Error::ShapeMismatch("non-contiguous tensor".to_string()))?;
    ArrayView2::from_shape((rows, cols), flat).map_err(|e| Error::ShapeMismatch(e.to_string()))
}

struct BmmBackward {
    vectors: GradInput,
    query: GradInput,
    vectors_data: Array1<f32>,
    query_data: Array1<f32>,
    batch: usize,
    k: usize,
    dim: usize,
    result_grad: GradCell,
}

impl BackwardOp for BmmBackward {
    fn backward(&self) {
        let guard = self.result_grad.borrow();
        let Some(grad) = guard.as_ref() else {
            return;
        };
        let (batch, k, dim) = (self.batch, self.k, self.dim);

        // ∂L/∂vectors[b, k, e] = g[b, k] · query[b, e]
        if self.vectors.requires_grad() {
            let mut grad_v = Array1::zeros(batch * k * dim);
            for b in 0..batch {
                for j in 0..k {
                    let g = grad[b * k + j];
                    let base = (b * k + j) * dim;
                    for e in 0..dim {
                        grad_v[base + e] = g * self.query_data[b * dim + e];
                    }
                }
            }
            self.vectors.accumulate(grad_v);
        }

        // ∂L/∂query[b, e] = Σ_k g[b, k] · vectors[b, k, e]
        if self.query.requires_grad() {
            let mut grad_q = Array1::zeros(batch * dim);
            for b in 0..batch {
                for j in 0..k {
                    let g = grad[b * k + j];
                    let base = (b * k + j) * dim;
                    for e in 0..dim {
                        grad_q[b * dim + e] += g * self.vectors_data[base + e];
                    }
                }
            }
            self.query.accumulate(grad_q);
        }
    }

    fn inputs(&self) -> Vec<Rc<dyn BackwardOp>> {
        upstream(&[&self.vectors, &self.query])
    }
}
