//! Embedding lookup (row gather) with scatter-add backward

use super::{upstream, GradInput};
use crate::autograd::tensor::GradCell;
use crate::autograd::{BackwardOp, Indices, Tensor};
use crate::error::{Error, Result};
use ndarray::{s, Array1};
use std::rc::Rc;

/// Gather rows of a `(V, E)` table
///
/// The output has shape `indices.shape() + [E]`. Any index `>= V` fails
/// with [`Error::IndexOutOfRange`]; nothing is clamped. Rows at
/// `padding_idx` receive no gradient.
pub fn embedding(table: &Tensor, indices: &Indices, padding_idx: Option<usize>) -> Result<Tensor> {
    let &[vocab_size, dim] = table.shape() else {
        return Err(Error::ShapeMismatch(format!(
            "embedding table must be (V, E), got {:?}",
            table.shape()
        )));
    };

    if let Some(&index) = indices.values().iter().find(|&&i| i >= vocab_size) {
        return Err(Error::IndexOutOfRange { index, vocab_size });
    }

    let mut out = Array1::zeros(indices.len() * dim);
    for (pos, &index) in indices.values().iter().enumerate() {
        out.slice_mut(s![pos * dim..(pos + 1) * dim]).assign(&table.row(index));
    }

    let mut shape = indices.shape().to_vec();
    shape.push(dim);

    let requires_grad = table.requires_grad();
    let mut result = Tensor::with_shape(out, shape, requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(EmbeddingBackward {
            table: GradInput::of(table),
            indices: indices.values().to_vec(),
            padding_idx,
            vocab_size,
            dim,
            result_grad: result.grad_cell(),
        }));
    }

    Ok(result)
}

struct EmbeddingBackward {
    table: GradInput,
    indices: Vec<usize>,
    padding_idx: Option<usize>,
    vocab_size: usize,
    dim: usize,
    result_grad: GradCell,
}

impl BackwardOp for EmbeddingBackward {
    fn backward(&self) {
        let guard = self.result_grad.borrow();
        let Some(grad) = guard.as_ref() else {
            return;
        };
        let dim = self.dim;

        let mut grad_table = Array1::zeros(self.vocab_size * dim);
        for (pos, &index) in self.indices.iter().enumerate() {
            if Some(index) == self.padding_idx {
                continue;
            }
            let mut row = grad_table.slice_mut(s![index * dim..(index + 1) * dim]);
            row += &grad.slice(s![pos * dim..(pos + 1) * dim]);
        }
        self.table.accumulate(grad_table);
    }

    fn inputs(&self) -> Vec<Rc<dyn BackwardOp>> {
        upstream(&[&self.table])
    }
}
