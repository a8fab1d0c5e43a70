//! Tensor with shape, shared gradient cell and optional backward op

use super::BackwardOp;
use crate::error::{Error, Result};
use ndarray::{s, Array1, ArrayView1};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared gradient storage
pub(crate) type GradCell = Rc<RefCell<Option<Array1<f32>>>>;

/// Dense `f32` tensor stored row-major in a flat buffer
///
/// Clones copy the data but share the gradient cell, so gradients written
/// through any clone are visible on the original parameter.
#[derive(Clone)]
pub struct Tensor {
    data: Array1<f32>,
    shape: Vec<usize>,
    grad: GradCell,
    backward_op: Option<Rc<dyn BackwardOp>>,
    requires_grad: bool,
}

impl Tensor {
    /// Create a 1-D tensor
    pub fn new(data: Array1<f32>, requires_grad: bool) -> Self {
        let shape = vec![data.len()];
        Self::with_shape(data, shape, requires_grad)
    }

    /// Create a 1-D tensor from a vector
    pub fn from_vec(data: Vec<f32>, requires_grad: bool) -> Self {
        Self::new(Array1::from(data), requires_grad)
    }

    /// Create a tensor of the given shape from a flat vector
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>, requires_grad: bool) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(Error::ShapeMismatch(format!(
                "shape {shape:?} needs {expected} elements, got {}",
                data.len()
            )));
        }
        Ok(Self::with_shape(Array1::from(data), shape.to_vec(), requires_grad))
    }

    /// Create a 1-D tensor of zeros
    pub fn zeros(len: usize, requires_grad: bool) -> Self {
        Self::new(Array1::zeros(len), requires_grad)
    }

    /// Create a scalar (0-d) tensor
    pub fn scalar(value: f32) -> Self {
        Self::with_shape(Array1::from(vec![value]), Vec::new(), false)
    }

    /// Build without checking that `shape` matches the buffer length
    pub(crate) fn with_shape(data: Array1<f32>, shape: Vec<usize>, requires_grad: bool) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        Self {
            data,
            shape,
            grad: Rc::new(RefCell::new(None)),
            backward_op: None,
            requires_grad,
        }
    }

    /// Flat data
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutable flat data
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Shape
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor holds no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// First element, the value of a scalar loss
    pub fn item(&self) -> f32 {
        self.data.first().copied().unwrap_or(f32::NAN)
    }

    /// Row `i` of a 2-D tensor
    pub fn row(&self, i: usize) -> ArrayView1<'_, f32> {
        let width = self.shape.last().copied().unwrap_or(1);
        self.data.slice(s![i * width..(i + 1) * width])
    }

    /// Whether gradients are tracked for this tensor
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Copy of the accumulated gradient, if any
    pub fn grad(&self) -> Option<Array1<f32>> {
        self.grad.borrow().clone()
    }

    /// Overwrite the gradient
    pub fn set_grad(&self, grad: Array1<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add to the accumulated gradient
    pub fn accumulate_grad(&self, grad: Array1<f32>) {
        accumulate_into(&self.grad, grad);
    }

    /// Drop the accumulated gradient
    pub fn zero_grad(&mut self) {
        *self.grad.borrow_mut() = None;
    }

    /// Shared gradient cell (used by backward ops)
    pub(crate) fn grad_cell(&self) -> GradCell {
        Rc::clone(&self.grad)
    }

    /// Attach the op that produced this tensor
    pub(crate) fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    /// Op that produced this tensor
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    /// Copy of the values with no gradient tracking and no graph
    pub fn detach(&self) -> Self {
        Self::with_shape(self.data.clone(), self.shape.clone(), false)
    }
}

/// Add `grad` into a gradient cell, initialising it on first write
pub(crate) fn accumulate_into(cell: &RefCell<Option<Array1<f32>>>, grad: Array1<f32>) {
    let mut slot = cell.borrow_mut();
    match slot.as_mut() {
        Some(existing) => *existing += &grad,
        None => *slot = Some(grad),
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .finish()
    }
}
