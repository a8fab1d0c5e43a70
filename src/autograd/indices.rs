//! Integer index tensors for embedding lookups

use crate::device::Device;
use crate::error::{Error, Result};
use ndarray::Array2;

/// Item indices of arbitrary shape, placed on a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indices {
    values: Vec<usize>,
    shape: Vec<usize>,
    device: Device,
}

impl Indices {
    /// Create indices with an explicit shape (host placement)
    pub fn new(values: Vec<usize>, shape: Vec<usize>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(Error::ShapeMismatch(format!(
                "index shape {shape:?} needs {expected} values, got {}",
                values.len()
            )));
        }
        Ok(Self { values, shape, device: Device::Cpu })
    }

    /// 1-D indices
    pub fn from_slice(values: &[usize]) -> Self {
        Self { values: values.to_vec(), shape: vec![values.len()], device: Device::Cpu }
    }

    /// 2-D indices from a matrix
    pub fn from_array2(values: &Array2<usize>) -> Self {
        let (rows, cols) = values.dim();
        Self { values: values.iter().copied().collect(), shape: vec![rows, cols], device: Device::Cpu }
    }

    /// Flat values in row-major order
    pub fn values(&self) -> &[usize] {
        &self.values
    }

    /// Shape
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of indices
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no indices
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Device holding the indices
    pub fn device(&self) -> Device {
        self.device
    }

    /// Move to `device`, a no-op when already there
    pub fn to_device(self, device: Device) -> Self {
        if self.device == device {
            self
        } else {
            Self { device, ..self }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_checks_shape() {
        assert!(Indices::new(vec![1, 2, 3], vec![3]).is_ok());
        assert!(Indices::new(vec![1, 2, 3], vec![2, 2]).is_err());
    }

    #[test]
    fn test_from_array2_row_major() {
        let idx = Indices::from_array2(&array![[1, 2], [3, 4]]);
        assert_eq!(idx.shape(), &[2, 2]);
        assert_eq!(idx.values(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_to_device() {
        let idx = Indices::from_slice(&[1]);
        assert_eq!(idx.device(), Device::Cpu);
        let moved = idx.to_device(Device::Cuda(0));
        assert_eq!(moved.device(), Device::Cuda(0));
    }
}
