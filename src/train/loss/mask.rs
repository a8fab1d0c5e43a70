//! Padding mask for context windows

use crate::error::{Error, Result};
use crate::Tensor;
use ndarray::Array2;

/// Marks which context slots hold a real item
///
/// Built once per batch by comparing context indices with the padding
/// index: `1.0` for a real item, `0.0` for padding.
#[derive(Debug, Clone, PartialEq)]
pub struct PadMask {
    keep: Array2<f32>,
}

impl PadMask {
    /// Mask of every position of `contexts` that is not `pad_idx`
    pub fn from_contexts(contexts: &Array2<usize>, pad_idx: usize) -> Self {
        Self { keep: contexts.mapv(|i| if i == pad_idx { 0.0 } else { 1.0 }) }
    }

    /// `(B, C)`
    pub fn dim(&self) -> (usize, usize) {
        self.keep.dim()
    }

    /// `(row, col)` positions equal to the padding index
    pub fn padded_positions(&self) -> Vec<(usize, usize)> {
        self.keep.indexed_iter().filter(|(_, k)| **k == 0.0).map(|(pos, _)| pos).collect()
    }

    /// Number of padded slots
    pub fn padded_count(&self) -> usize {
        self.keep.iter().filter(|&&k| k == 0.0).count()
    }

    /// Rows where every slot is padding
    pub fn empty_rows(&self) -> Vec<usize> {
        self.keep
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.iter().all(|&k| k == 0.0))
            .map(|(i, _)| i)
            .collect()
    }

    /// Constant `(B, C)` tensor to multiply per-position losses with
    pub(crate) fn to_tensor(&self, batch_size: usize, context_size: usize) -> Result<Tensor> {
        if self.dim() != (batch_size, context_size) {
            return Err(Error::ShapeMismatch(format!(
                "padding mask {:?} does not match batch ({batch_size}, {context_size})",
                self.dim()
            )));
        }
        let data = self.keep.iter().copied().collect();
        Tensor::from_shape_vec(&[batch_size, context_size], data, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mask_marks_padding() {
        let m = PadMask::from_contexts(&array![[0, 0, 3], [1, 2, 0]], 0);
        assert_eq!(m.padded_positions(), vec![(0, 0), (0, 1), (1, 2)]);
        assert_eq!(m.padded_count(), 3);
        assert!(m.empty_rows().is_empty());
    }

    #[test]
    fn test_mask_custom_pad_idx() {
        let m = PadMask::from_contexts(&array![[4, 4], [0, 4]], 4);
        assert_eq!(m.empty_rows(), vec![0]);
        assert_eq!(m.padded_positions(), vec![(0, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_to_tensor_checks_shape() {
        let m = PadMask::from_contexts(&array![[0, 1]], 0);
        let t = m.to_tensor(1, 2).unwrap();
        assert_eq!(t.data().to_vec(), vec![0.0, 1.0]);
        assert!(m.to_tensor(2, 1).is_err());
    }
}
