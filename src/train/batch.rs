//! Batch data structure

use crate::error::{Error, Result};
use ndarray::Array2;

/// A batch of target items with their context windows
///
/// `contexts` has one row per target; ragged windows are padded to a fixed
/// width with the padding index.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemBatch {
    /// Target item per row, length `B`
    pub targets: Vec<usize>,
    /// Context items, shape `(B, C)`
    pub contexts: Array2<usize>,
}

impl ItemBatch {
    /// Create a new batch, checking that row counts agree
    pub fn new(targets: Vec<usize>, contexts: Array2<usize>) -> Result<Self> {
        if targets.len() != contexts.nrows() {
            return Err(Error::ShapeMismatch(format!(
                "{} targets but {} context rows",
                targets.len(),
                contexts.nrows()
            )));
        }
        Ok(Self { targets, contexts })
    }

    /// Batch size `B`
    pub fn size(&self) -> usize {
        self.targets.len()
    }

    /// Context width `C`
    pub fn context_size(&self) -> usize {
        self.contexts.ncols()
    }
}
