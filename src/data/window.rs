//! Sliding context windows over user histories
//!
//! Every position `t >= 1` of a user's encoded history yields one training
//! example: the item at `t` is the target and the `window_size` items before
//! it form the context, left-padded with the padding index when the history
//! is shorter than the window.

use super::UserHistories;
use crate::error::{Error, Result};
use crate::train::ItemBatch;
use crate::vocab::Vocabulary;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Flattened (target, context) examples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindowDataset {
    targets: Vec<usize>,
    /// Row-major `[len, window_size]`
    contexts: Vec<usize>,
    window_size: usize,
    pad_idx: usize,
}

impl ContextWindowDataset {
    /// Encode `histories` with `vocab` and cut them into windows
    ///
    /// Items missing from the vocabulary are dropped before windowing.
    pub fn new(histories: &UserHistories, vocab: &Vocabulary, window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(Error::InvalidParameter("window_size must be > 0".into()));
        }
        let pad_idx = vocab.pad_idx();
        let mut dataset = Self { targets: Vec::new(), contexts: Vec::new(), window_size, pad_idx };

        for user in histories.iter() {
            let encoded = vocab.encode(user.iter().map(String::as_str));
            for t in 1..encoded.len() {
                let window = context_window(&encoded[..t], window_size);
                dataset.contexts.extend(std::iter::repeat_n(pad_idx, window_size - window.len()));
                dataset.contexts.extend_from_slice(window);
                dataset.targets.push(encoded[t]);
            }
        }

        tracing::debug!(examples = dataset.len(), window_size, "built context windows");
        Ok(dataset)
    }

    /// Number of examples
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether there are no examples
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Context width
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Index used for left padding
    pub fn pad_idx(&self) -> usize {
        self.pad_idx
    }

    /// Target and context of example `i`
    pub fn get(&self, i: usize) -> Option<(usize, &[usize])> {
        let target = *self.targets.get(i)?;
        let start = i * self.window_size;
        Some((target, &self.contexts[start..start + self.window_size]))
    }

    /// Group examples into batches of at most `batch_size`
    ///
    /// With `rng` the example order is shuffled first; without it batches
    /// follow dataset order. The last batch may be smaller.
    pub fn batches(&self, batch_size: usize, rng: Option<&mut StdRng>) -> Result<Vec<ItemBatch>> {
        if batch_size == 0 {
            return Err(Error::InvalidParameter("batch_size must be > 0".into()));
        }
        let mut order: Vec<usize> = (0..self.len()).collect();
        if let Some(rng) = rng {
            order.shuffle(rng);
        }

        order
            .chunks(batch_size)
            .map(|chunk| {
                let mut targets = Vec::with_capacity(chunk.len());
                let mut flat = Vec::with_capacity(chunk.len() * self.window_size);
                for &i in chunk {
                    targets.push(self.targets[i]);
                    let start = i * self.window_size;
                    flat.extend_from_slice(&self.contexts[start..start + self.window_size]);
                }
                let contexts = Array2::from_shape_vec((chunk.len(), self.window_size), flat)
                    .map_err(|e| Error::ShapeMismatch(e.to_string()))?;
                ItemBatch::new(targets, contexts)
            })
            .collect()
    }
}

/// Last `window_size` items of `history`
fn context_window(history: &[usize], window_size: usize) -> &[usize] {
    &history[history.len().saturating_sub(window_size)..]
}

/// A held-out user: rank `target` given the items before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalCase {
    /// Up to `window_size` items preceding the target, unpadded
    pub context: Vec<usize>,
    /// The user's last item
    pub target: usize,
}

impl EvalCase {
    /// One case per user with at least two known items
    pub fn from_histories(histories: &UserHistories, vocab: &Vocabulary, window_size: usize) -> Vec<Self> {
        histories
            .iter()
            .filter_map(|user| {
                let encoded = vocab.encode(user.iter().map(String::as_str));
                let (&target, history) = encoded.split_last()?;
                if history.is_empty() {
                    return None;
                }
                Some(Self { context: context_window(history, window_size).to_vec(), target })
            })
            .collect()
    }
}
