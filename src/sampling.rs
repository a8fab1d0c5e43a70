//! Negative sampling
//!
//! For every (target, context-slot) pair of a batch the sampler draws
//! `n_negs` item indices with replacement, either uniformly over the whole
//! vocabulary or from the unigram distribution smoothed with exponent 0.75.
//! True targets and contexts are not excluded from the draws.

use crate::error::{Error, Result};
use ndarray::Array2;
use rand::distr::weighted::WeightedIndex;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Exponent applied to raw item frequencies
pub const SMOOTHING_EXPONENT: f64 = 0.75;

/// `frequency^0.75`, normalised to sum to 1
///
/// Fails on an empty slice, on negative or non-finite entries, and when no
/// item has a positive frequency.
pub fn smoothed_distribution(frequencies: &[f64]) -> Result<Vec<f64>> {
    if frequencies.is_empty() {
        return Err(Error::EmptyVocabulary("no item frequencies supplied".into()));
    }
    if let Some((idx, f)) = frequencies.iter().enumerate().find(|(_, f)| !f.is_finite() || **f < 0.0) {
        return Err(Error::InvalidParameter(format!("frequency of item {idx} is {f}")));
    }

    let smoothed: Vec<f64> = frequencies.iter().map(|f| f.powf(SMOOTHING_EXPONENT)).collect();
    let total: f64 = smoothed.iter().sum();
    if total <= 0.0 {
        return Err(Error::EmptyVocabulary("all item frequencies are zero".into()));
    }
    Ok(smoothed.into_iter().map(|w| w / total).collect())
}

enum Sampling {
    Uniform(Uniform<usize>),
    Weighted { table: WeightedIndex<f64>, probabilities: Vec<f64> },
}

/// Seeded negative-item sampler over a fixed vocabulary
pub struct NegativeSampler {
    vocab_size: usize,
    sampling: Sampling,
    rng: StdRng,
}

impl NegativeSampler {
    /// Uniform draws over `[0, vocab_size - 1]`
    pub fn uniform(vocab_size: usize, seed: u64) -> Result<Self> {
        if vocab_size == 0 {
            return Err(Error::EmptyVocabulary("cannot sample from an empty vocabulary".into()));
        }
        let dist = Uniform::new_inclusive(0, vocab_size - 1)
            .map_err(|e| Error::InvalidParameter(format!("uniform sampler: {e}")))?;
        Ok(Self { vocab_size, sampling: Sampling::Uniform(dist), rng: StdRng::seed_from_u64(seed) })
    }

    /// Draws from the smoothed unigram distribution of `frequencies`
    ///
    /// `frequencies[i]` is the raw count of item `i`; the vocabulary size is
    /// the slice length.
    pub fn weighted(frequencies: &[f64], seed: u64) -> Result<Self> {
        let probabilities = smoothed_distribution(frequencies)?;
        let table = WeightedIndex::new(&probabilities)
            .map_err(|e| Error::InvalidParameter(format!("weighted sampler: {e}")))?;
        Ok(Self {
            vocab_size: probabilities.len(),
            sampling: Sampling::Weighted { table, probabilities },
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Weighted when frequencies are given, uniform otherwise
    pub fn from_frequencies(vocab_size: usize, frequencies: Option<&[f64]>, seed: u64) -> Result<Self> {
        match frequencies {
            Some(f) if f.len() != vocab_size => Err(Error::ShapeMismatch(format!(
                "{} frequencies for a vocabulary of {vocab_size}",
                f.len()
            ))),
            Some(f) => Self::weighted(f, seed),
            None => Self::uniform(vocab_size, seed),
        }
    }

    /// Vocabulary size the draws range over
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Sampling probabilities, `None` in uniform mode
    pub fn probabilities(&self) -> Option<&[f64]> {
        match &self.sampling {
            Sampling::Uniform(_) => None,
            Sampling::Weighted { probabilities, .. } => Some(probabilities),
        }
    }

    /// Draw a `(batch_size, context_size * n_negs)` matrix of item indices
    pub fn sample(&mut self, batch_size: usize, context_size: usize, n_negs: usize) -> Array2<usize> {
        let shape = (batch_size, context_size * n_negs);
        let rng = &mut self.rng;
        match &self.sampling {
            Sampling::Uniform(dist) => Array2::from_shape_fn(shape, |_| dist.sample(rng)),
            Sampling::Weighted { table, .. } => Array2::from_shape_fn(shape, |_| table.sample(rng)),
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_sample_shape(
            batch in 1usize..16,
            context in 1usize..8,
            n_negs in 1usize..6,
            vocab in 1usize..100,
            seed in any::<u64>(),
        ) {
            let mut s = NegativeSampler::uniform(vocab, seed).unwrap();
            let draws = s.sample(batch, context, n_negs);
            prop_assert_eq!(draws.dim(), (batch, context * n_negs));
            prop_assert!(draws.iter().all(|&i| i < vocab));
        }

        #[test]
        fn prop_weighted_sample_shape(
            freqs in prop::collection::vec(1.0f64..100.0, 1..20),
            batch in 1usize..8,
            context in 1usize..6,
            n_negs in 1usize..5,
        ) {
            let mut s = NegativeSampler::weighted(&freqs, 0).unwrap();
            let draws = s.sample(batch, context, n_negs);
            prop_assert_eq!(draws.dim(), (batch, context * n_negs));
            prop_assert!(draws.iter().all(|&i| i < freqs.len()));
        }
    }
}
