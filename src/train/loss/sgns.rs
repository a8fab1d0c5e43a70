//! SGNS objective
//!
//! For a batch of `B` targets with `C` context slots each:
//!
//! ```text
//! oloss[b, c] = ln σ(o[b, c] · i[b])
//! nloss[b, c] = Σ_k ln σ(-n[b, c, k] · i[b])
//! loss        = -mean_b Σ_c mask[b, c] * (oloss[b, c] + nloss[b, c])
//! ```
//!
//! where `i` are input-side target vectors, `o` output-side context vectors
//! and `n` output-side vectors of `n_negs` sampled negatives per slot.

use super::PadMask;
use crate::autograd::{add, bmm, log_sigmoid, mean, mul, neg, reshape, sum_last_axis, Indices};
use crate::embedding::Bundler;
use crate::error::{Error, Result};
use crate::sampling::NegativeSampler;
use crate::train::ItemBatch;
use crate::Tensor;

/// Skip-gram negative-sampling loss over any [`Bundler`]
pub struct SgnsLoss<B: Bundler> {
    bundler: B,
    sampler: NegativeSampler,
    n_negs: usize,
}

impl<B: Bundler> SgnsLoss<B> {
    /// Wrap a bundler and a sampler drawing `n_negs` negatives per context slot
    pub fn new(bundler: B, sampler: NegativeSampler, n_negs: usize) -> Result<Self> {
        if n_negs == 0 {
            return Err(Error::InvalidParameter("n_negs must be positive".into()));
        }
        if sampler.vocab_size() != bundler.vocab_size() {
            return Err(Error::ShapeMismatch(format!(
                "sampler covers {} items, bundler {}",
                sampler.vocab_size(),
                bundler.vocab_size()
            )));
        }
        Ok(Self { bundler, sampler, n_negs })
    }

    /// Embedding bundler
    pub fn bundler(&self) -> &B {
        &self.bundler
    }

    /// Mutable embedding bundler
    pub fn bundler_mut(&mut self) -> &mut B {
        &mut self.bundler
    }

    /// Give back the bundler
    pub fn into_bundler(self) -> B {
        self.bundler
    }

    /// Negatives per context slot
    pub fn n_negs(&self) -> usize {
        self.n_negs
    }

    /// Mask of the padded slots of `batch` under this bundler's padding index
    pub fn pad_mask(&self, batch: &ItemBatch) -> PadMask {
        PadMask::from_contexts(&batch.contexts, self.bundler.pad_idx())
    }

    /// Scalar loss for one batch
    ///
    /// With a mask, padded slots contribute nothing to the value or the
    /// gradient. Gradients flow into the bundler's tables when it is in
    /// training mode.
    pub fn forward(&mut self, batch: &ItemBatch, mask: Option<&PadMask>) -> Result<Tensor> {
        let (b, c) = batch.contexts.dim();
        if b == 0 || c == 0 {
            return Err(Error::InvalidParameter(format!("empty batch ({b}, {c})")));
        }
        if batch.targets.len() != b {
            return Err(Error::ShapeMismatch(format!(
                "{} targets for {b} context rows",
                batch.targets.len()
            )));
        }
        let n = self.n_negs;
        let nitems = self.sampler.sample(b, c, n);

        let ivectors = self.bundler.forward_i(&Indices::new(batch.targets.clone(), vec![b, 1])?)?;
        let ovectors = self.bundler.forward_o(&Indices::from_array2(&batch.contexts))?;
        let nvectors = neg(&self.bundler.forward_o(&Indices::from_array2(&nitems))?);

        let oloss = log_sigmoid(&bmm(&ovectors, &ivectors)?);
        ensure_batch_dim("oloss", &oloss, b)?;
        let nloss = log_sigmoid(&bmm(&nvectors, &ivectors)?);
        let nloss = sum_last_axis(&reshape(&nloss, &[b, c, n])?)?;
        ensure_batch_dim("nloss", &nloss, b)?;

        let mut per_slot = add(&oloss, &nloss)?;
        if let Some(mask) = mask {
            per_slot = mul(&per_slot, &mask.to_tensor(b, c)?)?;
        }

        Ok(neg(&mean(&sum_last_axis(&per_slot)?)))
    }

    /// Loss of `batch` with padded slots masked out
    pub fn forward_masked(&mut self, batch: &ItemBatch) -> Result<Tensor> {
        let mask = self.pad_mask(batch);
        self.forward(batch, Some(&mask))
    }
}

fn ensure_batch_dim(name: &str, t: &Tensor, batch_size: usize) -> Result<()> {
    match t.shape().first() {
        Some(&lead) if lead == batch_size => Ok(()),
        _ => Err(Error::ShapeMismatch(format!(
            "{name} has shape {:?}, expected leading dimension {batch_size}",
            t.shape()
        ))),
    }
}
