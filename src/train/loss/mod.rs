//! Skip-gram negative-sampling loss
//!
//! - [`SgnsLoss`] - scalar SGNS objective over a [`Bundler`](crate::embedding::Bundler)
//! - [`PadMask`] - per-position mask that silences padded context slots

mod mask;
mod sgns;

pub use mask::PadMask;
pub use sgns::SgnsLoss;
