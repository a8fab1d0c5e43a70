//! Metric sinks
//!
//! The trainer reports per-epoch scalars and final hyper-parameter/metric
//! pairs through [`MetricsSink`]. Sinks are fire-and-forget: failures are
//! logged, never returned.

mod jsonl;
mod sink;

pub use jsonl::JsonlSink;
pub use sink::{MemorySink, MetricsSink, ScalarRecord, TracingSink};

/// Tag of the mean training loss per epoch
pub const TAG_TRAIN_LOSS: &str = "Loss/train";

/// Tag of the validation loss per epoch
pub const TAG_VAL_LOSS: &str = "Loss/validation";
