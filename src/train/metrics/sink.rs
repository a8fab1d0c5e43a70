//! Sink trait and in-process sinks

use std::collections::BTreeMap;

/// Receiver of training metrics
pub trait MetricsSink {
    /// One scalar for an epoch (1-indexed)
    fn log_scalar(&mut self, tag: &str, value: f32, epoch: usize);

    /// Final hyper-parameters and the metrics they produced
    fn log_hparams(&mut self, hparams: &BTreeMap<String, serde_json::Value>, metrics: &BTreeMap<String, f32>);
}

/// Emits metrics as structured `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn log_scalar(&mut self, tag: &str, value: f32, epoch: usize) {
        tracing::info!(tag, value, epoch, "metric");
    }

    fn log_hparams(&mut self, hparams: &BTreeMap<String, serde_json::Value>, metrics: &BTreeMap<String, f32>) {
        let hparams = serde_json::Value::Object(hparams.clone().into_iter().collect());
        tracing::info!(%hparams, ?metrics, "hparams");
    }
}

/// A scalar captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarRecord {
    /// Metric tag
    pub tag: String,
    /// Value
    pub value: f32,
    /// Epoch
    pub epoch: usize,
}

/// Keeps everything in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    /// Scalars in arrival order
    pub scalars: Vec<ScalarRecord>,
    /// Hyper-parameter reports in arrival order
    pub hparams: Vec<(BTreeMap<String, serde_json::Value>, BTreeMap<String, f32>)>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Values logged under `tag`, in order
    pub fn values(&self, tag: &str) -> Vec<f32> {
        self.scalars.iter().filter(|r| r.tag == tag).map(|r| r.value).collect()
    }
}

impl MetricsSink for MemorySink {
    fn log_scalar(&mut self, tag: &str, value: f32, epoch: usize) {
        self.scalars.push(ScalarRecord { tag: tag.to_string(), value, epoch });
    }

    fn log_hparams(&mut self, hparams: &BTreeMap<String, serde_json::Value>, metrics: &BTreeMap<String, f32>) {
        self.hparams.push((hparams.clone(), metrics.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_filters_by_tag() {
        let mut sink = MemorySink::new();
        sink.log_scalar("Loss/train", 2.0, 1);
        sink.log_scalar("Loss/validation", 1.5, 1);
        sink.log_scalar("Loss/train", 1.0, 2);
        assert_eq!(sink.values("Loss/train"), vec![2.0, 1.0]);
        assert_eq!(sink.scalars[1].epoch, 1);
    }

    #[test]
    fn test_memory_sink_hparams() {
        let mut sink = MemorySink::new();
        let hp = BTreeMap::from([("lr".to_string(), serde_json::json!(0.1))]);
        let m = BTreeMap::from([("hr@10".to_string(), 0.5)]);
        sink.log_hparams(&hp, &m);
        assert_eq!(sink.hparams.len(), 1);
        assert_eq!(sink.hparams[0].1["hr@10"], 0.5);
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        let mut sink = TracingSink;
        sink.log_scalar("Loss/train", 1.0, 1);
        sink.log_hparams(&BTreeMap::new(), &BTreeMap::new());
    }
}
