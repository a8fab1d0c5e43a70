//! SGNS training
//!
//! This module provides:
//! - The SGNS loss with padding-aware masking
//! - The early-stopping controller and its improvement policies
//! - The trainer (step, epoch, validation, fixed or early-stopped loop)
//! - Training configuration and metrics tracking
//! - Metric sinks
//!
//! # Example
//!
//! ```
//! use itemvec::train::{EarlyStopping, ImprovementPolicy};
//!
//! let mut es = EarlyStopping::new(3, ImprovementPolicy::StrictDecrease);
//! let mut stop_epoch = None;
//! for (i, loss) in [10.0, 9.0, 9.0, 9.0, 9.0].into_iter().enumerate() {
//!     if es.observe(i + 1, loss).should_stop() {
//!         stop_epoch = Some(i + 1);
//!         break;
//!     }
//! }
//! assert_eq!(stop_epoch, Some(5));
//! assert_eq!(es.best_epoch(), Some(2));
//! ```

mod batch;
mod config;
mod early_stopping;
mod loss;
pub mod metrics;
mod trainer;

pub use batch::ItemBatch;
pub use config::{ImprovementPolicy, MetricsTracker, TrainConfig, TrainMode};
pub use early_stopping::{EarlyStopState, EarlyStopping, EpochDecision};
pub use loss::{PadMask, SgnsLoss};
pub use metrics::{JsonlSink, MemorySink, MetricsSink, TracingSink};
pub use trainer::{TrainReport, Trainer, BEST_TAG, FINAL_TAG};
