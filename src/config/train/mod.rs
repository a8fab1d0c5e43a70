//! Single-command training from YAML configuration
//!
//! This module provides the main entry points for declarative training via YAML configs.

mod data;
mod loader;

pub use loader::{
    load_config, train_from_spec, train_from_yaml, EvaluateReport, RunReport, METRIC_VALID_LOSS,
};

#[cfg(test)]
mod tests;
