//! Declarative training configuration
//!
//! - `schema`: YAML structure of a run
//! - `validate`: range and consistency checks before anything runs
//! - `builder`: model, sampler, optimizer and loop settings from a spec
//! - `train`: the `train` / `train_evaluate` pipelines
//! - `cli`: command-line arguments and overrides

mod builder;
mod cli;
mod schema;
mod train;
mod validate;

pub use builder::{build_model, build_optimizer, build_sampler, build_train_config};
pub use cli::{
    apply_overrides, parse_args, Cli, Command, InfoArgs, OutputFormat, TrainArgs, ValidateArgs,
};
pub use schema::{DataSpec, ModelSpec, OptimSpec, RunMode, TrainSpec, TrainingParams};
pub use train::{
    load_config, train_from_spec, train_from_yaml, EvaluateReport, RunReport, METRIC_VALID_LOSS,
};
pub use validate::{validate_config, validate_paths, ValidationError};
