//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, validate_paths, RunMode, TrainSpec, ValidateArgs};

/// Format model information as a string
pub fn format_model_info(spec: &TrainSpec) -> String {
    format!(
        "  Model: {}\n  Embedding size: {}\n  Device: {}\n  Seed: {}",
        spec.model.name, spec.model.embedding_size, spec.model.device, spec.model.seed
    )
}

/// Format data configuration as a string
pub fn format_data_info(spec: &TrainSpec) -> String {
    let data = &spec.data;
    let mut lines = vec![format!("  Training users: {}", data.resolve(&data.train).display())];
    if let Some(valid) = &data.valid {
        lines.push(format!("  Validation users: {}", data.resolve(valid).display()));
    }
    if let Some(test) = &data.test {
        lines.push(format!("  Test users: {}", data.resolve(test).display()));
    }
    lines.push(format!("  Window size: {}", data.window_size));
    lines.push(format!("  Batch size: {}", data.batch_size));
    lines.push(format!(
        "  Negatives: {} ({})",
        data.n_negs,
        if data.weighted { "frequency-weighted" } else { "uniform" }
    ));
    lines.join("\n")
}

/// Format optimizer configuration as a string
pub fn format_optimizer_info(spec: &TrainSpec) -> String {
    let mut lines = vec![
        format!("  Optimizer: {}", spec.optimizer.name),
        format!("  Learning rate: {}", spec.optimizer.lr),
    ];
    let mut params: Vec<_> = spec.optimizer.params.iter().collect();
    params.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in params {
        lines.push(format!("  {key}: {value}"));
    }
    lines.join("\n")
}

/// Format training configuration as a string
pub fn format_training_info(spec: &TrainSpec) -> String {
    let training = &spec.training;
    let mut lines = vec![format!("  Epochs: {}", training.epochs)];
    match training.mode {
        RunMode::Train => lines.push(format!("  Mode: train (HR@{k} / MRR@{k})", k = training.k)),
        RunMode::TrainEvaluate => {
            lines.push(format!("  Mode: train_evaluate (patience {})", training.patience));
            lines.push(format!("  Improvement policy: {:?}", training.policy));
        }
    }
    lines.push(format!("  Checkpoints: {}", training.save_dir.display()));
    lines.join("\n")
}

/// Print detailed configuration summary
pub fn print_detailed_summary(spec: &TrainSpec) {
    println!();
    println!("Configuration Summary:");
    println!("{}", format_model_info(spec));
    println!();
    println!("{}", format_data_info(spec));
    println!();
    println!("{}", format_optimizer_info(spec));
    println!();
    println!("{}", format_training_info(spec));
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("Validating config: {}", args.config.display()));

    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    if args.detailed {
        validate_paths(&spec).map_err(|e| format!("Validation failed: {e}"))?;
    }

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed && level != LogLevel::Quiet {
        print_detailed_summary(&spec);
    }

    Ok(())
}
