//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, train_from_spec, validate_config, RunReport, TrainArgs};

/// One-paragraph summary of a finished run
pub fn format_run_report(report: &RunReport) -> String {
    let train = &report.train;
    let mut lines = vec![format!(
        "  Epochs run: {}{}",
        train.epochs_run,
        if train.stopped_early { " (stopped early)" } else { "" }
    )];
    if let Some(loss) = train.final_train_loss() {
        lines.push(format!("  Final train loss: {loss:.6}"));
    }
    if let Some(ranking) = &report.ranking {
        lines.push(format!("  Test ranking: {ranking}"));
    }
    if let Some(evaluation) = &report.evaluation {
        lines.push(format!("  Best model validation loss: {:.6}", evaluation.valid_loss));
        if let Some(epoch) = evaluation.early_stop_epoch {
            lines.push(format!("  Best epoch: {epoch}"));
        }
    }
    lines.push(format!("  Checkpoints: {}", report.save_dir.display()));
    lines.join("\n")
}

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(level, LogLevel::Normal, &format!("itemvec: training from {}", args.config.display()));

    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    // Overrides can break ranges the file satisfied
    apply_overrides(&mut spec, &args);
    validate_config(&spec).map_err(|e| format!("Config error: {e}"))?;

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run - config validated successfully");
        log(level, LogLevel::Verbose, &format!("  Model: {} (dim={})", spec.model.name, spec.model.embedding_size));
        log(
            level,
            LogLevel::Verbose,
            &format!("  Optimizer: {} (lr={})", spec.optimizer.name, spec.optimizer.lr),
        );
        log(level, LogLevel::Verbose, &format!("  Epochs: {}", spec.training.epochs));
        log(level, LogLevel::Verbose, &format!("  Batch size: {}", spec.data.batch_size));
        return Ok(());
    }

    let report = train_from_spec(&spec).map_err(|e| format!("Training error: {e}"))?;

    log(level, LogLevel::Normal, "Training complete!");
    log(level, LogLevel::Normal, &format_run_report(&report));
    Ok(())
}
