//! End-to-end tests for configured training runs

use super::*;
use crate::config::schema::{DataSpec, ModelSpec, OptimSpec, RunMode, TrainSpec, TrainingParams};
use crate::error::Error;
use crate::io::{CheckpointStore, FileCheckpointStore};
use crate::vocab::Vocabulary;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TRAIN: &str = "a b c d e\nb c d\na c e f\nd e f a\nb d f\nc a b e\n";
const VALID: &str = "a b c\nd e f\n";
const TEST: &str = "a b c d\ne f a\n";

fn write_data(dir: &Path) {
    fs::write(dir.join("train.txt"), TRAIN).unwrap();
    fs::write(dir.join("valid.txt"), VALID).unwrap();
    fs::write(dir.join("test.txt"), TEST).unwrap();
}

fn spec(dir: &Path, mode: RunMode) -> TrainSpec {
    TrainSpec {
        model: ModelSpec { name: "shop".to_string(), embedding_size: 4, seed: 11, ..Default::default() },
        data: DataSpec {
            data_dir: dir.to_path_buf(),
            train: PathBuf::from("train.txt"),
            valid: Some(PathBuf::from("valid.txt")),
            test: Some(PathBuf::from("test.txt")),
            window_size: 2,
            batch_size: 4,
            n_negs: 2,
            ..Default::default()
        },
        optimizer: OptimSpec { lr: 0.05, ..Default::default() },
        training: TrainingParams {
            epochs: 3,
            mode,
            patience: 2,
            save_dir: dir.join("ckpt"),
            log_dir: Some(dir.join("runs")),
            k: 3,
            ..Default::default()
        },
    }
}

fn checkpoint_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| !n.ends_with("_vocab.json"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_train_mode_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_data(dir.path());
    let spec = spec(dir.path(), RunMode::Train);

    let report = train_from_spec(&spec).unwrap();

    assert_eq!(report.mode, RunMode::Train);
    assert_eq!(report.train.epochs_run, 3);
    assert!(!report.train.stopped_early);
    assert!(report.train.train_losses.iter().all(|l| l.is_finite()));
    assert!(report.evaluation.is_none());

    let ranking = report.ranking.unwrap();
    assert_eq!(ranking.cases, 2);
    assert_eq!(ranking.k, 3);
    assert!((0.0..=1.0).contains(&ranking.hit_ratio));
    assert!(ranking.mrr <= ranking.hit_ratio);

    // exactly one checkpoint, the final one
    assert_eq!(checkpoint_files(&report.save_dir), vec!["shop_final.json".to_string()]);
    let store = FileCheckpointStore::new(&report.save_dir, "shop");
    let ckpt = store.load("final").unwrap();
    assert_eq!(ckpt.epoch, Some(3));
    assert_eq!(ckpt.n_negs, 2);

    let vocab = Vocabulary::load(report.save_dir.join("shop_vocab.json")).unwrap();
    assert_eq!(vocab.len(), ckpt.vocab_size);
}

#[test]
fn test_train_mode_writes_metrics() {
    let dir = TempDir::new().unwrap();
    write_data(dir.path());
    train_from_spec(&spec(dir.path(), RunMode::Train)).unwrap();

    let runs: Vec<_> = fs::read_dir(dir.path().join("runs")).unwrap().collect();
    assert_eq!(runs.len(), 1);
    let metrics = fs::read_to_string(runs[0].as_ref().unwrap().path().join("metrics.jsonl")).unwrap();
    let lines: Vec<serde_json::Value> = metrics.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

    // 3 train losses, 3 validation losses, one hparams record
    assert_eq!(lines.len(), 7);
    let last = lines.last().unwrap().to_string();
    assert!(last.contains("hit_ratio_3"));
    assert!(last.contains("mrr_3"));
}

#[test]
fn test_train_evaluate_mode_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_data(dir.path());
    let mut spec = spec(dir.path(), RunMode::TrainEvaluate);
    spec.training.epochs = 6;

    let report = train_from_spec(&spec).unwrap();

    let evaluation = report.evaluation.unwrap();
    assert!(evaluation.valid_loss.is_finite());
    assert!(evaluation.valid_loss > 0.0);
    assert_eq!(evaluation.early_stop_epoch, report.train.best_epoch);
    assert!(evaluation.early_stop_epoch.is_some());
    assert!(report.ranking.is_none());
    assert_eq!(checkpoint_files(&report.save_dir), vec!["shop_best.json".to_string()]);
}

#[test]
fn test_runs_are_deterministic() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    write_data(a.path());
    write_data(b.path());

    let ra = train_from_spec(&spec(a.path(), RunMode::Train)).unwrap();
    let rb = train_from_spec(&spec(b.path(), RunMode::Train)).unwrap();
    assert_eq!(ra.train.train_losses, rb.train.train_losses);
    assert_eq!(ra.train.val_losses, rb.train.val_losses);
    assert_eq!(ra.ranking, rb.ranking);
}

#[test]
fn test_saved_vocabulary_is_reused() {
    let dir = TempDir::new().unwrap();
    write_data(dir.path());
    let vocab = Vocabulary::build(["a", "b", "c", "d", "e", "f", "zz"], 1).unwrap();
    vocab.save(dir.path().join("vocab.json")).unwrap();

    let mut spec = spec(dir.path(), RunMode::Train);
    spec.data.vocab = Some(PathBuf::from("vocab.json"));
    let report = train_from_spec(&spec).unwrap();

    let store = FileCheckpointStore::new(&report.save_dir, "shop");
    assert_eq!(store.load("final").unwrap().vocab_size, 8);
}

#[test]
fn test_missing_train_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let err = train_from_spec(&spec(dir.path(), RunMode::Train)).unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
}

#[test]
fn test_load_config_from_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        "data:\n  train: users.txt\n  batch_size: 16\noptimizer:\n  name: adagrad\n  lr: 0.025\n",
    )
    .unwrap();

    let spec = load_config(&path).unwrap();
    assert_eq!(spec.data.batch_size, 16);
    assert!((spec.optimizer.lr - 0.025).abs() < 1e-9);
}

#[test]
fn test_load_config_errors() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(load_config(dir.path().join("nope.yaml")), Err(Error::ConfigError(_))));

    let bad = dir.path().join("bad.yaml");
    fs::write(&bad, "data: [unclosed").unwrap();
    assert!(matches!(load_config(&bad), Err(Error::ConfigError(_))));

    let invalid = dir.path().join("invalid.yaml");
    fs::write(&invalid, "data:\n  train: users.txt\n  batch_size: 0\n").unwrap();
    let err = load_config(&invalid).unwrap_err();
    assert!(err.to_string().contains("Invalid batch size"));
}
