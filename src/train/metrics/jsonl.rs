//! Append-only JSON-lines metric log

use super::MetricsSink;
use crate::error::{Error, Result};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
#[serde(untagged)]
enum Line<'a> {
    Scalar { time: String, tag: &'a str, value: f32, epoch: usize },
    Hparams { time: String, hparams: &'a BTreeMap<String, serde_json::Value>, metrics: &'a BTreeMap<String, f32> },
}

/// Writes `<log_dir>/<timestamp>/metrics.jsonl`, one JSON object per line
pub struct JsonlSink {
    path: PathBuf,
    file: File,
}

impl JsonlSink {
    /// Open a new run directory stamped with the current UTC time
    pub fn create(log_dir: impl AsRef<Path>) -> Result<Self> {
        let run = Utc::now().format("%Y%m%d-%H%M%S%.3f").to_string();
        Self::create_in(log_dir.as_ref().join(run))
    }

    /// Open `<dir>/metrics.jsonl` for appending
    pub fn create_in(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join("metrics.jsonl");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    /// File being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&mut self, line: &Line<'_>) {
        let written = serde_json::to_string(line)
            .map_err(Error::from)
            .and_then(|text| writeln!(self.file, "{text}").map_err(Error::from));
        if let Err(e) = written {
            tracing::warn!(path = %self.path.display(), error = %e, "dropping metric line");
        }
    }
}

impl MetricsSink for JsonlSink {
    fn log_scalar(&mut self, tag: &str, value: f32, epoch: usize) {
        let time = Utc::now().to_rfc3339();
        self.write(&Line::Scalar { time, tag, value, epoch });
    }

    fn log_hparams(&mut self, hparams: &BTreeMap<String, serde_json::Value>, metrics: &BTreeMap<String, f32>) {
        let time = Utc::now().to_rfc3339();
        self.write(&Line::Hparams { time, hparams, metrics });
    }
}
