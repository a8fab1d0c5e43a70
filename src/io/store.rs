//! Checkpoint persistence

use super::{CheckpointFormat, ModelCheckpoint};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the trainer persists snapshots
///
/// Tags name the role of a snapshot (`"best"`, `"final"`); saving under an
/// existing tag replaces it.
pub trait CheckpointStore {
    /// Persist `checkpoint` under `tag`
    fn save(&mut self, tag: &str, checkpoint: &ModelCheckpoint) -> Result<()>;

    /// Read back the snapshot stored under `tag`
    fn load(&self, tag: &str) -> Result<ModelCheckpoint>;
}

/// Stores checkpoints as `<dir>/<model>_<tag>.<ext>`
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    dir: PathBuf,
    model_name: String,
    format: CheckpointFormat,
    pretty: bool,
}

impl FileCheckpointStore {
    /// Store under `dir`, file names prefixed with `model_name`
    pub fn new(dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self { dir: dir.into(), model_name: model_name.into(), format: CheckpointFormat::Json, pretty: false }
    }

    /// Set file format
    pub fn with_format(mut self, format: CheckpointFormat) -> Self {
        self.format = format;
        self
    }

    /// Pretty-print JSON output
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Path of the file holding `tag`
    pub fn path_for(&self, tag: &str) -> PathBuf {
        self.dir.join(format!("{}_{tag}.{}", self.model_name, self.format.extension()))
    }

    /// Directory checkpoints are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn save(&mut self, tag: &str, checkpoint: &ModelCheckpoint) -> Result<()> {
        checkpoint.validate()?;
        let path = self.path_for(tag);
        let text = self.format.encode(checkpoint, self.pretty)?;

        fs::create_dir_all(&self.dir).map_err(|e| {
            Error::Checkpoint(format!("creating {}: {e}", self.dir.display()))
        })?;

        // Readers only ever see a complete file
        let tmp = path.with_extension(format!("{}.tmp", self.format.extension()));
        fs::write(&tmp, text).map_err(|e| Error::Checkpoint(format!("writing {}: {e}", tmp.display())))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::Checkpoint(format!("moving checkpoint to {}: {e}", path.display())));
        }

        tracing::debug!(path = %path.display(), tag, epoch = ?checkpoint.epoch, "checkpoint saved");
        Ok(())
    }

    fn load(&self, tag: &str) -> Result<ModelCheckpoint> {
        let path = self.path_for(tag);
        let text = fs::read_to_string(&path)
            .map_err(|e| Error::Checkpoint(format!("reading {}: {e}", path.display())))?;
        let checkpoint: ModelCheckpoint = self.format.decode(&text)?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }
}

/// In-memory store that also records every save
#[derive(Debug, Default, Clone)]
pub struct MemoryCheckpointStore {
    checkpoints: BTreeMap<String, ModelCheckpoint>,
    history: Vec<String>,
}

impl MemoryCheckpointStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags in the order they were saved, repeats included
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Number of saves
    pub fn save_count(&self) -> usize {
        self.history.len()
    }

    /// Latest snapshot under `tag`
    pub fn get(&self, tag: &str) -> Option<&ModelCheckpoint> {
        self.checkpoints.get(tag)
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn save(&mut self, tag: &str, checkpoint: &ModelCheckpoint) -> Result<()> {
        checkpoint.validate()?;
        self.checkpoints.insert(tag.to_string(), checkpoint.clone());
        self.history.push(tag.to_string());
        Ok(())
    }

    fn load(&self, tag: &str) -> Result<ModelCheckpoint> {
        self.checkpoints
            .get(tag)
            .cloned()
            .ok_or_else(|| Error::Checkpoint(format!("no checkpoint tagged '{tag}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{Item2Vec, Item2VecConfig};
    use crate::io::Checkpointable;
    use tempfile::TempDir;

    fn checkpoint() -> ModelCheckpoint {
        Item2Vec::new(Item2VecConfig::new(6, 4).with_seed(5))
            .unwrap()
            .to_checkpoint()
            .with_n_negs(3)
            .at_epoch(2, Some(0.75))
    }

    #[test]
    fn test_file_store_json_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = FileCheckpointStore::new(dir.path(), "i2v");
        let ckpt = checkpoint();
        store.save("best", &ckpt).unwrap();

        assert!(dir.path().join("i2v_best.json").exists());
        assert_eq!(store.load("best").unwrap(), ckpt);
    }

    #[test]
    fn test_file_store_pretty_json() {
        let dir = TempDir::new().unwrap();
        let mut compact = FileCheckpointStore::new(dir.path(), "compact");
        let mut pretty = FileCheckpointStore::new(dir.path(), "pretty").with_pretty(true);
        compact.save("best", &checkpoint()).unwrap();
        pretty.save("best", &checkpoint()).unwrap();

        let compact_text = fs::read_to_string(compact.path_for("best")).unwrap();
        let pretty_text = fs::read_to_string(pretty.path_for("best")).unwrap();
        assert!(!compact_text.trim_end().contains('\n'));
        assert!(pretty_text.lines().count() > 1);
        assert_eq!(pretty.load("best").unwrap(), compact.load("best").unwrap());
    }

    #[test]
    fn test_file_store_yaml() {
        let dir = TempDir::new().unwrap();
        let mut store = FileCheckpointStore::new(dir.path(), "i2v").with_format(CheckpointFormat::Yaml);
        store.save("final", &checkpoint()).unwrap();
        assert!(store.path_for("final").ends_with("i2v_final.yaml"));
        assert_eq!(store.load("final").unwrap().n_negs, 3);
    }

    #[test]
    fn test_file_store_creates_directory_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let mut store = FileCheckpointStore::new(&nested, "m");
        store.save("best", &checkpoint()).unwrap();

        let names: Vec<_> = fs::read_dir(&nested)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["m_best.json".to_string()]);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(dir.path(), "m");
        fs::write(store.path_for("best"), "{\"metadata\": ").unwrap();
        assert!(matches!(store.load("best"), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_file_store_rejects_inconsistent_tables() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(dir.path(), "m");
        let mut ckpt = checkpoint();
        ckpt.ivectors.truncate(3);
        fs::write(store.path_for("best"), serde_json::to_string(&ckpt).unwrap()).unwrap();
        assert!(matches!(store.load("best"), Err(Error::Checkpoint(_))));
    }

    #[test]
    fn test_file_store_missing_tag() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::new(dir.path(), "m");
        assert!(matches!(store.load("best"), Err(Error::Checkpoint(_))));
    }

    #[test]
    fn test_memory_store_records_history() {
        let mut store = MemoryCheckpointStore::new();
        store.save("best", &checkpoint()).unwrap();
        store.save("best", &checkpoint().at_epoch(4, Some(0.5))).unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.load("best").unwrap().epoch, Some(4));
        assert!(store.load("final").is_err());
    }
}
