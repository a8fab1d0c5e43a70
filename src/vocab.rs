//! Item vocabulary
//!
//! Maps item identifiers to dense indices `0..len`. Index 0 is the padding
//! token [`PAD_TOKEN`] and never a real item. The vocabulary also keeps the
//! corpus occurrence count of every item, which feeds the negative sampler.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Identifier of the padding entry
pub const PAD_TOKEN: &str = "pad";

/// Index of the padding entry
pub const PAD_IDX: usize = 0;

/// On-disk form: `idx2item` plus counts; `item2idx` is rebuilt on load
#[derive(Serialize, Deserialize)]
struct VocabularyFile {
    idx2item: Vec<String>,
    counts: Vec<u64>,
}

/// Bijective item ↔ index mapping with occurrence counts
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    idx2item: Vec<String>,
    item2idx: HashMap<String, usize>,
    counts: Vec<u64>,
}

impl Vocabulary {
    /// Count items and index those seen at least `min_count` times
    ///
    /// Items are ordered by descending count, ties broken by identifier, so
    /// the same corpus always yields the same indices.
    pub fn build<'a, I>(items: I, min_count: u64) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for item in items {
            if item != PAD_TOKEN {
                *counts.entry(item).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<(&str, u64)> = counts.into_iter().filter(|&(_, c)| c >= min_count).collect();
        kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let mut idx2item = vec![PAD_TOKEN.to_string()];
        let mut item_counts = vec![0];
        for (item, count) in kept {
            idx2item.push(item.to_string());
            item_counts.push(count);
        }
        Self::from_parts(idx2item, item_counts)
    }

    /// Assemble from an index-ordered item list and matching counts
    ///
    /// The first entry must be [`PAD_TOKEN`]; identifiers must be unique.
    pub fn from_parts(idx2item: Vec<String>, counts: Vec<u64>) -> Result<Self> {
        if idx2item.len() != counts.len() {
            return Err(Error::ShapeMismatch(format!(
                "{} items but {} counts",
                idx2item.len(),
                counts.len()
            )));
        }
        if idx2item.first().map(String::as_str) != Some(PAD_TOKEN) {
            return Err(Error::InvalidParameter(format!("index {PAD_IDX} must be '{PAD_TOKEN}'")));
        }
        if idx2item.len() < 2 {
            return Err(Error::EmptyVocabulary("vocabulary holds only the padding token".into()));
        }

        let mut item2idx = HashMap::with_capacity(idx2item.len());
        for (idx, item) in idx2item.iter().enumerate() {
            if item2idx.insert(item.clone(), idx).is_some() {
                return Err(Error::InvalidParameter(format!("duplicate item '{item}'")));
            }
        }
        Ok(Self { idx2item, item2idx, counts })
    }

    /// Number of entries, padding included
    pub fn len(&self) -> usize {
        self.idx2item.len()
    }

    /// Whether there are no real items (never true for a built vocabulary)
    pub fn is_empty(&self) -> bool {
        self.idx2item.len() <= 1
    }

    /// Padding index
    pub fn pad_idx(&self) -> usize {
        PAD_IDX
    }

    /// Index of `item`
    pub fn index_of(&self, item: &str) -> Option<usize> {
        self.item2idx.get(item).copied()
    }

    /// Identifier at `idx`
    pub fn item(&self, idx: usize) -> Option<&str> {
        self.idx2item.get(idx).map(String::as_str)
    }

    /// Occurrence count at `idx`
    pub fn count(&self, idx: usize) -> Option<u64> {
        self.counts.get(idx).copied()
    }

    /// Raw counts as sampler frequencies (padding has 0)
    pub fn frequencies(&self) -> Vec<f64> {
        self.counts.iter().map(|&c| c as f64).collect()
    }

    /// Indices of known items, unknown ones dropped
    pub fn encode<'a, I>(&self, items: I) -> Vec<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        items.into_iter().filter_map(|item| self.index_of(item)).filter(|&i| i != PAD_IDX).collect()
    }

    /// Identifiers of `indices`; out-of-range indices are an error
    pub fn decode(&self, indices: &[usize]) -> Result<Vec<&str>> {
        indices
            .iter()
            .map(|&idx| self.item(idx).ok_or(Error::IndexOutOfRange { index: idx, vocab_size: self.len() }))
            .collect()
    }

    /// Write as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = VocabularyFile { idx2item: self.idx2item.clone(), counts: self.counts.clone() };
        fs::write(path, serde_json::to_string(&file)?)?;
        Ok(())
    }

    /// Read from JSON written by [`Vocabulary::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("reading vocabulary {}: {e}", path.display())))?;
        let file: VocabularyFile = serde_json::from_str(&text)?;
        Self::from_parts(file.idx2item, file.counts)
    }
}
