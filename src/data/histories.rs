//! Raw per-user item histories

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Ordered item histories, one per user
///
/// Text form: one user per line, item identifiers separated by whitespace.
/// Blank lines are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserHistories {
    users: Vec<Vec<String>>,
}

impl UserHistories {
    /// Wrap already-split histories
    pub fn new(users: Vec<Vec<String>>) -> Self {
        Self { users }
    }

    /// Read from a text file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("reading user histories {}: {e}", path.display())))?;
        let histories: Self = text.parse()?;
        tracing::debug!(path = %path.display(), users = histories.len(), "loaded user histories");
        Ok(histories)
    }

    /// Number of users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether there are no users
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Iterate over users
    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.users.iter().map(Vec::as_slice)
    }

    /// Every item occurrence across all users, in order
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.users.iter().flatten().map(String::as_str)
    }
}

impl FromStr for UserHistories {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let users = s
            .lines()
            .map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|user| !user.is_empty())
            .collect();
        Ok(Self { users })
    }
}
