use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::*;

/// Append-only store of finished games.
pub trait ResultStore: Send + Sync {
    fn append(&self, result: &GameResult) -> Result<()>;

    /// Every stored result, most recent first.
    fn list_all(&self) -> Result<Vec<GameResult>>;
}

/// Newest first by timestamp; among equal timestamps the later append wins.
fn most_recent_first(mut results: Vec<GameResult>) -> Vec<GameResult> {
    results.reverse();
    results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    results
}

/// Keeps one JSON object per line in a file that is only ever appended to.
#[derive(Clone, Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultStore for JsonLinesStore {
    fn append(&self, result: &GameResult) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut line = serde_json::to_string(result)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        log::debug!("Appended result to {}", self.path.display());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<GameResult>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut results = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            results.push(serde_json::from_str(&line)?);
        }
        Ok(most_recent_first(results))
    }
}

/// Keeps results in memory only.
#[derive(Debug, Default)]
pub struct MemoryStore {
    results: Mutex<Vec<GameResult>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryStore {
    fn append(&self, result: &GameResult) -> Result<()> {
        self.results.lock().push(result.clone());
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<GameResult>> {
        Ok(most_recent_first(self.results.lock().clone()))
    }
}
