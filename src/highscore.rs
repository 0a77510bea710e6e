//! Best-score persistence.
//!
//! The only thing this game ever persists is a single scalar: the best
//! floored score seen on this machine. It is read once at startup to seed
//! the session and rewritten each time a new best is set.

use crate::app_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// On-disk document. A named key keeps the file self-describing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct BestScoreFile {
    best_score: u64,
}

pub trait BestScoreStore: fmt::Debug {
    /// Read the stored best score; absent or unreadable stores read as 0.
    fn load(&self) -> u64;
    fn save(&mut self, best: u64) -> io::Result<()>;
}

/// JSON file under the user state directory.
#[derive(Debug, Clone)]
pub struct FileBestScoreStore {
    path: PathBuf,
}

impl FileBestScoreStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::best_score_path()
            .unwrap_or_else(|| PathBuf::from("plop_best_score.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileBestScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BestScoreStore for FileBestScoreStore {
    fn load(&self) -> u64 {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(doc) = serde_json::from_slice::<BestScoreFile>(&bytes) {
                return doc.best_score;
            }
        }
        0
    }

    fn save(&mut self, best: u64) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let doc = BestScoreFile { best_score: best };
        let data = serde_json::to_vec_pretty(&doc).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// In-memory store for tests and headless runs. Counts writes so tests can
/// assert when persistence actually happens.
#[derive(Debug, Clone, Default)]
pub struct MemoryBestScoreStore {
    best: u64,
    pub saves: usize,
}

impl MemoryBestScoreStore {
    pub fn new(initial: u64) -> Self {
        Self {
            best: initial,
            saves: 0,
        }
    }
}

impl BestScoreStore for MemoryBestScoreStore {
    fn load(&self) -> u64 {
        self.best
    }

    fn save(&mut self, best: u64) -> io::Result<()> {
        self.best = best;
        self.saves += 1;
        Ok(())
    }
}
