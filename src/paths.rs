//! Typed paths into the data directory.
//!
//! Centralizing path construction keeps file access consistent across
//! commands and prevents drift when the layout evolves.
use std::path::{Path, PathBuf};

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "SaveJson";

/// Convenience wrapper for locating workflow artifacts.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `config.json` path.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Return the `recommendation_output.json` path.
    pub fn recommendations_path(&self) -> PathBuf {
        self.root.join("recommendation_output.json")
    }

    /// Return the `reviews.json` path.
    pub fn reviews_path(&self) -> PathBuf {
        self.root.join("reviews.json")
    }

    /// Return the `prediction_log.json` path.
    pub fn prediction_log_path(&self) -> PathBuf {
        self.root.join("prediction_log.json")
    }

    /// Return the `lm_log.jsonl` path.
    pub fn lm_log_path(&self) -> PathBuf {
        self.root.join("lm_log.jsonl")
    }
}
