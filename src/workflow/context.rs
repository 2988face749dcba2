//! Per-command context: data paths, config, and backends.
use crate::config::{self, Config};
use crate::generator::lm_log::LmLog;
use crate::generator::{build_generator, Generator, UnavailableGenerator};
use crate::inference::PredictionEntry;
use crate::paths::DataPaths;
use crate::record::ReviewEvent;
use crate::store::{JsonArrayFile, JsonRecordStore};
use anyhow::Result;
use std::path::Path;

pub struct AppContext {
    pub paths: DataPaths,
    pub config: Config,
}

impl AppContext {
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        let paths = DataPaths::new(config::resolve_data_dir(data_dir));
        let config = config::load_config(&paths)?;
        tracing::debug!(data_dir = %paths.root().display(), "workflow context loaded");
        Ok(Self { paths, config })
    }

    /// Generator for commands whose whole purpose is generation.
    pub fn require_generator(&self, flag: Option<&str>) -> Result<Box<dyn Generator>> {
        let backend = config::resolve_generator(flag, &self.config)?;
        build_generator(&backend)
    }

    /// Generator for commands that can still produce a result without one.
    pub fn generator(&self, flag: Option<&str>) -> Box<dyn Generator> {
        match self.require_generator(flag) {
            Ok(generator) => generator,
            Err(err) => {
                tracing::debug!(error = %err, "generator unavailable");
                Box::new(UnavailableGenerator::new(format!("{err:#}")))
            }
        }
    }

    pub fn lm_log(&self) -> LmLog {
        LmLog::new(self.paths.lm_log_path())
    }

    pub fn record_store(&self) -> JsonRecordStore {
        JsonRecordStore::new(self.paths.recommendations_path())
    }

    pub fn reviews(&self) -> JsonArrayFile<ReviewEvent> {
        JsonArrayFile::new(self.paths.reviews_path())
    }

    pub fn prediction_log(&self) -> JsonArrayFile<PredictionEntry> {
        JsonArrayFile::new(self.paths.prediction_log_path())
    }
}
