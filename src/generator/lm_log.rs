//! Generation call log.
//!
//! Every generator call is appended to `lm_log.jsonl` as newline-delimited
//! JSON so reviewers can see why a plan came back degraded:
//!
//! ```jsonl
//! {"schema_version":1,"ts":1762855200000,"kind":"recommendation","duration_ms":4200,"outcome":"success",...}
//! {"schema_version":1,"ts":1762855260000,"kind":"summary","duration_ms":3100,"outcome":"degraded",...}
//! ```
use super::PromptKind;
use crate::util::{now_epoch_ms, truncate_string};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Current schema version for lm_log.jsonl entries.
pub const LM_LOG_SCHEMA_VERSION: u32 = 1;

const PROMPT_PREVIEW_BYTES: usize = 500;

/// Outcome of a generator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LmOutcome {
    /// Response parsed into the expected shape.
    Success,
    /// Response arrived but did not parse; stored as a fallback.
    Degraded,
    /// Backend error, no response.
    Failed,
}

/// A single generator call log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LmLogEntry {
    pub schema_version: u32,

    /// Unix timestamp in milliseconds when the call started.
    pub ts: u64,

    pub kind: PromptKind,

    pub duration_ms: u64,

    pub outcome: LmOutcome,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_bytes: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// First ~500 bytes of the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_preview: Option<String>,
}

/// Builder for log entries; captures the start time on creation.
pub struct LmLogBuilder {
    ts: u64,
    start: Instant,
    kind: PromptKind,
    prompt_preview: Option<String>,
}

impl LmLogBuilder {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            ts: now_epoch_ms(),
            start: Instant::now(),
            kind,
            prompt_preview: None,
        }
    }

    pub fn with_prompt_preview(mut self, prompt: &str) -> Self {
        let preview = if prompt.len() > PROMPT_PREVIEW_BYTES {
            format!("{}...", truncate_string(prompt, PROMPT_PREVIEW_BYTES))
        } else {
            prompt.to_string()
        };
        self.prompt_preview = Some(preview);
        self
    }

    pub fn success(self, response_bytes: usize) -> LmLogEntry {
        self.build(LmOutcome::Success, Some(response_bytes), None)
    }

    pub fn degraded(self, response_bytes: usize, error: impl Into<String>) -> LmLogEntry {
        self.build(LmOutcome::Degraded, Some(response_bytes), Some(error.into()))
    }

    pub fn failed(self, error: impl Into<String>) -> LmLogEntry {
        self.build(LmOutcome::Failed, None, Some(error.into()))
    }

    fn build(
        self,
        outcome: LmOutcome,
        response_bytes: Option<usize>,
        error: Option<String>,
    ) -> LmLogEntry {
        LmLogEntry {
            schema_version: LM_LOG_SCHEMA_VERSION,
            ts: self.ts,
            kind: self.kind,
            duration_ms: u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX),
            outcome,
            response_bytes,
            error,
            prompt_preview: self.prompt_preview,
        }
    }
}

/// Append-only JSONL log file.
#[derive(Debug, Clone)]
pub struct LmLog {
    path: PathBuf,
}

impl LmLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append(&self, entry: &LmLogEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        let line = serde_json::to_string(entry).context("serialize lm log entry")?;
        writeln!(file, "{line}").with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    /// Read all entries, skipping lines that do not parse.
    #[cfg(test)]
    pub fn read_entries(&self) -> Result<Vec<LmLogEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let mut entries = Vec::new();
        for line in text.lines().filter(|line| !line.trim().is_empty()) {
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => tracing::debug!(error = %err, "skipping unparseable lm log line"),
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_prompts_are_previewed() {
        let prompt = "x".repeat(PROMPT_PREVIEW_BYTES * 2);
        let entry = LmLogBuilder::new(PromptKind::Summary)
            .with_prompt_preview(&prompt)
            .failed("timeout");
        let preview = entry.prompt_preview.expect("preview");
        assert_eq!(preview.len(), PROMPT_PREVIEW_BYTES + 3);
        assert_eq!(entry.outcome, LmOutcome::Failed);
        assert_eq!(entry.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn outcomes_are_written_as_snake_case() {
        let entry = LmLogBuilder::new(PromptKind::Revision).degraded(40, "bad json");
        let line = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(line["outcome"], "degraded");
        assert_eq!(line["kind"], "revision");
    }

    #[test]
    fn entries_round_trip_through_jsonl() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = LmLog::new(dir.path().join("lm_log.jsonl"));
        assert!(log.read_entries().expect("read empty").is_empty());
        log.append(&LmLogBuilder::new(PromptKind::Question).success(12))
            .expect("append");
        std::fs::OpenOptions::new()
            .append(true)
            .open(dir.path().join("lm_log.jsonl"))
            .and_then(|mut f| writeln!(f, "garbage"))
            .expect("append garbage");
        let entries = log.read_entries().expect("read");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, PromptKind::Question);
        assert_eq!(entries[0].response_bytes, Some(12));
    }
}
