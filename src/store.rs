//! JSON-array persistence for records, reviews, and prediction logs.
//!
//! Every collection is read in full and written in full. Writes go through a
//! temp file in the target directory and an atomic rename, so readers never
//! observe a half-written document.
use crate::error::WorkflowError;
use crate::record::RecommendationRecord;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A JSON array document on disk.
///
/// Missing files read as empty. Unparseable files also read as empty, but are
/// reported at error level since the next save will overwrite them.
#[derive(Debug, Clone)]
pub struct JsonArrayFile<T> {
    path: PathBuf,
    _item: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> JsonArrayFile<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _item: PhantomData,
        }
    }

    pub fn load(&self) -> Vec<T> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %err,
                    "unreadable store; treating as empty"
                );
                return Vec::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(err) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %err,
                    "corrupt store; treating as empty, next save will overwrite it"
                );
                Vec::new()
            }
        }
    }

    pub fn save(&self, items: &[T]) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        let text = serde_json::to_string_pretty(items).context("serialize store")?;
        let mut staged = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("stage write in {}", parent.display()))?;
        staged
            .write_all(text.as_bytes())
            .with_context(|| format!("write {}", staged.path().display()))?;
        if let Ok(existing) = fs::metadata(&self.path) {
            staged
                .as_file()
                .set_permissions(existing.permissions())
                .with_context(|| format!("copy permissions of {}", self.path.display()))?;
        }
        staged
            .persist(&self.path)
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }

    /// Append one item by rewriting the whole document.
    pub fn append(&self, item: T) -> Result<()> {
        let mut items = self.load();
        items.push(item);
        self.save(&items)
    }
}

/// Storage seam for recommendation records.
///
/// `load`/`save` work on the whole collection. `commit` replaces a single record
/// only if nobody else bumped its version since the caller read it.
pub trait RecordStore {
    fn load(&self) -> Vec<RecommendationRecord>;

    fn save(&self, records: &[RecommendationRecord]) -> Result<()>;

    fn commit(
        &self,
        updated: &RecommendationRecord,
        observed_version: u32,
    ) -> Result<(), WorkflowError> {
        let mut records = self.load();
        let slot = records
            .iter_mut()
            .find(|record| record.id == updated.id)
            .ok_or_else(|| WorkflowError::RecordNotFound(updated.id.clone()))?;
        if slot.version != observed_version {
            return Err(WorkflowError::Conflict {
                id: updated.id.clone(),
                expected: observed_version,
                found: slot.version,
            });
        }
        *slot = updated.clone();
        self.save(&records)?;
        Ok(())
    }
}

/// Record store backed by `recommendation_output.json`.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    file: JsonArrayFile<RecommendationRecord>,
}

impl JsonRecordStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: JsonArrayFile::new(path),
        }
    }
}

impl RecordStore for JsonRecordStore {
    fn load(&self) -> Vec<RecommendationRecord> {
        self.file.load()
    }

    fn save(&self, records: &[RecommendationRecord]) -> Result<()> {
        self.file.save(records)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::RecordStore;
    use crate::record::RecommendationRecord;
    use anyhow::Result;
    use std::cell::RefCell;

    /// In-memory record store for orchestrator tests.
    #[derive(Debug, Default)]
    pub struct MemoryStore {
        records: RefCell<Vec<RecommendationRecord>>,
        pub saves: RefCell<usize>,
    }

    impl MemoryStore {
        pub fn with_records(records: Vec<RecommendationRecord>) -> Self {
            Self {
                records: RefCell::new(records),
                saves: RefCell::new(0),
            }
        }
    }

    impl RecordStore for MemoryStore {
        fn load(&self) -> Vec<RecommendationRecord> {
            self.records.borrow().clone()
        }

        fn save(&self, records: &[RecommendationRecord]) -> Result<()> {
            *self.records.borrow_mut() = records.to_vec();
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{
        GeneratedPlan, InferenceSnapshot, ModelKind, PlanAction, Recommendations, ReviewAction,
        Role,
    };
    use crate::transition::apply_review;
    use serde_json::{json, Map};

    fn sample(id: &str) -> RecommendationRecord {
        let mut probabilities = Map::new();
        probabilities.insert("Rough".to_string(), json!(0.6));
        probabilities.insert("Calm".to_string(), json!(0.4));
        RecommendationRecord::new(
            id.to_string(),
            InferenceSnapshot {
                timestamp: Some("2025-11-11 10:00:00".to_string()),
                model: ModelKind::Vessel,
                prediction: json!("Rough"),
                probabilities,
                sorted_labels: vec!["Rough".to_string(), "Calm".to_string()],
                inputs: Map::new(),
            },
            GeneratedPlan::Structured(Recommendations {
                primary: vec![PlanAction {
                    action: "Hold departure".to_string(),
                    justification: "sea state".to_string(),
                    expected_impact: "avoid damage".to_string(),
                }],
                alternative: Vec::new(),
                mitigation: Vec::new(),
            }),
        )
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonRecordStore::new(dir.path().join("nope.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("recs.json");
        fs::write(&path, b"{not json").expect("write corrupt");
        let store = JsonRecordStore::new(path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn odd_plan_shapes_do_not_hide_other_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("recs.json");
        let mut legacy = serde_json::to_value(sample("LEGACY")).expect("serialize");
        legacy["recommendations"] = json!({"error": "Failed to call Gemini: quota"});
        let mut freeform = serde_json::to_value(sample("FREEFORM")).expect("serialize");
        freeform["recommendations"] = json!({"notes": "hold all trucks"});
        let good = serde_json::to_value(sample("GOOD")).expect("serialize");
        let document = json!([good, legacy, freeform]);
        fs::write(&path, document.to_string()).expect("write mixed document");

        let store = JsonRecordStore::new(path.clone());
        let records = store.load();
        let ids: Vec<&str> = records.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["GOOD", "LEGACY", "FREEFORM"]);
        assert_eq!(
            records[1].recommendations,
            GeneratedPlan::degraded("Failed to call Gemini: quota", "")
        );

        store.save(&records).expect("save");
        let reread: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(reread[0]["recommendations"], document[0]["recommendations"]);
        assert_eq!(reread[2]["recommendations"], json!({"notes": "hold all trucks"}));
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonRecordStore::new(dir.path().join("nested/recs.json"));
        let reviewed = apply_review(
            &sample("b"),
            Role::MinePlanner,
            ReviewAction::Approve,
            "ok",
            "2025-11-12T00:00:00+00:00",
        );
        let records = vec![sample("c"), reviewed, sample("a")];
        store.save(&records).expect("save");
        assert_eq!(store.load(), records);
    }

    #[test]
    fn commit_replaces_matching_version() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonRecordStore::new(dir.path().join("recs.json"));
        store.save(&[sample("a"), sample("b")]).expect("save");
        let updated = apply_review(&sample("b"), Role::MinePlanner, ReviewAction::Approve, "", "t");
        store.commit(&updated, 1).expect("commit");
        let loaded = store.load();
        assert_eq!(loaded[0], sample("a"));
        assert_eq!(loaded[1].version, 2);
    }

    #[test]
    fn commit_rejects_stale_version() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonRecordStore::new(dir.path().join("recs.json"));
        let bumped = apply_review(&sample("a"), Role::MinePlanner, ReviewAction::Approve, "", "t");
        store.save(&[bumped]).expect("save");

        let stale = apply_review(&sample("a"), Role::MinePlanner, ReviewAction::Reject, "", "t");
        let err = store.commit(&stale, 1).expect_err("stale commit");
        assert!(matches!(
            err,
            WorkflowError::Conflict {
                expected: 1,
                found: 2,
                ..
            }
        ));
        assert_eq!(store.load()[0].version, 2);
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_existing_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("recs.json");
        let store = JsonRecordStore::new(path.clone());
        store.save(&[sample("a")]).expect("first save");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");
        store.save(&[sample("a"), sample("b")]).expect("second save");
        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        assert_eq!(store.load().len(), 2);
    }

    #[test]
    fn append_extends_array_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file: JsonArrayFile<serde_json::Value> =
            JsonArrayFile::new(dir.path().join("reviews.json"));
        file.append(json!({"n": 1})).expect("append");
        file.append(json!({"n": 2})).expect("append");
        assert_eq!(file.load(), vec![json!({"n": 1}), json!({"n": 2})]);
    }
}
