//! Review workflow engine.
//!
//! Owns the record store, the review ledger, and the generation client, and
//! exposes every operation the CLI drives. Record mutations go through
//! `RecordStore::commit` with the version observed at load time.
use super::summary::{fallback_summary, Summary};
use crate::error::WorkflowError;
use crate::generator::{self, GenerationClient, PromptKind};
use crate::inference::PredictionEntry;
use crate::record::{RecommendationRecord, ReviewAction, ReviewEvent, Role, Status};
use crate::store::{JsonArrayFile, RecordStore};
use crate::transition::{apply_review, apply_revision};
use crate::util::now_timestamp;
use uuid::Uuid;

pub struct Workflow<'a, S: RecordStore> {
    store: S,
    reviews: JsonArrayFile<ReviewEvent>,
    client: GenerationClient<'a>,
}

impl<'a, S: RecordStore> Workflow<'a, S> {
    pub fn new(
        store: S,
        reviews: JsonArrayFile<ReviewEvent>,
        client: GenerationClient<'a>,
    ) -> Self {
        Self {
            store,
            reviews,
            client,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build one fresh record per upstream prediction.
    ///
    /// Entries for models outside the catalog are skipped. Generator failures
    /// never abort the batch; they become degraded plans.
    pub fn generate_all(&self, entries: &[PredictionEntry]) -> Vec<RecommendationRecord> {
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(snapshot) = entry.snapshot() else {
                tracing::warn!(model = %entry.model, "skipping prediction for unknown model");
                continue;
            };
            let prompt = generator::recommendation_prompt(&snapshot);
            let plan = self.client.plan(PromptKind::Recommendation, &prompt);
            if plan.is_degraded() {
                tracing::warn!(model = %snapshot.model, "stored degraded recommendation");
            }
            records.push(RecommendationRecord::new(
                Uuid::new_v4().to_string(),
                snapshot,
                plan,
            ));
        }
        tracing::info!(
            entries = entries.len(),
            generated = records.len(),
            "generated recommendations"
        );
        records
    }

    /// Persist generated records, replacing the store or appending to it.
    pub fn store_generated(
        &self,
        records: &[RecommendationRecord],
        append: bool,
    ) -> anyhow::Result<()> {
        if append {
            let mut existing = self.store.load();
            existing.extend_from_slice(records);
            self.store.save(&existing)
        } else {
            self.store.save(records)
        }
    }

    /// Record a reviewer decision.
    ///
    /// The ledger entry is written first and unconditionally. The record
    /// transition only happens if `record_id` exists; a miss is not an error.
    pub fn submit_review(
        &self,
        record_id: &str,
        role: Role,
        action: ReviewAction,
        reviewer_name: Option<String>,
        comments: &str,
    ) -> Result<ReviewEvent, WorkflowError> {
        let event = ReviewEvent {
            id: Uuid::new_v4().to_string(),
            recommendation_id: record_id.to_string(),
            role,
            reviewer_name,
            action,
            comments: comments.to_string(),
            timestamp: now_timestamp(),
        };
        self.reviews.append(event.clone())?;

        let Some(record) = self.find(record_id) else {
            tracing::warn!(id = record_id, %role, %action, "review logged for unknown recommendation");
            return Ok(event);
        };
        let updated = apply_review(&record, role, action, comments, &event.timestamp);
        self.store.commit(&updated, record.version)?;
        tracing::info!(
            id = record_id,
            %role,
            %action,
            status = %updated.status,
            version = updated.version,
            "review applied"
        );
        Ok(event)
    }

    /// Regenerate a record's plan from reviewer feedback and restart review.
    pub fn request_ai_revision(
        &self,
        record_id: &str,
        comments: &str,
    ) -> Result<RecommendationRecord, WorkflowError> {
        let record = self
            .find(record_id)
            .ok_or_else(|| WorkflowError::RecordNotFound(record_id.to_string()))?;
        let prompt = generator::revision_prompt(&record.recommendations, comments);
        let plan = self.client.plan(PromptKind::Revision, &prompt);
        let updated = apply_revision(&record, plan, &now_timestamp());
        self.store.commit(&updated, record.version)?;
        tracing::info!(
            id = record_id,
            version = updated.version,
            degraded = updated.recommendations.is_degraded(),
            "revision stored"
        );
        Ok(updated)
    }

    /// All records, optionally restricted to one status.
    pub fn list(&self, status: Option<Status>) -> Vec<RecommendationRecord> {
        self.store
            .load()
            .into_iter()
            .filter(|record| match status {
                Some(status) => record.status == status,
                None => true,
            })
            .collect()
    }

    /// Records waiting on `role`. Unrecognized roles have nothing pending.
    pub fn list_pending(&self, role: &str) -> Vec<RecommendationRecord> {
        match Role::parse(role) {
            Some(role) => self.list(Some(role.pending_status())),
            None => Vec::new(),
        }
    }

    /// Approval email for a record, falling back to a local summary when the
    /// generator output is unusable.
    pub fn summarize(&self, record_id: &str) -> Result<Summary, WorkflowError> {
        let record = self
            .find(record_id)
            .ok_or_else(|| WorkflowError::RecordNotFound(record_id.to_string()))?;
        let prompt = generator::summary_prompt(&record);
        match self.client.structured::<Summary>(PromptKind::Summary, &prompt) {
            Ok(summary) => Ok(summary),
            Err(degraded) => {
                tracing::warn!(id = record_id, error = %degraded.error, "using fallback summary");
                Ok(fallback_summary(&record))
            }
        }
    }

    fn find(&self, record_id: &str) -> Option<RecommendationRecord> {
        self.store
            .load()
            .into_iter()
            .find(|record| record.id == record_id)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
