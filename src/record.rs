//! Recommendation records and the review vocabulary.
//!
//! A record is created once per inference event and then only moves through
//! the transition engine; the inference snapshot fields are never rewritten.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Reviewer pair every record is assigned, in pipeline order.
pub const ASSIGNED_REVIEWERS: [Role; 2] = [Role::MinePlanner, Role::ShippingPlanner];

/// Version stamped on freshly generated records.
pub const INITIAL_VERSION: u32 = 1;

/// Inference models known to the catalog.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Weather,
    Road,
    Equipment,
    Vessel,
    Logistics,
    Production,
}

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        ModelKind::Weather,
        ModelKind::Road,
        ModelKind::Equipment,
        ModelKind::Vessel,
        ModelKind::Logistics,
        ModelKind::Production,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Weather => "weather",
            ModelKind::Road => "road",
            ModelKind::Equipment => "equipment",
            ModelKind::Vessel => "vessel",
            ModelKind::Logistics => "logistics",
            ModelKind::Production => "production",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow state of a record.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    PendingReviewMinePlanner,
    PendingReviewShippingPlanner,
    AwaitingRevisionAi,
    FinalApproved,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::PendingReviewMinePlanner,
        Status::PendingReviewShippingPlanner,
        Status::AwaitingRevisionAi,
        Status::FinalApproved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::PendingReviewMinePlanner => "pending_review_mine_planner",
            Status::PendingReviewShippingPlanner => "pending_review_shipping_planner",
            Status::AwaitingRevisionAi => "awaiting_revision_ai",
            Status::FinalApproved => "final_approved",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::FinalApproved)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two reviewer categories.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Role {
    MinePlanner,
    ShippingPlanner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::MinePlanner => "mine_planner",
            Role::ShippingPlanner => "shipping_planner",
        }
    }

    /// Parse a role name; anything other than the two known roles is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "mine_planner" => Some(Role::MinePlanner),
            "shipping_planner" => Some(Role::ShippingPlanner),
            _ => None,
        }
    }

    /// Status a record sits in while waiting for this role.
    pub fn pending_status(&self) -> Status {
        match self {
            Role::MinePlanner => Status::PendingReviewMinePlanner,
            Role::ShippingPlanner => Status::PendingReviewShippingPlanner,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewer decision.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
    RequestChanges,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
            ReviewAction::RequestChanges => "request_changes",
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single proposed action inside a plan.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PlanAction {
    pub action: String,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub expected_impact: String,
}

/// Well-formed generator output.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Recommendations {
    pub primary: Vec<PlanAction>,
    pub alternative: Vec<PlanAction>,
    pub mitigation: Vec<PlanAction>,
}

/// Generator output as stored on a record.
///
/// On disk the degraded variant keeps the `{error, raw}` object shape; in memory
/// callers match on the variant instead of probing for an `error` key. Any other
/// shape is kept verbatim in `Unrecognized` so one odd record never makes the
/// whole store unreadable.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum GeneratedPlan {
    Structured(Recommendations),
    Degraded {
        error: String,
        #[serde(default)]
        raw: String,
    },
    Unrecognized(Value),
}

impl GeneratedPlan {
    pub fn degraded(error: impl Into<String>, raw: impl Into<String>) -> Self {
        GeneratedPlan::Degraded {
            error: error.into(),
            raw: raw.into(),
        }
    }

    /// True for anything other than a well-formed plan.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, GeneratedPlan::Structured(_))
    }

    /// Primary actions, empty unless the plan is well-formed.
    pub fn primary(&self) -> &[PlanAction] {
        match self {
            GeneratedPlan::Structured(recs) => &recs.primary,
            GeneratedPlan::Degraded { .. } | GeneratedPlan::Unrecognized(_) => &[],
        }
    }
}

/// Entry appended to a record's review history on every review transition.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReviewEntry {
    pub role: Role,
    pub action: ReviewAction,
    pub comments: String,
    pub timestamp: String,
}

/// Inference snapshot copied onto a record at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceSnapshot {
    pub timestamp: Option<String>,
    pub model: ModelKind,
    pub prediction: Value,
    pub probabilities: Map<String, Value>,
    pub sorted_labels: Vec<String>,
    pub inputs: Map<String, Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RecommendationRecord {
    pub id: String,
    pub timestamp: Option<String>,
    pub model: ModelKind,
    pub prediction: Value,
    #[serde(default)]
    pub probabilities: Map<String, Value>,
    #[serde(default)]
    pub sorted_labels: Vec<String>,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    pub recommendations: GeneratedPlan,
    pub status: Status,
    pub assigned_reviewers: [Role; 2],
    pub version: u32,
    #[serde(default)]
    pub review_history: Vec<ReviewEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl RecommendationRecord {
    /// Build a fresh record at the start of the review pipeline.
    pub fn new(id: String, snapshot: InferenceSnapshot, recommendations: GeneratedPlan) -> Self {
        Self::with_reviewers(id, snapshot, recommendations, ASSIGNED_REVIEWERS)
    }

    /// Build a record with an explicit reviewer assignment.
    ///
    /// Only the fixed mine/shipping pair is supported; anything else is a bug in
    /// the caller.
    pub fn with_reviewers(
        id: String,
        snapshot: InferenceSnapshot,
        recommendations: GeneratedPlan,
        assigned_reviewers: [Role; 2],
    ) -> Self {
        assert_eq!(
            assigned_reviewers, ASSIGNED_REVIEWERS,
            "records must be assigned [mine_planner, shipping_planner]"
        );
        Self {
            id,
            timestamp: snapshot.timestamp,
            model: snapshot.model,
            prediction: snapshot.prediction,
            probabilities: snapshot.probabilities,
            sorted_labels: snapshot.sorted_labels,
            inputs: snapshot.inputs,
            recommendations,
            status: Status::PendingReviewMinePlanner,
            assigned_reviewers,
            version: INITIAL_VERSION,
            review_history: Vec::new(),
            last_updated: None,
        }
    }

    /// Highest class probability, if any probabilities were recorded.
    pub fn top_confidence(&self) -> Option<f64> {
        self.probabilities
            .values()
            .filter_map(Value::as_f64)
            .fold(None, |best, score| match best {
                Some(current) if current >= score => Some(current),
                _ => Some(score),
            })
    }
}

/// Audit entry for a submitted review, stored in its own ledger.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReviewEvent {
    pub id: String,
    pub recommendation_id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    pub action: ReviewAction,
    pub comments: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> InferenceSnapshot {
        InferenceSnapshot {
            timestamp: Some("2025-11-11 10:00:00".to_string()),
            model: ModelKind::Weather,
            prediction: json!("Storm"),
            probabilities: Map::new(),
            sorted_labels: Vec::new(),
            inputs: Map::new(),
        }
    }

    #[test]
    fn new_record_starts_pipeline_at_mine_planner() {
        let record = RecommendationRecord::new(
            "r1".to_string(),
            snapshot(),
            GeneratedPlan::degraded("x", "y"),
        );
        assert_eq!(record.status, Status::PendingReviewMinePlanner);
        assert_eq!(record.version, 1);
        assert!(record.review_history.is_empty());
        assert_eq!(record.assigned_reviewers, ASSIGNED_REVIEWERS);
    }

    #[test]
    #[should_panic(expected = "records must be assigned")]
    fn reversed_reviewer_pair_is_rejected() {
        RecommendationRecord::with_reviewers(
            "r1".to_string(),
            snapshot(),
            GeneratedPlan::degraded("x", "y"),
            [Role::ShippingPlanner, Role::MinePlanner],
        );
    }

    #[test]
    fn status_strings_match_wire_names() {
        for status in Status::ALL {
            let wire = serde_json::to_value(status).expect("serialize status");
            assert_eq!(wire, json!(status.as_str()));
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn generated_plan_reads_both_shapes() {
        let structured: GeneratedPlan = serde_json::from_value(json!({
            "primary": [{"action": "Delay hauling", "justification": "rain", "expected_impact": "safety"}],
            "alternative": [],
            "mitigation": []
        }))
        .expect("structured plan");
        assert!(!structured.is_degraded());
        assert_eq!(structured.primary()[0].action, "Delay hauling");

        let degraded: GeneratedPlan =
            serde_json::from_value(json!({"error": "bad json", "raw": "sorry"}))
                .expect("degraded plan");
        assert_eq!(degraded, GeneratedPlan::degraded("bad json", "sorry"));
        assert!(degraded.primary().is_empty());
    }

    #[test]
    fn backend_error_without_raw_text_reads_as_degraded() {
        let plan: GeneratedPlan =
            serde_json::from_value(json!({"error": "Failed to call Gemini: quota"}))
                .expect("error-only plan");
        assert_eq!(plan, GeneratedPlan::degraded("Failed to call Gemini: quota", ""));
    }

    #[test]
    fn unknown_plan_shapes_round_trip() {
        let raw = json!({"steps": ["stop crusher"], "confidence": "high"});
        let plan: GeneratedPlan = serde_json::from_value(raw.clone()).expect("any shape");
        assert_eq!(plan, GeneratedPlan::Unrecognized(raw.clone()));
        assert!(plan.is_degraded());
        assert!(plan.primary().is_empty());
        assert_eq!(serde_json::to_value(&plan).expect("serialize"), raw);

        let text: GeneratedPlan = serde_json::from_value(json!("plain text")).expect("string");
        assert!(matches!(text, GeneratedPlan::Unrecognized(Value::String(_))));
    }

    #[test]
    fn top_confidence_picks_highest_numeric_score() {
        let mut record = RecommendationRecord::new(
            "r1".to_string(),
            snapshot(),
            GeneratedPlan::degraded("x", "y"),
        );
        assert_eq!(record.top_confidence(), None);
        record.probabilities.insert("Clear".to_string(), json!(0.2));
        record.probabilities.insert("Storm".to_string(), json!(0.7));
        assert_eq!(record.top_confidence(), Some(0.7));
    }
}
