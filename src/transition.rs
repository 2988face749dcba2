//! Pure state transitions for recommendation records.
//!
//! The next status depends only on `(role, action)`. Any role may act on a
//! record in any status; the engine does not check that the acting role owns
//! the record's current stage.
use crate::record::{GeneratedPlan, RecommendationRecord, ReviewAction, ReviewEntry, Role, Status};

/// Status a record moves to after `role` takes `action`.
pub fn next_status(role: Role, action: ReviewAction) -> Status {
    match (role, action) {
        (Role::MinePlanner, ReviewAction::Approve) => Status::PendingReviewShippingPlanner,
        (Role::ShippingPlanner, ReviewAction::Approve) => Status::FinalApproved,
        (_, ReviewAction::Reject | ReviewAction::RequestChanges) => Status::AwaitingRevisionAi,
    }
}

/// Apply a review decision, returning the updated record.
///
/// Appends exactly one history entry and bumps the version by one.
pub fn apply_review(
    record: &RecommendationRecord,
    role: Role,
    action: ReviewAction,
    comments: &str,
    at: &str,
) -> RecommendationRecord {
    let mut next = record.clone();
    next.review_history.push(ReviewEntry {
        role,
        action,
        comments: comments.to_string(),
        timestamp: at.to_string(),
    });
    next.status = next_status(role, action);
    next.version = record.version + 1;
    next.last_updated = Some(at.to_string());
    next
}

/// Replace the plan with a regenerated one and restart the pipeline.
///
/// Revised plans always go back to the mine planner, whichever stage asked for
/// the revision.
pub fn apply_revision(
    record: &RecommendationRecord,
    plan: GeneratedPlan,
    at: &str,
) -> RecommendationRecord {
    let mut next = record.clone();
    next.recommendations = plan;
    next.status = Status::PendingReviewMinePlanner;
    next.version = record.version + 1;
    next.last_updated = Some(at.to_string());
    next
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;
