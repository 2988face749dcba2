//! Read-only listing steps.
use super::{print_json, with_workflow, AppContext};
use crate::cli::{ListArgs, PendingArgs};
use crate::generator::UnavailableGenerator;
use crate::record::{RecommendationRecord, Status};
use anyhow::{anyhow, Result};

pub fn run_list(ctx: &AppContext, args: ListArgs) -> Result<()> {
    let status = match args.status.as_deref() {
        Some(raw) => Some(Status::parse(raw).ok_or_else(|| {
            let known: Vec<&str> = Status::ALL.iter().map(Status::as_str).collect();
            anyhow!("unknown status '{raw}' (expected one of: {})", known.join(", "))
        })?),
        None => None,
    };
    let generator = UnavailableGenerator::new("listing does not generate");
    let records = with_workflow(ctx, &generator, |workflow| Ok(workflow.list(status)))?;
    print_records(&records, args.json)
}

pub fn run_pending(ctx: &AppContext, args: PendingArgs) -> Result<()> {
    let generator = UnavailableGenerator::new("listing does not generate");
    let records = with_workflow(ctx, &generator, |workflow| {
        Ok(workflow.list_pending(&args.role))
    })?;
    print_records(&records, args.json)
}

fn print_records(records: &[RecommendationRecord], json: bool) -> Result<()> {
    if json {
        return print_json(&records);
    }
    if records.is_empty() {
        eprintln!("no recommendations");
        return Ok(());
    }
    for record in records {
        println!("{}", record_line(record));
    }
    Ok(())
}

fn record_line(record: &RecommendationRecord) -> String {
    let prediction = match &record.prediction {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    let confidence = record
        .top_confidence()
        .map(|score| format!("{:.0}%", score * 100.0))
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{}  {}  v{}  {}  {} ({})",
        record.id, record.status, record.version, record.model, prediction, confidence
    );
    if record.recommendations.is_degraded() {
        line.push_str("  [degraded]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{GeneratedPlan, InferenceSnapshot, ModelKind};
    use serde_json::{json, Map};

    #[test]
    fn record_line_shows_state_and_confidence() {
        let mut probabilities = Map::new();
        probabilities.insert("Delayed".to_string(), json!(0.82));
        probabilities.insert("On Time".to_string(), json!(0.18));
        let record = RecommendationRecord::new(
            "R9".to_string(),
            InferenceSnapshot {
                timestamp: None,
                model: ModelKind::Logistics,
                prediction: json!("Delayed"),
                probabilities,
                sorted_labels: Vec::new(),
                inputs: Map::new(),
            },
            GeneratedPlan::degraded("timeout", ""),
        );
        assert_eq!(
            record_line(&record),
            "R9  pending_review_mine_planner  v1  logistics  Delayed (82%)  [degraded]"
        );
    }
}
