//! Approval summary emails.
use super::{print_json, with_workflow, AppContext};
use crate::cli::SummarizeArgs;
use crate::record::RecommendationRecord;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub subject: String,
    pub body: String,
}

/// Summary built from the record alone, used when generation fails.
pub fn fallback_summary(record: &RecommendationRecord) -> Summary {
    let timestamp = record.timestamp.as_deref().unwrap_or("unknown");
    let actions = record
        .recommendations
        .primary()
        .iter()
        .map(|item| format!("- {}", item.action))
        .collect::<Vec<_>>()
        .join("\n");
    let body = format!(
        "Plan summary for model {model}:\n\n\
         Primary recommendations:\n{actions}\n\n\
         Status: {status}\n\n\
         Please check the system for details and record your approval.\n",
        model = record.model,
        status = record.status,
    );
    Summary {
        subject: format!("Summary Plan - {} - {}", record.model, timestamp),
        body,
    }
}

impl Summary {
    /// Plain-text rendering for terminals.
    pub fn render(&self) -> String {
        format!("Subject: {}\n\n{}", self.subject, self.body.trim_end())
    }
}

pub fn run_summarize(ctx: &AppContext, args: SummarizeArgs) -> Result<()> {
    let generator = ctx.generator(args.lm.as_deref());
    let summary = with_workflow(ctx, generator.as_ref(), |workflow| {
        Ok(workflow.summarize(&args.id)?)
    })?;
    if args.json {
        return print_json(&summary);
    }
    println!("{}", summary.render());
    Ok(())
}
