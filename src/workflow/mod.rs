//! Review workflow orchestration.
//!
//! `engine` holds the operations; the remaining modules are the CLI steps that
//! load context, call one operation, and print the result.
mod ask;
mod context;
mod engine;
mod generate;
mod listing;
mod predict;
mod review;
mod summary;

pub use ask::run_ask;
pub use context::AppContext;
pub use generate::run_generate;
pub use listing::{run_list, run_pending};
pub use predict::{run_models, run_predict};
pub use review::{run_review, run_revise};
pub use summary::run_summarize;

use crate::generator::{GenerationClient, Generator};
use crate::store::JsonRecordStore;
use anyhow::Result;
use engine::Workflow;

/// Build a workflow over the on-disk stores and hand it to `step`.
fn with_workflow<T>(
    ctx: &AppContext,
    generator: &dyn Generator,
    step: impl FnOnce(&Workflow<'_, JsonRecordStore>) -> Result<T>,
) -> Result<T> {
    let log = ctx.lm_log();
    let client = GenerationClient::new(generator, Some(&log));
    let workflow = Workflow::new(ctx.record_store(), ctx.reviews(), client);
    step(&workflow)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{text}");
    Ok(())
}
