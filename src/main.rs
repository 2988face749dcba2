//! planrev: two-stage human review of generated operational plans.
//!
//! Predictions from the model catalog become recommendation records, which
//! move through mine-planner and shipping-planner review, with rejected plans
//! regenerated from reviewer feedback. All state lives in JSON files under the
//! data directory.
mod cli;
mod config;
mod error;
mod generator;
mod inference;
mod paths;
mod record;
mod store;
mod transition;
mod util;
mod workflow;

use anyhow::Result;
use clap::Parser;
use cli::{Command, RootArgs};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use workflow::AppContext;

fn main() -> Result<()> {
    init_tracing();
    let args = RootArgs::parse();

    if let Command::Models = args.command {
        return workflow::run_models();
    }
    let ctx = AppContext::load(args.data_dir.as_deref())?;
    match args.command {
        Command::Predict(args) => workflow::run_predict(&ctx, args),
        Command::Models => workflow::run_models(),
        Command::Generate(args) => workflow::run_generate(&ctx, args),
        Command::List(args) => workflow::run_list(&ctx, args),
        Command::Pending(args) => workflow::run_pending(&ctx, args),
        Command::Review(args) => workflow::run_review(&ctx, args),
        Command::Revise(args) => workflow::run_revise(&ctx, args),
        Command::Summarize(args) => workflow::run_summarize(&ctx, args),
        Command::Ask(args) => workflow::run_ask(&ctx, args),
    }
}

/// Log to stderr so stdout stays machine-readable; `RUST_LOG` overrides.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planrev=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
