//! CLI argument parsing for the review workflow.
//!
//! The CLI is a thin shell over the workflow engine: each subcommand maps to
//! one engine operation and one persisted change.
use crate::record::{ReviewAction, Role};
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "planrev",
    version,
    about = "Two-stage human review of generated operational plans",
    after_help = "Examples:\n  planrev predict --model weather --sample\n  planrev generate\n  planrev pending --role mine_planner\n  planrev review --id <ID> --role mine_planner --action approve\n  planrev review --id <ID> --role shipping_planner --action reject --comments \"no berth\"\n  planrev revise --id <ID> --comments \"no berth\"\n  planrev summarize --id <ID>",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Data directory holding the JSON stores (defaults to $PLANREV_DATA_DIR or ./SaveJson)
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Predict(PredictArgs),
    /// List known models and their feature order
    Models,
    Generate(GenerateArgs),
    List(ListArgs),
    Pending(PendingArgs),
    Review(ReviewArgs),
    Revise(ReviseArgs),
    Summarize(SummarizeArgs),
    Ask(AskArgs),
}

/// Score one input set and append it to the prediction log.
#[derive(Parser, Debug)]
#[command(
    about = "Run a model and append the result to the prediction log",
    group(ArgGroup::new("input").required(true).args(["inputs", "sample"]))
)]
pub struct PredictArgs {
    /// Model name (see `planrev models`)
    #[arg(long)]
    pub model: String,

    /// Raw inputs as a JSON object keyed by feature name
    #[arg(long, value_name = "JSON")]
    pub inputs: Option<String>,

    /// Use the model's built-in sample inputs
    #[arg(long)]
    pub sample: bool,

    /// Predictor command (overrides config and $PLANREV_PREDICT_COMMAND)
    #[arg(long, value_name = "CMD")]
    pub predictor: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Generate a recommendation for every logged prediction")]
pub struct GenerateArgs {
    /// Append to existing recommendations instead of replacing them
    #[arg(long)]
    pub append: bool,

    /// LM command (overrides config and environment)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "List recommendations")]
pub struct ListArgs {
    /// Only show records in this status
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "List recommendations waiting on a reviewer role")]
pub struct PendingArgs {
    /// Reviewer role (mine_planner or shipping_planner)
    #[arg(long)]
    pub role: String,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Record a reviewer decision")]
pub struct ReviewArgs {
    /// Recommendation id
    #[arg(long)]
    pub id: String,

    #[arg(long, value_enum)]
    pub role: Role,

    #[arg(long, value_enum)]
    pub action: ReviewAction,

    /// Name of the person reviewing
    #[arg(long)]
    pub reviewer: Option<String>,

    #[arg(long, default_value = "")]
    pub comments: String,
}

#[derive(Parser, Debug)]
#[command(about = "Regenerate a recommendation from reviewer feedback")]
pub struct ReviseArgs {
    /// Recommendation id
    #[arg(long)]
    pub id: String,

    /// Feedback passed to the generator
    #[arg(long)]
    pub comments: String,

    /// LM command (overrides config and environment)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Draft the approval summary email for a recommendation")]
pub struct SummarizeArgs {
    /// Recommendation id
    #[arg(long)]
    pub id: String,

    /// LM command (overrides config and environment)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Ask a question about the stored data")]
pub struct AskArgs {
    pub question: String,

    /// LM command (overrides config and environment)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,
}
