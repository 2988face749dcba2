//! Prediction steps.
use super::{print_json, AppContext};
use crate::cli::PredictArgs;
use crate::config;
use crate::inference::{self, catalog, CommandPredictor};
use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};

pub fn run_predict(ctx: &AppContext, args: PredictArgs) -> Result<()> {
    let spec = catalog::lookup(&args.model)?;
    let inputs = match args.inputs.as_deref() {
        Some(raw) => parse_inputs(raw)?,
        None => catalog::sample_inputs(spec.kind),
    };
    let command = config::resolve_predictor(args.predictor.as_deref(), &ctx.config)?;
    let predictor = CommandPredictor::new(&command)?;
    let entry = inference::predict(&predictor, &ctx.prediction_log(), &args.model, inputs)?;
    print_json(&entry)?;
    eprintln!("appended to {}", ctx.paths.prediction_log_path().display());
    Ok(())
}

pub fn run_models() -> Result<()> {
    for spec in &catalog::MODELS {
        println!("{}  {}", spec.kind, spec.file);
        for feature in spec.features {
            match catalog::categories(feature) {
                Some(values) => println!("  {feature}  [{}]", values.join(", ")),
                None => println!("  {feature}"),
            }
        }
    }
    Ok(())
}

fn parse_inputs(raw: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw).context("parse --inputs JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!("--inputs must be a JSON object, got {other}")),
    }
}
