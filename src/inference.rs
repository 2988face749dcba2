//! Inference boundary.
//!
//! Models are scored by an external predictor command. This module resolves
//! the model, coerces raw inputs into the model's feature vector, calls the
//! predictor, and appends the outcome to the prediction log. Predictor
//! failures never abort: they are stored as an `"Error: ..."` prediction.
pub mod catalog;
pub mod coerce;

use crate::error::WorkflowError;
use crate::generator::lm_command::{resolve_command, run_with_stdin};
use crate::record::{InferenceSnapshot, ModelKind};
use crate::store::JsonArrayFile;
use crate::util::now_log_timestamp;
use anyhow::{Context, Result};
use catalog::ModelSpec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::path::PathBuf;

/// Predictor output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    pub prediction: Value,
    #[serde(default)]
    pub probabilities: Option<Map<String, Value>>,
}

/// External model scorer.
pub trait Predictor {
    fn predict(&self, spec: &ModelSpec, values: &[Value]) -> Result<Prediction>;
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    model: &'a str,
    model_file: &'a str,
    features: &'a [&'a str],
    values: &'a [Value],
}

/// Predictor that pipes a JSON request through a shell command.
#[derive(Debug, Clone)]
pub struct CommandPredictor {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandPredictor {
    pub fn new(command: &str) -> Result<Self> {
        let (program, args) = resolve_command(command)?;
        Ok(Self { program, args })
    }
}

impl Predictor for CommandPredictor {
    fn predict(&self, spec: &ModelSpec, values: &[Value]) -> Result<Prediction> {
        let request = PredictRequest {
            model: spec.kind.as_str(),
            model_file: spec.file,
            features: spec.features,
            values,
        };
        let input = serde_json::to_string(&request).context("serialize predict request")?;
        tracing::debug!(model = %spec.kind, program = %self.program.display(), "invoking predictor");
        let stdout = run_with_stdin(&self.program, &self.args, &input)?;
        serde_json::from_str(stdout.trim())
            .with_context(|| format!("parse predictor output for {}", spec.kind))
    }
}

/// One line of `prediction_log.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PredictionEntry {
    pub timestamp: String,
    pub model: String,
    pub prediction: Value,
    #[serde(default)]
    pub probabilities: Option<Map<String, Value>>,
    #[serde(default)]
    pub inputs: Map<String, Value>,
}

impl PredictionEntry {
    /// Snapshot for record generation; `None` if the model is not in the catalog.
    pub fn snapshot(&self) -> Option<InferenceSnapshot> {
        let model = ModelKind::parse(&self.model)?;
        let probabilities = self.probabilities.clone().unwrap_or_default();
        Some(InferenceSnapshot {
            timestamp: Some(self.timestamp.clone()),
            model,
            prediction: self.prediction.clone(),
            sorted_labels: sort_labels(&probabilities),
            probabilities,
            inputs: self.inputs.clone(),
        })
    }
}

/// Labels ordered by descending score. Ties keep their original order and
/// non-numeric scores sort last.
pub fn sort_labels(probabilities: &Map<String, Value>) -> Vec<String> {
    let mut scored: Vec<(&String, f64)> = probabilities
        .iter()
        .map(|(label, score)| (label, score.as_f64().unwrap_or(f64::NEG_INFINITY)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(label, _)| label.clone()).collect()
}

/// Score `raw_inputs` with `model_name` and append the result to `log`.
///
/// The log keeps the coerced feature vector the predictor saw, keyed by feature
/// in model order. Unknown input keys are dropped.
pub fn predict(
    predictor: &dyn Predictor,
    log: &JsonArrayFile<PredictionEntry>,
    model_name: &str,
    raw_inputs: Map<String, Value>,
) -> Result<PredictionEntry, WorkflowError> {
    let spec = catalog::lookup(model_name)?;
    let values = coerce::coerce_inputs(spec, &raw_inputs);
    let inputs: Map<String, Value> = spec
        .features
        .iter()
        .map(|feature| feature.to_string())
        .zip(values.iter().cloned())
        .collect();
    let (prediction, probabilities) = match predictor.predict(spec, &values) {
        Ok(result) => (result.prediction, result.probabilities),
        Err(err) => {
            let error = format!("{err:#}");
            tracing::warn!(model = %spec.kind, error = %error, "prediction failed");
            (Value::String(format!("Error: {error}")), None)
        }
    };
    let entry = PredictionEntry {
        timestamp: now_log_timestamp(),
        model: spec.kind.as_str().to_string(),
        prediction,
        probabilities,
        inputs,
    };
    log.append(entry.clone())?;
    tracing::info!(model = %spec.kind, prediction = %entry.prediction, "prediction logged");
    Ok(entry)
}
