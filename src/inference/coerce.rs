//! Raw input coercion.
//!
//! Upstream inputs arrive as loosely typed JSON (form fields, CSV cells). Every
//! value is folded into either a canonical category label or a float before it
//! reaches a model. Nothing here fails; bad values fall back and are logged.
use super::catalog::{categories, ModelSpec};
use serde_json::{Map, Number, Value};

const NULL_LIKE: [&str; 5] = ["", "None", "none", "NaN", "nan"];

/// Coerce every feature of `spec` from `raw`, in model feature order.
///
/// Missing features are treated as the integer `0`.
pub fn coerce_inputs(spec: &ModelSpec, raw: &Map<String, Value>) -> Vec<Value> {
    let missing = Value::from(0);
    spec.features
        .iter()
        .map(|feature| coerce_input(feature, raw.get(*feature).unwrap_or(&missing)))
        .collect()
}

/// Coerce one value for `feature`.
pub fn coerce_input(feature: &str, value: &Value) -> Value {
    if is_null_like(value) {
        return float(0.0);
    }
    if let Some(vocabulary) = categories(feature) {
        return Value::String(canonical_category(vocabulary, &category_text(value)));
    }
    match as_float(value) {
        Some(number) => float(number),
        None => {
            tracing::debug!(feature, value = %value, "non-numeric input; using 0.0");
            float(0.0)
        }
    }
}

fn is_null_like(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => NULL_LIKE.contains(&text.as_str()),
        _ => false,
    }
}

fn category_text(value: &Value) -> String {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    };
    text.trim().to_lowercase()
}

fn canonical_category(vocabulary: &[&str], lowered: &str) -> String {
    if let Some(known) = vocabulary
        .iter()
        .find(|label| label.to_lowercase() == lowered)
    {
        return (*known).to_string();
    }
    capitalize(lowered)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn float(number: f64) -> Value {
    Number::from_f64(number)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0.0))
}
