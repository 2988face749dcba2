//! Recommendation text generation.
//!
//! The generator itself is a black box that turns a prompt into raw text. This
//! module owns everything around it: prompt assembly, backend selection,
//! parsing raw text into typed output, and folding every failure into an
//! in-band [`Degraded`] value so callers always get something storable.
pub mod gemini;
pub mod lm_command;
pub mod lm_log;

use crate::config::GeneratorBackend;
use crate::record::{GeneratedPlan, InferenceSnapshot, RecommendationRecord, Recommendations};
use crate::util::truncate_string;
use anyhow::{anyhow, Result};
use lm_log::{LmLog, LmLogBuilder};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;

const RECOMMENDATION_PROMPT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/recommendation.md"
));
const REVISION_PROMPT: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/revision.md"));
const SUMMARY_PROMPT: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/summary.md"));
const QUESTION_PROMPT: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/prompts/question.md"));

/// Kinds of generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Recommendation,
    Revision,
    Summary,
    Question,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Recommendation => "recommendation",
            PromptKind::Revision => "revision",
            PromptKind::Summary => "summary",
            PromptKind::Question => "question",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External text generator: prompt in, raw text out.
pub trait Generator {
    fn generate(&self, kind: PromptKind, prompt: &str) -> Result<String>;
}

/// Instantiate the configured backend.
pub fn build_generator(backend: &GeneratorBackend) -> Result<Box<dyn Generator>> {
    match backend {
        GeneratorBackend::Command(command) => {
            Ok(Box::new(lm_command::CommandGenerator::new(command)?))
        }
        GeneratorBackend::Gemini { api_key, model } => Ok(Box::new(
            gemini::GeminiGenerator::new(api_key.clone(), model.clone()),
        )),
    }
}

/// Stand-in for commands that can run without a configured backend.
///
/// Every call fails with the resolution error, which callers fold into
/// degraded output like any other backend failure.
pub struct UnavailableGenerator {
    reason: String,
}

impl UnavailableGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Generator for UnavailableGenerator {
    fn generate(&self, _kind: PromptKind, _prompt: &str) -> Result<String> {
        Err(anyhow!("{}", self.reason))
    }
}

/// Generator output that could not be used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degraded {
    pub error: String,
    pub raw: String,
}

impl From<Degraded> for GeneratedPlan {
    fn from(degraded: Degraded) -> Self {
        GeneratedPlan::degraded(degraded.error, degraded.raw)
    }
}

/// Generator wrapper that times, logs, and parses every call.
pub struct GenerationClient<'a> {
    generator: &'a dyn Generator,
    log: Option<&'a LmLog>,
}

impl<'a> GenerationClient<'a> {
    pub fn new(generator: &'a dyn Generator, log: Option<&'a LmLog>) -> Self {
        Self { generator, log }
    }

    /// Generate and parse a recommendation plan, degrading on any failure.
    pub fn plan(&self, kind: PromptKind, prompt: &str) -> GeneratedPlan {
        match self.structured::<Recommendations>(kind, prompt) {
            Ok(recs) => GeneratedPlan::Structured(recs),
            Err(degraded) => degraded.into(),
        }
    }

    /// Generate and parse a JSON object of type `T`.
    pub fn structured<T: DeserializeOwned>(
        &self,
        kind: PromptKind,
        prompt: &str,
    ) -> Result<T, Degraded> {
        let builder = LmLogBuilder::new(kind).with_prompt_preview(prompt);
        let raw = match self.invoke(kind, prompt) {
            Ok(raw) => raw,
            Err(err) => {
                let error = format!("generation failed: {err:#}");
                tracing::warn!(%kind, error = %error, "generation failed; degrading");
                self.record(builder.failed(error.clone()));
                return Err(Degraded {
                    error,
                    raw: String::new(),
                });
            }
        };
        match parse_json::<T>(&raw) {
            Ok(value) => {
                self.record(builder.success(raw.len()));
                Ok(value)
            }
            Err(err) => {
                let error = format!("response was not valid {kind} JSON: {err}");
                tracing::warn!(%kind, error = %error, "malformed generator response; degrading");
                self.record(builder.degraded(raw.len(), error.clone()));
                Err(Degraded { error, raw })
            }
        }
    }

    /// Generate free-form text; failures propagate.
    pub fn text(&self, kind: PromptKind, prompt: &str) -> Result<String> {
        let builder = LmLogBuilder::new(kind).with_prompt_preview(prompt);
        match self.invoke(kind, prompt) {
            Ok(raw) => {
                self.record(builder.success(raw.len()));
                Ok(raw)
            }
            Err(err) => {
                self.record(builder.failed(format!("{err:#}")));
                Err(err)
            }
        }
    }

    fn invoke(&self, kind: PromptKind, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let result = self.generator.generate(kind, prompt);
        let elapsed_ms = start.elapsed().as_millis();
        match &result {
            Ok(raw) => tracing::info!(
                %kind,
                elapsed_ms,
                prompt_bytes = prompt.len(),
                response_bytes = raw.len(),
                "generation complete"
            ),
            Err(err) => tracing::debug!(%kind, elapsed_ms, error = %err, "generation error"),
        }
        result
    }

    fn record(&self, entry: lm_log::LmLogEntry) {
        let Some(log) = self.log else {
            return;
        };
        if let Err(err) = log.append(&entry) {
            tracing::warn!(error = %err, "failed to append generation log");
        }
    }
}

/// Prompt for an initial recommendation plan.
pub fn recommendation_prompt(snapshot: &InferenceSnapshot) -> String {
    fill_template(
        RECOMMENDATION_PROMPT,
        &[
            ("model", snapshot.model.as_str()),
            ("prediction", &display_value(&snapshot.prediction)),
            ("probabilities", &to_json(&snapshot.probabilities)),
            ("sorted_labels", &to_json(&snapshot.sorted_labels)),
            ("inputs", &to_json(&snapshot.inputs)),
        ],
    )
}

/// Prompt for revising a plan after reviewer feedback.
pub fn revision_prompt(previous: &GeneratedPlan, comments: &str) -> String {
    let previous = serde_json::to_string_pretty(previous).unwrap_or_default();
    fill_template(
        REVISION_PROMPT,
        &[("comments", comments), ("previous", &previous)],
    )
}

/// Prompt for the approval summary email.
pub fn summary_prompt(record: &RecommendationRecord) -> String {
    let record = serde_json::to_string_pretty(record).unwrap_or_default();
    fill_template(SUMMARY_PROMPT, &[("record", &record)])
}

/// Prompt for a free-form question over stored data.
pub fn question_prompt(context: &Value, question: &str) -> String {
    let context = serde_json::to_string_pretty(context).unwrap_or_default();
    fill_template(
        QUESTION_PROMPT,
        &[("context", &context), ("question", question)],
    )
}

/// Substitute `{name}` placeholders in one pass over `template`.
///
/// Substituted values are never rescanned, so placeholder text inside stored
/// data or reviewer comments stays literal. Unknown `{...}` text is kept.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];
        let hit = values.iter().find_map(|(name, value)| {
            after_brace
                .strip_prefix(name)
                .and_then(|tail| tail.strip_prefix('}'))
                .map(|tail| (*value, tail))
        });
        match hit {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }
    out.push_str(rest);
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Parse raw generator text as a JSON object of type `T`.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let json_text = extract_json(raw);
    if json_text.is_empty() {
        return Err(anyhow!("empty response"));
    }
    serde_json::from_str(json_text).map_err(|err| {
        anyhow!(
            "{err}; first 200 chars: {}",
            truncate_string(raw.trim(), 200)
        )
    })
}

/// Extract JSON from text that might have markdown code fences or prose around it.
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let start = start + 7;
        if let Some(end) = text[start..].find("```") {
            return text[start..start + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let start = start + 3;
        // Skip language identifier if present
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            return text[start..start + end].trim();
        }
    }

    if text.starts_with('{') {
        return text;
    }
    object_regex()
        .and_then(|re| re.find(text))
        .map(|m| m.as_str())
        .unwrap_or(text)
}

fn object_regex() -> Option<&'static Regex> {
    static OBJECT: OnceLock<Option<Regex>> = OnceLock::new();
    OBJECT
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").ok())
        .as_ref()
}

#[cfg(test)]
pub(crate) mod fake {
    use super::{Generator, PromptKind};
    use anyhow::{anyhow, Result};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Scripted generator: returns queued responses in order, then errors.
    #[derive(Default)]
    pub struct ScriptedGenerator {
        responses: RefCell<VecDeque<Result<String, String>>>,
        pub calls: RefCell<Vec<(PromptKind, String)>>,
    }

    impl ScriptedGenerator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, text: &str) -> Self {
            self.responses.borrow_mut().push_back(Ok(text.to_string()));
            self
        }

        pub fn fail(self, error: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(error.to_string()));
            self
        }
    }

    impl Generator for ScriptedGenerator {
        fn generate(&self, kind: PromptKind, prompt: &str) -> Result<String> {
            self.calls.borrow_mut().push((kind, prompt.to_string()));
            match self.responses.borrow_mut().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(error)) => Err(anyhow!(error)),
                None => Err(anyhow!("no scripted response left")),
            }
        }
    }
}
