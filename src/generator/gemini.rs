//! Gemini `generateContent` backend over HTTPS.
use super::{Generator, PromptKind};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiGenerator {
    api_key: String,
    model: String,
    agent: ureq::Agent,
}

impl GeminiGenerator {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/{}:generateContent", self.model)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl Generator for GeminiGenerator {
    fn generate(&self, kind: PromptKind, prompt: &str) -> Result<String> {
        tracing::debug!(%kind, model = %self.model, "calling gemini");
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };
        let response: GenerateContentResponse = self
            .agent
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .send_json(&request)
            .context("gemini request failed")?
            .into_body()
            .read_json()
            .context("parse gemini response")?;
        response_text(response)
    }
}

fn response_text(response: GenerateContentResponse) -> Result<String> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .ok_or_else(|| anyhow!("gemini response contained no candidates"))?;
    Ok(text.trim().to_string())
}
