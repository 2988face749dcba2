//! Free-form questions over everything in the data directory.
use super::AppContext;
use crate::cli::AskArgs;
use crate::generator::{self, GenerationClient, PromptKind};
use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Every `*.json` document under `root`, keyed by file name.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_documents(root: &Path) -> Result<Map<String, Value>> {
    let mut documents = Map::new();
    if !root.is_dir() {
        return Ok(documents);
    }
    let mut paths = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("read {}", root.display()))? {
        let path = entry
            .with_context(|| format!("read entry in {}", root.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    for path in paths {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let parsed = fs::read(&path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).map_err(Into::into));
        match parsed {
            Ok(value) => {
                documents.insert(name.to_string(), value);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable document")
            }
        }
    }
    Ok(documents)
}

/// Answer `question` using the data directory as context.
pub fn ask(client: &GenerationClient<'_>, root: &Path, question: &str) -> Result<String> {
    let documents = load_documents(root)?;
    if documents.is_empty() {
        return Err(anyhow!("no JSON documents found in {}", root.display()));
    }
    tracing::info!(documents = documents.len(), "answering question");
    let prompt = generator::question_prompt(&Value::Object(documents), question);
    let answer = client.text(PromptKind::Question, &prompt)?;
    Ok(answer.trim().to_string())
}

pub fn run_ask(ctx: &AppContext, args: AskArgs) -> Result<()> {
    let generator = ctx.require_generator(args.lm.as_deref())?;
    let log = ctx.lm_log();
    let client = GenerationClient::new(generator.as_ref(), Some(&log));
    let answer = ask(&client, ctx.paths.root(), &args.question)?;
    println!("{answer}");
    Ok(())
}
