//! Configuration loading and backend resolution.
//!
//! Config is optional. When present it lives in `<data dir>/config.json`, or in
//! the user config directory as a fallback, and only names the external
//! commands this tool shells out to.
use crate::paths::{DataPaths, DEFAULT_DATA_DIR};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;

pub const DATA_DIR_ENV: &str = "PLANREV_DATA_DIR";
pub const LM_COMMAND_ENV: &str = "PLANREV_LM_COMMAND";
pub const PREDICT_COMMAND_ENV: &str = "PLANREV_PREDICT_COMMAND";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lm_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictor_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            lm_command: None,
            predictor_command: None,
            gemini_model: None,
        }
    }
}

/// Where recommendation text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorBackend {
    /// Local command: prompt on stdin, response on stdout.
    Command(String),
    /// Gemini `generateContent` over HTTPS.
    Gemini { api_key: String, model: String },
}

/// Resolve the data directory: flag, then `PLANREV_DATA_DIR`, then `SaveJson`.
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    env::var_os(DATA_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Load config from the data directory, falling back to the user config dir.
///
/// A missing file yields the defaults; a present but invalid file is an error.
pub fn load_config(paths: &DataPaths) -> Result<Config> {
    let candidates = [Some(paths.config_path()), global_config_path()];
    for path in candidates.into_iter().flatten() {
        if path.is_file() {
            return load_config_file(&path);
        }
    }
    Ok(Config::default())
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("planrev").join("config.json"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: Config = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Validate config schema and command fields.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    for (label, value) in [
        ("lm_command", &config.lm_command),
        ("predictor_command", &config.predictor_command),
        ("gemini_model", &config.gemini_model),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(anyhow!("{label} must be non-empty when set"));
        }
    }
    Ok(())
}

/// Resolve the generator backend using the process environment.
pub fn resolve_generator(flag: Option<&str>, config: &Config) -> Result<GeneratorBackend> {
    resolve_generator_from(
        flag,
        config,
        env::var(LM_COMMAND_ENV).ok(),
        env::var(GEMINI_API_KEY_ENV).ok(),
    )
}

/// Resolution order: `--lm`, config `lm_command`, `PLANREV_LM_COMMAND`, then
/// Gemini when an API key is available.
pub fn resolve_generator_from(
    flag: Option<&str>,
    config: &Config,
    env_command: Option<String>,
    env_api_key: Option<String>,
) -> Result<GeneratorBackend> {
    let command = flag
        .map(str::to_string)
        .or_else(|| config.lm_command.clone())
        .or(env_command)
        .filter(|command| !command.trim().is_empty());
    if let Some(command) = command {
        return Ok(GeneratorBackend::Command(command));
    }
    if let Some(api_key) = env_api_key.filter(|key| !key.trim().is_empty()) {
        let model = config
            .gemini_model
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        return Ok(GeneratorBackend::Gemini { api_key, model });
    }
    Err(anyhow!(
        "no generation backend configured; pass --lm, set lm_command in config.json, \
         set {LM_COMMAND_ENV}, or set {GEMINI_API_KEY_ENV}"
    ))
}

/// Resolve the predictor command using the process environment.
pub fn resolve_predictor(flag: Option<&str>, config: &Config) -> Result<String> {
    resolve_predictor_from(flag, config, env::var(PREDICT_COMMAND_ENV).ok())
}

/// Resolution order: `--predictor`, config `predictor_command`, `PLANREV_PREDICT_COMMAND`.
pub fn resolve_predictor_from(
    flag: Option<&str>,
    config: &Config,
    env_command: Option<String>,
) -> Result<String> {
    flag.map(str::to_string)
        .or_else(|| config.predictor_command.clone())
        .or(env_command)
        .filter(|command| !command.trim().is_empty())
        .ok_or_else(|| {
            anyhow!(
                "no predictor configured; pass --predictor, set predictor_command in \
                 config.json, or set {PREDICT_COMMAND_ENV}"
            )
        })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
