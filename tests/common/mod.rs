//! Shared test infrastructure for integration tests.
//!
//! Each test gets its own data directory and drives the `planrev` binary with
//! mock LM and predictor scripts written into a temp dir.
#![allow(dead_code)]

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Mock LM: picks a canned response by looking at the prompt.
const MOCK_LM: &str = r#"#!/bin/sh
prompt=$(cat)
case "$prompt" in
  *"Recommendation record:"*)
    printf '%s\n' '{"subject":"Plan approved","body":"All actions cleared."}' ;;
  *"Previous recommendation payload:"*)
    printf '%s\n' '```json' '{"primary":[{"action":"Delay loading","justification":"swell","expected_impact":"safe berth"}],"alternative":[],"mitigation":[]}' '```' ;;
  *"Question:"*)
    echo "There is one recommendation." ;;
  *)
    printf '%s\n' '{"primary":[{"action":"Secure cranes","justification":"wind","expected_impact":"no damage"}],"alternative":[{"action":"Use inner berth"}],"mitigation":[{"action":"Brief crews"}]}' ;;
esac
"#;

/// Mock LM that never returns JSON.
const CHATTY_LM: &str = "#!/bin/sh\ncat >/dev/null\necho 'Dear team, everything looks fine.'\n";

const MOCK_PREDICTOR: &str = r#"#!/bin/sh
cat >/dev/null
printf '%s\n' '{"prediction":"Storm","probabilities":{"Clear":0.1,"Storm":0.9}}'
"#;

/// Environment variables that would leak host configuration into a test run.
const SCRUBBED_ENV: [&str; 5] = [
    "PLANREV_DATA_DIR",
    "PLANREV_LM_COMMAND",
    "PLANREV_PREDICT_COMMAND",
    "GEMINI_API_KEY",
    "RUST_LOG",
];

pub struct TestEnv {
    temp: TempDir,
    pub data_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("tempdir");
        let data_dir = temp.path().join("SaveJson");
        Self { temp, data_dir }
    }

    /// Command line for the prompt-aware mock LM.
    pub fn mock_lm(&self) -> String {
        self.script("mock-lm.sh", MOCK_LM)
    }

    /// Command line for an LM that only returns prose.
    pub fn chatty_lm(&self) -> String {
        self.script("chatty-lm.sh", CHATTY_LM)
    }

    pub fn mock_predictor(&self) -> String {
        self.script("predict.sh", MOCK_PREDICTOR)
    }

    fn script(&self, name: &str, body: &str) -> String {
        let path = self.temp.path().join(name);
        fs::write(&path, body).expect("write script");
        format!("sh '{}'", path.display())
    }

    /// Run `planrev --data-dir <dir> args...` with a scrubbed environment.
    pub fn run(&self, args: &[&str]) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_planrev"));
        command
            .arg("--data-dir")
            .arg(&self.data_dir)
            .args(args)
            .env("HOME", self.temp.path())
            .env("XDG_CONFIG_HOME", self.temp.path().join("config"));
        for key in SCRUBBED_ENV {
            command.env_remove(key);
        }
        command.output().expect("spawn planrev")
    }

    /// Run and require success; returns stdout.
    pub fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "planrev {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("utf-8 stdout")
    }

    /// Run and require failure; returns stderr.
    pub fn run_err(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "planrev {:?} unexpectedly succeeded",
            args
        );
        String::from_utf8(output.stderr).expect("utf-8 stderr")
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Parse a JSON document from the data directory.
    pub fn read_json(&self, file: &str) -> Value {
        read_json(&self.path(file))
    }

    pub fn records(&self) -> Vec<Value> {
        match self.read_json("recommendation_output.json") {
            Value::Array(records) => records,
            other => panic!("expected record array, got {other}"),
        }
    }
}

pub fn read_json(path: &Path) -> Value {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("read {}: {err}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|err| panic!("parse {}: {err}", path.display()))
}
