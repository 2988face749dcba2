//! Local LM command backend.
//!
//! Invokes a user-configured command with the prompt on stdin and takes stdout
//! as the raw response. The command can be any tool that accepts text input and
//! produces text output (`llm`, `ollama run`, a wrapper script).
use super::{Generator, PromptKind};
use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandGenerator {
    /// Parse a shell-style command line and resolve its program on `PATH`.
    pub fn new(command: &str) -> Result<Self> {
        let (program, args) = resolve_command(command)?;
        Ok(Self { program, args })
    }
}

impl Generator for CommandGenerator {
    fn generate(&self, kind: PromptKind, prompt: &str) -> Result<String> {
        tracing::debug!(%kind, program = %self.program.display(), "invoking lm command");
        run_with_stdin(&self.program, &self.args, prompt)
    }
}

/// Split a command line and resolve the program through `which`.
pub fn resolve_command(command: &str) -> Result<(PathBuf, Vec<String>)> {
    let mut argv =
        shell_words::split(command).with_context(|| format!("parse command: {command}"))?;
    if argv.is_empty() {
        return Err(anyhow!("command is empty"));
    }
    let program = argv.remove(0);
    let resolved =
        which::which(&program).with_context(|| format!("command not found: {program}"))?;
    Ok((resolved, argv))
}

/// Run `program args...`, write `input` to its stdin, and return stdout.
pub fn run_with_stdin(program: &Path, args: &[String], input: &str) -> Result<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn {}", program.display()))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .with_context(|| format!("write stdin of {}", program.display()))?;
    }

    let output = child
        .wait_with_output()
        .with_context(|| format!("wait for {}", program.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "{} failed with status {}: {}",
            program.display(),
            output.status,
            stderr.trim()
        ));
    }

    String::from_utf8(output.stdout)
        .with_context(|| format!("decode stdout of {} as UTF-8", program.display()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        let err = CommandGenerator::new("   ").expect_err("empty");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn unknown_program_is_rejected() {
        let err = CommandGenerator::new("definitely-not-a-real-lm-binary --x").expect_err("missing");
        assert!(err.to_string().contains("command not found"));
    }

    #[test]
    fn prompt_is_piped_through() {
        let Ok(generator) = CommandGenerator::new("cat") else {
            return;
        };
        let out = generator
            .generate(PromptKind::Question, "hello lm")
            .expect("cat echoes");
        assert_eq!(out, "hello lm");
    }

    #[test]
    fn nonzero_exit_is_an_error() {
        let Ok(generator) = CommandGenerator::new("sh -c 'echo boom >&2; exit 3'") else {
            return;
        };
        let err = generator
            .generate(PromptKind::Question, "")
            .expect_err("failing command");
        assert!(err.to_string().contains("boom"));
    }
}
