use super::*;

fn config_with_command(command: &str) -> Config {
    Config {
        lm_command: Some(command.to_string()),
        ..Config::default()
    }
}

#[test]
fn flag_wins_over_config_and_env() {
    let backend = resolve_generator_from(
        Some("flag-lm"),
        &config_with_command("config-lm"),
        Some("env-lm".to_string()),
        Some("key".to_string()),
    )
    .expect("resolve");
    assert_eq!(backend, GeneratorBackend::Command("flag-lm".to_string()));
}

#[test]
fn config_wins_over_env() {
    let backend = resolve_generator_from(
        None,
        &config_with_command("config-lm"),
        Some("env-lm".to_string()),
        None,
    )
    .expect("resolve");
    assert_eq!(backend, GeneratorBackend::Command("config-lm".to_string()));
}

#[test]
fn gemini_used_only_without_any_command() {
    let backend =
        resolve_generator_from(None, &Config::default(), None, Some("secret".to_string()))
            .expect("resolve");
    assert_eq!(
        backend,
        GeneratorBackend::Gemini {
            api_key: "secret".to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    );
}

#[test]
fn missing_backend_is_an_error() {
    let err = resolve_generator_from(None, &Config::default(), Some("  ".to_string()), None)
        .expect_err("no backend");
    assert!(err.to_string().contains("no generation backend"));
}

#[test]
fn predictor_falls_back_to_env() {
    let command = resolve_predictor_from(None, &Config::default(), Some("predict.sh".to_string()))
        .expect("resolve");
    assert_eq!(command, "predict.sh");
    assert!(resolve_predictor_from(None, &Config::default(), None).is_err());
}

#[test]
fn data_dir_config_is_loaded_and_validated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = DataPaths::new(dir.path().to_path_buf());
    std::fs::write(
        paths.config_path(),
        r#"{"schema_version": 1, "lm_command": "llm -m local"}"#,
    )
    .expect("write config");
    let config = load_config(&paths).expect("load config");
    assert_eq!(config.lm_command.as_deref(), Some("llm -m local"));

    std::fs::write(paths.config_path(), r#"{"schema_version": 2}"#).expect("write config");
    assert!(load_config(&paths).is_err());

    std::fs::write(paths.config_path(), r#"{"schema_version": 1, "surprise": true}"#)
        .expect("write config");
    assert!(load_config(&paths).is_err());
}
