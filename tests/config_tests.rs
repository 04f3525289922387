// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use gg::commands::config::{show_lines, write_config};
use gg::config::{Config, GgPaths, Secrets, Settings};

fn paths() -> (tempfile::TempDir, GgPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = GgPaths::new(dir.path().join(".gg"));
    paths.ensure_home().unwrap();
    (dir, paths)
}

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();

    assert_eq!(settings.api.provider, "anthropic");
    assert_eq!(settings.api.claude_model, "claude-sonnet-4-5-20250929");
    assert!((settings.api.claude_temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(settings.api.max_tokens, 4096);
    assert_eq!(settings.github.default_branch, "main");
    assert_eq!(settings.gg.tier, "free");
}

#[test]
fn test_partial_config_file_loads() {
    let (_dir, paths) = paths();
    std::fs::write(
        paths.config_file(),
        "[api]\nprovider = \"ollama\"\n\n[github]\ndefault_branch = \"trunk\"\n",
    )
    .unwrap();

    let settings = Settings::load_from(&paths.config_file()).unwrap();
    assert_eq!(settings.api.provider, "ollama");
    assert_eq!(settings.api.ollama_model, "qwen2.5-coder:7b");
    assert_eq!(settings.github.default_branch, "trunk");
}

#[test]
fn test_invalid_provider_rejected() {
    let mut settings = Settings::default();
    settings.api.provider = "gemini".to_string();
    let err = settings.validate().unwrap_err();
    assert!(err.to_string().contains("Invalid provider"));
}

#[test]
fn test_write_then_load_round_trips_secrets() {
    let (_dir, paths) = paths();
    let secrets = Secrets::from_answers("sk-ant-abc", "", "", "gg_pro_XYZ");
    write_config(&paths, &secrets).unwrap();

    let secrets_bytes = std::fs::read(paths.secrets_file()).unwrap();
    assert!(!String::from_utf8_lossy(&secrets_bytes).contains("sk-ant-abc"));

    let config = Config::load(&paths).unwrap();
    assert_eq!(config.secrets, secrets);
    assert_eq!(config.settings.gg.tier, "pro");
}

#[test]
fn test_show_lines_never_print_secret_values() {
    let (_dir, paths) = paths();
    write_config(&paths, &Secrets::from_answers("sk-ant-abc", "sk-openai", "", "")).unwrap();

    let config = Config::load(&paths).unwrap();
    let text = show_lines(&config).unwrap().join("\n");
    assert!(text.contains("[secrets]"));
    assert!(!text.contains("sk-ant-abc"));
    assert!(!text.contains("sk-openai"));
    assert_eq!(config.settings.gg.tier, "free");
}

#[test]
fn test_load_without_init_fails() {
    let (_dir, paths) = paths();
    assert!(Config::load(&paths).is_err());
}
