// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg config init|show|path`

use std::io::{self, BufRead};

use crossterm::style::Color;

use super::{print_lines, CommandContext};
use crate::cli::ConfigCommands;
use crate::config::{secrets, Config, GgPaths, Secrets, Settings};
use crate::error::Result;
use crate::license::is_pro_key;
use crate::utils::{print_colored, prompt_line};

pub fn execute(ctx: &CommandContext, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Init => {
            let stdin = io::stdin();
            init(&ctx.paths, &mut stdin.lock())
        }
        ConfigCommands::Show => {
            let config = ctx.load_config()?;
            print_lines(&show_lines(&config)?);
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", ctx.paths.config_file().display());
            Ok(())
        }
    }
}

/// Interactive setup: identity, settings, encrypted secrets
pub fn init<R: BufRead>(paths: &GgPaths, input: &mut R) -> Result<()> {
    println!("Welcome to gg v{}!", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Setting up your configuration...");
    println!();

    paths.ensure_home()?;

    let claude = prompt_line(input, "Enter your Claude API key (from console.anthropic.com):\n> ")?;
    let openai = prompt_line(
        input,
        "\nEnter your OpenAI API key (optional, press Enter to skip):\n> ",
    )?;
    let maaza = prompt_line(
        input,
        "\nEnter your Maaza API key (optional, press Enter to skip):\n> ",
    )?;
    let license = prompt_line(
        input,
        "\nEnter your Pro license key (optional, press Enter to skip):\n> ",
    )?;

    let secrets = Secrets::from_answers(&claude, &openai, &maaza, &license);
    write_config(paths, &secrets)?;

    println!();
    print_colored(
        Color::Green,
        &format!("✓ Configuration saved to {}", paths.config_file().display()),
    )?;
    print_colored(
        Color::Green,
        &format!(
            "✓ Secrets encrypted and saved to {}",
            paths.secrets_file().display()
        ),
    )?;
    println!();
    println!("Run 'gg ask \"your prompt\"' to get started!");
    Ok(())
}

/// Default settings with the tier derived from the license, a fresh identity
/// and the secrets encrypted to it
pub fn write_config(paths: &GgPaths, secrets: &Secrets) -> Result<()> {
    let mut settings = Settings::default();
    if secrets.pro_license_key.as_deref().is_some_and(is_pro_key) {
        settings.gg.tier = "pro".to_string();
    }
    settings.save_to(&paths.config_file())?;

    let identity = secrets::generate_identity();
    secrets::write_identity(&paths.key_file(), &identity)?;
    secrets.encrypt_to(&paths.secrets_file(), &identity)?;
    tracing::debug!("wrote config under {}", paths.home().display());
    Ok(())
}

/// Settings as TOML plus which secrets are set, never their values
pub fn show_lines(config: &Config) -> Result<Vec<String>> {
    let mut lines = vec![format!("# {}", config.paths.config_file().display())];
    lines.extend(toml::to_string_pretty(&config.settings)?.lines().map(String::from));

    let status = |value: Option<String>| if value.is_some() { "set" } else { "not set" };
    lines.push(String::new());
    lines.push("[secrets]".to_string());
    lines.push(format!(
        "claude_api_key = {}",
        status(config.anthropic_api_key())
    ));
    lines.push(format!("openai_api_key = {}", status(config.openai_api_key())));
    lines.push(format!(
        "maaza_api_key = {}",
        status(config.secrets.maaza_api_key.clone())
    ));
    lines.push(format!(
        "pro_license_key = {}",
        status(config.pro_license_key())
    ));
    Ok(lines)
}
