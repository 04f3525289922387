// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! gg - the agent-native git client
//!
//! Entry point for the `gg` CLI.

use std::process::ExitCode;

use clap::Parser;

use gg::cli::{usage_lines, Cli, Commands, ExternalTarget};
use gg::commands::{self, print_lines, CommandContext};
use gg::error::Result;
use gg::utils::sanitize;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on gg's debug output, `-vv` its trace output. `RUST_LOG` still applies.
    let level = match cli.verbose {
        0 => None,
        1 => Some("gg=debug"),
        _ => Some("gg=trace"),
    };
    if let Some(directive) = level {
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {}", sanitize(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let ctx = CommandContext::resolve(cli.directory)?;
    tracing::debug!("workdir {}", ctx.workdir().display());

    let Some(command) = cli.command else {
        print_lines(&usage_lines());
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Version => println!("gg v{}", env!("CARGO_PKG_VERSION")),
        Commands::Config(args) => commands::config::execute(&ctx, &args.command)?,
        Commands::Maaza => print_lines(&commands::repo::maaza_lines()),
        Commands::Ask(args) => commands::generate::execute_ask(&ctx, &args).await?,
        Commands::Edit(args) => commands::generate::execute_edit(&ctx, &args).await?,
        Commands::A2a(args) => commands::a2a::execute(&ctx, &args).await?,
        Commands::Approve(args) => commands::pr::execute_approve(&ctx, &args)?,
        Commands::Pr(args) => commands::pr::execute_pr(&ctx, &args)?,
        Commands::Run(args) => commands::run::execute(&ctx, &args).await?,
        Commands::Stats => commands::stats::execute(&ctx),
        Commands::Npm(args) => commands::packages::execute_npm(&ctx, &args).await?,
        Commands::Brew(args) => commands::packages::execute_brew(&ctx, &args).await?,
        Commands::Chain(args) => commands::chain::execute(&ctx, &args).await?,
        Commands::Cool(args) => commands::chain::execute_cool(&args)?,
        Commands::Cache(args) => commands::cache::execute(&ctx, &args.command)?,
        Commands::External(args) => match ExternalTarget::classify(&args) {
            ExternalTarget::CurrentRepo => commands::repo::execute_current(&ctx).await?,
            ExternalTarget::Repo(slug) => commands::repo::execute_repo(&ctx, &slug).await?,
            ExternalTarget::Unknown(verb) => {
                eprintln!("gg: unknown command: {}", verb);
                eprintln!();
                for line in usage_lines() {
                    eprintln!("{}", line);
                }
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
