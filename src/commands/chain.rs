// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg chain` and `gg cool`

use super::{print_lines, CommandContext};
use crate::chain::{chain_lines, saved_lines, ChainRunner};
use crate::cli::{ChainArgs, CoolArgs};
use crate::error::{GgError, Result};
use crate::github::GitHubClient;
use crate::registry::{BrewCli, RegistryClient};
use crate::toolbelt;

/// What a `gg chain` invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainAction {
    List,
    Save { name: String, tools: Vec<String> },
    Run { name: String },
    Saved { name: String },
    Show { tools: Vec<String> },
}

impl ChainAction {
    pub fn from_args(args: &ChainArgs) -> Result<Self> {
        if args.list {
            return Ok(Self::List);
        }
        if let Some(name) = &args.save {
            if args.items.is_empty() {
                return Err(GgError::InvalidInput(
                    "Usage: gg chain --save <name> <tool:pkg>...".to_string(),
                ));
            }
            return Ok(Self::Save {
                name: name.clone(),
                tools: args.items.clone(),
            });
        }
        if let Some(name) = args.run_target() {
            return Ok(Self::Run {
                name: name.to_string(),
            });
        }

        match args.items.as_slice() {
            [] => Err(GgError::InvalidInput(
                "Usage: gg chain <type:name>... | --save <name> <tool:pkg>... | --list | run <name>"
                    .to_string(),
            )),
            [first, ..] if !first.contains(':') => Ok(Self::Saved {
                name: first.clone(),
            }),
            items => Ok(Self::Show {
                tools: items.to_vec(),
            }),
        }
    }
}

pub async fn execute(ctx: &CommandContext, args: &ChainArgs) -> Result<()> {
    let store = ctx.chains();

    match ChainAction::from_args(args)? {
        ChainAction::List => print_lines(&saved_lines(&store.list()?)),
        ChainAction::Save { name, tools } => {
            store.save(&name, &tools)?;
            println!("💾 Saved chain '{}' with {} tools", name, tools.len());
        }
        ChainAction::Run { name } => {
            let tools = store.load(&name)?;
            let runner = runner(ctx);
            runner.run(&name, &tools, |line| println!("{}", line)).await;
        }
        ChainAction::Saved { name } => {
            let tools = store.load(&name)?;
            println!("🔗 Running saved chain '{}'", name);
            println!();
            print_lines(&chain_lines(&tools));
        }
        ChainAction::Show { tools } => print_lines(&chain_lines(&tools)),
    }
    Ok(())
}

fn runner(ctx: &CommandContext) -> ChainRunner {
    let settings = ctx.settings_or_default();
    ChainRunner {
        registry: RegistryClient::new(&settings.registry),
        cache: ctx.cache(),
        brew: BrewCli::default(),
        github: GitHubClient::new(&settings.registry.github_api_url),
    }
}

pub fn execute_cool(args: &CoolArgs) -> Result<()> {
    if args.list {
        print_lines(&toolbelt::list_lines());
        return Ok(());
    }

    let Some(name) = &args.name else {
        return Err(GgError::InvalidInput(format!(
            "Usage: gg cool <name> | --list\n   Available: {}",
            toolbelt::names()
        )));
    };
    print_lines(&toolbelt::find(name)?.lines());
    Ok(())
}
