// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg npm` and `gg brew`

use crossterm::style::Color;

use super::{print_lines, CommandContext};
use crate::cli::{BrewArgs, NpmArgs};
use crate::error::Result;
use crate::registry::{brew, npm, BrewCli, RegistryClient};
use crate::utils::print_colored;

pub async fn execute_npm(ctx: &CommandContext, args: &NpmArgs) -> Result<()> {
    let settings = ctx.settings_or_default();
    let client = RegistryClient::new(&settings.registry);

    let lookup = npm::lookup(&client, &ctx.cache(), &args.package, args.refresh).await?;
    print_lines(&npm::summary_lines(&lookup, args.function.as_deref()));
    Ok(())
}

pub async fn execute_brew(ctx: &CommandContext, args: &BrewArgs) -> Result<()> {
    let settings = ctx.settings_or_default();
    let client = RegistryClient::new(&settings.registry);
    let cli = BrewCli::default();

    let mut lookup = brew::lookup(&cli, &client, &ctx.cache(), &args.formula, args.refresh).await?;

    if args.install && !lookup.summary.installed {
        println!("🍺 Installing {}...", args.formula);
        cli.install(&args.formula).await?;
        print_colored(Color::Green, &format!("✅ {} installed", args.formula))?;
        lookup.summary.installed = true;
    }

    print_lines(&brew::summary_lines(&lookup, args.install));
    Ok(())
}
