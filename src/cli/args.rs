// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for gg.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// gg - the 2-letter agent-native git client
#[derive(Parser, Debug)]
#[command(name = "gg")]
#[command(version, about = "The 2-letter agent-native git client")]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Working directory (defaults to current)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version
    Version,

    /// Set up or inspect configuration
    Config(ConfigArgs),

    /// Maaza model MCP endpoint
    Maaza,

    /// Generate code and open a PR (streams output)
    Ask(AskArgs),

    /// Rewrite one file from an instruction and open a PR
    Edit(EditArgs),

    /// Compressed agent-to-agent reply
    A2a(A2aArgs),

    /// Merge the latest PR
    Approve(ApproveArgs),

    /// View or manage a specific PR
    Pr(PrArgs),

    /// Run a command and report its exit status and duration
    Run(RunArgs),

    /// Show usage statistics
    Stats,

    /// npm package summary
    Npm(NpmArgs),

    /// Homebrew formula summary
    Brew(BrewArgs),

    /// Chain multiple tools together
    Chain(ChainArgs),

    /// Curated tool collections
    Cool(CoolArgs),

    /// Inspect or prune the disk cache
    Cache(CacheArgs),

    /// `.` for the current repo, `owner/repo` for any GitHub repo
    #[command(external_subcommand)]
    External(Vec<String>),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Interactive setup of ~/.gg
    Init,
    /// Print settings and which secrets are set
    Show,
    /// Print the config file location
    Path,
}

/// Flags shared by `ask` and `edit`
#[derive(Args, Debug, Default, Clone)]
pub struct GenerateArgs {
    /// Use the pro license even when the tier check fails locally
    #[arg(long)]
    pub pro: bool,

    /// LLM provider to use (anthropic, openai, ollama)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Wait for the whole reply instead of streaming it
    #[arg(long)]
    pub no_stream: bool,

    /// List the files that would be written without touching git
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// What to build
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// File to rewrite, relative to the working directory
    pub path: String,

    /// What to change
    #[arg(required = true, num_args = 1..)]
    pub instruction: Vec<String>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

#[derive(Args, Debug)]
pub struct A2aArgs {
    /// Request from the calling agent
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,

    /// LLM provider to use (anthropic, openai, ollama)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print one compact JSON object
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ApproveArgs {
    /// Merge without asking
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct PrArgs {
    /// PR number
    pub number: u64,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command line, run through `sh -c`
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

#[derive(Args, Debug)]
pub struct NpmArgs {
    /// Package name, scoped names included
    pub package: String,

    /// Function the agent intends to call
    #[arg(long = "fn", value_name = "NAME")]
    pub function: Option<String>,

    /// Ignore the cache
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args, Debug)]
pub struct BrewArgs {
    /// Formula name
    pub formula: String,

    /// Install the formula when it is missing
    #[arg(short = 'i', long = "install")]
    pub install: bool,

    /// Ignore the cache
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args, Debug)]
pub struct ChainArgs {
    /// Save the listed tools under this name
    #[arg(long, value_name = "NAME")]
    pub save: Option<String>,

    /// List saved chains
    #[arg(long)]
    pub list: bool,

    /// `type:name` items, a saved chain name, or `run <name>`
    pub items: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CoolArgs {
    /// Toolbelt name
    pub name: Option<String>,

    /// List every toolbelt
    #[arg(long)]
    pub list: bool,
}

#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum CacheCommands {
    /// Show cache size and contents
    Status,
    /// Remove old cache entries
    Clean {
        /// Remove entries older than this many days
        #[arg(long, default_value_t = 7)]
        days: u64,
    },
}

impl ChainArgs {
    /// `chain run <name>` target
    pub fn run_target(&self) -> Option<&str> {
        match self.items.as_slice() {
            [first, name, ..] if first == "run" => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Verb-less invocations routed through `Commands::External`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalTarget {
    CurrentRepo,
    Repo(String),
    Unknown(String),
}

impl ExternalTarget {
    pub fn classify(args: &[String]) -> Self {
        match args {
            [dot] if dot == "." => Self::CurrentRepo,
            [slug] if slug.contains('/') => Self::Repo(slug.clone()),
            [first, ..] => Self::Unknown(first.clone()),
            [] => Self::Unknown(String::new()),
        }
    }
}

/// Usage text shown when no verb is given
pub fn usage_lines() -> Vec<&'static str> {
    vec![
        "gg — the 2-letter agent-native git client",
        "",
        "commands:",
        "  gg config init     # Set up configuration",
        "  gg maaza           # Maaza model MCP endpoint",
        "  gg .               # Current repo → code-execution MCP",
        "  gg user/repo       # Any GitHub repo → MCP",
        "  gg ask \"...\"       # Generate code → open PR (streams output)",
        "  gg edit <f> \"...\"  # Rewrite a file → open PR",
        "  gg a2a \"...\"       # Compressed reply for another agent",
        "  gg approve         # Merge the PR",
        "  gg pr <number>     # View/manage specific PR",
        "  gg run <cmd>       # Run command, return result",
        "  gg stats           # Show usage statistics",
        "",
        "package manager:",
        "  gg npm <pkg>       # npm package → MCP endpoint",
        "  gg brew [-i] <f>   # Homebrew formula → MCP (-i auto-installs)",
        "  gg chain <tools>   # Chain multiple MCPs together",
        "  gg chain run <n>   # Execute a saved chain",
        "  gg cool <toolbelt> # Curated tool collections (webdev, media, sec, data, devops)",
        "  gg cache status    # Show cache size",
        "  gg cache clean     # Prune old cache entries",
        "",
        "install: curl -L gg.sh | sh",
        "more: github.com/ggdotdev/gg",
    ]
}
