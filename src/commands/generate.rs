// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg ask` and `gg edit`: prompt a provider, write its code blocks, open a PR

use std::io::{self, Write};

use crossterm::style::Color;

use super::{print_lines, CommandContext};
use crate::cli::{AskArgs, EditArgs, GenerateArgs};
use crate::codegen::{
    edit_prompt, parse_code_blocks, parse_unlabeled_blocks, system_prompt,
    validate_path, ChangeKind, CodeFile, GitWorkflow, PublishOutcome,
};
use crate::config::Config;
use crate::error::{GgError, Result};
use crate::github::{current_repo, GhCli};
use crate::license::{self, Gate};
use crate::llm::{
    collect_stream, CompletionRequest, CompletionResponse, LlmProvider, ProviderFactory,
};
use crate::usage::CommandKind;
use crate::utils::print_colored;

/// Reply text and usage, streamed or not
pub async fn generate(
    provider: &dyn LlmProvider,
    request: CompletionRequest,
    stream: bool,
    on_text: impl FnMut(&str),
) -> Result<CompletionResponse> {
    if !stream {
        return provider.complete(request).await;
    }

    let model = request.model.clone();
    let events = provider.complete_stream(request).await?;
    let reply = collect_stream(events, on_text).await?;
    Ok(CompletionResponse {
        model,
        text: reply.text,
        usage: reply.usage,
    })
}

/// Labeled blocks; for `edit`, a single unlabeled block becomes the new
/// content of the edited file
pub fn files_from_reply(text: &str, edited_path: Option<&str>) -> Vec<CodeFile> {
    let files = parse_code_blocks(text);
    if !files.is_empty() {
        return files;
    }

    match (edited_path, parse_unlabeled_blocks(text).as_slice()) {
        (Some(path), [content]) => vec![CodeFile {
            path: path.to_string(),
            content: content.clone(),
        }],
        _ => Vec::new(),
    }
}

pub async fn execute_ask(ctx: &CommandContext, args: &AskArgs) -> Result<()> {
    let prompt = args.prompt.join(" ").trim().to_string();
    if prompt.is_empty() {
        return Err(GgError::InvalidInput("No prompt provided".to_string()));
    }

    let request = Job {
        kind: ChangeKind::Ask {
            prompt: prompt.clone(),
        },
        prompt,
        edited_path: None,
    };
    run(ctx, &args.generate, request, "ask").await
}

pub async fn execute_edit(ctx: &CommandContext, args: &EditArgs) -> Result<()> {
    let instruction = args.instruction.join(" ").trim().to_string();
    if instruction.is_empty() {
        return Err(GgError::InvalidInput("No instruction provided".to_string()));
    }
    validate_path(&args.path)?;

    let target = ctx.workdir().join(&args.path);
    if !target.is_file() {
        return Err(GgError::NotFound(format!("File not found: {}", args.path)));
    }
    let content = std::fs::read_to_string(&target)?;

    let request = Job {
        kind: ChangeKind::Edit {
            path: args.path.clone(),
            instruction: instruction.clone(),
        },
        prompt: edit_prompt(&args.path, &content, &instruction),
        edited_path: Some(args.path.clone()),
    };
    run(ctx, &args.generate, request, "edit").await
}

struct Job {
    kind: ChangeKind,
    prompt: String,
    edited_path: Option<String>,
}

impl Job {
    fn command_kind(&self) -> CommandKind {
        match self.kind {
            ChangeKind::Ask { .. } => CommandKind::Ask,
            ChangeKind::Edit { .. } => CommandKind::Edit,
        }
    }
}

async fn run(ctx: &CommandContext, flags: &GenerateArgs, job: Job, verb: &str) -> Result<()> {
    let config = ctx.load_config()?;

    let pro = license::check_pro(&config).await;
    if license::gate(pro, flags.pro)? == Gate::Upsell {
        print_lines(&license::upsell_lines(verb));
        return Ok(());
    }

    let gh = GhCli::new(ctx.workdir());
    if !flags.dry_run {
        gh.ensure_auth()?;
    }
    let repo = current_repo(ctx.workdir())
        .map_err(|_| GgError::NotFound("Not in a git repository".to_string()))?;

    let (provider, model) = provider_for(&config, flags)?;
    println!("🤖 Generating code with {}/{}...", provider.name(), model);
    println!();

    let request = CompletionRequest::new(&model, &job.prompt)
        .with_system(system_prompt(&repo))
        .with_max_tokens(config.settings.api.max_tokens)
        .with_temperature(config.settings.api.claude_temperature);

    let stream = !flags.no_stream;
    let reply = generate(provider.as_ref(), request, stream, |text| {
        print!("{}", text);
        let _ = io::stdout().flush();
    })
    .await?;
    if stream {
        println!();
        println!();
    }

    record_usage(ctx, job.command_kind(), provider.as_ref(), &reply);

    let files = files_from_reply(&reply.text, job.edited_path.as_deref());
    if files.is_empty() {
        print_colored(Color::Yellow, "⚠️  No code blocks found in response")?;
        if !stream {
            println!("Response:");
            println!("{}", reply.text);
        }
        return Ok(());
    }

    if flags.dry_run {
        println!("📝 Dry run: {} file(s) would be written", files.len());
        for file in &files {
            match validate_path(&file.path) {
                Ok(()) => println!("   {}", file.path),
                Err(e) => println!("   {} (skipped: {})", file.path, e),
            }
        }
        return Ok(());
    }

    publish(ctx, &config, &gh, &job.kind, &files)
}

fn provider_for(
    config: &Config,
    flags: &GenerateArgs,
) -> Result<(std::sync::Arc<dyn LlmProvider>, String)> {
    let name = flags
        .provider
        .clone()
        .unwrap_or_else(|| config.settings.api.provider.clone());
    let provider = ProviderFactory::create(&name, config)?;
    let model = flags
        .model
        .clone()
        .unwrap_or_else(|| ProviderFactory::default_model(&name, &config.settings));
    Ok((provider, model))
}

/// Count the command and its tokens; a failed write never fails the command
pub(crate) fn record_usage(
    ctx: &CommandContext,
    kind: CommandKind,
    provider: &dyn LlmProvider,
    reply: &CompletionResponse,
) {
    let store = ctx.usage();
    if let Err(e) = store.record_command(kind) {
        tracing::warn!("failed to record usage: {}", e);
    }
    if let Err(e) = store.record_tokens(&reply.usage, &provider.pricing(&reply.model)) {
        tracing::warn!("failed to record token usage: {}", e);
    }
}

fn publish(
    ctx: &CommandContext,
    config: &Config,
    gh: &GhCli,
    kind: &ChangeKind,
    files: &[CodeFile],
) -> Result<()> {
    let workflow = GitWorkflow::new(ctx.workdir());
    let branch = kind.branch_name(chrono::Utc::now().timestamp());
    let outcomes = workflow.write_on_branch(&branch, files)?;
    for outcome in &outcomes {
        let color = if outcome.is_written() {
            Color::Green
        } else {
            Color::Yellow
        };
        print_colored(color, &outcome.line())?;
    }
    if !outcomes.iter().any(|o| o.is_written()) {
        return Err(GgError::InvalidInput(
            "no files could be written".to_string(),
        ));
    }

    workflow.commit_all(&kind.commit_message())?;

    match workflow.publish(gh, &branch, &config.settings.github.default_branch, kind) {
        PublishOutcome::Created { url } => {
            println!();
            print_colored(Color::Green, &format!("✓ PR created: {}", url))?;
            println!();
            println!("Next: gg approve");
        }
        PublishOutcome::Manual { branch, reason } => {
            tracing::debug!("PR creation fell back to manual: {}", reason);
            print_colored(Color::Yellow, "⚠️  Failed to create PR. Create manually:")?;
            println!("   Branch: {}", branch);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock_provider::MockProvider;
    use crate::llm::Usage;

    const REPLY: &str = "Here:\n```rust:src/health.rs\npub fn ok() -> bool { true }\n```\n";

    #[tokio::test]
    async fn test_generate_streaming_collects_text() {
        let provider = MockProvider::new().with_usage_response(
            REPLY,
            Usage {
                input_tokens: 12,
                output_tokens: 30,
            },
        );
        let mut streamed = String::new();
        let reply = generate(
            &provider,
            CompletionRequest::new("mock-model", "add health"),
            true,
            |t| streamed.push_str(t),
        )
        .await
        .unwrap();

        assert_eq!(reply.text, REPLY);
        assert_eq!(streamed, REPLY);
        assert_eq!(reply.model, "mock-model");
        assert_eq!(reply.usage.output_tokens, 30);
    }

    #[tokio::test]
    async fn test_generate_without_streaming() {
        let provider = MockProvider::new().with_response(REPLY);
        let mut called = false;
        let reply = generate(
            &provider,
            CompletionRequest::new("m", "p"),
            false,
            |_| called = true,
        )
        .await
        .unwrap();
        assert_eq!(reply.text, REPLY);
        assert!(!called);
    }

    #[tokio::test]
    async fn test_generate_propagates_provider_error() {
        let provider = MockProvider::new().with_error("boom");
        let result = generate(&provider, CompletionRequest::new("m", "p"), true, |_| {}).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_files_from_labeled_reply() {
        let files = files_from_reply(REPLY, None);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/health.rs");
    }

    #[test]
    fn test_edit_uses_single_unlabeled_block() {
        let reply = "```rust\nfn new() {}\n```";
        let files = files_from_reply(reply, Some("src/lib.rs"));
        assert_eq!(
            files,
            vec![CodeFile {
                path: "src/lib.rs".to_string(),
                content: "fn new() {}\n".to_string()
            }]
        );
        assert!(files_from_reply(reply, None).is_empty());
    }

    #[test]
    fn test_edit_ignores_ambiguous_unlabeled_blocks() {
        let reply = "```rust\na\n```\n```rust\nb\n```";
        assert!(files_from_reply(reply, Some("src/lib.rs")).is_empty());
    }
}
