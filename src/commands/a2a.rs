// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! `gg a2a`: a compressed reply for another agent

use serde::Serialize;

use super::generate::record_usage;
use super::{print_lines, CommandContext};
use crate::cli::A2aArgs;
use crate::codegen::{count_blocks, parse_code_blocks};
use crate::error::{GgError, Result};
use crate::llm::{CompletionRequest, CompletionResponse, ProviderFactory};
use crate::usage::CommandKind;
use crate::utils::truncate;

const REPLY_PREVIEW_CHARS: usize = 117;

/// Few-field view of a model reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct A2aSummary {
    pub provider: String,
    pub model: String,
    pub reply: String,
    pub lines: usize,
    pub code_blocks: usize,
    pub files: Vec<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl A2aSummary {
    pub fn from_reply(provider: &str, response: &CompletionResponse) -> Self {
        let text = &response.text;
        let first_line = text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default();

        Self {
            provider: provider.to_string(),
            model: response.model.clone(),
            reply: truncate(first_line, REPLY_PREVIEW_CHARS),
            lines: text.lines().count(),
            code_blocks: count_blocks(text),
            files: parse_code_blocks(text).into_iter().map(|f| f.path).collect(),
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("🤝 a2a: {}/{}", self.provider, self.model),
            format!("reply: {}", self.reply),
            format!("lines: {} | code blocks: {}", self.lines, self.code_blocks),
        ];
        if !self.files.is_empty() {
            lines.push(format!("files: {}", self.files.join(", ")));
        }
        lines.push(format!(
            "tokens: in={} out={}",
            self.input_tokens, self.output_tokens
        ));
        lines
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub async fn execute(ctx: &CommandContext, args: &A2aArgs) -> Result<()> {
    let prompt = args.prompt.join(" ").trim().to_string();
    if prompt.is_empty() {
        return Err(GgError::InvalidInput("No prompt provided".to_string()));
    }

    let config = ctx.load_config()?;
    let name = args
        .provider
        .clone()
        .unwrap_or_else(|| config.settings.api.provider.clone());
    let provider = ProviderFactory::create(&name, &config)?;
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| ProviderFactory::default_model(&name, &config.settings));

    let request = CompletionRequest::new(model, prompt)
        .with_max_tokens(config.settings.api.max_tokens)
        .with_temperature(config.settings.api.claude_temperature);
    let response = provider.complete(request).await?;
    record_usage(ctx, CommandKind::A2a, provider.as_ref(), &response);

    let summary = A2aSummary::from_reply(provider.name(), &response);
    if args.json {
        println!("{}", summary.to_json()?);
    } else {
        print_lines(&summary.lines());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Usage;

    fn response(text: &str) -> CompletionResponse {
        CompletionResponse {
            model: "claude-sonnet-4-5-20250929".to_string(),
            text: text.to_string(),
            usage: Usage {
                input_tokens: 120,
                output_tokens: 45,
            },
        }
    }

    #[test]
    fn test_summary_fields() {
        let text = "\n\nAdded a health check.\n```rust:src/health.rs\nfn ok() {}\n```\n```sh\ncargo test\n```\n";
        let summary = A2aSummary::from_reply("anthropic", &response(text));

        assert_eq!(summary.reply, "Added a health check.");
        assert_eq!(summary.code_blocks, 2);
        assert_eq!(summary.files, vec!["src/health.rs"]);
        assert_eq!(summary.lines, text.lines().count());
    }

    #[test]
    fn test_reply_is_bounded() {
        let summary = A2aSummary::from_reply("openai", &response(&"word ".repeat(100)));
        assert!(summary.reply.chars().count() <= 120);
        assert!(summary.reply.ends_with("..."));
    }

    #[test]
    fn test_lines() {
        let summary = A2aSummary::from_reply("anthropic", &response("Done."));
        assert_eq!(
            summary.lines(),
            vec![
                "🤝 a2a: anthropic/claude-sonnet-4-5-20250929",
                "reply: Done.",
                "lines: 1 | code blocks: 0",
                "tokens: in=120 out=45",
            ]
        );
    }

    #[test]
    fn test_json_is_one_compact_object() {
        let summary = A2aSummary::from_reply("ollama", &response("ok"));
        let json = summary.to_json().unwrap();
        assert!(!json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["provider"], "ollama");
        assert_eq!(value["input_tokens"], 120);
        assert_eq!(value["files"], serde_json::json!([]));
    }
}
