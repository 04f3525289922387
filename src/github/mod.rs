// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! GitHub integration: remotes, the REST repo summary and the `gh` CLI

pub mod api;
pub mod gh;
pub mod remote;

pub use api::{GitHubClient, RepoLookup, RepoSummary};
pub use gh::{GhCli, PrAction, PrListItem, PrView};
pub use remote::{current_repo, is_repo_slug, parse_github_url};
