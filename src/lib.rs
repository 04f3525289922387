// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! gg - the 2-letter agent-native git client.
//!
//! This crate exposes the shared runtime used by:
//! - the `gg` CLI (`src/main.rs`)
//! - the `gg-license` service (`src/bin/gg-license.rs`)
//!
//! Architecture highlights:
//! - `registry`, `github`, `cache`: compressed package and repo summaries
//! - `llm`, `codegen`: provider abstraction, code-block extraction, git/PR workflow
//! - `config`, `license`, `usage`: settings, encrypted secrets, pro gating, counters
//! - `chain`, `toolbelt`: saved and curated tool collections
//! - `license_server`: Stripe-driven license issuing over a key-value store

pub mod cache;
pub mod chain;
pub mod cli;
pub mod codegen;
pub mod commands;
pub mod config;
pub mod error;
pub mod github;
pub mod license;
pub mod license_server;
pub mod llm;
pub mod registry;
pub mod toolbelt;
pub mod usage;
pub mod utils;

pub use error::{GgError, Result};
