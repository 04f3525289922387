// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM module for gg
//!
//! Provides abstraction over different LLM providers.

pub mod factory;
pub mod mock_provider;
pub mod provider;
pub mod providers;
pub mod stream;

pub use factory::ProviderFactory;
pub use provider::*;
pub use stream::{collect_stream, CollectedReply};
