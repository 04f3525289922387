// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Encrypted secrets
//!
//! API keys and the pro license are stored as a TOML `[keys]` table,
//! encrypted with age to an X25519 identity kept next to it in `.key`.

use std::path::Path;

use age::secrecy::ExposeSecret;
use age::x25519::Identity;
use serde::{Deserialize, Serialize};

use crate::error::{GgError, Result};

/// Decrypted secret values
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Secrets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maaza_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_license_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SecretsFile {
    #[serde(default)]
    keys: Secrets,
}

impl Secrets {
    /// Build from prompt answers; empty answers become `None`.
    pub fn from_answers(claude: &str, openai: &str, maaza: &str, license: &str) -> Self {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            claude_api_key: non_empty(claude),
            openai_api_key: non_empty(openai),
            maaza_api_key: non_empty(maaza),
            pro_license_key: non_empty(license),
        }
    }

    /// Encrypt to the identity's own recipient and write to `path`.
    pub fn encrypt_to(&self, path: &Path, identity: &Identity) -> Result<()> {
        let plaintext = toml::to_string(&SecretsFile { keys: self.clone() })?;
        let ciphertext = age::encrypt(&identity.to_public(), plaintext.as_bytes())
            .map_err(|e| GgError::Secrets(format!("Failed to encrypt secrets: {}", e)))?;
        write_private(path, &ciphertext)
    }

    /// Read and decrypt `path` with `identity`.
    pub fn decrypt_from(path: &Path, identity: &Identity) -> Result<Self> {
        let ciphertext = std::fs::read(path)
            .map_err(|e| GgError::Secrets(format!("secrets file not readable: {}", e)))?;
        let plaintext = age::decrypt(identity, &ciphertext)
            .map_err(|e| GgError::Secrets(format!("Failed to decrypt secrets: {}", e)))?;
        let text = String::from_utf8(plaintext)
            .map_err(|_| GgError::Secrets("secrets file is not valid UTF-8".to_string()))?;
        let file: SecretsFile = toml::from_str(&text)?;
        Ok(file.keys)
    }
}

/// Generate a fresh X25519 identity.
pub fn generate_identity() -> Identity {
    Identity::generate()
}

/// Write the identity to `path` with owner-only permissions.
pub fn write_identity(path: &Path, identity: &Identity) -> Result<()> {
    let encoded = identity.to_string();
    write_private(path, encoded.expose_secret().as_bytes())
}

/// Read an identity written by [`write_identity`].
pub fn read_identity(path: &Path) -> Result<Identity> {
    let data = std::fs::read_to_string(path)
        .map_err(|_| GgError::Secrets("encryption key not found".to_string()))?;
    data.trim()
        .parse::<Identity>()
        .map_err(|e| GgError::Secrets(format!("invalid encryption key: {}", e)))
}

fn write_private(path: &Path, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    Ok(())
}
