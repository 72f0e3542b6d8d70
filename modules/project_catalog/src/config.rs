//! Configuration for the project catalog module

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Project catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory uploaded files are written under
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,

    /// Maximum upload size in bytes
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,

    /// HMAC secret for bearer tokens; no default, must be configured
    #[serde(default)]
    pub token_secret: String,

    /// Bearer token lifetime
    #[serde(default = "default_token_ttl", with = "humantime_serde")]
    pub token_ttl: Duration,

    /// PBKDF2 iterations for new password hashes
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
            max_upload_size: default_max_upload_size(),
            token_secret: String::new(),
            token_ttl: default_token_ttl(),
            password_iterations: default_password_iterations(),
        }
    }
}

/// Shortest accepted `token_secret`, in bytes (HS256 key size)
pub const MIN_TOKEN_SECRET_LEN: usize = 32;

impl Config {
    /// Reject settings the module cannot run with
    pub fn validate(&self) -> Result<()> {
        let secret = self.token_secret.trim();
        ensure!(
            !secret.is_empty(),
            "catalog.token_secret is not set (use CATALOG__CATALOG__TOKEN_SECRET)"
        );
        ensure!(
            secret.len() >= MIN_TOKEN_SECRET_LEN,
            "catalog.token_secret must be at least {MIN_TOKEN_SECRET_LEN} bytes"
        );
        ensure!(self.max_upload_size > 0, "catalog.max_upload_size must be positive");
        ensure!(self.password_iterations > 0, "catalog.password_iterations must be positive");
        Ok(())
    }
}

fn default_media_root() -> PathBuf {
    PathBuf::from("media")
}

fn default_max_upload_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_token_ttl() -> Duration {
    Duration::from_secs(7 * 24 * 60 * 60)
}

fn default_password_iterations() -> u32 {
    260_000
}
