//! Domain service - business logic orchestration
//!
//! Every operation receives the caller's [`Principal`] and states its own
//! permission check before touching a repository.

mod catalog;
mod projects;
mod users;

use super::credentials::{PasswordHasher, TokenIssuer};
use super::repository::{Repositories, UniqueViolation};
use super::upload::{MediaStorage, UploadKind};
use crate::config::Config;
use crate::contract::{CatalogError, Principal};
use bytes::Bytes;
use chrono::{DateTime, SubsecRound, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Domain service for the project catalog
pub struct Service {
    repos: Repositories,
    media: Arc<dyn MediaStorage>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    max_upload_size: usize,
}

impl Service {
    /// Create a new service instance
    pub fn new(repos: Repositories, media: Arc<dyn MediaStorage>, config: &Config) -> Self {
        Self {
            repos,
            media,
            hasher: PasswordHasher::new(config.password_iterations),
            tokens: TokenIssuer::new(&config.token_secret, config.token_ttl),
            max_upload_size: config.max_upload_size,
        }
    }

    // ===== Credentials =====

    /// Hash on the blocking pool; PBKDF2 must not hold a runtime worker
    async fn hash_password(&self, password: &str) -> Result<String, CatalogError> {
        let hasher = self.hasher;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| CatalogError::internal(e.into()))
    }

    async fn verify_password(&self, password: &str, encoded: String) -> Result<bool, CatalogError> {
        let hasher = self.hasher;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &encoded))
            .await
            .map_err(|e| CatalogError::internal(e.into()))
    }

    // ===== Media =====

    async fn store_media(
        &self,
        kind: UploadKind,
        extension: &str,
        contents: Bytes,
    ) -> Result<String, CatalogError> {
        self.media
            .store(kind, extension, contents)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, ?kind, "failed to store upload");
                CatalogError::Storage {
                    message: "the uploaded file could not be stored".to_string(),
                }
            })
    }

    async fn discard_media(&self, reference: &str) {
        if let Err(e) = self.media.remove(reference).await {
            tracing::warn!(error = ?e, reference, "failed to remove orphaned upload");
        }
    }

    // ===== Reference checks =====

    async fn ensure_application(&self, id: i32) -> Result<(), CatalogError> {
        let found = self
            .repos
            .applications
            .find_by_id(id)
            .await
            .map_err(CatalogError::internal)?;
        match found {
            Some(_) => Ok(()),
            None => Err(invalid_pk("application", id)),
        }
    }

    async fn ensure_tool(&self, id: Option<i32>) -> Result<(), CatalogError> {
        let Some(id) = id else {
            return Ok(());
        };
        let found = self
            .repos
            .tools
            .find_by_id(id)
            .await
            .map_err(CatalogError::internal)?;
        match found {
            Some(_) => Ok(()),
            None => Err(invalid_pk("tool", id)),
        }
    }

    async fn ensure_tags(&self, ids: &[i32]) -> Result<(), CatalogError> {
        if ids.is_empty() {
            return Ok(());
        }
        let wanted: BTreeSet<i32> = ids.iter().copied().collect();
        let wanted: Vec<i32> = wanted.into_iter().collect();
        let found: BTreeSet<i32> = self
            .repos
            .tags
            .find_many(&wanted)
            .await
            .map_err(CatalogError::internal)?
            .into_iter()
            .map(|tag| tag.id)
            .collect();

        match wanted.iter().find(|id| !found.contains(id)) {
            Some(missing) => Err(invalid_pk("tags", *missing)),
            None => Ok(()),
        }
    }
}

fn invalid_pk(field: &str, id: i32) -> CatalogError {
    CatalogError::validation(
        field,
        format!("Invalid pk \"{}\" - object does not exist.", id),
    )
}

/// Current time at the microsecond precision the database keeps
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Map a failed insert/update; unique-index collisions become field errors
fn write_failed(error: anyhow::Error, resource: &str, fields: &[&str]) -> CatalogError {
    match error.downcast_ref::<UniqueViolation>() {
        Some(violation) => {
            tracing::debug!(%violation, resource, "write rejected by unique index");
            already_exists(resource, violation.field(fields))
        }
        None => CatalogError::internal(error),
    }
}

fn already_exists(resource: &str, field: &str) -> CatalogError {
    CatalogError::validation(
        field,
        format!("{} with this {} already exists.", resource, field),
    )
}

/// Caller description for log lines
fn who(principal: &Principal) -> String {
    match principal {
        Principal::Anonymous => "anonymous".to_string(),
        Principal::Authenticated(actor) => format!("user:{}", actor.user_id),
    }
}
