//! Media files on the local filesystem

use crate::domain::upload::{MediaStorage, UploadKind};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Stores uploads as `<root>/uploads/<kind>/<uuid><ext>`
///
/// The returned reference is the path relative to `root`, which is what the
/// entities persist.
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let relative = Path::new(reference);
        let inside_uploads = relative.starts_with("uploads")
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !inside_uploads {
            bail!("media reference {reference:?} is outside the uploads directory");
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(&self, kind: UploadKind, extension: &str, contents: Bytes) -> Result<String> {
        let reference = format!("uploads/{}/{}{}", kind.directory(), Uuid::new_v4(), extension);
        let path = self.resolve(&reference)?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        tokio::fs::write(&path, &contents)
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        tracing::debug!(reference = %reference, size = contents.len(), "stored media file");
        Ok(reference)
    }

    async fn remove(&self, reference: &str) -> Result<()> {
        let path = self.resolve(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }
}
