use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::audio::EncodedArtifact;
use crate::error::{AudioError, Result};

/// What an uploader reports back after storing an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadReceipt {
    pub name: String,
    pub size: u64,
}

/// Destination for finished clips
///
/// `create` takes the artifact by value; the pipeline keeps nothing once it
/// has been handed over.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn create(&self, artifact: EncodedArtifact) -> Result<UploadReceipt>;
}

/// Stores artifacts as files in one directory, never overwriting
#[derive(Debug, Clone)]
pub struct DirectoryUploader {
    root: PathBuf,
}

impl DirectoryUploader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Uploader for DirectoryUploader {
    async fn create(&self, artifact: EncodedArtifact) -> Result<UploadReceipt> {
        let (bytes, name) = artifact.into_parts();
        let name = sanitize_name(&name)?;
        let path = self.root.join(&name);

        tokio::fs::create_dir_all(&self.root).await?;

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(AudioError::UploadConflict(name));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(&bytes).await?;
        file.flush().await?;

        tracing::info!(name = %name, size = bytes.len(), root = %self.root.display(), "clip stored");

        Ok(UploadReceipt {
            name,
            size: bytes.len() as u64,
        })
    }
}

/// Reduce a name to a safe single path component
///
/// Keeps only the last `/`-separated part and rejects anything that could
/// still escape the target directory.
pub fn sanitize_name(name: &str) -> Result<String> {
    let trimmed = name.trim().trim_end_matches('/');
    let base = trimmed.rsplit('/').next().unwrap_or_default();

    if base.is_empty() || base == "." {
        return Err(AudioError::InvalidName(name.to_string()));
    }
    if base.contains("..") || base.contains('\\') {
        return Err(AudioError::InvalidName(name.to_string()));
    }
    Ok(base.to_string())
}
