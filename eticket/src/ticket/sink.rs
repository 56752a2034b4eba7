//! Destinations for finished ticket documents.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Sink errors
#[derive(Error, Debug)]
pub enum SinkError {
    /// File name would escape the output directory
    #[error("invalid document name: {0}")]
    InvalidName(String),

    /// Writing failed
    #[error("failed to write {path}: {source}")]
    Io {
        /// Target path
        path: PathBuf,
        /// Cause
        #[source]
        source: std::io::Error,
    },
}

/// Sink result future
pub type SinkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>>;

/// Receives finished documents (the buyer's "download")
pub trait DocumentSink: Send + Sync {
    /// Store `bytes` under `file_name`
    ///
    /// Either the whole document becomes visible or nothing does.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the document could not be stored.
    fn deliver<'a>(&'a self, file_name: &'a str, bytes: &'a [u8]) -> SinkFuture<'a>;
}

/// Writes documents into a directory
///
/// Bytes go to `<name>.part` first and are renamed into place once flushed.
#[derive(Clone, Debug)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Sink writing into `dir` (created on first delivery)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        if file_name.is_empty()
            || file_name.contains(['/', '\\'])
            || file_name.starts_with('.')
        {
            return Err(SinkError::InvalidName(file_name.to_string()));
        }

        let target = self.dir.join(file_name);
        let partial = self.dir.join(format!("{file_name}.part"));

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SinkError::Io {
                path: self.dir.clone(),
                source,
            })?;
        if let Err(source) = tokio::fs::write(&partial, bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(SinkError::Io {
                path: partial,
                source,
            });
        }
        if let Err(source) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(SinkError::Io {
                path: target,
                source,
            });
        }

        tracing::info!(path = %target.display(), bytes = bytes.len(), "Ticket written");
        Ok(())
    }
}

impl DocumentSink for FileSink {
    fn deliver<'a>(&'a self, file_name: &'a str, bytes: &'a [u8]) -> SinkFuture<'a> {
        Box::pin(self.write(file_name, bytes))
    }
}

/// Keeps delivered documents in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    /// Creates an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered `(file_name, bytes)` pairs, oldest first
    #[must_use]
    pub fn documents(&self) -> Vec<(String, Vec<u8>)> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of delivered documents
    #[must_use]
    pub fn file_names(&self) -> Vec<String> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl DocumentSink for MemorySink {
    fn deliver<'a>(&'a self, file_name: &'a str, bytes: &'a [u8]) -> SinkFuture<'a> {
        Box::pin(async move {
            self.documents
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((file_name.to_string(), bytes.to_vec()));
            Ok(())
        })
    }
}
