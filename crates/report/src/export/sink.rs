use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use crate::error::SinkError;

/// Destination for a finished export file.
///
/// The driver hands over the final document in one piece; partial or failed
/// exports never reach a sink.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn deliver(&self, filename: &str, content: &str) -> Result<(), SinkError>;
}

/// Writes export files into a fixed directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadSink for FileSink {
    async fn deliver(&self, filename: &str, content: &str) -> Result<(), SinkError> {
        if filename.contains(['/', '\\']) {
            return Err(SinkError::InvalidFilename(filename.to_string()));
        }
        let path = self.dir.join(filename);
        tokio::fs::write(&path, content).await?;
        info!(
            target: "export",
            path = %path.display(),
            bytes = content.len(),
            "export file written"
        );
        Ok(())
    }
}

/// Collects deliveries in memory, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    delivered: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(filename, content)` pair delivered so far.
    #[must_use]
    pub fn delivered(&self) -> Vec<(String, String)> {
        self.delivered
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DownloadSink for MemorySink {
    async fn deliver(&self, filename: &str, content: &str) -> Result<(), SinkError> {
        let mut delivered = self
            .delivered
            .lock()
            .map_err(|e| SinkError::Delivery(e.to_string()))?;
        delivered.push((filename.to_string(), content.to_string()));
        Ok(())
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
