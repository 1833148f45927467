//! Repository push interface
//!
//! The host's storage collaborator, specified at its interface boundary.
//! Records are pushed once per page/batch so the engine never buffers a
//! whole collection, and a crash mid-pagination loses at most one unflushed
//! page.

use crate::error::{Error, Result};
use crate::normalize::NormalizedRecord;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// Stream of attachment body chunks
pub type ByteStream =
    Pin<Box<dyn Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send>>;

/// Host-side storage for normalized records and attachment binaries
#[async_trait]
pub trait Repository: Send + Sync {
    /// Push a batch of normalized records for one item type
    async fn push(&self, item_type: &str, records: Vec<NormalizedRecord>) -> Result<()>;

    /// Read back previously pushed records of one item type
    async fn stored(&self, item_type: &str) -> Result<Vec<NormalizedRecord>>;

    /// Store the streamed binary of one attachment
    async fn upload_attachment(&self, record: &NormalizedRecord, body: ByteStream) -> Result<()>;
}

// ============================================================================
// In-memory repository
// ============================================================================

/// In-memory repository, used by tests and local runs
#[derive(Default)]
pub struct MemoryRepository {
    records: Mutex<HashMap<String, Vec<NormalizedRecord>>>,
    uploads: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Records pushed for an item type
    pub async fn records(&self, item_type: &str) -> Vec<NormalizedRecord> {
        self.records
            .lock()
            .await
            .get(item_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Uploaded binary for an attachment id
    pub async fn uploaded(&self, attachment_id: &str) -> Option<Vec<u8>> {
        self.uploads.lock().await.get(attachment_id).cloned()
    }

    /// Ids of every uploaded attachment
    pub async fn uploaded_ids(&self) -> Vec<String> {
        self.uploads.lock().await.keys().cloned().collect()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn push(&self, item_type: &str, records: Vec<NormalizedRecord>) -> Result<()> {
        self.records
            .lock()
            .await
            .entry(item_type.to_string())
            .or_default()
            .extend(records);
        Ok(())
    }

    async fn stored(&self, item_type: &str) -> Result<Vec<NormalizedRecord>> {
        Ok(self.records(item_type).await)
    }

    async fn upload_attachment(&self, record: &NormalizedRecord, body: ByteStream) -> Result<()> {
        use futures::StreamExt;

        let mut buf = Vec::new();
        let mut body = body;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(Error::Http)?;
            buf.extend_from_slice(&chunk);
        }
        self.uploads.lock().await.insert(record.id.clone(), buf);
        Ok(())
    }
}

// ============================================================================
// JSONL repository
// ============================================================================

/// File-backed repository: one append-only JSONL file per item type, plus a
/// directory of attachment binaries
///
/// Good enough for a single host-serialized invocation; the host guarantees
/// no concurrent invocations share a sync.
pub struct JsonlRepository {
    dir: PathBuf,
}

impl JsonlRepository {
    /// Create a repository rooted at `dir` (created if missing)
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn file_for(&self, item_type: &str) -> PathBuf {
        self.dir.join(format!("{item_type}.jsonl"))
    }
}

#[async_trait]
impl Repository for JsonlRepository {
    async fn push(&self, item_type: &str, records: Vec<NormalizedRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut lines = String::new();
        for record in &records {
            lines.push_str(&serde_json::to_string(record)?);
            lines.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(item_type))
            .await?;
        file.write_all(lines.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn stored(&self, item_type: &str) -> Result<Vec<NormalizedRecord>> {
        let path = self.file_for(item_type);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let contents = tokio::fs::read_to_string(&path).await?;
        let lines: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();
        let mut records = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                // A torn trailing line is what an interrupted mid-batch
                // write leaves behind; the record is re-pushed on retry.
                Err(err) if index + 1 == lines.len() => {
                    warn!("dropping torn trailing line in {item_type}.jsonl: {err}");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(records)
    }

    async fn upload_attachment(&self, record: &NormalizedRecord, body: ByteStream) -> Result<()> {
        use futures::StreamExt;

        let blob_dir = self.dir.join("attachments");
        tokio::fs::create_dir_all(&blob_dir).await?;

        let mut file = tokio::fs::File::create(blob_dir.join(&record.id)).await?;
        let mut body = body;
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(Error::Http)?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}
