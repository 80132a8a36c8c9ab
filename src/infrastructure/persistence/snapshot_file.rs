//! Whole-state snapshot file used by the file-backed repository.
//!
//! The file holds two JSON objects, one per line: short code to original URL,
//! then short code to deleted flag. Every mutation truncates the file and writes
//! both objects again, so each write costs O(n) in the number of stored codes.

use std::collections::BTreeMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

use crate::error::StorageError;

/// Decoded contents of a snapshot file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SnapshotData {
    pub urls: BTreeMap<String, String>,
    pub deleted: BTreeMap<String, bool>,
}

impl SnapshotData {
    /// Parses snapshot bytes.
    ///
    /// An empty file is an empty store. A file holding only the URL object loads
    /// with every deleted flag unset.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] on malformed content.
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let mut stream = serde_json::Deserializer::from_slice(bytes).into_iter::<Value>();

        let urls: BTreeMap<String, String> = match stream.next() {
            Some(value) => serde_json::from_value(value?)?,
            None => return Ok(Self::default()),
        };

        let mut deleted: BTreeMap<String, bool> = match stream.next() {
            Some(value) => serde_json::from_value(value?)?,
            None => BTreeMap::new(),
        };
        deleted.retain(|code, _| urls.contains_key(code));

        Ok(Self { urls, deleted })
    }

    /// Renders the two-line snapshot layout.
    pub fn encode(
        urls: &BTreeMap<String, String>,
        deleted: &BTreeMap<String, bool>,
    ) -> Result<Vec<u8>, StorageError> {
        let mut buf = serde_json::to_vec(urls)?;
        buf.push(b'\n');
        serde_json::to_writer(&mut buf, deleted)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// Open handle to the snapshot file.
#[derive(Debug)]
pub struct SnapshotFile {
    file: File,
    path: PathBuf,
}

impl SnapshotFile {
    /// Opens (or creates) the snapshot at `path` and loads its contents.
    pub async fn open(path: impl AsRef<Path>) -> Result<(Self, SnapshotData), StorageError> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).await?;
        let data = SnapshotData::decode(&bytes)?;

        debug!(path = %path.display(), codes = data.urls.len(), "Snapshot loaded");

        Ok((Self { file, path }, data))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file contents with the given tables.
    pub async fn rewrite(
        &mut self,
        urls: &BTreeMap<String, String>,
        deleted: &BTreeMap<String, bool>,
    ) -> Result<(), StorageError> {
        let buf = SnapshotData::encode(urls, deleted)?;

        self.file.set_len(0).await?;
        self.file.seek(SeekFrom::Start(0)).await?;
        self.file.write_all(&buf).await?;
        self.file.flush().await?;

        Ok(())
    }

    /// Flushes pending writes to disk.
    pub async fn sync(&mut self) -> Result<(), StorageError> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        Ok(())
    }
}
