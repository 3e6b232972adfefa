/// JSON file backend
///
/// Each collection is one file holding a top-level JSON array of records:
///
/// ```json
/// [
///   { "id": 1, "nome": "Ana Silva", "email": "ana@x.com" }
/// ]
/// ```
///
/// # Read Semantics
///
/// | File state | Result |
/// |---|---|
/// | missing | empty collection |
/// | empty or whitespace only | empty collection |
/// | anything but an array of records | [`StoreError::Corrupt`] |
///
/// A corrupt file is reported instead of being treated as empty, so a bad
/// file is never silently overwritten by the next write.
///
/// # Write Semantics
///
/// Records are written pretty-printed to a sibling `*.tmp` file which is then
/// renamed over the target. Missing parent directories are created.
///
/// # Id Sequence
///
/// The highest id ever issued is kept in a sibling `*.seq` file (e.g.
/// `tasks.json.seq`) holding a single integer, so ids freed by deletions stay
/// retired across restarts. A missing or blank sequence file counts as 0.

use super::{Backend, Collection, Record, StoreError, StoreResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Backend storing a collection in one JSON file
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sequence file next to the collection file
    pub fn seq_path(&self) -> PathBuf {
        sibling(&self.path, ".seq")
    }

    async fn write_atomic(&self, path: &Path, bytes: Vec<u8>) -> StoreResult<()> {
        let io_error = |source: std::io::Error| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let temp = sibling(path, ".tmp");
        tokio::fs::write(&temp, bytes).await.map_err(io_error)?;
        tokio::fs::rename(&temp, path).await.map_err(io_error)?;
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Reads `path`, treating a missing or blank file as `None`
async fn read_present(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(None),
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[async_trait]
impl<T: Record> Backend<T> for JsonFile {
    async fn read(&self) -> StoreResult<Vec<T>> {
        let Some(bytes) = read_present(&self.path).await? else {
            tracing::debug!(path = %self.path.display(), "collection file absent or blank, starting empty");
            return Ok(Vec::new());
        };

        serde_json::from_slice(&bytes).map_err(|source| {
            tracing::error!(
                path = %self.path.display(),
                collection = T::COLLECTION,
                error = %source,
                "collection file is corrupt"
            );
            StoreError::Corrupt {
                path: self.path.clone(),
                collection: T::COLLECTION,
                source,
            }
        })
    }

    async fn write(&self, records: &[T]) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(records).map_err(|source| StoreError::Encode {
            collection: T::COLLECTION,
            source,
        })?;

        self.write_atomic(&self.path, json).await
    }

    async fn read_high_water(&self) -> StoreResult<i64> {
        let path = self.seq_path();
        let Some(bytes) = read_present(&path).await? else {
            return Ok(0);
        };

        serde_json::from_slice(&bytes).map_err(|source| {
            tracing::error!(path = %path.display(), error = %source, "id sequence file is corrupt");
            StoreError::Corrupt {
                path,
                collection: T::COLLECTION,
                source,
            }
        })
    }

    async fn write_high_water(&self, id: i64) -> StoreResult<()> {
        self.write_atomic(&self.seq_path(), id.to_string().into_bytes())
            .await
    }
}

impl<T: Record> Collection<T, JsonFile> {
    /// Collection persisted at `path`; the file is created on first write
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self::new(JsonFile::new(path))
    }
}
