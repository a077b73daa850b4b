//! File-backed record source.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use vision_core::error::{Error, InvalidInputError};
use vision_core::traits::RecordSource;
use vision_core::{ApiUrl, Record, ResourcePath, Result, checked_page_size};

use crate::store::FileStore;

/// A [`RecordSource`] that reads collections from a [`FileStore`].
///
/// Paging parameters are validated and otherwise ignored; the whole stored
/// collection is returned. Timeouts do not apply.
#[derive(Debug, Clone)]
pub struct FileSource {
    store: FileStore,
    url: ApiUrl,
}

impl FileSource {
    /// Create a source rooted at `root`, reporting `url` as its location.
    pub fn new(root: impl AsRef<Path>, url: ApiUrl) -> Self {
        Self {
            store: FileStore::new(root),
            url,
        }
    }

    /// Open the store a `file://` URL points at.
    pub fn open(url: ApiUrl) -> Result<Self> {
        let root = url.to_file_path().ok_or_else(|| {
            Error::InvalidInput(InvalidInputError::ApiUrl {
                value: url.to_string(),
                reason: "file source requires a file:// URL".to_string(),
            })
        })?;
        Ok(Self::new(root, url))
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Records for one explicit path: its own file if saved, otherwise the
    /// record in the parent collection whose `id` matches the last segment.
    fn resolve(&self, path: &ResourcePath) -> Result<Vec<Record>> {
        if let Some(records) = self.store.load_existing(path)? {
            return Ok(records);
        }

        let Some(parent) = path.parent() else {
            return Ok(Vec::new());
        };

        let id = path.last_segment();
        let records = self
            .store
            .load(&parent)?
            .into_iter()
            .filter(|record| record.id().as_deref() == Some(id))
            .collect();
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for FileSource {
    fn url(&self) -> &ApiUrl {
        &self.url
    }

    #[instrument(skip(self), fields(%path))]
    async fn fetch_all(
        &self,
        path: &ResourcePath,
        page_size: u32,
        _timeout: Duration,
    ) -> Result<Vec<Record>> {
        checked_page_size(page_size)?;
        self.store.load(path)
    }

    #[instrument(skip(self, paths), fields(paths = paths.len()))]
    async fn fetch_paths(
        &self,
        paths: &[ResourcePath],
        _timeout: Duration,
    ) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for path in paths {
            match self.resolve(path) {
                Ok(found) => {
                    if found.is_empty() {
                        debug!(%path, "No stored records");
                    }
                    records.extend(found);
                }
                Err(err) => warn!(%path, error = %err, "Read failed, contributing no records"),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn path(s: &str) -> ResourcePath {
        ResourcePath::new(s).unwrap()
    }

    fn source(dir: &TempDir) -> FileSource {
        let url = ApiUrl::new(format!("file://{}", dir.path().display())).unwrap();
        FileSource::open(url).unwrap()
    }

    fn seed_cameras(source: &FileSource) {
        source
            .store()
            .save(
                &path("/cameras"),
                &[
                    Record::new(json!({"id": "a", "latitude": 1.0})),
                    Record::new(json!({"id": "b", "latitude": 2.0})),
                    Record::new(json!({"id": 7, "latitude": 3.0})),
                ],
            )
            .unwrap();
    }

    #[test]
    fn open_rejects_network_url() {
        let url = ApiUrl::new("https://vision.example.org").unwrap();
        assert!(FileSource::open(url).is_err());
    }

    #[tokio::test]
    async fn fetch_all_returns_whole_collection() {
        let dir = TempDir::new().unwrap();
        let source = source(&dir);
        seed_cameras(&source);

        let records = source
            .fetch_all(&path("/cameras"), 1, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn fetch_all_rejects_zero_page_size() {
        let dir = TempDir::new().unwrap();
        let source = source(&dir);
        let err = source
            .fetch_all(&path("/cameras"), 0, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn fetch_paths_falls_back_to_parent_by_id() {
        let dir = TempDir::new().unwrap();
        let source = source(&dir);
        seed_cameras(&source);

        let records = source
            .fetch_paths(
                &[path("/cameras/b"), path("/cameras/7"), path("/cameras/missing")],
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        let ids: Vec<_> = records.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec!["b", "7"]);
    }

    #[tokio::test]
    async fn fetch_paths_prefers_own_file() {
        let dir = TempDir::new().unwrap();
        let source = source(&dir);
        seed_cameras(&source);
        source
            .store()
            .save(
                &path("/cameras/a"),
                &[Record::new(json!({"id": "a", "detail": true}))],
            )
            .unwrap();

        let records = source
            .fetch_paths(&[path("/cameras/a")], Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("detail"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn unreadable_path_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        let source = source(&dir);
        seed_cameras(&source);
        std::fs::write(dir.path().join("objects.json"), "{broken").unwrap();

        let records = source
            .fetch_paths(
                &[path("/objects"), path("/cameras/a")],
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
    }
}
