//! Filesystem storage for record collections.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use vision_core::error::{Error, StorageError};
use vision_core::{Record, ResourcePath, Result};

fn map_io(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |err| {
        Error::Storage(StorageError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }
}

fn map_json(path: &Path) -> impl FnOnce(serde_json::Error) -> Error + '_ {
    move |err| {
        Error::Storage(StorageError::Json {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }
}

/// Accepted file contents: a bare array or a saved API page.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCollection {
    List(Vec<Record>),
    Page { items: Vec<Record> },
}

impl StoredCollection {
    fn into_records(self) -> Vec<Record> {
        match self {
            StoredCollection::List(records) => records,
            StoredCollection::Page { items } => items,
        }
    }
}

/// A directory of JSON collection files, one per resource path.
///
/// `/cameras` lives at `<root>/cameras.json` and `/identifications/ai` at
/// `<root>/identifications/ai.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file holding the collection at `path`.
    pub fn collection_path(&self, path: &ResourcePath) -> PathBuf {
        let mut file = self.root.clone();
        let mut segments = path.segments().peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                file.push(segment);
            } else {
                file.push(format!("{}.json", segment));
            }
        }
        file
    }

    fn lock_path(&self) -> PathBuf {
        self.root.join(".store.lock")
    }

    pub fn exists(&self, path: &ResourcePath) -> bool {
        self.collection_path(path).is_file()
    }

    /// Last modification time of a collection file, if it exists.
    pub fn modified(&self, path: &ResourcePath) -> Result<Option<DateTime<Utc>>> {
        let file = self.collection_path(path);
        if !file.is_file() {
            return Ok(None);
        }
        let modified = fs::metadata(&file)
            .and_then(|m| m.modified())
            .map_err(map_io(&file))?;
        Ok(Some(modified.into()))
    }

    /// Load a collection. A missing file is an empty collection.
    #[instrument(skip(self), fields(%path))]
    pub fn load(&self, path: &ResourcePath) -> Result<Vec<Record>> {
        Ok(self.load_existing(path)?.unwrap_or_default())
    }

    /// Load a collection, or `None` if it was never saved.
    pub fn load_existing(&self, path: &ResourcePath) -> Result<Option<Vec<Record>>> {
        let file = self.collection_path(path);
        if !file.is_file() {
            debug!(file = %file.display(), "No stored collection");
            return Ok(None);
        }

        let content = fs::read_to_string(&file).map_err(map_io(&file))?;
        let stored: StoredCollection = serde_json::from_str(&content).map_err(map_json(&file))?;
        let records = stored.into_records();

        debug!(file = %file.display(), records = records.len(), "Loaded collection");
        Ok(Some(records))
    }

    /// Replace a collection with `records`.
    ///
    /// The new content is written to a temporary file and renamed into
    /// place while holding an exclusive lock on the store, so readers see
    /// either the old or the new file and writers never interleave.
    #[instrument(skip(self, records), fields(%path, records = records.len()))]
    pub fn save(&self, path: &ResourcePath, records: &[Record]) -> Result<PathBuf> {
        let file = self.collection_path(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(map_io(parent))?;
        }
        fs::create_dir_all(&self.root).map_err(map_io(&self.root))?;

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(map_io(&lock_path))?;

        lock_file.lock_exclusive().map_err(map_io(&lock_path))?;

        let content = serde_json::to_string_pretty(records).map_err(map_json(&file))?;
        let tmp = file.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        if let Err(err) = replace_file(&tmp, &file, content.as_bytes()) {
            // The temp file may or may not exist depending on where the write failed.
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }

        lock_file.unlock().map_err(map_io(&lock_path))?;

        debug!(file = %file.display(), "Saved collection");
        Ok(file)
    }
}

fn replace_file(tmp: &Path, file: &Path, content: &[u8]) -> Result<()> {
    let mut out = fs::File::create(tmp).map_err(map_io(tmp))?;
    out.write_all(content).map_err(map_io(tmp))?;
    out.sync_data().map_err(map_io(tmp))?;
    drop(out);
    fs::rename(tmp, file).map_err(map_io(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn path(s: &str) -> ResourcePath {
        ResourcePath::new(s).unwrap()
    }

    #[test]
    fn collection_paths() {
        let store = FileStore::new("/data");
        assert_eq!(
            store.collection_path(&path("/cameras")),
            PathBuf::from("/data/cameras.json")
        );
        assert_eq!(
            store.collection_path(&path("/identifications/ai")),
            PathBuf::from("/data/identifications/ai.json")
        );
    }

    #[test]
    fn missing_collection_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load(&path("/cameras")).unwrap().is_empty());
        assert!(store.load_existing(&path("/cameras")).unwrap().is_none());
        assert!(store.modified(&path("/cameras")).unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let records = vec![
            Record::new(json!({"id": "a", "latitude": -22.9, "longitude": -43.2})),
            Record::new(json!({"id": "b", "identifications": []})),
        ];

        let file = store.save(&path("/identifications/ai"), &records).unwrap();
        assert!(file.ends_with("identifications/ai.json"));
        assert!(store.exists(&path("/identifications/ai")));
        assert!(store.modified(&path("/identifications/ai")).unwrap().is_some());
        assert_eq!(store.load(&path("/identifications/ai")).unwrap(), records);
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        store.save(&path("/cameras"), &[]).unwrap();
        store
            .save(&path("/cameras"), &[Record::new(json!({"id": 1}))])
            .unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
        assert_eq!(store.load(&path("/cameras")).unwrap().len(), 1);
    }

    #[test]
    fn failed_save_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        // A non-empty directory where the collection file should go makes the rename fail.
        let blocker = dir.path().join("cameras.json");
        fs::create_dir_all(blocker.join("occupied")).unwrap();

        let records = vec![Record::new(json!({"id": "a"}))];
        let err = store.save(&path("/cameras"), &records).unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Io { .. })));

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {:?}", leftovers);
        assert!(blocker.join("occupied").is_dir());
    }

    #[test]
    fn loads_saved_api_page() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cameras.json"),
            r#"{"total": 2, "items": [{"id": "a"}, {"id": "b"}]}"#,
        )
        .unwrap();

        let store = FileStore::new(dir.path());
        assert_eq!(store.load(&path("/cameras")).unwrap().len(), 2);
    }

    #[test]
    fn invalid_json_is_storage_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cameras.json"), "{not json").unwrap();

        let store = FileStore::new(dir.path());
        let err = store.load(&path("/cameras")).unwrap_err();
        assert!(matches!(err, Error::Storage(StorageError::Json { .. })));
    }
}
