//! File-backed local storage.
//!
//! All keys live in one JSON object at `<data_dir>/storage.json`. Every write
//! goes to a temp file in the same directory which is then renamed over the
//! original, so a crash mid-write leaves the previous contents intact.
//!
//! The file is the only copy. Reads go to disk and writes re-read the file
//! before applying their change, so values written by another process on
//! the same data directory (the `eb-cli` tool) are kept rather than replaced
//! with a stale in-memory map.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use eggbucket_core::{LocalStorage, StorageError};

const STORAGE_FILE: &str = "storage.json";

type Values = BTreeMap<String, String>;

/// Local storage persisted to a JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Open (or create) the storage file in `data_dir`.
    ///
    /// A file that cannot be parsed is moved aside to `storage.json.corrupt`
    /// and storage starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be read.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir)?;
        let storage = Self {
            path: data_dir.join(STORAGE_FILE),
            lock: Mutex::new(()),
        };
        storage.load()?;
        Ok(storage)
    }

    /// Path of the storage file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current file. Missing means empty; unparsable is moved aside.
    fn load(&self) -> Result<Values, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Values::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Values::new());
        }

        match serde_json::from_str(&raw) {
            Ok(values) => Ok(values),
            Err(e) => {
                let aside = self.path.with_extension("json.corrupt");
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    "Local storage file is corrupt, starting empty"
                );
                fs::rename(&self.path, &aside)?;
                Ok(Values::new())
            }
        }
    }

    fn write_atomic(&self, values: &Values) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec_pretty(values)?;
        // Per process, so two writers never share a temp file.
        let tmp = self
            .path
            .with_extension(format!("json.{}.tmp", std::process::id()));

        let mut file = fs::File::create(&tmp)?;
        file.write_all(&encoded)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, mutate: impl FnOnce(&mut Values) -> bool) -> Result<(), StorageError> {
        let _guard = self.lock.lock()?;
        let mut values = self.load()?;
        if mutate(&mut values) {
            self.write_atomic(&values)?;
        }
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock()?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|values| {
            values.insert(key.to_owned(), value.to_owned());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|values| values.remove(key).is_some())
    }
}
