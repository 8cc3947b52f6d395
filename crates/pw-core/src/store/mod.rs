//! Durable status store for tracked shipments
//!
//! The store is a single JSON document mapping tracking numbers to their
//! last-known status. It is the sole source of truth for "has this status
//! already been notified". Key properties:
//!
//! - **Fresh-install friendly**: a missing or unreadable file loads as an
//!   empty store, never an error
//! - **Atomic save**: write-to-temp, fsync, rename-over, so a crash
//!   mid-write cannot destroy previously known statuses
//! - **No-op detection**: BLAKE3 content hashing skips the rewrite when a
//!   pass changed nothing
//! - **Insertion order**: items list in the order they were added, for
//!   reproducible passes

pub mod error;
pub mod lock;

pub use error::StoreError;
pub use lock::{acquire_lock, StoreLock};

use crate::courier::infer_courier;
use crate::schema::{StoreFile, TrackedItem};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// In-memory handle over the durable store document
#[derive(Debug)]
pub struct StatusStore {
    path: PathBuf,
    file: StoreFile,
    loaded_hash: Option<blake3::Hash>,
}

impl StatusStore {
    /// Load the store from `path`
    ///
    /// Missing or unreadable files yield an empty store: a fresh install
    /// has no file yet, and a corrupt file must not block the run. Both
    /// cases are logged; the corrupt case means next pass re-notifies
    /// current statuses, which beats never running again.
    pub fn load(path: &Path) -> Self {
        let (file, loaded_hash) = match fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<StoreFile>(&bytes) {
                Ok(file) => (file, Some(blake3::hash(&bytes))),
                Err(e) => {
                    warn!("Unreadable store file at {path:?}, starting empty: {e}");
                    (StoreFile::default(), None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No store file at {path:?}, starting empty");
                (StoreFile::default(), None)
            }
            Err(e) => {
                warn!("Could not read store file at {path:?}, starting empty: {e}");
                (StoreFile::default(), None)
            }
        };

        let mut store = Self {
            path: path.to_path_buf(),
            file,
            loaded_hash,
        };
        store.backfill_couriers();
        store
    }

    /// Fill in couriers for entries from legacy files that predate the
    /// courier field, using the identifier-shape heuristic.
    fn backfill_couriers(&mut self) {
        for item in &mut self.file.packages {
            if item.courier.is_empty() {
                item.courier = infer_courier(&item.number).to_string();
                debug!(
                    "Inferred courier '{}' for legacy entry {}",
                    item.courier, item.number
                );
            }
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the advisory lock file guarding this store
    pub fn lock_path(path: &Path) -> PathBuf {
        let mut os = path.as_os_str().to_os_string();
        os.push(".lock");
        PathBuf::from(os)
    }

    /// Look up an item by tracking number
    pub fn get(&self, number: &str) -> Option<&TrackedItem> {
        self.file.packages.iter().find(|i| i.number == number)
    }

    /// Insert or overwrite the entry for `item.number`
    ///
    /// An existing entry keeps its position in the list; a new one is
    /// appended.
    pub fn upsert(&mut self, item: TrackedItem) {
        match self
            .file
            .packages
            .iter_mut()
            .find(|i| i.number == item.number)
        {
            Some(existing) => *existing = item,
            None => self.file.packages.push(item),
        }
    }

    /// Delete the entry for `number`; returns whether it was present
    pub fn remove(&mut self, number: &str) -> bool {
        let before = self.file.packages.len();
        self.file.packages.retain(|i| i.number != number);
        self.file.packages.len() != before
    }

    /// All tracked items in insertion order
    pub fn list_all(&self) -> &[TrackedItem] {
        &self.file.packages
    }

    /// Number of tracked items
    pub fn len(&self) -> usize {
        self.file.packages.len()
    }

    /// Whether the store tracks nothing
    pub fn is_empty(&self) -> bool {
        self.file.packages.is_empty()
    }

    /// RFC 3339 timestamp of the last completed pass, if any
    pub fn last_run(&self) -> Option<&str> {
        self.file.last_run.as_deref()
    }

    /// Record the timestamp of the pass that is about to be persisted
    pub fn set_last_run(&mut self, timestamp: impl Into<String>) {
        self.file.last_run = Some(timestamp.into());
    }

    /// Whether the in-memory document differs from what was loaded
    ///
    /// True for a store whose file does not exist yet, and for legacy
    /// files whose entries were normalized on load.
    pub fn content_changed(&self) -> Result<bool, StoreError> {
        let content = serde_json::to_vec_pretty(&self.file).map_err(|e| StoreError::Json {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(self.loaded_hash != Some(blake3::hash(&content)))
    }

    /// Write the store back to its file
    ///
    /// Serializes the full document, then writes to a sibling `.tmp` file,
    /// fsyncs, and renames over the target. When the serialized content is
    /// byte-identical to what was loaded, the write is skipped entirely.
    /// Returns whether a write happened.
    pub fn save(&self) -> Result<bool, StoreError> {
        let content = serde_json::to_vec_pretty(&self.file).map_err(|e| StoreError::Json {
            path: self.path.clone(),
            source: e,
        })?;

        if self.loaded_hash == Some(blake3::hash(&content)) {
            debug!("Store content unchanged, skipping write to {:?}", self.path);
            return Ok(false);
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut tmp_file = fs::File::create(&tmp_path).map_err(|e| StoreError::Io {
                path: tmp_path.clone(),
                source: e,
            })?;

            tmp_file.write_all(&content).map_err(|e| StoreError::Io {
                path: tmp_path.clone(),
                source: e,
            })?;

            tmp_file.sync_all().map_err(|e| StoreError::Io {
                path: tmp_path.clone(),
                source: e,
            })?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(true)
    }
}
