//! Per-level progress records
//!
//! One record per level id (`level_{n}`): best score, best stars, unlocked.
//! Stores persist a whole `ProgressBook` under a mode's storage key, so
//! every mode keeps its own records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring;

/// Errors from a progress store
#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Failed to access progress file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt progress data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Storage(String),
}

/// Stored record for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelProgress {
    pub score: u64,
    pub stars: u8,
    pub unlocked: bool,
}

/// A finished-round result to record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressRecord {
    pub score: u64,
    pub stars: u8,
}

/// Storage id for a level number
pub fn level_key(level: u32) -> String {
    format!("level_{}", level)
}

/// Progress for every level of one mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressBook {
    levels: BTreeMap<String, LevelProgress>,
}

impl ProgressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for a level id; level 1 is always unlocked
    pub fn get(&self, level_id: &str) -> LevelProgress {
        let mut progress = self.levels.get(level_id).copied().unwrap_or_default();
        if level_id == level_key(1) {
            progress.unlocked = true;
        }
        progress
    }

    pub fn level(&self, level: u32) -> LevelProgress {
        self.get(&level_key(level))
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        self.level(level).unlocked
    }

    /// Merge a result into the stored record (keeping the best of each)
    pub fn record(&mut self, level_id: &str, record: ProgressRecord) -> LevelProgress {
        let merged = scoring::merge_progress(&self.get(level_id), record.score, record.stars);
        self.levels.insert(level_id.to_string(), merged);
        merged
    }

    pub fn unlock(&mut self, level_id: &str) {
        self.levels.entry(level_id.to_string()).or_default().unlocked = true;
    }

    /// Sum of best stars across levels
    pub fn total_stars(&self) -> u32 {
        self.levels.values().map(|p| p.stars as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

/// Persistence collaborator
///
/// Implementors hold a `ProgressBook` and write it out on `flush`; the
/// load/save/unlock operations are provided on top of that.
pub trait ProgressStore {
    fn book(&self) -> &ProgressBook;
    fn book_mut(&mut self) -> &mut ProgressBook;
    /// Write the book to the backing storage
    fn flush(&mut self) -> Result<(), ProgressError>;

    fn load_progress(&self, level_id: &str) -> LevelProgress {
        self.book().get(level_id)
    }

    /// Record a result (best-of merge) and persist it
    fn save_progress(&mut self, level_id: &str, record: ProgressRecord) -> Result<LevelProgress, ProgressError> {
        let merged = self.book_mut().record(level_id, record);
        self.flush()?;
        Ok(merged)
    }

    fn unlock(&mut self, level_id: &str) -> Result<(), ProgressError> {
        self.book_mut().unlock(level_id);
        self.flush()
    }
}

/// In-memory store (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    book: ProgressBook,
    /// Number of flushes, for observing write behaviour
    pub flushes: u32,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn book(&self) -> &ProgressBook {
        &self.book
    }

    fn book_mut(&mut self) -> &mut ProgressBook {
        &mut self.book
    }

    fn flush(&mut self) -> Result<(), ProgressError> {
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileProgressStore;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::{ProgressBook, ProgressError, ProgressStore};
    use crate::levels::Mode;

    /// JSON file store (native), one document per mode storage key
    ///
    /// Writes go to a temp file first and are renamed over the real one.
    #[derive(Debug, Clone)]
    pub struct JsonFileProgressStore {
        path: PathBuf,
        book: ProgressBook,
    }

    impl JsonFileProgressStore {
        /// Open the document for `key` (`{dir}/{key}.json`) in a progress directory
        pub fn open(dir: impl AsRef<Path>, key: &str) -> Result<Self, ProgressError> {
            let dir = dir.as_ref();
            fs::create_dir_all(dir)?;
            Self::open_file(dir.join(format!("{}.json", key)))
        }

        /// Open a mode's progress document in `dir`
        pub fn for_mode(dir: impl AsRef<Path>, mode: Mode) -> Result<Self, ProgressError> {
            Self::open(dir, mode.storage_key())
        }

        /// Open a progress file; a missing file starts an empty book
        pub fn open_file(path: impl AsRef<Path>) -> Result<Self, ProgressError> {
            let path = path.as_ref().to_path_buf();
            let book = if path.exists() {
                let json = fs::read_to_string(&path)?;
                let book: ProgressBook = serde_json::from_str(&json)?;
                log::info!("Loaded progress from {}", path.display());
                book
            } else {
                log::info!("No progress at {}, starting fresh", path.display());
                ProgressBook::new()
            };
            Ok(Self { path, book })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl ProgressStore for JsonFileProgressStore {
        fn book(&self) -> &ProgressBook {
            &self.book
        }

        fn book_mut(&mut self) -> &mut ProgressBook {
            &mut self.book
        }

        fn flush(&mut self) -> Result<(), ProgressError> {
            let json = serde_json::to_string_pretty(&self.book)?;
            let tmp = self.path.with_extension("tmp");
            fs::write(&tmp, json)?;
            fs::rename(&tmp, &self.path)?;
            log::info!("Progress saved to {}", self.path.display());
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageProgressStore;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{ProgressBook, ProgressError, ProgressStore};
    use crate::levels::Mode;

    /// LocalStorage store (wasm32), one JSON document per storage key
    #[derive(Debug, Clone)]
    pub struct LocalStorageProgressStore {
        key: String,
        book: ProgressBook,
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }

    impl LocalStorageProgressStore {
        /// Load progress stored under `key`; missing or corrupt data starts fresh
        pub fn load(key: &str) -> Self {
            let book = storage()
                .and_then(|s| s.get_item(key).ok().flatten())
                .and_then(|json| match serde_json::from_str::<ProgressBook>(&json) {
                    Ok(book) => Some(book),
                    Err(e) => {
                        log::warn!("Discarding corrupt progress under {}: {}", key, e);
                        None
                    }
                })
                .unwrap_or_default();
            Self {
                key: key.to_string(),
                book,
            }
        }

        /// Load a mode's progress from its storage key
        pub fn for_mode(mode: Mode) -> Self {
            Self::load(mode.storage_key())
        }
    }

    impl ProgressStore for LocalStorageProgressStore {
        fn book(&self) -> &ProgressBook {
            &self.book
        }

        fn book_mut(&mut self) -> &mut ProgressBook {
            &mut self.book
        }

        fn flush(&mut self) -> Result<(), ProgressError> {
            let storage = storage().ok_or_else(|| ProgressError::Storage("no localStorage".into()))?;
            let json = serde_json::to_string(&self.book)?;
            storage
                .set_item(&self.key, &json)
                .map_err(|e| ProgressError::Storage(format!("{:?}", e)))?;
            log::info!("Progress saved under {}", self.key);
            Ok(())
        }
    }
}
