use crate::config::Config;
use crate::models::AppState;
use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Fixed name of the single slot the whole state lives in
pub const STATE_FILE_NAME: &str = "bundle-app-state.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine a data directory")]
    NoDataDir,

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        StorageError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What reading the state slot found
#[derive(Debug, Clone, PartialEq)]
pub enum SlotContents {
    Loaded(AppState),
    /// Nothing was saved, or the unusable contents were copied aside
    Empty,
    /// The slot exists but could be neither read nor copied
    Locked,
}

/// Storage Manager for the persisted application state
#[derive(Debug, Clone)]
pub struct StorageManager {
    data_dir: PathBuf,
    state_file: PathBuf,
    pretty: bool,
}

impl StorageManager {
    /// Resolve the data directory from the config and make sure it exists
    pub fn new(config: &Config) -> Result<Self, StorageError> {
        let data_dir = config.data_dir().ok_or(StorageError::NoDataDir)?;
        let mut storage = Self::with_dir(data_dir)?;
        storage.pretty = config.pretty_state;
        Ok(storage)
    }

    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .map_err(|e| StorageError::io("failed to create", &data_dir, e))?;

        Ok(Self {
            state_file: data_dir.join(STATE_FILE_NAME),
            data_dir,
            pretty: true,
        })
    }

    /// Load the saved state.
    ///
    /// `None` means nothing usable is stored. See `read_slot` for how an
    /// unreadable slot is handled.
    pub fn load(&self) -> Option<AppState> {
        match self.read_slot() {
            SlotContents::Loaded(state) => Some(state),
            SlotContents::Empty | SlotContents::Locked => None,
        }
    }

    /// Read the slot and say whether it may be overwritten.
    ///
    /// Any slot that exists but cannot be used (bad UTF-8, bad JSON, an I/O
    /// error) is copied aside first. If even the copy fails the slot is
    /// reported as `Locked` and must be left alone.
    pub fn read_slot(&self) -> SlotContents {
        let content = match fs::read(&self.state_file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return SlotContents::Empty,
            Err(e) => {
                warn!(path = %self.state_file.display(), error = %e, "Failed to read saved state");
                return self.set_aside();
            }
        };

        match serde_json::from_slice(&content) {
            Ok(state) => SlotContents::Loaded(state),
            Err(e) => {
                warn!(
                    path = %self.state_file.display(),
                    error = %e,
                    "Saved state is corrupt, starting fresh"
                );
                self.set_aside()
            }
        }
    }

    fn set_aside(&self) -> SlotContents {
        match self.quarantine_corrupt() {
            Ok(path) => {
                warn!(path = %path.display(), "Kept a copy of the unusable state");
                SlotContents::Empty
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to keep a copy of the unusable state, leaving it in place"
                );
                SlotContents::Locked
            }
        }
    }

    /// Replace the stored state with `state`.
    ///
    /// The new content goes to a sibling temp file that is then renamed over
    /// the slot, so a reader sees either the old value or the new one.
    pub fn save(&self, state: &AppState) -> Result<(), StorageError> {
        let content = if self.pretty {
            serde_json::to_string_pretty(state)?
        } else {
            serde_json::to_string(state)?
        };

        let tmp_file = self.state_file.with_extension("json.tmp");
        fs::write(&tmp_file, content)
            .map_err(|e| StorageError::io("failed to write", &tmp_file, e))?;
        fs::rename(&tmp_file, &self.state_file)
            .map_err(|e| StorageError::io("failed to replace", &self.state_file, e))?;

        debug!(path = %self.state_file.display(), links = state.links.len(), "Saved state");
        Ok(())
    }

    /// Backup the state slot to a timestamped file
    pub fn backup(&self) -> Result<PathBuf, StorageError> {
        let backup_dir = self.data_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| StorageError::io("failed to create", &backup_dir, e))?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let backup_file = backup_dir.join(format!("backup_{}.json", timestamp));

        fs::copy(&self.state_file, &backup_file)
            .map_err(|e| StorageError::io("failed to copy", &self.state_file, e))?;

        Ok(backup_file)
    }

    fn quarantine_corrupt(&self) -> Result<PathBuf, StorageError> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let target = self
            .data_dir
            .join(format!("bundle-app-state.corrupt-{}.json", timestamp));

        fs::copy(&self.state_file, &target)
            .map_err(|e| StorageError::io("failed to copy", &self.state_file, e))?;
        Ok(target)
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_dir
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }
}
