//! Persistence module.
//! Reads and writes the notification JSON file and owns the editing session:
//! the document, the path it came from and whether it has unsaved changes.
//! Writes overwrite the target in place; there is no temp-file swap.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{EditorError, Result};
use crate::model::Configuration;

pub const APP_TITLE: &str = "RwG DayZ Expansion Notification Editor";

/// Reads and parses the document at `path`.
pub fn open(path: &Path) -> Result<Configuration> {
    let bytes = fs::read(path).map_err(|error| EditorError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    Configuration::load(&bytes)
}

/// Serializes `config` and overwrites `path` with it.
pub fn save(config: &Configuration, path: &Path) -> Result<()> {
    let bytes = config.serialize()?;
    fs::write(path, bytes).map_err(|error| EditorError::Io {
        path: path.to_path_buf(),
        error,
    })
}

/// State of one editing session.
#[derive(Debug, Default)]
pub struct Session {
    config: Configuration,
    path: Option<PathBuf>,
    dirty: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Mutable access to the document. Marks the session as modified.
    pub fn config_mut(&mut self) -> &mut Configuration {
        self.dirty = true;
        &mut self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Title line naming the current file, if any.
    pub fn title(&self) -> String {
        match &self.path {
            Some(path) => format!("{} - {}", APP_TITLE, path.display()),
            None => APP_TITLE.to_string(),
        }
    }

    /// Discards the document and starts an empty, unnamed one.
    pub fn new_document(&mut self) {
        self.config = Configuration::default();
        self.path = None;
        self.dirty = false;
    }

    /// Replaces the document with the contents of `path`.
    /// On failure the current document and path are kept.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let config = open(path).inspect_err(|e| warn!("failed to open {}: {}", path.display(), e))?;
        info!(
            path = %path.display(),
            notifications = config.notifications.len(),
            "opened notification file"
        );
        self.config = config;
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// Writes the document back to the current path.
    pub fn save(&mut self) -> Result<&Path> {
        let Some(path) = self.path.as_deref() else {
            return Err(EditorError::NoPath);
        };
        save(&self.config, path).inspect_err(|e| warn!("failed to save {}: {}", path.display(), e))?;
        info!(path = %path.display(), "saved notification file");
        self.dirty = false;
        Ok(path)
    }

    /// Writes the document to `path` and makes it the current path.
    /// The previous path is kept if the write fails.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        save(&self.config, path).inspect_err(|e| warn!("failed to save {}: {}", path.display(), e))?;
        info!(path = %path.display(), "saved notification file");
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }
}
