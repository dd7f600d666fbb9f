use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Durable home of the persisted session record.
///
/// The session store is the only writer. The gateway's bearer stage reads the
/// raw record on every request so that a logout from another process is seen
/// immediately.
pub trait SessionStorage: Send + Sync {
    /// Raw record, or `None` if nothing has been written yet
    fn read(&self) -> Result<Option<String>>;

    fn write(&self, contents: &str) -> Result<()>;
}

/// Stores the session record as JSON in the cache directory.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            path: cache_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        Ok(Some(contents))
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create session directory")?;
        }
        // Readers in other processes only ever see a complete record
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write session file {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace session file {}", self.path.display()))?;
        Ok(())
    }
}

/// In-process storage, used for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    contents: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw record already present, as if written by an earlier run
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    /// Overwrite the raw record directly, bypassing the session store
    pub fn replace(&self, contents: impl Into<String>) {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(contents.into());
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self
            .contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        self.replace(contents);
        Ok(())
    }
}
