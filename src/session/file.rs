//! File-backed session storage
//!
//! Stores each key as a file under `<root>/<session id>/`, so values outlive
//! the process for as long as the same session id is reused.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;
use uuid::Uuid;

use super::{SessionScope, SessionStorage};
use crate::error::Result;

/// Session storage persisted to disk.
#[derive(Debug, Clone)]
pub struct FileSession {
    scope: SessionScope,
    dir: PathBuf,
}

impl FileSession {
    /// Creates storage for `scope` under `root`.
    pub fn new(root: impl AsRef<Path>, scope: SessionScope) -> Self {
        let dir = root.as_ref().join(sanitize(&scope.id));
        Self { scope, dir }
    }

    /// Creates storage under the platform cache directory
    /// (`~/.cache/collection-cache/sessions` on Linux).
    ///
    /// Returns `None` if the cache directory cannot be determined.
    pub fn open_default(scope: SessionScope) -> Option<Self> {
        Self::default_root().map(|root| Self::new(root, scope))
    }

    /// Platform cache directory session folders are created in.
    pub fn default_root() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("", "", "collection-cache")?;
        Some(dirs.cache_dir().join("sessions"))
    }

    /// Directory holding this session's values.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ends the session by removing its directory.
    pub fn end(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                debug!(session = %self.scope.id, "Removed session directory");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(key)))
    }
}

impl SessionStorage for FileSession {
    fn scope(&self) -> &SessionScope {
        &self.scope
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes to a temp file and renames it into place, so readers never
    /// see a partially written value.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let tmp_path = self
            .dir
            .join(format!(".{}.tmp-{}", sanitize(key), Uuid::new_v4()));

        fs::write(&tmp_path, value)?;
        if let Err(err) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        Ok(())
    }
}

/// Maps a key to a safe file name component.
fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
