//! ArtifactSession - request-scoped directory for translated PDDL files
//!
//! The directory and everything in it is removed when the session is dropped,
//! whichever way the request ends.

use shared::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};
use tracing::debug;
use uuid::Uuid;

const DIR_PREFIX: &str = "mapv-";

#[derive(Debug)]
pub struct ArtifactSession {
    id: Uuid,
    dir: TempDir,
}

impl ArtifactSession {
    /// Create a fresh directory under `parent`, or the system temp dir
    pub fn create(id: Uuid, parent: Option<&Path>) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix(DIR_PREFIX);
        let dir = match parent {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        debug!(session = %id, path = %dir.path().display(), "Created artifact session");
        Ok(Self { id, dir })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write one artifact and return its path
    pub fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(file_name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

impl Drop for ArtifactSession {
    fn drop(&mut self) {
        debug!(session = %self.id, "Removing artifact session");
    }
}
