//! File-backed session marker store for the command-line dashboard.
//!
//! The marker lives in `<dir>/echelon_id`. Writes go through a staged file
//! and a rename so readers never observe a partial value.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::EchelonId;
use crate::domain::ports::{SESSION_MARKER_KEY, SessionStorage, SessionStorageError};

/// Session storage rooted at one directory.
#[derive(Debug)]
pub struct FileSessionStorage {
    dir: Dir,
    path: PathBuf,
}

impl FileSessionStorage {
    /// Open (creating when missing) the session directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionStorageError> {
        let path = path.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&path, ambient_authority())
            .map_err(|error| io_error(&path, &error))?;
        let dir = Dir::open_ambient_dir(&path, ambient_authority())
            .map_err(|error| io_error(&path, &error))?;
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn marker_path(&self) -> PathBuf {
        self.path.join(SESSION_MARKER_KEY)
    }
}

fn io_error(path: &Path, error: &io::Error) -> SessionStorageError {
    SessionStorageError::io(format!("{}: {error}", path.display()))
}

impl SessionStorage for FileSessionStorage {
    fn echelon_id(&self) -> Result<Option<EchelonId>, SessionStorageError> {
        match self.dir.read_to_string(SESSION_MARKER_KEY) {
            Ok(contents) => Ok(EchelonId::new(contents).ok()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(&self.marker_path(), &error)),
        }
    }

    fn persist(&self, echelon_id: &EchelonId) -> Result<(), SessionStorageError> {
        let staged = format!(".{SESSION_MARKER_KEY}.{}", Uuid::new_v4().simple());
        self.dir
            .write(&staged, echelon_id.as_ref().as_bytes())
            .map_err(|error| io_error(&self.path.join(&staged), &error))?;
        self.dir
            .rename(&staged, &self.dir, SESSION_MARKER_KEY)
            .map_err(|error| io_error(&self.marker_path(), &error))?;
        debug!(path = %self.marker_path().display(), "session marker persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStorageError> {
        match self.dir.remove_file(SESSION_MARKER_KEY) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(&self.marker_path(), &error)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp() -> TempDir {
        TempDir::new().expect("temp dir")
    }

    #[rstest]
    fn marker_round_trips_across_instances(temp: TempDir) {
        let root = temp.path().join("session");
        let first = FileSessionStorage::open(&root).expect("open");
        assert!(first.echelon_id().expect("read").is_none());

        first
            .persist(&EchelonId::new("ada").expect("id"))
            .expect("persist");

        let second = FileSessionStorage::open(&root).expect("reopen");
        assert_eq!(
            second.echelon_id().expect("read").map(String::from).as_deref(),
            Some("ada")
        );
    }

    #[rstest]
    fn clear_is_idempotent(temp: TempDir) {
        let storage = FileSessionStorage::open(temp.path()).expect("open");
        storage.clear().expect("clear without marker");
        storage
            .persist(&EchelonId::new("ada").expect("id"))
            .expect("persist");
        storage.clear().expect("clear");
        assert!(storage.echelon_id().expect("read").is_none());
    }

    #[rstest]
    fn blank_marker_reads_as_signed_out(temp: TempDir) {
        let storage = FileSessionStorage::open(temp.path()).expect("open");
        let dir = Dir::open_ambient_dir(temp.path(), ambient_authority()).expect("dir");
        dir.write(SESSION_MARKER_KEY, b"  \n").expect("write");
        assert!(storage.echelon_id().expect("read").is_none());
    }
}
