use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::domain::DomainError;

const LOCK_FILE: &str = "ingest.lock";

/// Exclusive lock on a file-backed index directory, held for the duration of
/// an ingestion run. A second concurrent run fails fast instead of racing
/// writes into the same store. Released on drop.
pub struct IndexLock {
    path: PathBuf,
}

impl IndexLock {
    pub fn acquire(index_dir: &Path) -> Result<Self, DomainError> {
        fs::create_dir_all(index_dir).map_err(|e| {
            DomainError::index(format!(
                "cannot create index at {}: {e}",
                index_dir.display()
            ))
        })?;

        let path = index_dir.join(LOCK_FILE);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let _ = writeln!(file, "{}", std::process::id());
                Ok(Self { path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(DomainError::index(format!(
                    "another ingestion run holds {}; remove it if that run is dead",
                    path.display()
                )))
            }
            Err(e) => Err(DomainError::index(format!(
                "cannot lock {}: {e}",
                path.display()
            ))),
        }
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release index lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquisition_fails_while_held() {
        let tmp = tempfile::tempdir().unwrap();

        let held = IndexLock::acquire(tmp.path()).unwrap();
        assert!(matches!(
            IndexLock::acquire(tmp.path()),
            Err(DomainError::Index(_))
        ));

        drop(held);
        assert!(IndexLock::acquire(tmp.path()).is_ok());
    }
}
