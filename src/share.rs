//! Share codes: an opaque key to a stored copy of a raw export.

use crate::error::{ReportError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

/// Key to blob storage. Unknown codes are `Ok(None)`, not errors.
pub trait ShareStore {
    fn put(&self, blob: &[u8]) -> Result<String>;
    fn get(&self, code: &str) -> Result<Option<Vec<u8>>>;
}

/// Blobs stored as `<dir>/<code>.csv`. No locking and no expiry.
#[derive(Debug, Clone)]
pub struct FileShareStore {
    dir: PathBuf,
}

impl FileShareStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileShareStore { dir: dir.into() }
    }

    fn blob_path(&self, code: &Uuid) -> PathBuf {
        self.dir.join(format!("{code}.csv"))
    }
}

/// Codes are UUIDs; anything else could name a path outside the store.
fn parse_code(code: &str) -> Result<Uuid> {
    Uuid::parse_str(code.trim()).map_err(|_| ReportError::ShareCodeInvalid(code.to_string()))
}

impl ShareStore for FileShareStore {
    fn put(&self, blob: &[u8]) -> Result<String> {
        fs::create_dir_all(&self.dir)?;
        let code = Uuid::new_v4();
        let path = self.blob_path(&code);
        fs::write(&path, blob)?;
        info!("shared {} bytes as {code}", blob.len());
        Ok(code.to_string())
    }

    fn get(&self, code: &str) -> Result<Option<Vec<u8>>> {
        let code = parse_code(code)?;
        match fs::read(self.blob_path(&code)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("share code {code} not found");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_returns_the_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileShareStore::new(dir.path().join("shared"));
        let code = store.put(b"a,b,c\n").unwrap();
        assert!(Uuid::parse_str(&code).is_ok());
        assert_eq!(store.get(&code).unwrap(), Some(b"a,b,c\n".to_vec()));
    }

    #[test]
    fn unknown_code_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileShareStore::new(dir.path());
        let code = Uuid::new_v4().to_string();
        assert_eq!(store.get(&code).unwrap(), None);
    }

    #[test]
    fn path_like_codes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileShareStore::new(dir.path());
        assert!(matches!(
            store.get("../etc/passwd"),
            Err(ReportError::ShareCodeInvalid(_))
        ));
    }

    #[test]
    fn codes_differ_between_puts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileShareStore::new(dir.path());
        let a = store.put(b"x").unwrap();
        let b = store.put(b"x").unwrap();
        assert_ne!(a, b);
    }
}
