#[cfg(test)]
#[path = "local_test.rs"]
mod local_test;

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use uuid::Uuid;

use crate::object_store::{
    AtomicWriteHandle,
    ObjectStore,
    ObjectStoreError,
    ObjectStoreResult,
};

// Temp files live in a dot directory under the root so listings never see
// them; object path components starting with a dot are rejected.
const TMP_DIR: &str = ".tmp";

/// Filesystem backend mapping object paths to files under a root directory.
///
/// Conditional create is synthesized by writing the bytes to a unique temp
/// file and hard-linking it into place: `link(2)` fails if the target exists,
/// so the publish is atomic and a lost race leaves nothing visible.
#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Opens a store rooted at the directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> ObjectStoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(TMP_DIR))?;
        Ok(Self { root })
    }

    fn file_path(&self, path: &str) -> ObjectStoreResult<PathBuf> {
        let mut file_path = self.root.clone();
        for component in path.split('/') {
            if component.is_empty() || component.starts_with('.') {
                return Err(ObjectStoreError::InvalidPath { path: path.to_owned() });
            }
            file_path.push(component);
        }
        Ok(file_path)
    }
}

impl ObjectStore for LocalObjectStore {
    fn read(&self, path: &str) -> ObjectStoreResult<Vec<u8>> {
        fs::read(self.file_path(path)?).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => ObjectStoreError::NotFound { path: path.to_owned() },
            _ => err.into(),
        })
    }

    fn write(&self, path: &str, bytes: &[u8]) -> ObjectStoreResult<()> {
        let file_path = self.file_path(path)?;
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(fs::write(file_path, bytes)?)
    }

    fn start_atomic_write(&self, path: &str) -> ObjectStoreResult<Box<dyn AtomicWriteHandle>> {
        Ok(Box::new(LocalAtomicWrite {
            target: self.file_path(path)?,
            tmp: self.root.join(TMP_DIR).join(Uuid::new_v4().to_string()),
            path: path.to_owned(),
            buffer: Vec::new(),
        }))
    }

    fn list(&self, prefix: &str) -> ObjectStoreResult<Vec<String>> {
        let mut paths = Vec::new();
        let mut pending = vec![(self.root.clone(), String::new())];
        while let Some((dir, dir_key)) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let file_name = entry.file_name();
                let Some(name) = file_name.to_str() else { continue };
                if name.starts_with('.') {
                    continue;
                }
                let key = if dir_key.is_empty() {
                    name.to_owned()
                } else {
                    format!("{dir_key}/{name}")
                };
                if entry.file_type()?.is_dir() {
                    pending.push((entry.path(), key));
                } else if key.starts_with(prefix) {
                    paths.push(key);
                }
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn exists(&self, path: &str) -> ObjectStoreResult<bool> {
        Ok(self.file_path(path)?.is_file())
    }
}

struct LocalAtomicWrite {
    target: PathBuf,
    tmp: PathBuf,
    path: String,
    buffer: Vec<u8>,
}

impl Write for LocalAtomicWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl AtomicWriteHandle for LocalAtomicWrite {
    fn complete(self: Box<Self>) -> ObjectStoreResult<()> {
        let Self { target, tmp, path, buffer } = *self;
        fs::write(&tmp, buffer)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let linked = fs::hard_link(&tmp, &target);
        // The temp file is garbage once the link attempt resolved.
        let _ = fs::remove_file(&tmp);
        linked.map_err(|err| match err.kind() {
            std::io::ErrorKind::AlreadyExists => ObjectStoreError::AlreadyExists { path },
            _ => err.into(),
        })
    }
}
