#[cfg(test)]
#[path = "in_memory_test.rs"]
mod in_memory_test;

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::object_store::{
    AtomicWriteHandle,
    ObjectStore,
    ObjectStoreError,
    ObjectStoreResult,
};

type SharedObjects = Arc<Mutex<BTreeMap<String, Vec<u8>>>>;

/// Reference backend holding all objects in process memory.
///
/// Clones share the same object map, so one store can back a catalog and be
/// inspected from a test at the same time. Conditional create is exact: the
/// presence check and the insert happen under one lock.
#[derive(Clone, Debug, Default)]
pub struct InMemoryObjectStore {
    objects: SharedObjects,
}

impl InMemoryObjectStore {
    /// Returns an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.objects.lock().expect("object map lock poisoned")
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, path: &str) -> ObjectStoreResult<Vec<u8>> {
        self.objects()
            .get(path)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound { path: path.to_owned() })
    }

    fn write(&self, path: &str, bytes: &[u8]) -> ObjectStoreResult<()> {
        self.objects().insert(path.to_owned(), bytes.to_owned());
        Ok(())
    }

    fn start_atomic_write(&self, path: &str) -> ObjectStoreResult<Box<dyn AtomicWriteHandle>> {
        Ok(Box::new(InMemoryAtomicWrite {
            objects: self.objects.clone(),
            path: path.to_owned(),
            buffer: Vec::new(),
        }))
    }

    fn list(&self, prefix: &str) -> ObjectStoreResult<Vec<String>> {
        Ok(self
            .objects()
            .range(prefix.to_owned()..)
            .take_while(|(path, _)| path.starts_with(prefix))
            .map(|(path, _)| path.clone())
            .collect())
    }

    fn exists(&self, path: &str) -> ObjectStoreResult<bool> {
        Ok(self.objects().contains_key(path))
    }
}

struct InMemoryAtomicWrite {
    objects: SharedObjects,
    path: String,
    buffer: Vec<u8>,
}

impl Write for InMemoryAtomicWrite {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl AtomicWriteHandle for InMemoryAtomicWrite {
    fn complete(self: Box<Self>) -> ObjectStoreResult<()> {
        let Self { objects, path, buffer } = *self;
        let mut objects = objects.lock().expect("object map lock poisoned");
        if objects.contains_key(&path) {
            return Err(ObjectStoreError::AlreadyExists { path });
        }
        objects.insert(path, buffer);
        Ok(())
    }
}
