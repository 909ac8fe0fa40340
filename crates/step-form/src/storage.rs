//! The storage collaborator contract.
//!
//! The schema reads the persisted value once at construction and writes the
//! full canonical value after every committed update. Errors are never
//! swallowed.

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("persisted value is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

pub trait Storage {
    /// The persisted value, if any was saved.
    fn get(&self) -> Result<Option<Value>, StorageError>;

    fn set(&self, value: &Value) -> Result<(), StorageError>;
}

/// In-process storage. Clones share the same slot, so a test can keep one
/// clone to inspect what the schema wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<Value>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `value`, as if saved by an earlier session.
    pub fn with_value(value: Value) -> Self {
        let storage = Self::new();
        *storage.slot.borrow_mut() = Some(value);
        storage
    }

    pub fn snapshot(&self) -> Option<Value> {
        self.slot.borrow().clone()
    }

    /// Number of `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl Storage for MemoryStorage {
    fn get(&self) -> Result<Option<Value>, StorageError> {
        Ok(self.slot.borrow().clone())
    }

    fn set(&self, value: &Value) -> Result<(), StorageError> {
        *self.slot.borrow_mut() = Some(value.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Persists through any string key-value store (browser-like `localStorage`,
/// a file, an embedded database) by serializing the value as JSON.
pub struct JsonStringStorage<G, S> {
    read: G,
    write: S,
}

impl<G, S> JsonStringStorage<G, S>
where
    G: Fn() -> Result<Option<String>, StorageError>,
    S: Fn(String) -> Result<(), StorageError>,
{
    pub fn new(read: G, write: S) -> Self {
        Self { read, write }
    }
}

impl<G, S> Storage for JsonStringStorage<G, S>
where
    G: Fn() -> Result<Option<String>, StorageError>,
    S: Fn(String) -> Result<(), StorageError>,
{
    fn get(&self) -> Result<Option<Value>, StorageError> {
        match (self.read)()? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set(&self, value: &Value) -> Result<(), StorageError> {
        (self.write)(serde_json::to_string(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_storage_shares_slot() {
        let storage = MemoryStorage::new();
        let observer = storage.clone();
        storage.set(&json!({"step1": {}})).unwrap();
        assert_eq!(observer.snapshot(), Some(json!({"step1": {}})));
        assert_eq!(observer.write_count(), 1);
    }

    #[test]
    fn test_json_string_storage_roundtrip() {
        let cell = Rc::new(RefCell::new(None::<String>));
        let read_cell = Rc::clone(&cell);
        let write_cell = Rc::clone(&cell);
        let storage = JsonStringStorage::new(
            move || Ok(read_cell.borrow().clone()),
            move |raw| {
                *write_cell.borrow_mut() = Some(raw);
                Ok(())
            },
        );
        assert!(storage.get().unwrap().is_none());
        storage.set(&json!({"step1": {"title": "A"}})).unwrap();
        assert_eq!(cell.borrow().as_deref(), Some(r#"{"step1":{"title":"A"}}"#));
        assert_eq!(storage.get().unwrap(), Some(json!({"step1": {"title": "A"}})));
    }

    #[test]
    fn test_json_string_storage_decode_error() {
        let storage = JsonStringStorage::new(|| Ok(Some("{not json".to_string())), |_| Ok(()));
        assert!(matches!(storage.get(), Err(StorageError::Decode(_))));
    }
}
