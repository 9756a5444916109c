//! Named durable record storage contracts and adapters.
//!
//! A record is one JSON document stored under a fixed name (for example `window-store`). Records
//! are wrapped in a [`RecordEnvelope`] carrying a schema version so readers can detect layouts
//! written by older builds.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Schema version written into every [`RecordEnvelope`] by this build.
pub const RECORD_SCHEMA_VERSION: u32 = 0;

/// Object-safe boxed future used by [`RecordStore`] async methods.
pub type RecordStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service for named durable records (JSON stored as text per record name).
pub trait RecordStore {
    /// Loads the raw JSON text stored under `name`.
    fn load_record<'a>(
        &'a self,
        name: &'a str,
    ) -> RecordStoreFuture<'a, Result<Option<String>, String>>;

    /// Replaces the raw JSON text stored under `name`.
    fn save_record<'a>(
        &'a self,
        name: &'a str,
        raw_json: &'a str,
    ) -> RecordStoreFuture<'a, Result<(), String>>;

    /// Deletes the record stored under `name`.
    fn delete_record<'a>(&'a self, name: &'a str) -> RecordStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Versioned wrapper around a persisted record payload.
pub struct RecordEnvelope<T> {
    /// Record payload.
    pub state: T,
    /// Payload schema version.
    pub version: u32,
}

impl<T> RecordEnvelope<T> {
    /// Wraps `state` with the current [`RECORD_SCHEMA_VERSION`].
    pub fn current(state: T) -> Self {
        Self {
            state,
            version: RECORD_SCHEMA_VERSION,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Record store that never holds anything, for hosts without durable storage.
pub struct NoopRecordStore;

impl RecordStore for NoopRecordStore {
    fn load_record<'a>(
        &'a self,
        _name: &'a str,
    ) -> RecordStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_record<'a>(
        &'a self,
        _name: &'a str,
        _raw_json: &'a str,
    ) -> RecordStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete_record<'a>(&'a self, _name: &'a str) -> RecordStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory record store. Clones share the same backing map.
pub struct MemoryRecordStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryRecordStore {
    /// Returns the raw JSON currently stored under `name`.
    pub fn raw(&self, name: &str) -> Option<String> {
        self.inner.borrow().get(name).cloned()
    }

    /// Overwrites the raw JSON stored under `name` without going through the async API.
    pub fn insert_raw(&self, name: impl Into<String>, raw_json: impl Into<String>) {
        self.inner.borrow_mut().insert(name.into(), raw_json.into());
    }

    /// Removes every stored record.
    pub fn clear(&self) {
        self.inner.borrow_mut().clear();
    }
}

impl RecordStore for MemoryRecordStore {
    fn load_record<'a>(
        &'a self,
        name: &'a str,
    ) -> RecordStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.raw(name)) })
    }

    fn save_record<'a>(
        &'a self,
        name: &'a str,
        raw_json: &'a str,
    ) -> RecordStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.insert_raw(name, raw_json);
            Ok(())
        })
    }

    fn delete_record<'a>(&'a self, name: &'a str) -> RecordStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().remove(name);
            Ok(())
        })
    }
}

/// Loads and deserializes an enveloped record through a [`RecordStore`] implementation.
///
/// # Errors
///
/// Returns an error when the store fails or the stored JSON does not match `T`.
pub async fn load_record_with<S: RecordStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    name: &str,
) -> Result<Option<RecordEnvelope<T>>, String> {
    let Some(raw) = store.load_record(name).await? else {
        return Ok(None);
    };
    let envelope = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    Ok(Some(envelope))
}

/// Serializes `state` into a current-version envelope and saves it under `name`.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_record_with<S: RecordStore + ?Sized, T: Serialize>(
    store: &S,
    name: &str,
    state: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(&RecordEnvelope::current(state)).map_err(|e| e.to_string())?;
    store.save_record(name, &raw).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        next: u64,
    }

    #[test]
    fn memory_store_save_load_delete() {
        let store = MemoryRecordStore::default();
        let store_obj: &dyn RecordStore = &store;

        block_on(store_obj.save_record("window-store", "{\"k\":1}")).expect("save");
        assert_eq!(
            block_on(store_obj.load_record("window-store")).expect("load"),
            Some("{\"k\":1}".to_string())
        );
        block_on(store_obj.delete_record("window-store")).expect("delete");
        assert_eq!(
            block_on(store_obj.load_record("window-store")).expect("load"),
            None
        );
    }

    #[test]
    fn typed_helpers_wrap_state_in_versioned_envelope() {
        let store = MemoryRecordStore::default();
        block_on(save_record_with(&store, "counter", &Counter { next: 7 })).expect("save");

        assert_eq!(
            store.raw("counter").as_deref(),
            Some("{\"state\":{\"next\":7},\"version\":0}")
        );

        let loaded: Option<RecordEnvelope<Counter>> =
            block_on(load_record_with(&store, "counter")).expect("load");
        assert_eq!(loaded, Some(RecordEnvelope::current(Counter { next: 7 })));
    }

    #[test]
    fn typed_load_reports_malformed_json() {
        let store = MemoryRecordStore::default();
        store.insert_raw("counter", "{not json");
        let loaded = block_on(load_record_with::<_, Counter>(&store, "counter"));
        assert!(loaded.is_err());
    }

    #[test]
    fn noop_store_is_empty_and_successful() {
        let store = NoopRecordStore;
        let store_obj: &dyn RecordStore = &store;
        assert_eq!(block_on(store_obj.load_record("k")).expect("load"), None);
        block_on(store_obj.save_record("k", "{}")).expect("save");
        block_on(store_obj.delete_record("k")).expect("delete");
    }

    #[test]
    fn clones_share_backing_map() {
        let store = MemoryRecordStore::default();
        let other = store.clone();
        store.insert_raw("a", "1");
        assert_eq!(other.raw("a").as_deref(), Some("1"));
        other.clear();
        assert_eq!(store.raw("a"), None);
    }
}
