//! `localStorage`-backed record store implementation.
//!
//! The browser API is synchronous; the [`platform_host::RecordStore`] futures resolve on first
//! poll. Quota and availability failures surface as `Err(String)` for the caller to log.

use platform_host::{RecordStore, RecordStoreFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Browser record store backed by `window.localStorage`.
pub struct WebRecordStore;

impl WebRecordStore {
    /// Loads the raw JSON stored under `name`.
    pub fn load_json(self, name: &str) -> Result<Option<String>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let Some(storage) = local_storage() else {
                return Ok(None);
            };
            storage
                .get_item(name)
                .map_err(|e| format!("localStorage get_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = name;
            Ok(None)
        }
    }

    /// Saves raw JSON under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or the write fails (for example, when
    /// the quota is exceeded).
    pub fn save_json(self, name: &str, raw_json: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = local_storage().ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .set_item(name, raw_json)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (name, raw_json);
            Ok(())
        }
    }

    /// Deletes the record stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or the delete fails.
    pub fn delete_json(self, name: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = local_storage().ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .remove_item(name)
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = name;
            Ok(())
        }
    }
}

impl RecordStore for WebRecordStore {
    fn load_record<'a>(
        &'a self,
        name: &'a str,
    ) -> RecordStoreFuture<'a, Result<Option<String>, String>> {
        let store = *self;
        Box::pin(async move { store.load_json(name) })
    }

    fn save_record<'a>(
        &'a self,
        name: &'a str,
        raw_json: &'a str,
    ) -> RecordStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.save_json(name, raw_json) })
    }

    fn delete_record<'a>(&'a self, name: &'a str) -> RecordStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.delete_json(name) })
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn non_wasm_store_is_inert() {
        let store = WebRecordStore;
        block_on(store.save_record("window-store", "{}")).expect("save");
        assert_eq!(block_on(store.load_record("window-store")).expect("load"), None);
        block_on(store.delete_record("window-store")).expect("delete");
    }
}
