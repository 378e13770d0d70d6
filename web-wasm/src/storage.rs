//! localStorage バックエンド

use farmaid_common::{Error, KeyValueStorage, Result};
use wasm_bindgen::JsValue;

/// window.localStorage（呼び出しごとに取得）
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn storage_error(context: &str, err: JsValue) -> Error {
    Error::Storage(format!("{}: {:?}", context, err))
}

impl KeyValueStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let storage = local_storage().ok_or_else(|| Error::Storage("localStorage is unavailable".into()))?;
        storage
            .set_item(key, value)
            .map_err(|e| storage_error("setItem", e))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match local_storage() {
            Some(storage) => storage
                .remove_item(key)
                .map_err(|e| storage_error("removeItem", e)),
            None => Ok(()),
        }
    }
}
