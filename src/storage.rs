//! ファイルベースのクライアントストレージ
//!
//! ブラウザの localStorage と同じキー・バリュー形式を1つのJSONファイルに保存する。
//! 壊れたファイルは空として扱う。

use farmaid_common::{Error as CommonError, KeyValueStorage};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const STORAGE_FILE_NAME: &str = "storage.json";

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 設定ディレクトリ直下の storage.json
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORAGE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> farmaid_common::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(items)?;

        // 一時ファイルに書いてから置き換え
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| CommonError::Storage(format!("{}: {}", self.path.display(), e)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> farmaid_common::Result<()> {
        let mut items = self.read_all();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> farmaid_common::Result<()> {
        let mut items = self.read_all();
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}
