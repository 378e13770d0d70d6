//! アプリケーション状態ストア
//!
//! - 変更はセッター経由のみ（フィールドは非公開）
//! - language / theme のみ永続化し、それ以外は起動ごとにリセット
//! - 永続データが壊れていても既定値で起動する

use crate::error::Result;
use crate::types::{DiagnosisResult, Theme, DEFAULT_LANGUAGE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 永続スナップショットの保存キー
pub const STORE_KEY: &str = "farmaid-ai-store";

/// 認証トークンの保存キー（このクレートからは読み取りのみ）
pub const AUTH_TOKEN_KEY: &str = "authToken";

const SNAPSHOT_VERSION: u32 = 0;

/// クライアントローカルのキー・バリューストレージ（localStorage相当）
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for Arc<S> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}

/// メモリ上のストレージ（テスト・一時利用）
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| crate::Error::Storage("memory storage poisoned".into()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| crate::Error::Storage("memory storage poisoned".into()))?;
        items.remove(key);
        Ok(())
    }
}

/// 保存済みトークン（空文字は無しとみなす）
pub fn read_auth_token<S: KeyValueStorage + ?Sized>(storage: &S) -> Option<String> {
    storage
        .get_item(AUTH_TOKEN_KEY)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// 永続化対象フィールド
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub language: Option<String>,
    pub theme: Option<Theme>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

/// 状態（読み取り専用ビュー）
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    language: String,
    theme: Theme,
    diagnosis_result: Option<DiagnosisResult>,
    uploaded_image: Option<String>,
    is_loading: bool,
    error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            theme: Theme::default(),
            diagnosis_result: None,
            uploaded_image: None,
            is_loading: false,
            error: None,
        }
    }
}

impl AppState {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn diagnosis_result(&self) -> Option<&DiagnosisResult> {
        self.diagnosis_result.as_ref()
    }

    pub fn uploaded_image(&self) -> Option<&str> {
        self.uploaded_image.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn persisted(&self) -> PersistedState {
        PersistedState {
            language: Some(self.language.clone()),
            theme: Some(self.theme),
        }
    }
}

/// 購読ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn(&AppState) + Send + Sync>;

/// 状態コンテナ
pub struct AppStore<S: KeyValueStorage> {
    storage: S,
    state: AppState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<S: KeyValueStorage> AppStore<S> {
    /// ストレージから永続フィールドを復元して作成
    pub fn load(storage: S) -> Self {
        let mut state = AppState::default();
        if let Some(persisted) = read_snapshot(&storage) {
            if let Some(language) = persisted.language.filter(|l| !l.trim().is_empty()) {
                state.language = language;
            }
            if let Some(theme) = persisted.theme {
                state.theme = theme;
            }
        }

        Self {
            storage,
            state,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 言語を変更して永続化
    ///
    /// 状態は常に更新され、保存失敗のみ Err で返る。
    pub fn set_language(&mut self, language: impl Into<String>) -> Result<()> {
        self.state.language = language.into();
        self.notify();
        self.persist()
    }

    /// テーマを変更して永続化
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.state.theme = theme;
        self.notify();
        self.persist()
    }

    /// 診断結果を置き換える（マージしない）
    pub fn set_diagnosis_result(&mut self, result: DiagnosisResult) {
        self.state.diagnosis_result = Some(result);
        self.notify();
    }

    pub fn clear_diagnosis_result(&mut self) {
        self.state.diagnosis_result = None;
        self.notify();
    }

    pub fn set_uploaded_image(&mut self, image: impl Into<String>) {
        self.state.uploaded_image = Some(image.into());
        self.notify();
    }

    pub fn clear_uploaded_image(&mut self) {
        self.state.uploaded_image = None;
        self.notify();
    }

    pub fn set_is_loading(&mut self, loading: bool) {
        self.state.is_loading = loading;
        self.notify();
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.state.error = error;
        self.notify();
    }

    /// 解析開始: loading=true, error=None
    pub fn begin_diagnosis(&mut self) {
        self.state.is_loading = true;
        self.state.error = None;
        self.notify();
    }

    /// 解析完了: 成功・失敗どちらでも loading を解除する
    pub fn finish_diagnosis<E: std::fmt::Display>(
        &mut self,
        outcome: std::result::Result<DiagnosisResult, E>,
    ) {
        self.state.is_loading = false;
        match outcome {
            Ok(result) => {
                self.state.diagnosis_result = Some(result);
                self.state.error = None;
            }
            Err(e) => self.state.error = Some(e.to_string()),
        }
        self.notify();
    }

    /// 変更通知を購読
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&AppState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.state);
        }
    }

    fn persist(&self) -> Result<()> {
        let snapshot = Snapshot {
            state: self.state.persisted(),
            version: SNAPSHOT_VERSION,
        };
        let json = serde_json::to_string(&snapshot)?;
        self.storage.set_item(STORE_KEY, &json)
    }
}

/// 永続スナップショットを読む（無い・壊れている場合は None）
fn read_snapshot<S: KeyValueStorage + ?Sized>(storage: &S) -> Option<PersistedState> {
    let raw = storage.get_item(STORE_KEY)?;
    serde_json::from_str::<Snapshot>(&raw).ok().map(|s| s.state)
}
