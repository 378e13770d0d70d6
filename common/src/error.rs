//! エラー型定義
//!
//! - Error: 設定・ストレージなどローカル処理のエラー
//! - ApiError: ネットワーク越しの呼び出しを正規化したエラー（表示文字列 = メッセージ）

use thiserror::Error;

/// 汎用フォールバックメッセージ（サーバー/通信どちらからもメッセージが得られない場合）
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// API呼び出しの正規化エラー
///
/// UI層は種類で分岐せずに `to_string()` をそのまま表示できる。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// 接続不可・DNS/TLS失敗など
    #[error("{message}")]
    Transport { message: String },

    /// タイムアウト上限を超過
    #[error("{message}")]
    Timeout { message: String },

    /// レスポンスは受信したが success=false もしくは非2xx
    #[error("{message}")]
    Server { status: Option<u16>, message: String },

    /// success=true だが単一オブジェクトの data が欠落
    #[error("{0}")]
    MissingData(String),

    /// レスポンス本文が想定した形式でない
    #[error("{0}")]
    Decode(String),

    /// 同じ操作が既に実行中
    #[error("{operation} is already in progress")]
    Busy { operation: &'static str },
}

impl ApiError {
    /// 通信エラー（メッセージが空なら汎用メッセージ）
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: resolve_message(None, Some(&message.into())),
        }
    }

    /// タイムアウトエラー
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout {
            message: format!("timeout of {}ms exceeded", timeout_ms),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// サーバー拒否か（レスポンス受信済みのエラー）
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

/// メッセージ解決: サーバー提供 → 通信レベル → 汎用
pub fn resolve_message(server: Option<&str>, transport: Option<&str>) -> String {
    [server, transport]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|m| !m.is_empty())
        .unwrap_or(GENERIC_ERROR_MESSAGE)
        .to_string()
}
