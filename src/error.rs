use thiserror::Error;

#[derive(Error, Debug)]
pub enum FarmaidError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("ストレージエラー: {0}")]
    Storage(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    /// API呼び出しの正規化エラー（メッセージをそのまま表示）
    #[error(transparent)]
    Api(#[from] farmaid_common::ApiError),

    #[error(transparent)]
    Common(#[from] farmaid_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FarmaidError>;
