//! アップロード画像の表現とData URL処理

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// MIMEタイプが取れない場合の既定値
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// predict に渡す画像
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// バイナリ本体
    File {
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
    /// 既存の参照文字列（アップロード済みURLなど）
    Reference(String),
}

impl ImageSource {
    /// Data URLをデコードしてバイナリ画像にする
    pub fn from_data_url(file_name: &str, data_url: &str) -> Result<Self> {
        let mime_type = extract_mime_type_from_data_url(data_url);
        if !is_image_mime(mime_type) {
            return Err(Error::InvalidImage(format!("{} ({})", file_name, mime_type)));
        }

        let payload = extract_base64_from_data_url(data_url)
            .ok_or_else(|| Error::InvalidImage(format!("{}: invalid data URL", file_name)))?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::InvalidImage(format!("{}: {}", file_name, e)))?;

        Ok(ImageSource::File {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes,
        })
    }

    /// 表示・記録用の名前
    pub fn display_name(&self) -> &str {
        match self {
            ImageSource::File { file_name, .. } => file_name,
            ImageSource::Reference(reference) => reference,
        }
    }
}

/// Data URLからBase64データ部分を抽出
///
/// "data:image/jpeg;base64,/9j/4AAQ..." → "/9j/4AAQ..."
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Data URLからMIMEタイプを抽出（失敗時は image/jpeg）
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .split(':')
        .nth(1)
        .and_then(|s| s.split(';').next())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_IMAGE_MIME)
}

/// バイト列からData URLを作る
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// image/* のみ受け付ける
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}
