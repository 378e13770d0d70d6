//! バックエンドAPIの契約
//!
//! HTTP実装（CLI: reqwest / Web: fetch）から独立した部分:
//! - エンドポイント（メソッド・パス・クエリ）
//! - レスポンスエンベロープのデコードとエラー正規化
//! - predict のマルチパート構成

use crate::error::{resolve_message, ApiError};
use crate::image::ImageSource;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// 既定のAPIベースURL
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// 既定のタイムアウト（ミリ秒）
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// predict の失敗時メッセージ（サーバーがメッセージを返さない場合）
pub const PREDICTION_FAILED: &str = "Prediction failed";

/// APIクライアント設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// HTTPメソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// 専門家一覧のサーバー側フィルタ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpertFilters {
    pub location: Option<String>,
    pub kind: Option<String>,
}

/// 商品一覧のサーバー側フィルタ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
    pub kind: Option<String>,
    pub disease: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// リクエスト先
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
        }
    }

    fn with_param(mut self, key: &'static str, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.query.push((key, value));
        }
        self
    }

    pub fn predict() -> Self {
        Self::new(Method::Post, "/predict")
    }

    pub fn recommendations(disease_id: &str) -> Self {
        Self::new(
            Method::Get,
            format!("/recommendations/{}", urlencoding::encode(disease_id)),
        )
    }

    pub fn experts(filters: &ExpertFilters) -> Self {
        Self::new(Method::Get, "/experts")
            .with_param("location", filters.location.clone())
            .with_param("type", filters.kind.clone())
    }

    pub fn products(filters: &ProductFilters) -> Self {
        Self::new(Method::Get, "/products")
            .with_param("type", filters.kind.clone())
            .with_param("disease", filters.disease.clone())
            .with_param("minPrice", filters.min_price.map(|p| p.to_string()))
            .with_param("maxPrice", filters.max_price.map(|p| p.to_string()))
    }

    pub fn feedback(diagnosis_id: &str) -> Self {
        Self::new(
            Method::Post,
            format!("/feedback/{}", urlencoding::encode(diagnosis_id)),
        )
    }

    pub fn health() -> Self {
        Self::new(Method::Get, "/health")
    }

    /// ベースURLと結合した完全なURL（クエリはエンコード済み）
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        if !self.query.is_empty() {
            let query: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }
}

/// 全レスポンス共通のエンベロープ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// サーバー提供メッセージ（message → error の順）
    pub fn server_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or(self.error.as_deref())
    }

    fn rejection(&self, status: u16, fallback: &str) -> ApiError {
        ApiError::Server {
            status: Some(status),
            message: resolve_message(self.server_message(), Some(fallback)),
        }
    }
}

fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// レスポンスを検査しエンベロープを取り出す
///
/// 非2xxはサーバーメッセージ（無ければステータス文言）で Server エラー。
/// data は未検証の JSON のまま返し、success を確認してから型に落とす。
pub fn decode_envelope(status: u16, body: &str) -> Result<Envelope<serde_json::Value>, ApiError> {
    if !is_success_status(status) {
        let server_message = serde_json::from_str::<Envelope<serde_json::Value>>(body)
            .ok()
            .and_then(|env| env.server_message().map(str::to_string));
        return Err(ApiError::Server {
            status: Some(status),
            message: resolve_message(
                server_message.as_deref(),
                Some(&format!("Request failed with status code {}", status)),
            ),
        });
    }

    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .map_err(|e| ApiError::Decode(format!("Invalid response body: {}", e)))
}

fn decode_data<T: DeserializeOwned>(data: Option<serde_json::Value>) -> Result<Option<T>, ApiError> {
    match data {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ApiError::Decode(format!("Invalid response body: {}", e))),
    }
}

/// 単一オブジェクト: success かつ data 必須
pub fn expect_data<T: DeserializeOwned>(
    status: u16,
    envelope: Envelope<serde_json::Value>,
    fallback: &str,
) -> Result<T, ApiError> {
    if !envelope.success {
        return Err(envelope.rejection(status, fallback));
    }
    let message = resolve_message(envelope.server_message(), Some(fallback));
    decode_data(envelope.data)?.ok_or(ApiError::MissingData(message))
}

/// リスト: data 欠落は空リスト
pub fn list_or_empty<T: DeserializeOwned>(
    status: u16,
    envelope: Envelope<serde_json::Value>,
    fallback: &str,
) -> Result<Vec<T>, ApiError> {
    if !envelope.success {
        return Err(envelope.rejection(status, fallback));
    }
    Ok(decode_data(envelope.data)?.unwrap_or_default())
}

/// predict レスポンスの正規化（信頼度範囲も検証）
pub fn decode_prediction(status: u16, body: &str) -> Result<crate::DiagnosisResult, ApiError> {
    let envelope = decode_envelope(status, body)?;
    let result: crate::DiagnosisResult = expect_data(status, envelope, PREDICTION_FAILED)?;
    result.validate().map_err(ApiError::Decode)?;
    Ok(result)
}

/// リスト系レスポンスの正規化
pub fn decode_list<T: DeserializeOwned>(status: u16, body: &str, fallback: &str) -> Result<Vec<T>, ApiError> {
    let envelope = decode_envelope(status, body)?;
    list_or_empty(status, envelope, fallback)
}

/// success フラグのみ
pub fn decode_success_flag(status: u16, body: &str) -> Result<bool, ApiError> {
    decode_envelope(status, body).map(|env| env.success)
}

/// ヘルスチェック: どんな失敗も false
pub fn health_from_outcome(outcome: Result<(u16, String), ApiError>) -> bool {
    match outcome {
        Ok((status, body)) => decode_success_flag(status, &body).unwrap_or(false),
        Err(_) => false,
    }
}

/// Authorization ヘッダー値
pub fn bearer_header(token: Option<&str>) -> Option<String> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("Bearer {}", t))
}

/// フィードバック本文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub helpful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// マルチパートの値
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

/// マルチパートの1パート
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: &'static str,
    pub value: FormValue,
}

/// predict リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    pub image: ImageSource,
    pub language: Option<String>,
}

impl PredictRequest {
    pub fn new(image: ImageSource) -> Self {
        Self { image, language: None }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// マルチパート構成（image → language の順）
    pub fn form_parts(&self) -> Vec<FormPart> {
        let image = match &self.image {
            ImageSource::File {
                file_name,
                mime_type,
                bytes,
            } => FormValue::File {
                file_name: file_name.clone(),
                mime_type: mime_type.clone(),
                bytes: bytes.clone(),
            },
            ImageSource::Reference(reference) => FormValue::Text(reference.clone()),
        };

        let mut parts = vec![FormPart { name: "image", value: image }];
        if let Some(language) = self.language.as_deref().filter(|l| !l.is_empty()) {
            parts.push(FormPart {
                name: "language",
                value: FormValue::Text(language.to_string()),
            });
        }
        parts
    }
}
