//! バックエンドAPIクライアント（reqwest）
//!
//! 全リクエストで保存済みトークンを Authorization に付与し、
//! 失敗はすべて ApiError に正規化して返す（health_check のみ bool）。

use farmaid_common::api::{self, bearer_header};
use farmaid_common::store::read_auth_token;
use farmaid_common::{
    ApiError, ClientConfig, DiagnosisResult, Endpoint, Expert, ExpertFilters, FeedbackRequest,
    FormPart, FormValue, InFlight, KeyValueStorage, Method, PredictRequest, Product,
    ProductFilters, RecommendationItem,
};
use reqwest::multipart::{Form, Part};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// トークン読み出し元
pub type SharedStorage = Arc<dyn KeyValueStorage + Send + Sync>;

enum RequestBody {
    Empty,
    Json(FeedbackRequest),
    Form(Form),
}

/// 設定済みの reqwest ビルダー（タイムアウト・User-Agent）
pub fn http_client_builder(config: &ClientConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(concat!("farmaid/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_millis(config.timeout_ms))
}

pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    storage: SharedStorage,
    predict_guard: InFlight,
}

impl ApiClient {
    pub fn new(config: ClientConfig, storage: SharedStorage) -> Result<Self, ApiError> {
        let http = http_client_builder(&config)
            .build()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        Ok(Self::with_http(config, storage, http))
    }

    pub fn with_http(config: ClientConfig, storage: SharedStorage, http: reqwest::Client) -> Self {
        Self {
            http,
            config,
            storage,
            predict_guard: InFlight::new("predict"),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 画像から病害を予測
    ///
    /// 実行中に再度呼ぶと Busy で即座に失敗する。
    pub async fn predict(&self, request: PredictRequest) -> Result<DiagnosisResult, ApiError> {
        let _guard = self.predict_guard.try_acquire()?;

        let result = async {
            let form = to_multipart(request.form_parts())?;
            let (status, body) = self.send(&Endpoint::predict(), RequestBody::Form(form)).await?;
            api::decode_prediction(status, &body)
        }
        .await;

        log_failure("predict", result)
    }

    pub async fn get_recommendations(&self, disease_id: &str) -> Result<Vec<RecommendationItem>, ApiError> {
        let result = async {
            let (status, body) = self
                .send(&Endpoint::recommendations(disease_id), RequestBody::Empty)
                .await?;
            api::decode_list(status, &body, "Failed to load recommendations")
        }
        .await;

        log_failure("recommendations", result)
    }

    pub async fn get_experts(&self, filters: &ExpertFilters) -> Result<Vec<Expert>, ApiError> {
        let result = async {
            let (status, body) = self.send(&Endpoint::experts(filters), RequestBody::Empty).await?;
            api::decode_list(status, &body, "Failed to load experts")
        }
        .await;

        log_failure("experts", result)
    }

    pub async fn get_products(&self, filters: &ProductFilters) -> Result<Vec<Product>, ApiError> {
        let result = async {
            let (status, body) = self.send(&Endpoint::products(filters), RequestBody::Empty).await?;
            api::decode_list(status, &body, "Failed to load products")
        }
        .await;

        log_failure("products", result)
    }

    /// 診断へのフィードバック送信（サーバーの success フラグを返す）
    pub async fn submit_feedback(
        &self,
        diagnosis_id: &str,
        helpful: bool,
        notes: Option<String>,
    ) -> Result<bool, ApiError> {
        let body = FeedbackRequest { helpful, notes };
        let result = async {
            let (status, body) = self
                .send(&Endpoint::feedback(diagnosis_id), RequestBody::Json(body))
                .await?;
            api::decode_success_flag(status, &body)
        }
        .await;

        log_failure("feedback", result)
    }

    /// 疎通確認（失敗はすべて false、エラーにはしない）
    pub async fn health_check(&self) -> bool {
        let outcome = self.send(&Endpoint::health(), RequestBody::Empty).await;
        if let Err(e) = &outcome {
            warn!(error = %e, "health check failed");
        }
        api::health_from_outcome(outcome)
    }

    async fn send(&self, endpoint: &Endpoint, body: RequestBody) -> Result<(u16, String), ApiError> {
        let url = endpoint.url(&self.config.base_url);
        let mut request = match endpoint.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };

        // トークンは毎回ストレージから読む
        if let Some(value) = bearer_header(read_auth_token(&*self.storage).as_deref()) {
            request = request.header(reqwest::header::AUTHORIZATION, value);
        }

        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(payload) => request.json(&payload),
            RequestBody::Form(form) => request.multipart(form),
        };

        debug!(method = endpoint.method.as_str(), %url, "sending request");

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !response_ok(status) {
            error!(status, body = %text, "API Error");
        }

        Ok((status, text))
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::timeout(self.config.timeout_ms)
        } else {
            ApiError::transport(e.to_string())
        }
    }
}

fn response_ok(status: u16) -> bool {
    (200..300).contains(&status)
}

fn log_failure<T>(operation: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(e) = &result {
        error!(operation, error = %e, "API Error");
    }
    result
}

fn to_multipart(parts: Vec<FormPart>) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for part in parts {
        form = match part.value {
            FormValue::Text(text) => form.text(part.name, text),
            FormValue::File {
                file_name,
                mime_type,
                bytes,
            } => {
                let file_part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime_type)
                    .map_err(|e| ApiError::transport(format!("invalid MIME type {}: {}", mime_type, e)))?;
                form.part(part.name, file_part)
            }
        };
    }
    Ok(form)
}
