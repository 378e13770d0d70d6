//! fetch ベースのAPIクライアント
//!
//! タイムアウトは AbortController で打ち切り、失敗は ApiError に正規化する。

use crate::storage::BrowserStorage;
use farmaid_common::api::{self, bearer_header};
use farmaid_common::store::read_auth_token;
use farmaid_common::{
    ApiError, ClientConfig, DiagnosisResult, Endpoint, Expert, ExpertFilters, FeedbackRequest,
    FormPart, FormValue, InFlight, PredictRequest, Product, ProductFilters, RecommendationItem,
};
use gloo::timers::callback::Timeout;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Blob, BlobPropertyBag, FormData, Request, RequestInit, Response};

enum RequestBody {
    Empty,
    Json(String),
    Form(FormData),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    predict_guard: InFlight,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            predict_guard: InFlight::new("predict"),
        }
    }

    pub fn is_predicting(&self) -> bool {
        self.predict_guard.is_busy()
    }

    pub async fn predict(&self, request: PredictRequest) -> Result<DiagnosisResult, ApiError> {
        let _guard = self.predict_guard.try_acquire()?;

        let result = async {
            let form = to_form_data(request.form_parts())?;
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

    pub async fn submit_feedback(
        &self,
        diagnosis_id: &str,
        helpful: bool,
        notes: Option<String>,
    ) -> Result<bool, ApiError> {
        let result = async {
            let payload = serde_json::to_string(&FeedbackRequest { helpful, notes })
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            let (status, body) = self
                .send(&Endpoint::feedback(diagnosis_id), RequestBody::Json(payload))
                .await?;
            api::decode_success_flag(status, &body)
        }
        .await;

        log_failure("feedback", result)
    }

    pub async fn health_check(&self) -> bool {
        let outcome = self.send(&Endpoint::health(), RequestBody::Empty).await;
        if let Err(e) = &outcome {
            gloo::console::warn!("Health check failed:", e.to_string());
        }
        api::health_from_outcome(outcome)
    }

    async fn send(&self, endpoint: &Endpoint, body: RequestBody) -> Result<(u16, String), ApiError> {
        let controller = AbortController::new().map_err(js_transport)?;
        let request = self.build_request(endpoint, body, &controller)?;

        let window = web_sys::window().ok_or_else(|| ApiError::transport("window is unavailable"))?;

        let timed_out = Rc::new(Cell::new(false));
        let timer = {
            let timed_out = timed_out.clone();
            let millis = u32::try_from(self.config.timeout_ms).unwrap_or(u32::MAX);
            Timeout::new(millis, move || {
                timed_out.set(true);
                controller.abort();
            })
        };

        let outcome = async {
            let value = JsFuture::from(window.fetch_with_request(&request)).await?;
            let response: Response = value.dyn_into()?;
            let text = JsFuture::from(response.text()?).await?;
            Ok::<_, JsValue>((response.status(), text.as_string().unwrap_or_default()))
        }
        .await;
        // 完了したらタイマーを止める
        drop(timer);

        let (status, text) = outcome.map_err(|e| {
            if timed_out.get() {
                ApiError::timeout(self.config.timeout_ms)
            } else {
                js_transport(e)
            }
        })?;

        if !(200..300).contains(&status) {
            gloo::console::error!("API Error:", status, text.clone());
        }

        Ok((status, text))
    }
}

impl ApiClient {
    /// メソッド・本文・ヘッダーを組み立てる（トークンは毎回読み直す）
    fn build_request(
        &self,
        endpoint: &Endpoint,
        body: RequestBody,
        controller: &AbortController,
    ) -> Result<Request, ApiError> {
        let url = endpoint.url(&self.config.base_url);

        let opts = RequestInit::new();
        opts.set_method(endpoint.method.as_str());
        opts.set_signal(Some(&controller.signal()));
        let is_json = matches!(body, RequestBody::Json(_));
        match &body {
            RequestBody::Empty => {}
            RequestBody::Json(text) => opts.set_body(&JsValue::from_str(text)),
            RequestBody::Form(form) => opts.set_body(form),
        }

        let request = Request::new_with_str_and_init(&url, &opts).map_err(js_transport)?;
        let headers = request.headers();
        if is_json {
            headers.set("Content-Type", "application/json").map_err(js_transport)?;
        }
        if let Some(value) = bearer_header(read_auth_token(&BrowserStorage).as_deref()) {
            headers.set("Authorization", &value).map_err(js_transport)?;
        }
        Ok(request)
    }
}

fn log_failure<T>(operation: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(e) = &result {
        gloo::console::error!("API Error:", operation.to_string(), e.to_string());
    }
    result
}

/// JS例外を通信エラーに変換
fn js_transport(value: JsValue) -> ApiError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_default();
    ApiError::transport(message)
}

fn to_form_data(parts: Vec<FormPart>) -> Result<FormData, ApiError> {
    let form = FormData::new().map_err(js_transport)?;
    for part in parts {
        match part.value {
            FormValue::Text(text) => form.append_with_str(part.name, &text).map_err(js_transport)?,
            FormValue::File {
                file_name,
                mime_type,
                bytes,
            } => {
                let array = js_sys::Uint8Array::from(bytes.as_slice());
                let sequence = js_sys::Array::of1(&array);
                let bag = BlobPropertyBag::new();
                bag.set_type(&mime_type);
                let blob = Blob::new_with_u8_array_sequence_and_options(&sequence, &bag)
                    .map_err(js_transport)?;
                form.append_with_blob_and_filename(part.name, &blob, &file_name)
                    .map_err(js_transport)?;
            }
        }
    }
    Ok(form)
}
