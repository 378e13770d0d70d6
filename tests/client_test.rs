//! APIクライアント結合テスト
//!
//! ローカルのモックHTTPサーバーに対してリクエスト内容とエラー正規化を検証

use farmaid_ai::client::{http_client_builder, ApiClient};
use farmaid_common::store::AUTH_TOKEN_KEY;
use farmaid_common::{
    ApiError, ClientConfig, ExpertFilters, ImageSource, KeyValueStorage, MemoryStorage,
    PredictRequest, ProductFilters, RecommendationType,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// 受信したリクエスト（小文字化した生テキスト）を記録するモックサーバー
struct MockServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    async fn start(status: u16, body: &'static str) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    async fn start_with_delay(status: u16, body: &'static str, delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind失敗");
        let addr = listener.local_addr().expect("アドレス取得失敗");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    handle(stream, status, body, delay, recorded).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}/api", addr),
            requests,
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock失敗").clone()
    }
}

async fn handle(
    mut stream: TcpStream,
    status: u16,
    body: &'static str,
    delay: Duration,
    recorded: Arc<Mutex<Vec<String>>>,
) {
    let request = read_request(&mut stream).await;
    recorded.lock().expect("lock失敗").push(request);

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let response = format!(
        "HTTP/1.1 {} Mock\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data).to_lowercase();
        let Some(header_end) = text.find("\r\n\r\n") else {
            continue;
        };
        let headers = &text[..header_end];
        let received_body = data.len() - (header_end + 4);

        if headers.contains("transfer-encoding: chunked") {
            if text.ends_with("0\r\n\r\n") {
                break;
            }
            continue;
        }

        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if received_body >= content_length {
            break;
        }
    }

    String::from_utf8_lossy(&data).to_lowercase()
}

fn client_for(base_url: &str, timeout_ms: u64, storage: Arc<MemoryStorage>) -> ApiClient {
    let config = ClientConfig {
        base_url: base_url.to_string(),
        timeout_ms,
    };
    let http = http_client_builder(&config)
        .no_proxy()
        .build()
        .expect("クライアント作成失敗");
    ApiClient::with_http(config, storage, http)
}

fn leaf_image() -> PredictRequest {
    PredictRequest::new(ImageSource::File {
        file_name: "leaf.jpg".to_string(),
        mime_type: "image/jpeg".to_string(),
        bytes: vec![0xff, 0xd8, 0xff, 0xe0],
    })
}

const PREDICTION_BODY: &str = r#"{
    "success": true,
    "data": {
        "id": "diag-42",
        "disease": "Cassava Mosaic Disease",
        "confidence": 91.5,
        "recommendations": [
            {"id": "r1", "title": "Remove infected plants", "description": "Uproot and burn",
             "type": "treatment", "products": ["Gloves"]}
        ]
    }
}"#;

/// 予測成功時: トークン・マルチパート・言語が送られる
#[tokio::test]
async fn test_predict_sends_token_and_form() {
    let server = MockServer::start(200, PREDICTION_BODY).await;
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(AUTH_TOKEN_KEY, "secret-token").expect("書き込み失敗");
    let client = client_for(&server.base_url, 5_000, storage);

    let result = client
        .predict(leaf_image().with_language("ha"))
        .await
        .expect("予測失敗");

    assert_eq!(result.disease, "Cassava Mosaic Disease");
    assert_eq!(result.confidence, 91.5);
    assert!(result.is_high_confidence());
    assert_eq!(result.recommendations[0].kind, RecommendationType::Treatment);
    assert_eq!(result.feedback_id(), "diag-42");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.starts_with("post /api/predict "));
    assert!(request.contains("authorization: bearer secret-token"));
    assert!(request.contains("multipart/form-data"));
    assert!(request.contains("name=\"image\"; filename=\"leaf.jpg\""));
    assert!(request.contains("name=\"language\""));
}

/// トークン未保存なら Authorization ヘッダーなし
#[tokio::test]
async fn test_request_without_token_has_no_authorization() {
    let server = MockServer::start(200, r#"{"success": true, "data": []}"#).await;
    let client = client_for(&server.base_url, 5_000, Arc::new(MemoryStorage::new()));

    let experts = client
        .get_experts(&ExpertFilters::default())
        .await
        .expect("取得失敗");
    assert!(experts.is_empty());

    let requests = server.requests();
    assert!(requests[0].starts_with("get /api/experts "));
    assert!(!requests[0].contains("authorization:"));
}

/// トークンはリクエストごとに読み直される
#[tokio::test]
async fn test_token_read_per_request() {
    let server = MockServer::start(200, r#"{"success": true, "data": []}"#).await;
    let storage = Arc::new(MemoryStorage::new());
    let client = client_for(&server.base_url, 5_000, storage.clone());

    client.get_products(&ProductFilters::default()).await.expect("取得失敗");
    storage.set_item(AUTH_TOKEN_KEY, "later").expect("書き込み失敗");
    client.get_products(&ProductFilters::default()).await.expect("取得失敗");

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].contains("authorization:"));
    assert!(requests[1].contains("authorization: bearer later"));
}

/// サーバーのメッセージがそのままエラーメッセージになる
#[tokio::test]
async fn test_server_message_surfaces() {
    let server = MockServer::start(404, r#"{"success": false, "message": "No disease found"}"#).await;
    let client = client_for(&server.base_url, 5_000, Arc::new(MemoryStorage::new()));

    let err = client.predict(leaf_image()).await.expect_err("エラーになるはず");
    assert_eq!(err.to_string(), "No disease found");
    assert!(matches!(err, ApiError::Server { status: Some(404), .. }));
}

/// メッセージなしのHTTPエラーはステータスコード入りのメッセージ
#[tokio::test]
async fn test_status_without_message() {
    let server = MockServer::start(500, "Internal Server Error").await;
    let client = client_for(&server.base_url, 5_000, Arc::new(MemoryStorage::new()));

    let err = client.get_recommendations("cmd").await.expect_err("エラーになるはず");
    assert_eq!(err.to_string(), "Request failed with status code 500");
}

/// data のない予測成功レスポンスは MissingData
#[tokio::test]
async fn test_prediction_without_data() {
    let server = MockServer::start(200, r#"{"success": true}"#).await;
    let client = client_for(&server.base_url, 5_000, Arc::new(MemoryStorage::new()));

    let err = client.predict(leaf_image()).await.expect_err("エラーになるはず");
    assert!(matches!(err, ApiError::MissingData(_)));
    assert_eq!(err.to_string(), "Prediction failed");
}

/// 範囲外の信頼度は受け付けない
#[tokio::test]
async fn test_prediction_confidence_out_of_range() {
    let server = MockServer::start(
        200,
        r#"{"success": true, "data": {"disease": "X", "confidence": 140}}"#,
    )
    .await;
    let client = client_for(&server.base_url, 5_000, Arc::new(MemoryStorage::new()));

    let err = client.predict(leaf_image()).await.expect_err("エラーになるはず");
    assert!(matches!(err, ApiError::Decode(_)));
}

/// 推奨一覧: パスのエンコードと data 欠落時の空リスト
#[tokio::test]
async fn test_recommendations_missing_data_is_empty() {
    let server = MockServer::start(200, r#"{"success": true}"#).await;
    let client = client_for(&server.base_url, 5_000, Arc::new(MemoryStorage::new()));

    let items = client
        .get_recommendations("leaf blight")
        .await
        .expect("取得失敗");
    assert!(items.is_empty());
    assert!(server.requests()[0].starts_with("get /api/recommendations/leaf%20blight "));
}

/// 商品一覧: クエリパラメータ
#[tokio::test]
async fn test_products_query_parameters() {
    let server = MockServer::start(
        200,
        r#"{"success": true, "data": [
            {"id": "p1", "name": "Neem Oil", "description": "Organic", "price": 3500, "type": "pesticide"}
        ]}"#,
    )
    .await;
    let client = client_for(&server.base_url, 5_000, Arc::new(MemoryStorage::new()));

    let filters = ProductFilters {
        kind: Some("pesticide".to_string()),
        disease: None,
        min_price: Some(1000.0),
        max_price: None,
    };
    let products = client.get_products(&filters).await.expect("取得失敗");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].formatted_price(), "₦3,500");

    let request = &server.requests()[0];
    assert!(request.starts_with("get /api/products?type=pesticide&minprice=1000 "));
}

/// success=false のリストはエラー
#[tokio::test]
async fn test_list_rejected_by_server() {
    let server = MockServer::start(200, r#"{"success": false, "error": "Database unavailable"}"#).await;
    let client = client_for(&server.base_url, 5_000, Arc::new(MemoryStorage::new()));

    let err = client
        .get_experts(&ExpertFilters::default())
        .await
        .expect_err("エラーになるはず");
    assert_eq!(err.to_string(), "Database unavailable");
}

/// フィードバック: JSON本文と success フラグ
#[tokio::test]
async fn test_feedback_returns_success_flag() {
    let server = MockServer::start(200, r#"{"success": false}"#).await;
    let client = client_for(&server.base_url, 5_000, Arc::new(MemoryStorage::new()));

    let accepted = client
        .submit_feedback("diag-42", false, Some("wrong crop".to_string()))
        .await
        .expect("送信失敗");
    assert!(!accepted);

    let request = &server.requests()[0];
    assert!(request.starts_with("post /api/feedback/diag-42 "));
    assert!(request.contains("application/json"));
    assert!(request.contains(r#""helpful":false"#));
    assert!(request.contains(r#""notes":"wrong crop""#));
}

/// ヘルスチェック: 成功/失敗/タイムアウト/接続不可
#[tokio::test]
async fn test_health_check() {
    let ok = MockServer::start(200, r#"{"success": true}"#).await;
    assert!(client_for(&ok.base_url, 5_000, Arc::new(MemoryStorage::new())).health_check().await);
    assert!(ok.requests()[0].starts_with("get /api/health "));

    let failing = MockServer::start(503, r#"{"success": false}"#).await;
    assert!(!client_for(&failing.base_url, 5_000, Arc::new(MemoryStorage::new())).health_check().await);

    let slow = MockServer::start_with_delay(200, r#"{"success": true}"#, Duration::from_millis(800)).await;
    assert!(!client_for(&slow.base_url, 100, Arc::new(MemoryStorage::new())).health_check().await);

    // 閉じたポート
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind失敗");
    let addr = listener.local_addr().expect("アドレス取得失敗");
    drop(listener);
    let base_url = format!("http://{}/api", addr);
    assert!(!client_for(&base_url, 1_000, Arc::new(MemoryStorage::new())).health_check().await);
}

/// タイムアウトは Timeout エラー
#[tokio::test]
async fn test_predict_timeout() {
    let server = MockServer::start_with_delay(200, PREDICTION_BODY, Duration::from_millis(800)).await;
    let client = client_for(&server.base_url, 100, Arc::new(MemoryStorage::new()));

    let err = client.predict(leaf_image()).await.expect_err("タイムアウトするはず");
    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "timeout of 100ms exceeded");
}

/// 予測中の二重送信は Busy
#[tokio::test]
async fn test_concurrent_predict_rejected() {
    let server = MockServer::start_with_delay(200, PREDICTION_BODY, Duration::from_millis(200)).await;
    let client = client_for(&server.base_url, 5_000, Arc::new(MemoryStorage::new()));

    let (first, second) = tokio::join!(client.predict(leaf_image()), client.predict(leaf_image()));

    assert!(first.is_ok());
    assert!(matches!(second, Err(ApiError::Busy { .. })));
    assert_eq!(server.requests().len(), 1);

    // 完了後は再び送信できる
    assert!(client.predict(leaf_image()).await.is_ok());
}
