use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use anketo_relay::{api_router, AppState, RelayConfig};

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as f64
}

/// A payload that passes the bot filter: empty honeypot, human-paced timing.
fn human_payload() -> Value {
    json!({
        "lastName": "田中",
        "firstName": "太郎",
        "lastNameKana": "タナカ",
        "firstNameKana": "タロウ",
        "postalCode": "1000001",
        "prefecture": "東京都",
        "city": "千代田区千代田",
        "street": "1-1",
        "phone": "0312345678",
        "email": "taro@example.com",
        "gender": "male",
        "occupation": "employee",
        "livingIssues": ["mortgage"],
        "propertyTypes": ["house"],
        "debtStatus": "no_delinquency",
        "notes": "",
        "website": "",
        "formStartedAt": now_ms() - 5000.0,
    })
}

fn dummy_config() -> RelayConfig {
    RelayConfig {
        dummy_send: Some("true".to_string()),
        ..Default::default()
    }
}

fn brevo_config(endpoint: String) -> RelayConfig {
    RelayConfig {
        brevo_api_key: Some("key-123".to_string()),
        brevo_sender_email: Some("noreply@example.com".to_string()),
        brevo_to_email: Some("desk@example.com".to_string()),
        brevo_endpoint: Some(endpoint),
        ..Default::default()
    }
}

/// Binds the real router to an ephemeral port and serves it in the
/// background.
async fn spawn_relay(config: RelayConfig) -> String {
    let state = AppState::new(Arc::new(config));
    let router = api_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn unknown_path_is_404_json() {
    let base = spawn_relay(dummy_config()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/other"))
        .json(&human_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn options_preflight_is_no_content() {
    let base = spawn_relay(dummy_config()).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/api/submit"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 204);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}

#[tokio::test]
async fn non_post_method_is_405_with_allow() {
    let base = spawn_relay(dummy_config()).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/api/submit"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 405);
    let allow = response.headers().get("allow").unwrap().to_str().unwrap();
    assert!(allow.contains("POST"));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let base = spawn_relay(dummy_config()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/submit"))
        .header("content-type", "application/json")
        .body("this is not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn filled_honeypot_is_rejected() {
    let base = spawn_relay(dummy_config()).await;

    let mut payload = human_payload();
    payload["website"] = json!("http://spam");

    let response = reqwest::Client::new()
        .post(format!("{base}/api/submit"))
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "不正な送信が検出されました。");
}

#[tokio::test]
async fn instant_submission_is_rejected() {
    let base = spawn_relay(dummy_config()).await;

    let mut payload = human_payload();
    payload["formStartedAt"] = json!(now_ms() - 500.0);

    let response = reqwest::Client::new()
        .post(format!("{base}/api/submit"))
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "不正な送信が検出されました。");
}

#[tokio::test]
async fn dummy_mode_echoes_formatted_message_without_contacting_brevo() {
    let brevo = MockServer::start().await;
    let mut config = brevo_config(format!("{}/v3/smtp/email", brevo.uri()));
    config.dummy_send = Some("1".to_string());
    let base = spawn_relay(config).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/submit"))
        .json(&human_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["dummy"], true);
    assert_eq!(body["subject"], "アンケートが送信されました");
    let text = body["body"].as_str().unwrap();
    assert!(text.contains("名前：田中 太郎"));
    assert!(text.contains("性別：男性"));
    assert!(text.contains("債務状況：滞納無し"));

    assert!(brevo.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_mail_config_is_500() {
    let base = spawn_relay(RelayConfig::default()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/submit"))
        .json(&human_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "BREVO_API_KEY/BREVO_SENDER_EMAIL/BREVO_TO_EMAIL を設定してください。"
    );
}

#[tokio::test]
async fn submission_is_forwarded_to_brevo() {
    let brevo = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/smtp/email"))
        .and(header("api-key", "key-123"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"messageId": "x"})))
        .expect(1)
        .mount(&brevo)
        .await;

    let base = spawn_relay(brevo_config(format!("{}/v3/smtp/email", brevo.uri()))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/submit"))
        .json(&human_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"ok": true}));

    let requests = brevo.received_requests().await.unwrap();
    let sent: Value = requests[0].body_json().unwrap();
    assert_eq!(sent["sender"]["email"], "noreply@example.com");
    assert_eq!(sent["sender"]["name"], "アンケート");
    assert_eq!(sent["to"], json!([{"email": "desk@example.com"}]));
    assert_eq!(sent["subject"], "アンケートが送信されました");
    assert!(sent["textContent"]
        .as_str()
        .unwrap()
        .contains("ご職業：会社員"));
}

#[tokio::test]
async fn provider_failure_surfaces_as_502_with_detail() {
    let brevo = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/smtp/email"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&brevo)
        .await;

    let base = spawn_relay(brevo_config(format!("{}/v3/smtp/email", brevo.uri()))).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/submit"))
        .json(&human_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Brevo送信に失敗しました。");
    assert_eq!(body["detail"], "upstream exploded");
}

#[tokio::test]
async fn responses_carry_cors_headers() {
    let base = spawn_relay(dummy_config()).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/submit"))
        .json(&human_payload())
        .send()
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap()),
        Some("*")
    );
}
