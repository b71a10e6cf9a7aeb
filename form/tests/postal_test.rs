use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use anketo_form::{FormController, PostalAutofill, PostalClient, QuestionnaireForm};

fn shared_form() -> Arc<Mutex<QuestionnaireForm>> {
    Arc::new(Mutex::new(QuestionnaireForm::new()))
}

fn short_autofill(server: &MockServer) -> PostalAutofill {
    let client = PostalClient::new(format!("{}/api/search", server.uri()));
    PostalAutofill::with_delay(client, Duration::from_millis(10))
}

async fn mount_tokyo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "results": [{
                "address1": "東京都",
                "address2": "千代田区",
                "address3": "千代田",
            }],
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn lookup_fills_prefecture_and_city() {
    let server = MockServer::start().await;
    mount_tokyo(&server).await;

    let form = shared_form();
    let mut autofill = short_autofill(&server);
    autofill.schedule("100-0001", Arc::clone(&form));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let form = form.lock();
    assert_eq!(form.prefecture.value, "東京都");
    assert_eq!(form.city.value, "千代田区千代田");
}

#[tokio::test]
async fn debounce_fires_only_the_latest_lookup() {
    let server = MockServer::start().await;
    mount_tokyo(&server).await;

    let form = shared_form();
    let mut autofill = short_autofill(&server);
    autofill.schedule("1000001", Arc::clone(&form));
    autofill.schedule("1000002", Arc::clone(&form));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query().unwrap().contains("1000002"));
}

#[tokio::test]
async fn repeat_and_short_codes_are_ignored() {
    let server = MockServer::start().await;
    mount_tokyo(&server).await;

    let form = shared_form();
    let mut autofill = short_autofill(&server);
    autofill.schedule("1000001", Arc::clone(&form));
    tokio::time::sleep(Duration::from_millis(200)).await;

    // already looked up: no second request
    autofill.schedule("1000001", Arc::clone(&form));
    // not yet 7 digits: no request either
    autofill.schedule("12345", Arc::clone(&form));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn transport_failure_leaves_fields_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let form = shared_form();
    let mut autofill = short_autofill(&server);
    autofill.schedule("1000001", Arc::clone(&form));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let form = form.lock();
    assert!(form.prefecture.value.is_empty());
    assert!(form.city.value.is_empty());
}

#[tokio::test]
async fn api_level_error_status_is_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 400,
            "message": "params error",
        })))
        .mount(&server)
        .await;

    let form = shared_form();
    let mut autofill = short_autofill(&server);
    autofill.schedule("1000001", Arc::clone(&form));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(form.lock().prefecture.value.is_empty());
}

#[tokio::test]
async fn empty_results_are_swallowed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("zipcode", "9999999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "results": null,
        })))
        .mount(&server)
        .await;

    let form = shared_form();
    let mut autofill = short_autofill(&server);
    autofill.schedule("9999999", Arc::clone(&form));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(form.lock().prefecture.value.is_empty());
}

#[tokio::test]
async fn controller_wires_the_postal_field_to_the_autofill() {
    let server = MockServer::start().await;
    mount_tokyo(&server).await;

    let client = PostalClient::new(format!("{}/api/search", server.uri()));
    let mut controller =
        FormController::with_postal_client("http://localhost:8787/api/submit", client.clone());
    controller.set_autofill(PostalAutofill::with_delay(client, Duration::from_millis(10)));

    controller.form().lock().postal_code.value = "100-0001".to_string();
    controller.schedule_postal_lookup();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let form = controller.form();
    let form = form.lock();
    assert_eq!(form.prefecture.value, "東京都");
    assert_eq!(form.city.value, "千代田区千代田");
}
