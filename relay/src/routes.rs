//! Router assembly and the submit handler.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use anketo_message::{create_email_message, SubmissionPayload};

use crate::bot::is_likely_bot;
use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::mail::{BrevoMailer, Mailer};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    /// Present only when all Brevo credentials are configured; checked per
    /// request so dummy mode runs unconfigured.
    mailer: Option<BrevoMailer>,
}

impl AppState {
    pub fn new(config: Arc<RelayConfig>) -> Self {
        let mailer = BrevoMailer::from_config(&config).ok();
        AppState { config, mailer }
    }
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/submit", post(submit).options(preflight))
        .fallback(not_found)
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86400))
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn not_found() -> RelayError {
    RelayError::NotFound
}

async fn submit(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, RelayError> {
    let payload: SubmissionPayload =
        serde_json::from_slice(&body).map_err(|_| RelayError::MalformedJson)?;

    if is_likely_bot(&payload, epoch_millis()) {
        tracing::info!("submission rejected by bot filter");
        return Err(RelayError::LikelyBot);
    }

    let message = create_email_message(&payload);

    if state.config.dummy_send_enabled() {
        tracing::info!("dummy send enabled; echoing formatted message");
        return Ok(Json(json!({
            "ok": true,
            "dummy": true,
            "subject": message.subject,
            "body": message.body,
        })));
    }

    let mailer = state.mailer.as_ref().ok_or(RelayError::MissingMailConfig)?;
    mailer.send(&message.subject, &message.body).await?;
    tracing::info!("submission forwarded to mail provider");

    Ok(Json(json!({ "ok": true })))
}

fn epoch_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as f64)
        .unwrap_or_default()
}
