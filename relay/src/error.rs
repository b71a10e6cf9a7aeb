//! HTTP error type for the relay API.
//!
//! Every failure ends in the `{ok:false, error, detail?}` JSON shape; nothing
//! escalates to a crash.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::mail::MailError;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Not Found")]
    NotFound,

    #[error("JSON形式が正しくありません。")]
    MalformedJson,

    #[error("不正な送信が検出されました。")]
    LikelyBot,

    #[error("BREVO_API_KEY/BREVO_SENDER_EMAIL/BREVO_TO_EMAIL を設定してください。")]
    MissingMailConfig,

    #[error("Brevo送信に失敗しました。")]
    Upstream { detail: String },
}

impl RelayError {
    pub fn http_code(&self) -> StatusCode {
        match self {
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::MalformedJson | RelayError::LikelyBot => StatusCode::BAD_REQUEST,
            RelayError::MissingMailConfig => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<MailError> for RelayError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::MissingConfig => RelayError::MissingMailConfig,
            MailError::Transport(detail) => RelayError::Upstream { detail },
            MailError::Rejected { detail } => RelayError::Upstream { detail },
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        // Trace server errors since the response only carries the public message
        if self.http_code().is_server_error() {
            tracing::error!("Error Status {}: {}", self.http_code(), self);
        }

        let mut body = json!({
            "ok": false,
            "error": self.to_string(),
        });
        if let RelayError::Upstream { detail } = &self {
            body["detail"] = json!(detail);
        }

        (self.http_code(), Json(body)).into_response()
    }
}
