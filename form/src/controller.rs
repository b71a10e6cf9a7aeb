//! Submit pipeline and endpoint wiring for the bound form.

use std::sync::Arc;

use anketo_message::{create_email_message, SubmissionPayload};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;

use crate::postal::{PostalAutofill, PostalClient};
use crate::state::{
    AlertKind, QuestionnaireForm, CONSENT_MESSAGE, DELINQUENCY_MESSAGE,
};

const REQUIRED_FIELDS_MESSAGE: &str = "未入力の必須項目があります。入力内容をご確認ください。";
const NO_ENDPOINT_MESSAGE: &str = "送信先が設定されていません。";
const SUCCESS_MESSAGE: &str = "送信しました。ありがとうございました。";
const SEND_FAILED_PREFIX: &str = "送信に失敗しました。";
const RETRY_MESSAGE: &str = "送信に失敗しました。時間をおいて再度お試しください。";

/// Outcome of one submit attempt, for callers that render the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation blocked the attempt before any network activity.
    Blocked,
    /// The relay accepted the submission.
    Sent,
    /// The relay accepted in debug mode and echoed the formatted message.
    SentDummy,
    /// The request was made and failed; the alert banner carries the detail.
    Failed,
}

/// Success body returned by the relay.
#[derive(Debug, Deserialize)]
struct RelaySuccess {
    #[allow(dead_code)]
    ok: bool,
    #[serde(default)]
    dummy: bool,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// Error body returned by the relay; both fields are optional on the wire.
#[derive(Debug, Default, Deserialize)]
struct RelayFailure {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

enum RelayReply {
    Accepted {
        dummy: bool,
        subject: Option<String>,
        body: Option<String>,
    },
    Rejected {
        detail: String,
    },
    TransportFailed,
}

/// Owns the bound form and drives it against the submission endpoint.
pub struct FormController {
    form: Arc<Mutex<QuestionnaireForm>>,
    http: reqwest::Client,
    endpoint: String,
    autofill: PostalAutofill,
}

impl FormController {
    pub fn new(endpoint: impl Into<String>) -> Self {
        FormController::with_postal_client(endpoint, PostalClient::default())
    }

    pub fn with_postal_client(endpoint: impl Into<String>, postal: PostalClient) -> Self {
        FormController {
            form: Arc::new(Mutex::new(QuestionnaireForm::new())),
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            autofill: PostalAutofill::new(postal),
        }
    }

    /// Swaps the debounce scheduler; tests shorten the delay this way.
    pub fn set_autofill(&mut self, autofill: PostalAutofill) {
        self.autofill = autofill;
    }

    /// Shared handle to the bound form, for rendering and event wiring.
    pub fn form(&self) -> Arc<Mutex<QuestionnaireForm>> {
        Arc::clone(&self.form)
    }

    /// Input/blur hook for the postal-code field.
    pub fn schedule_postal_lookup(&mut self) {
        let raw = self.form.lock().postal_code.value.clone();
        self.autofill.schedule(&raw, Arc::clone(&self.form));
    }

    /// The submit pipeline. Every validation failure surfaces on the form
    /// itself; network and decode errors end in an alert banner, never a
    /// propagated error.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let payload = {
            let mut form = self.form.lock();

            if !form.privacy_consent.checked {
                form.show_privacy_consent_error();
                form.show_alert(AlertKind::Danger, CONSENT_MESSAGE);
                return SubmitOutcome::Blocked;
            }

            // custom validations run first so their messages participate in
            // the native check below
            let living_ok = form.living_issues.validate_at_least_one_checked();
            let property_ok = form.property_types.validate_at_least_one_checked();

            form.sync_delinquency_period_visibility();
            let delinquency_ok = form.delinquency_period_satisfied();
            form.delinquency_period.validation_message = if delinquency_ok {
                String::new()
            } else {
                DELINQUENCY_MESSAGE.to_string()
            };
            form.delinquency_period.invalid = !delinquency_ok;

            if !form.check_validity() || !living_ok || !property_ok || !delinquency_ok {
                form.was_validated = true;
                form.apply_validation_styles();
                form.show_alert(AlertKind::Danger, REQUIRED_FIELDS_MESSAGE);
                return SubmitOutcome::Blocked;
            }

            form.was_validated = true;
            form.debug_panel = None;

            if self.endpoint.is_empty() {
                form.show_alert(AlertKind::Danger, NO_ENDPOINT_MESSAGE);
                return SubmitOutcome::Blocked;
            }

            let payload = form.to_payload();
            let preview = create_email_message(&payload);
            tracing::debug!(subject = %preview.subject, "assembled submission");

            // double-submit guard: stays off until the request settles
            form.submit_enabled = false;
            payload
        };

        let reply = self.send(&payload).await;

        let mut form = self.form.lock();
        form.sync_privacy_consent_state();
        match reply {
            RelayReply::Accepted {
                dummy,
                subject,
                body,
            } => {
                let outcome = if dummy {
                    form.debug_panel = Some(debug_panel_text(
                        &payload,
                        subject.as_deref(),
                        body.as_deref(),
                    ));
                    SubmitOutcome::SentDummy
                } else {
                    SubmitOutcome::Sent
                };
                form.show_alert(AlertKind::Success, SUCCESS_MESSAGE);
                form.reset();
                form.sync_delinquency_period_visibility();
                form.sync_privacy_consent_state();
                outcome
            }
            RelayReply::Rejected { detail } => {
                let message = if detail.is_empty() {
                    SEND_FAILED_PREFIX.to_string()
                } else {
                    format!("{SEND_FAILED_PREFIX}{detail}")
                };
                form.show_alert(AlertKind::Danger, message);
                SubmitOutcome::Failed
            }
            RelayReply::TransportFailed => {
                form.show_alert(AlertKind::Danger, RETRY_MESSAGE);
                SubmitOutcome::Failed
            }
        }
    }

    async fn send(&self, payload: &SubmissionPayload) -> RelayReply {
        let response = match self.http.post(&self.endpoint).json(payload).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "submission request failed");
                return RelayReply::TransportFailed;
            }
        };

        if !response.status().is_success() {
            // prefer the structured {error, detail} body, fall back to text
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<RelayFailure>(&text)
                .map(|failure| failure.detail.or(failure.error).unwrap_or_default())
                .unwrap_or(text);
            return RelayReply::Rejected { detail };
        }

        match response.json::<RelaySuccess>().await {
            Ok(success) => RelayReply::Accepted {
                dummy: success.dummy,
                subject: success.subject,
                body: success.body,
            },
            Err(err) => {
                tracing::warn!(error = %err, "could not decode relay response");
                RelayReply::TransportFailed
            }
        }
    }
}

/// Pretty-printed payload with the echoed subject/body appended, the way the
/// page's debug panel shows it.
fn debug_panel_text(
    payload: &SubmissionPayload,
    subject: Option<&str>,
    body: Option<&str>,
) -> String {
    let mut value = serde_json::to_value(payload).unwrap_or_default();
    if let Value::Object(map) = &mut value {
        map.insert("_mailSubject".to_string(), subject.into());
        map.insert("_mailBody".to_string(), body.into());
    }
    serde_json::to_string_pretty(&value).unwrap_or_default()
}
