//! Heuristic automation filter.
//!
//! Filters naive automated submissions: a filled honeypot or a submit that
//! lands within two seconds of the form being shown. This is not a security
//! boundary — a determined client passes it trivially — so nothing else may
//! treat it as authentication.

use anketo_message::{SubmissionPayload, Timestamp};

/// Submissions completed faster than this read as automation.
pub const MIN_HUMAN_ELAPSED_MS: f64 = 2000.0;

/// `now_ms` is the server receipt time as epoch millis; passed in so the
/// filter stays pure.
pub fn is_likely_bot(payload: &SubmissionPayload, now_ms: f64) -> bool {
    let honeypot = payload.website.as_deref().map(str::trim).unwrap_or("");
    if !honeypot.is_empty() {
        return true;
    }

    let Some(started_at) = payload
        .form_started_at
        .as_ref()
        .and_then(Timestamp::as_millis)
    else {
        return true;
    };

    let elapsed_ms = now_ms - started_at;
    elapsed_ms > 0.0 && elapsed_ms < MIN_HUMAN_ELAPSED_MS
}
