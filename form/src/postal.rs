//! Debounced postal-code → address autofill.
//!
//! Convenience only: failures of any kind are swallowed and the user keeps
//! typing. Never a validation gate.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;

use crate::state::QuestionnaireForm;

/// Public zipcode → address search API.
pub const ZIPCLOUD_ENDPOINT: &str = "https://zipcloud.ibsnet.co.jp/api/search";

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Prefecture and municipality returned by a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub prefecture: String,
    pub city: String,
}

#[derive(Debug, Deserialize)]
struct ZipcloudResponse {
    status: i64,
    #[serde(default)]
    results: Option<Vec<ZipcloudEntry>>,
}

#[derive(Debug, Deserialize)]
struct ZipcloudEntry {
    #[serde(default)]
    address1: String,
    #[serde(default)]
    address2: String,
    #[serde(default)]
    address3: String,
}

/// Strips everything but ASCII digits.
pub fn normalize_postal_code(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Thin zipcloud client. Every failure is reported as `None`.
#[derive(Debug, Clone)]
pub struct PostalClient {
    http: reqwest::Client,
    endpoint: String,
}

impl Default for PostalClient {
    fn default() -> Self {
        PostalClient::new(ZIPCLOUD_ENDPOINT)
    }
}

impl PostalClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        PostalClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub async fn lookup(&self, zipcode: &str) -> Option<Address> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("zipcode", zipcode)])
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }

        let data: ZipcloudResponse = response.json().await.ok()?;
        if data.status != 200 {
            return None;
        }

        let entry = data.results?.into_iter().next()?;
        Some(Address {
            prefecture: entry.address1,
            city: format!("{}{}", entry.address2, entry.address3),
        })
    }
}

/// Single-slot debounce around [`PostalClient`]: scheduling a new lookup
/// cancels any unfired one, so at most the latest pending lookup ever fires.
#[derive(Debug)]
pub struct PostalAutofill {
    client: PostalClient,
    delay: Duration,
    last_lookup: Arc<Mutex<String>>,
    pending: Option<tokio::task::JoinHandle<()>>,
}

impl PostalAutofill {
    pub fn new(client: PostalClient) -> Self {
        PostalAutofill::with_delay(client, DEBOUNCE)
    }

    pub fn with_delay(client: PostalClient, delay: Duration) -> Self {
        PostalAutofill {
            client,
            delay,
            last_lookup: Arc::new(Mutex::new(String::new())),
            pending: None,
        }
    }

    /// Debounce gate for the postal-code field; wired to both input and blur.
    /// Fires only once the normalized value reaches exactly 7 digits and
    /// differs from the last value looked up.
    pub fn schedule(&mut self, raw: &str, form: Arc<Mutex<QuestionnaireForm>>) {
        let normalized = normalize_postal_code(raw);
        if normalized.len() != 7 || *self.last_lookup.lock() == normalized {
            return;
        }

        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        let client = self.client.clone();
        let delay = self.delay;
        let last_lookup = Arc::clone(&self.last_lookup);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            *last_lookup.lock() = normalized.clone();
            if let Some(address) = client.lookup(&normalized).await {
                let mut form = form.lock();
                form.prefecture.value = address.prefecture;
                form.city.value = address.city;
            }
        }));
    }
}
