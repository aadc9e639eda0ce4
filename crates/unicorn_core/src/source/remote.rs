//! Remote HTTP API source.
//!
//! # Responsibility
//! - Issue one configurable HTTP request per attempt with a bounded timeout.
//! - Retry transient failures with exponential backoff.
//! - Normalize the response body into a dataset.
//!
//! # Invariants
//! - No request blocks longer than `timeout`.
//! - Total attempts never exceed `retries + 1`.
//! - 4xx responses and malformed bodies are never retried.

use crate::model::dataset::{Dataset, Provenance};
use crate::source::normalize::{extract_record_array, records_from_values};
use crate::source::{DataSource, SourceError, SourceResult};
use log::{info, warn};
use reqwest::blocking::Client;
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const REMOTE_SOURCE_ID: &str = "remote_api";

const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Request description for the remote source.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub url: String,
    /// HTTP method name, e.g. `GET` or `POST`.
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
    /// Extra attempts after the first one for transient failures.
    pub retries: u32,
    /// Delay before the first retry; doubles per further retry.
    pub retry_backoff: Duration,
}

impl RemoteRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            timeout: Duration::from_secs(10),
            retries: 0,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

/// Fetches records from an HTTP(S) endpoint.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    request: RemoteRequest,
}

impl RemoteSource {
    pub fn new(request: RemoteRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &RemoteRequest {
        &self.request
    }

    fn client(&self) -> SourceResult<Client> {
        Client::builder()
            .timeout(self.request.timeout)
            .build()
            .map_err(|err| SourceError::Connect {
                url: self.request.url.clone(),
                message: format!("failed to create HTTP client: {err}"),
            })
    }

    fn method(&self) -> SourceResult<Method> {
        Method::from_bytes(self.request.method.trim().to_ascii_uppercase().as_bytes()).map_err(
            |_| SourceError::Connect {
                url: self.request.url.clone(),
                message: format!("invalid HTTP method `{}`", self.request.method),
            },
        )
    }

    fn fetch_once(&self, client: &Client, method: &Method) -> SourceResult<Value> {
        let url = self.request.url.as_str();
        let mut builder = client.request(method.clone(), url);
        for (name, value) in &self.request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().map_err(|err| classify(url, &err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().map_err(|err| {
            if err.is_timeout() {
                classify(url, &err)
            } else {
                SourceError::Parse(format!("response body from {url}: {err}"))
            }
        })
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.request
            .retry_backoff
            .saturating_mul(factor)
            .min(MAX_BACKOFF)
    }
}

impl DataSource for RemoteSource {
    fn source_id(&self) -> &str {
        REMOTE_SOURCE_ID
    }

    fn provenance(&self) -> Provenance {
        Provenance::RemoteApi
    }

    fn load(&self, limit: usize) -> SourceResult<Dataset> {
        let client = self.client()?;
        let method = self.method()?;
        let max_attempts = self.request.retries.saturating_add(1);
        let started_at = Instant::now();

        let mut attempt = 1;
        let body = loop {
            match self.fetch_once(&client, &method) {
                Ok(body) => break body,
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay = self.backoff_for(attempt);
                    warn!(
                        "event=remote_retry module=remote attempt={} max_attempts={} delay_ms={} error_code={} error={}",
                        attempt,
                        max_attempts,
                        delay.as_millis(),
                        err.code(),
                        err
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(SourceError::Timeout { url, .. }) => {
                    return Err(SourceError::Timeout {
                        url,
                        attempts: attempt,
                    })
                }
                Err(err) => return Err(err),
            }
        };

        info!(
            "event=remote_fetch module=remote status=ok attempts={} duration_ms={}",
            attempt,
            started_at.elapsed().as_millis()
        );

        let values = extract_record_array(body)?;
        records_from_values(&values, Provenance::RemoteApi, limit)
    }
}

fn classify(url: &str, err: &reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout {
            url: url.to_string(),
            attempts: 1,
        }
    } else {
        SourceError::Connect {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
