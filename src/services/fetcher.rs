use rand::seq::SliceRandom;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Hard ceiling for any single upstream request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Rotated per request; the upstream endpoint rejects non-browser agents.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Errors from one upstream fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(err)
        }
    }
}

impl FetchError {
    /// The transient class: the only failures worth retrying on the bulk path.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout)
    }
}

/// Upstream HTTP client with a browser-mimicking header set
///
/// One shared connection pool serves both the sequential monitoring path and
/// the bounded fan-out of the bulk sweep.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// POST a form-encoded payload (monitoring path). Returns the decoded
    /// JSON body on 200; any other status is a hard failure for this call.
    pub async fn post_form(&self, url: &str, body: &str) -> Result<Value, FetchError> {
        self.post(url, "application/x-www-form-urlencoded; charset=UTF-8", body.to_string())
            .await
    }

    /// POST a JSON payload (bulk path).
    pub async fn post_json(&self, url: &str, payload: &Value) -> Result<Value, FetchError> {
        self.post(url, "application/json; charset=UTF-8", payload.to_string())
            .await
    }

    async fn post(&self, url: &str, content_type: &str, body: String) -> Result<Value, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let origin = match (parsed.scheme(), parsed.host_str()) {
            (scheme, Some(host)) => format!("{scheme}://{host}"),
            _ => return Err(FetchError::InvalidUrl(url.to_string())),
        };

        tracing::debug!("POST {} ({} bytes)", url, body.len());

        let response = self
            .client
            .post(parsed)
            .header("user-agent", pick_user_agent())
            .header("accept", "*/*")
            .header("accept-language", "en-US,en;q=0.9,fr-FR;q=0.8,fr;q=0.7")
            .header("cache-control", "no-cache")
            .header("pragma", "no-cache")
            .header(
                "sec-ch-ua",
                "\"Not A(Brand\";v=\"99\", \"Google Chrome\";v=\"121\", \"Chromium\";v=\"121\"",
            )
            .header("sec-ch-ua-mobile", "?0")
            .header("sec-ch-ua-platform", "\"macOS\"")
            .header("sec-fetch-dest", "empty")
            .header("sec-fetch-mode", "cors")
            .header("sec-fetch-site", "same-origin")
            .header("origin", &origin)
            .header("referer", &origin)
            .header("x-requested-with", "XMLHttpRequest")
            .header("content-type", content_type)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Upstream returned {} for {}:\n{}", status, url, body);
            return Err(FetchError::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}
