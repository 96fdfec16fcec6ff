use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors from the worksheet gateway
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("worksheet API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

/// Append-rows sink keyed by (document id, tab name)
///
/// The narrow seam to the external spreadsheet service; the monitoring cycle
/// only ever appends batches through it.
#[async_trait]
pub trait SheetSink: Send + Sync {
    async fn append_rows(
        &self,
        document_id: &str,
        tab: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SheetError>;
}

/// REST client for a Sheets-style values API
///
/// Appending is a row-count read followed by a positional append. The two
/// calls are not transactional; overlapping writers can interleave, which is
/// an accepted risk for this sink.
pub struct SheetsClient {
    client: Client,
    base_url: String,
    token: String,
}

impl SheetsClient {
    pub fn new(base_url: String, token: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url,
            token,
        }
    }

    async fn row_count(&self, document_id: &str, tab: &str) -> Result<usize, SheetError> {
        let range = urlencoding::encode(&format!("{tab}!A2:G")).into_owned();
        let url = format!(
            "{}/{}/values/{}",
            self.base_url.trim_end_matches('/'),
            document_id,
            range
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Status { status, body });
        }

        let body: Value = response.json().await?;
        Ok(body
            .get("values")
            .and_then(|v| v.as_array())
            .map(|v| v.len())
            .unwrap_or(0))
    }
}

#[async_trait]
impl SheetSink for SheetsClient {
    async fn append_rows(
        &self,
        document_id: &str,
        tab: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SheetError> {
        let next_row = self.row_count(document_id, tab).await? + 1;
        let range =
            urlencoding::encode(&format!("{tab}!A{next_row}:G")).into_owned();
        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.base_url.trim_end_matches('/'),
            document_id,
            range
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "values": rows }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Status { status, body });
        }

        tracing::debug!("Appended {} rows at row {} of {}", rows.len(), next_row, tab);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_append_reads_count_then_appends_positionally() {
        let mut server = mockito::Server::new_async().await;
        let read = server
            .mock("GET", "/doc1/values/Sheet1%21A2%3AG")
            .with_status(200)
            .with_body(r#"{"values": [["a"], ["b"], ["c"]]}"#)
            .create_async()
            .await;
        let append = server
            .mock("POST", "/doc1/values/Sheet1%21A4%3AG:append")
            .match_query(mockito::Matcher::UrlEncoded(
                "valueInputOption".into(),
                "USER_ENTERED".into(),
            ))
            .match_body(mockito::Matcher::PartialJson(json!({
                "values": [["2024-12-01 10:00:00", "FIRST", "300"]]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = SheetsClient::new(server.url(), "token".to_string());
        client
            .append_rows(
                "doc1",
                "Sheet1",
                &[row(&["2024-12-01 10:00:00", "FIRST", "300"])],
            )
            .await
            .unwrap();

        read.assert_async().await;
        append.assert_async().await;
    }

    #[tokio::test]
    async fn test_append_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doc1/values/Sheet1%21A2%3AG")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let client = SheetsClient::new(server.url(), "token".to_string());
        let err = client
            .append_rows("doc1", "Sheet1", &[row(&["x"])])
            .await
            .unwrap_err();

        assert!(matches!(err, SheetError::Status { .. }));
    }

    #[tokio::test]
    async fn test_missing_values_array_counts_as_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/doc1/values/Sheet1%21A2%3AG")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let append = server
            .mock("POST", "/doc1/values/Sheet1%21A1%3AG:append")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = SheetsClient::new(server.url(), "token".to_string());
        client
            .append_rows("doc1", "Sheet1", &[row(&["x"])])
            .await
            .unwrap();
        append.assert_async().await;
    }
}
