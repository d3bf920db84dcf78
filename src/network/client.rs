//! HTTP client wrapper - export side channel

use crate::messages::NetworkResponse;
use crate::models::ExportRequest;

/// POST an export request; the answer is only logged by the caller
pub async fn post_export(client: &reqwest::Client, url: &str, request: ExportRequest) -> NetworkResponse {
    let result = client.post(url).json(&request).send().await;

    match result {
        Ok(resp) => {
            let status = resp.status().as_u16();
            match resp.text().await {
                Ok(body) => NetworkResponse::ExportCompleted {
                    request,
                    status,
                    body: compact_json(&body),
                },
                Err(e) => NetworkResponse::ExportFailed {
                    request,
                    error: format!("Error reading body: {}", e),
                },
            }
        }
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timed out (30s)".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                format!("Request failed: {}", e)
            };
            NetworkResponse::ExportFailed { request, error }
        }
    }
}

/// Single-line rendition of a JSON body for the activity log
fn compact_json(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Create an HTTP client with default configuration
pub fn create_client() -> reqwest::Client {
    use std::time::Duration;

    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
