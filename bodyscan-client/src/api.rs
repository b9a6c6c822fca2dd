use std::time::Duration;

use anyhow::Context;
use bodyscan_shared::{CameraAnalysis, CaptureRequest, ScanHistory};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout).
    #[error("analysis backend unreachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with an explicit error payload.
    #[error("{0}")]
    Service(String),

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Text shown to the user for a failed scan attempt.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unreachable { .. } => {
                "ML backend unreachable. Make sure the analysis service is running.".to_string()
            }
            ApiError::Service(message) => message.clone(),
            ApiError::Decode { .. } => "Unexpected response from the analysis service.".to_string(),
        }
    }
}

/// HTTP client for the analysis service.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid analysis service URL '{}'", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Analysis service URL '{}' cannot carry a path", base_url);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /camera-analyze`. Sent once per capture; never retried.
    pub async fn camera_analyze(&self, request: &CaptureRequest) -> Result<CameraAnalysis, ApiError> {
        let url = self.endpoint(&["camera-analyze"]);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|source| ApiError::Unreachable {
                url: url.to_string(),
                source,
            })?;

        read_json(&url, response).await
    }

    /// `GET /scan-history/{user_id}?limit=N`
    pub async fn scan_history(&self, user_id: &str, limit: u32) -> Result<ScanHistory, ApiError> {
        let mut url = self.endpoint(&["scan-history", user_id]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| ApiError::Unreachable {
                url: url.to_string(),
                source,
            })?;

        read_json(&url, response).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn read_json<T: DeserializeOwned>(url: &Url, response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(|source| ApiError::Unreachable {
        url: url.to_string(),
        source,
    })?;

    decode_body(url, status, &body)
}

fn decode_body<T: DeserializeOwned>(url: &Url, status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) if !status.is_success() => {
            return Err(ApiError::Service(format!(
                "Analysis service returned {}",
                status
            )))
        }
        Err(source) => {
            return Err(ApiError::Decode {
                url: url.to_string(),
                source,
            })
        }
    };

    if let Some(message) = error_message(&value, status) {
        return Err(ApiError::Service(message));
    }

    serde_json::from_value(value).map_err(|source| ApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// An `error` field is honoured on any status; `detail` only on failures.
fn error_message(value: &Value, status: StatusCode) -> Option<String> {
    let as_text = |v: &Value| match v {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    };

    if let Some(message) = value.get("error").and_then(as_text) {
        return Some(message);
    }
    if status.is_success() {
        return None;
    }
    Some(
        value
            .get("detail")
            .and_then(as_text)
            .unwrap_or_else(|| format!("Analysis service returned {}", status)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodyscan_shared::BmiCategory;
    use serde_json::json;

    fn url() -> Url {
        Url::parse("http://localhost:8000/api/camera-analyze").unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let client = AnalysisClient::new("http://localhost:8000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint(&["scan-history", "user 1"]).as_str(),
            "http://localhost:8000/api/scan-history/user%201"
        );
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(AnalysisClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(AnalysisClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_error_field_wins_on_success() {
        let body = json!({"error": "Could not analyze pose"}).to_string();
        let result = decode_body::<CameraAnalysis>(&url(), StatusCode::OK, body.as_bytes());

        match result {
            Err(ApiError::Service(message)) => assert_eq!(message, "Could not analyze pose"),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_error_field_is_ignored() {
        let body = json!({
            "bmi": 24.1, "category": "normal", "confidence": 80,
            "scan_id": "s1", "scanned_at": "2026-10-19T10:00:00Z", "error": null
        })
        .to_string();

        let analysis = decode_body::<CameraAnalysis>(&url(), StatusCode::OK, body.as_bytes()).unwrap();
        assert_eq!(analysis.analysis.category, BmiCategory::Normal);
    }

    #[test]
    fn test_detail_on_failure_status() {
        let body = json!({"detail": "user not found"}).to_string();
        let result = decode_body::<CameraAnalysis>(&url(), StatusCode::NOT_FOUND, body.as_bytes());
        assert_eq!(result.unwrap_err().user_message(), "user not found");

        let result = decode_body::<CameraAnalysis>(&url(), StatusCode::BAD_GATEWAY, b"<html>");
        assert_eq!(
            result.unwrap_err().user_message(),
            "Analysis service returned 502 Bad Gateway"
        );
    }

    #[test]
    fn test_malformed_success_body() {
        let result = decode_body::<CameraAnalysis>(&url(), StatusCode::OK, b"{\"bmi\": 1}");
        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }
}
