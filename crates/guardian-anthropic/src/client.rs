// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Provides [`AnthropicClient`] which handles request construction,
//! authentication, and transient error retry for non-streaming
//! classification calls.

use std::time::Duration;

use guardian_core::GuardianError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// Base URL for the Anthropic Messages API.
const API_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// HTTP client for Anthropic API communication.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 503, 529).
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    max_retries: u32,
    base_url: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic API client.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key for authentication
    /// * `api_version` - API version string (e.g., "2023-06-01")
    pub fn new(api_key: &str, api_version: &str) -> Result<Self, GuardianError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|e| {
                GuardianError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(api_version).map_err(|e| {
                GuardianError::Config(format!("invalid API version header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| GuardianError::ClassifyTransient {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            max_retries: 1,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Sends a non-streaming request and returns the full response.
    ///
    /// On transient errors (429, 500, 503, 529), retries once after a
    /// 1-second delay. Every failure maps to
    /// [`GuardianError::ClassifyTransient`] so the monitoring loop retries
    /// the message on a later tick instead of dropping it.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, GuardianError> {
        let mut req = request.clone();
        req.stream = false;

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying classification request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(&req)
                .send()
                .await
                .map_err(|e| GuardianError::ClassifyTransient {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "classification response received");

            if status.is_success() {
                let body =
                    response
                        .text()
                        .await
                        .map_err(|e| GuardianError::ClassifyTransient {
                            message: format!("failed to read response body: {e}"),
                            source: Some(Box::new(e)),
                        })?;
                let msg_response: MessageResponse = serde_json::from_str(&body).map_err(|e| {
                    GuardianError::ClassifyTransient {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    }
                })?;
                return Ok(msg_response);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(GuardianError::ClassifyTransient {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            // Non-transient status or exhausted retries. Still surfaced as
            // ClassifyTransient: the message must be re-attempted, never
            // silently dropped.
            let body = response.text().await.unwrap_or_default();
            let error_msg = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "Anthropic API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(GuardianError::ClassifyTransient {
                message: error_msg,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| GuardianError::ClassifyTransient {
            message: "classification request failed after retries".into(),
            source: None,
        }))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth
/// retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> AnthropicClient {
        AnthropicClient::new("test-api-key", "2023-06-01")
            .unwrap()
            .with_base_url(base_url.to_string())
    }

    fn test_request() -> MessageRequest {
        MessageRequest {
            model: "claude-haiku-4-5-20250901".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
            system: None,
            max_tokens: 512,
            stream: false,
        }
    }

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-haiku-4-5-20250901",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    #[tokio::test]
    async fn complete_message_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Hi there!")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete_message(&test_request()).await.unwrap();

        assert_eq!(result.id, "msg_test");
        assert_eq!(result.usage.input_tokens, 10);
        assert_eq!(result.text(), "Hi there!");
    }

    #[tokio::test]
    async fn complete_message_retries_on_429() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {"type": "rate_limit_error", "message": "Rate limited"}
        });

        // First request returns 429, second returns 200.
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("After retry")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete_message(&test_request()).await.unwrap();
        assert_eq!(result.text(), "After retry");
    }

    #[tokio::test]
    async fn complete_message_fails_on_400_as_retryable() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {"type": "invalid_request_error", "message": "Bad model"}
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(&error_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete_message(&test_request()).await.unwrap_err();
        assert!(err.to_string().contains("invalid_request_error"), "got: {err}");
        // Classification failures are always re-attempted on a later tick.
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn complete_message_exhausts_retries_on_503() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {"type": "overloaded_error", "message": "Service overloaded"}
        });

        // Both attempts return 503.
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503).set_body_json(&error_body))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete_message(&test_request()).await.unwrap_err();
        assert!(err.to_string().contains("overloaded_error"), "got: {err}");
    }

    #[tokio::test]
    async fn client_sends_correct_headers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete_message(&test_request()).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }
}
