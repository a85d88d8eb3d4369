// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API request/response types.
//!
//! Guardian only issues non-streaming, text-only classification requests,
//! so this is the corresponding subset of the Messages API surface.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A request to the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    /// Model identifier (e.g., "claude-haiku-4-5-20250901").
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<ApiMessage>,

    /// System prompt (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Whether to stream the response. Always false for classification.
    pub stream: bool,
}

/// A single message in the Anthropic conversation format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Plain text content.
    pub content: String,
}

// --- Response types ---

/// A full response from the Anthropic Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    /// Response ID.
    pub id: String,
    /// Response type (always "message").
    #[serde(rename = "type")]
    pub type_: String,
    /// Role (always "assistant").
    pub role: String,
    /// Content blocks in the response.
    pub content: Vec<ResponseContentBlock>,
    /// Model that generated the response.
    pub model: String,
    /// Reason the generation stopped.
    pub stop_reason: Option<String>,
    /// Token usage statistics.
    pub usage: ApiUsage,
}

impl MessageResponse {
    /// Concatenated text of all text content blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| match block {
                ResponseContentBlock::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A content block in a response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ResponseContentBlock {
    /// Text content block.
    #[serde(rename = "text")]
    Text { text: String },
}

/// Token usage statistics from the API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiUsage {
    /// Number of input tokens consumed.
    pub input_tokens: u32,
    /// Number of output tokens generated.
    pub output_tokens: u32,
}

// --- Error types ---

/// Error envelope returned by the API on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error type (e.g., "rate_limit_error").
    #[serde(rename = "type")]
    pub type_: String,
    /// Human-readable error message.
    pub message: String,
}
