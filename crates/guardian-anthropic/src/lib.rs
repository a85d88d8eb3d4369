// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude classifier adapter for the Guardian monitoring agent.
//!
//! Implements [`Classifier`] over the Anthropic Messages API. The model is
//! prompted to return a strict JSON verdict; the adapter normalizes the
//! response into the core [`Verdict`] shape before the loop ever sees it,
//! resolving ambiguity upward to `Suspicious` rather than `Safe`.

pub mod client;
pub mod types;

use async_trait::async_trait;
use guardian_config::model::AnthropicConfig;
use guardian_core::{
    AdapterKind, ChannelMessage, Classifier, GuardianError, HealthStatus, ServiceAdapter,
    Severity, Verdict,
};
use tracing::{debug, warn};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// System prompt for the safety classification call.
const CLASSIFY_SYSTEM_PROMPT: &str = "\
You are a child-safety monitor reviewing a single chat message sent to a child.\n\
Classify the message into exactly one category:\n\
- SAFE: ordinary, age-appropriate conversation\n\
- SUSPICIOUS: boundary-testing, secrecy requests, personal questions from \
strangers, attempts to move the conversation elsewhere\n\
- PREDATORY: grooming, sexual content, requests to meet, requests for photos, \
threats or coercion\n\n\
Respond with ONLY a JSON object in this exact schema, no other text:\n\
{\"label\": \"SAFE\" | \"SUSPICIOUS\" | \"PREDATORY\", \"rationale\": \"<one sentence>\"}";

/// Anthropic-backed classifier implementing [`Classifier`].
pub struct AnthropicClassifier {
    client: AnthropicClient,
    model: String,
    max_tokens: u32,
}

impl AnthropicClassifier {
    /// Creates a new classifier from the Anthropic config section.
    ///
    /// Requires `config.api_key` to be set and non-empty.
    pub fn new(config: &AnthropicConfig) -> Result<Self, GuardianError> {
        let api_key = config.api_key.as_deref().unwrap_or_default();
        if api_key.is_empty() {
            return Err(GuardianError::Config(
                "anthropic.api_key is required for the classifier".into(),
            ));
        }

        Ok(Self {
            client: AnthropicClient::new(api_key, &config.api_version)?,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    #[cfg(test)]
    fn with_base_url(mut self, url: String) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    fn build_request(&self, message: &ChannelMessage) -> MessageRequest {
        MessageRequest {
            model: self.model.clone(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content: format!("[{}] {}", message.sender, message.text),
            }],
            system: Some(CLASSIFY_SYSTEM_PROMPT.to_string()),
            max_tokens: self.max_tokens,
            stream: false,
        }
    }
}

#[async_trait]
impl ServiceAdapter for AnthropicClassifier {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, GuardianError> {
        // No cheap ping endpoint exists; a constructed client with a
        // non-empty key is as healthy as we can observe without spending
        // a classification call.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GuardianError> {
        Ok(())
    }
}

#[async_trait]
impl Classifier for AnthropicClassifier {
    async fn classify(&self, message: &ChannelMessage) -> Result<Verdict, GuardianError> {
        let request = self.build_request(message);
        let response = self.client.complete_message(&request).await?;
        let text = response.text();

        let (severity, rationale) = parse_verdict_text(&text);
        debug!(
            message_id = message.id.as_str(),
            severity = %severity,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "message classified"
        );

        Ok(Verdict {
            message_id: message.id.clone(),
            severity,
            rationale,
        })
    }
}

/// Raw verdict JSON as the model is asked to produce it.
#[derive(Debug, serde::Deserialize)]
struct RawVerdict {
    label: String,
    #[serde(default)]
    rationale: String,
}

/// Normalize the model's response text into a severity and rationale.
///
/// Strict JSON first; if the response wraps the object in prose, the first
/// balanced `{...}` region is tried. As a last resort the text is scanned
/// for the label words. Anything unrecognizable resolves to `Suspicious` --
/// an unreadable verdict must never silently pass as safe.
fn parse_verdict_text(text: &str) -> (Severity, String) {
    if let Some(raw) = extract_json(text)
        && let Some(severity) = parse_label(&raw.label)
    {
        let rationale = if raw.rationale.trim().is_empty() {
            format!("classified as {severity}")
        } else {
            raw.rationale
        };
        return (severity, rationale);
    }

    // Label scan fallback, most severe label first.
    let upper = text.to_uppercase();
    for (needle, severity) in [
        ("PREDATORY", Severity::Predatory),
        ("SUSPICIOUS", Severity::Suspicious),
        ("SAFE", Severity::Safe),
    ] {
        if upper.contains(needle) {
            return (severity, text.trim().to_string());
        }
    }

    warn!("unparseable classifier response, defaulting to suspicious");
    (
        Severity::Suspicious,
        format!("unparseable classifier response: {}", text.trim()),
    )
}

fn extract_json(text: &str) -> Option<RawVerdict> {
    if let Ok(raw) = serde_json::from_str::<RawVerdict>(text.trim()) {
        return Some(raw);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn parse_label(label: &str) -> Option<Severity> {
    match label.trim().to_uppercase().as_str() {
        "SAFE" => Some(Severity::Safe),
        "SUSPICIOUS" => Some(Severity::Suspicious),
        "PREDATORY" => Some(Severity::Predatory),
        _ => None,
    }
}
