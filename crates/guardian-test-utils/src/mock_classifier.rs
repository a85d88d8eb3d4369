// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock classifier for deterministic testing.
//!
//! `MockClassifier` implements `Classifier` with substring rules mapping
//! message text to severities, plus injectable transient failures for
//! retry-path testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use guardian_core::{
    AdapterKind, ChannelMessage, Classifier, GuardianError, HealthStatus, ServiceAdapter,
    Severity, Verdict,
};

/// A rule-based classifier for testing.
///
/// The first matching substring rule wins; unmatched messages are `Safe`.
pub struct MockClassifier {
    rules: Vec<(String, Severity)>,
    fail_next: Arc<Mutex<u32>>,
    classified: Arc<Mutex<Vec<String>>>,
}

impl MockClassifier {
    /// Create a classifier with default grooming-pattern rules.
    pub fn new() -> Self {
        Self::with_rules(vec![
            ("meet me".to_string(), Severity::Predatory),
            ("our secret".to_string(), Severity::Predatory),
            ("how old are you".to_string(), Severity::Suspicious),
            ("send a photo".to_string(), Severity::Suspicious),
        ])
    }

    /// Create a classifier with explicit substring rules.
    pub fn with_rules(rules: Vec<(String, Severity)>) -> Self {
        Self {
            rules,
            fail_next: Arc::new(Mutex::new(0)),
            classified: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make the next `n` classify calls fail with a transient error.
    pub async fn fail_next(&self, n: u32) {
        *self.fail_next.lock().await = n;
    }

    /// Message ids classified so far, in call order.
    pub async fn classified_ids(&self) -> Vec<String> {
        self.classified.lock().await.clone()
    }

    /// Number of successful classify calls.
    pub async fn classify_count(&self) -> usize {
        self.classified.lock().await.len()
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Classifier
    }

    async fn health_check(&self) -> Result<HealthStatus, GuardianError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GuardianError> {
        Ok(())
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, message: &ChannelMessage) -> Result<Verdict, GuardianError> {
        {
            let mut remaining = self.fail_next.lock().await;
            if *remaining > 0 {
                *remaining -= 1;
                return Err(GuardianError::ClassifyTransient {
                    message: "mock backend unavailable".into(),
                    source: None,
                });
            }
        }

        let lower = message.text.to_lowercase();
        let severity = self
            .rules
            .iter()
            .find(|(needle, _)| lower.contains(needle.as_str()))
            .map(|(_, severity)| *severity)
            .unwrap_or(Severity::Safe);

        self.classified.lock().await.push(message.id.clone());

        Ok(Verdict {
            message_id: message.id.clone(),
            severity,
            rationale: format!("mock rule match: {severity}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_fetcher::make_message;

    #[tokio::test]
    async fn default_rules_match_grooming_patterns() {
        let classifier = MockClassifier::new();

        let predatory = classifier
            .classify(&make_message("1.0", "U1", "Meet me after school, it's our secret"))
            .await
            .unwrap();
        assert_eq!(predatory.severity, Severity::Predatory);

        let suspicious = classifier
            .classify(&make_message("2.0", "U1", "how old are you?"))
            .await
            .unwrap();
        assert_eq!(suspicious.severity, Severity::Suspicious);

        let safe = classifier
            .classify(&make_message("3.0", "U1", "did you finish the homework?"))
            .await
            .unwrap();
        assert_eq!(safe.severity, Severity::Safe);
    }

    #[tokio::test]
    async fn fail_next_injects_transient_errors() {
        let classifier = MockClassifier::new();
        classifier.fail_next(2).await;

        let msg = make_message("1.0", "U1", "hello");
        assert!(classifier.classify(&msg).await.is_err());
        assert!(classifier.classify(&msg).await.is_err());
        assert!(classifier.classify(&msg).await.is_ok());
        assert_eq!(classifier.classify_count().await, 1);
    }

    #[tokio::test]
    async fn classified_ids_record_call_order() {
        let classifier = MockClassifier::new();
        classifier
            .classify(&make_message("1.0", "U1", "a"))
            .await
            .unwrap();
        classifier
            .classify(&make_message("2.0", "U1", "b"))
            .await
            .unwrap();
        assert_eq!(classifier.classified_ids().await, vec!["1.0", "2.0"]);
    }
}
