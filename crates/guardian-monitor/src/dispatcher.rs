// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Alert dispatch with idempotent delivery.
//!
//! The dispatcher owns the decision sequence around one alert: check the
//! alert log, format the email, send it, and record the delivery. The
//! record is written only after a successful send, so a failed send is
//! retried by a later tick and a replayed message is a no-op.

use std::sync::Arc;

use guardian_core::{
    AlertNotifier, AlertRecord, ChannelMessage, GuardianError, MonitorConfig, StateStore,
    Verdict,
};
use tracing::{debug, info};

/// Outcome of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The alert was delivered and recorded.
    Sent,
    /// An alert for this message id was already delivered earlier.
    AlreadyAlerted,
}

/// Formats and delivers alerts through the notifier, deduplicating against
/// the alert log.
pub struct AlertDispatcher {
    notifier: Arc<dyn AlertNotifier + Send + Sync>,
    store: Arc<dyn StateStore + Send + Sync>,
}

impl AlertDispatcher {
    /// Creates a dispatcher over the given notifier and state store.
    pub fn new(
        notifier: Arc<dyn AlertNotifier + Send + Sync>,
        store: Arc<dyn StateStore + Send + Sync>,
    ) -> Self {
        Self { notifier, store }
    }

    /// Delivers one alert, guarding against duplicates.
    ///
    /// Called only for verdicts at or above the alert threshold. On send
    /// failure the error propagates without recording anything, so the
    /// tick aborts and a later tick retries the same message.
    pub async fn dispatch(
        &self,
        config: &MonitorConfig,
        message: &ChannelMessage,
        verdict: &Verdict,
    ) -> Result<DispatchOutcome, GuardianError> {
        if self.store.has_alert(&message.id).await? {
            debug!(message_id = message.id.as_str(), "alert already delivered, skipping");
            return Ok(DispatchOutcome::AlreadyAlerted);
        }

        let subject = alert_subject(verdict);
        let body = alert_body(message, verdict);
        self.notifier
            .send(&config.parent_email, &subject, &body)
            .await?;

        let record = AlertRecord {
            message_id: message.id.clone(),
            severity: verdict.severity,
            sent_at: chrono::Utc::now().to_rfc3339(),
        };
        self.store.record_alert(&config.channel_id, &record).await?;

        info!(
            message_id = message.id.as_str(),
            severity = %verdict.severity,
            to = config.parent_email.as_str(),
            "alert delivered"
        );
        Ok(DispatchOutcome::Sent)
    }
}

/// Subject line for one alert email.
fn alert_subject(verdict: &Verdict) -> String {
    format!(
        "GUARDIAN ALERT: 1 concerning message detected ({})",
        verdict.severity
    )
}

/// HTML body for one alert email: a heading and a single-row detail table.
fn alert_body(message: &ChannelMessage, verdict: &Verdict) -> String {
    format!(
        r#"<html>
  <body style="font-family:Arial, sans-serif; color:#333;">
    <h2 style="color:#b00020;">Guardian Alert</h2>
    <p>A concerning message was detected in your child's channel:</p>
    <table border="1" cellpadding="6" cellspacing="0" style="border-collapse:collapse;">
      <tr style="background-color:#f2f2f2;">
        <th>Timestamp</th>
        <th>User</th>
        <th>Label</th>
        <th>Reasons</th>
        <th>Message</th>
      </tr>
      <tr>
        <td>{ts}</td>
        <td>{sender}</td>
        <td>{label}</td>
        <td>{reasons}</td>
        <td>{text}</td>
      </tr>
    </table>
    <p style="margin-top:20px;">Stay safe,<br><b>Guardian</b></p>
  </body>
</html>"#,
        ts = escape_html(&message.ts.0),
        sender = escape_html(&message.sender),
        label = verdict.severity,
        reasons = escape_html(&verdict.rationale),
        text = escape_html(&message.text),
    )
}

/// Minimal HTML escaping for untrusted message content.
fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::{Cursor, Severity};

    fn make_message(text: &str) -> ChannelMessage {
        ChannelMessage {
            id: "1712345678.000100".into(),
            sender: "U42".into(),
            text: text.into(),
            ts: Cursor("1712345678.000100".into()),
        }
    }

    fn make_verdict(severity: Severity) -> Verdict {
        Verdict {
            message_id: "1712345678.000100".into(),
            severity,
            rationale: "asks the child to keep a secret".into(),
        }
    }

    #[test]
    fn subject_carries_severity() {
        let subject = alert_subject(&make_verdict(Severity::Predatory));
        assert!(subject.contains("GUARDIAN ALERT"));
        assert!(subject.contains("predatory"));
    }

    #[test]
    fn body_contains_message_details() {
        let body = alert_body(&make_message("meet me after school"), &make_verdict(Severity::Predatory));
        assert!(body.contains("meet me after school"));
        assert!(body.contains("U42"));
        assert!(body.contains("1712345678.000100"));
        assert!(body.contains("keep a secret"));
        assert!(body.contains("<table"));
    }

    #[test]
    fn body_escapes_untrusted_content() {
        let body = alert_body(
            &make_message("<script>alert('x')</script>"),
            &make_verdict(Severity::Suspicious),
        );
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn escape_html_handles_all_specials() {
        assert_eq!(
            escape_html(r#"<a href="x">&</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;"
        );
    }
}
