// SPDX-FileCopyrightText: 2026 Guardian Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP alert notifier adapter for the Guardian monitoring agent.
//!
//! Implements [`AlertNotifier`] over lettre's async SMTP transport.
//! Formatting and idempotence live in the dispatcher; this adapter only
//! delivers what it is given.

use async_trait::async_trait;
use guardian_config::model::EmailConfig;
use guardian_core::{
    AdapterKind, AlertNotifier, GuardianError, HealthStatus, ServiceAdapter,
};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

/// SMTP notifier implementing [`AlertNotifier`].
#[derive(Debug)]
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailNotifier {
    /// Creates a new SMTP notifier from the email config section.
    ///
    /// Connects via STARTTLS on the configured relay; credentials are
    /// attached when both username and password are set.
    pub fn new(config: &EmailConfig) -> Result<Self, GuardianError> {
        let from: Mailbox = config.from_address.parse().map_err(|e| {
            GuardianError::Config(format!(
                "email.from_address `{}` is not a valid mailbox: {e}",
                config.from_address
            ))
        })?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| {
                    GuardianError::Config(format!(
                        "email.smtp_host `{}` is not usable: {e}",
                        config.smtp_host
                    ))
                })?
                .port(config.smtp_port);

        if let (Some(username), Some(password)) =
            (&config.smtp_username, &config.smtp_password)
        {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl ServiceAdapter for EmailNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, GuardianError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Unhealthy("SMTP NOOP failed".into())),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("SMTP unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), GuardianError> {
        debug!("SMTP notifier shutting down");
        Ok(())
    }
}

#[async_trait]
impl AlertNotifier for EmailNotifier {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), GuardianError> {
        let to: Mailbox = to.parse().map_err(|e| {
            GuardianError::Config(format!("alert recipient `{to}` is not a valid mailbox: {e}"))
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| GuardianError::DispatchFailed {
                message: format!("failed to build alert email: {e}"),
                source: Some(Box::new(e)),
            })?;

        self.transport
            .send(message)
            .await
            .map_err(|e| GuardianError::DispatchFailed {
                message: format!("SMTP send failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(to = %to, subject, "alert email delivered");
        Ok(())
    }
}
