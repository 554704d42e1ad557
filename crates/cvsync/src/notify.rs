//! Out-of-band reporting of pass outcomes.
//!
//! Delivery is best effort: the engine logs a [`NotifyError`] and moves on.

use std::fmt::Write as _;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::sync::SyncSummary;

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Terminal outcome of a pass.
#[derive(Debug, Clone)]
pub enum Notification {
    Success(SyncSummary),
    Failure {
        error: String,
        at: DateTime<FixedOffset>,
    },
}

impl Notification {
    pub fn subject(&self) -> &'static str {
        match self {
            Notification::Success(_) => "CVCRM sync completed",
            Notification::Failure { .. } => "CVCRM sync failed",
        }
    }

    /// Plain-text message body.
    pub fn body(&self) -> String {
        let mut body = String::new();
        match self {
            Notification::Success(summary) => {
                let _ = writeln!(body, "Sales data sync finished successfully.");
                let _ = writeln!(body);
                for report in &summary.resources {
                    let _ = write!(
                        body,
                        "  {:<16} {:>6} rows",
                        report.resource, report.stats.written
                    );
                    if let Some(error) = &report.error {
                        let _ = write!(body, " (incomplete: {error})");
                    }
                    let _ = writeln!(body);
                }
                let _ = writeln!(body);
                let _ = writeln!(body, "Duration: {:.1}s", summary.duration.as_secs_f64());
                let _ = writeln!(
                    body,
                    "Started at: {}",
                    summary.started_at.format(TIMESTAMP_FORMAT)
                );
            }
            Notification::Failure { error, at } => {
                let _ = writeln!(body, "The sales data sync aborted.");
                let _ = writeln!(body);
                let _ = writeln!(body, "Error: {error}");
                let _ = writeln!(body, "Detected at: {}", at.format(TIMESTAMP_FORMAT));
                let _ = writeln!(body);
                let _ = writeln!(body, "Check the service logs for details.");
            }
        }
        body
    }
}

/// Errors from delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Receives pass outcomes.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log. Used when no mail relay is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        match notification {
            Notification::Success(summary) => tracing::info!(
                written = summary.total_written(),
                degraded = summary.degraded().count(),
                "{}",
                notification.subject()
            ),
            Notification::Failure { error, .. } => {
                tracing::error!(error = %error, "{}", notification.subject())
            }
        }
        Ok(())
    }
}

#[cfg(feature = "smtp")]
pub use smtp::{SmtpNotifier, SmtpSettings};

#[cfg(feature = "smtp")]
mod smtp {
    use async_trait::async_trait;
    use lettre::{
        AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::Mailbox,
        message::header::ContentType, transport::smtp::authentication::Credentials,
    };

    use super::{Notification, Notifier, NotifyError};

    pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
    pub const DEFAULT_SMTP_PORT: u16 = 587;

    /// Mail relay settings.
    #[derive(Clone)]
    pub struct SmtpSettings {
        pub host: String,
        pub port: u16,
        pub username: String,
        pub password: String,
        /// Recipient; the sender's own address when unset.
        pub to: Option<String>,
    }

    impl std::fmt::Debug for SmtpSettings {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("SmtpSettings")
                .field("host", &self.host)
                .field("port", &self.port)
                .field("username", &self.username)
                .field("password", &"<redacted>")
                .field("to", &self.to)
                .finish()
        }
    }

    impl SmtpSettings {
        pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
            Self {
                host: DEFAULT_SMTP_HOST.to_string(),
                port: DEFAULT_SMTP_PORT,
                username: username.into(),
                password: password.into(),
                to: None,
            }
        }
    }

    /// Sends notifications as plain-text e-mail over STARTTLS.
    pub struct SmtpNotifier {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
        to: Mailbox,
    }

    impl SmtpNotifier {
        pub fn new(settings: &SmtpSettings) -> Result<Self, NotifyError> {
            let from: Mailbox = settings
                .username
                .parse()
                .map_err(|e| NotifyError::Address(format!("{}: {e}", settings.username)))?;
            let to = match &settings.to {
                Some(to) => to
                    .parse()
                    .map_err(|e| NotifyError::Address(format!("{to}: {e}")))?,
                None => from.clone(),
            };

            let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| NotifyError::Delivery(e.to_string()))?
                .port(settings.port)
                .credentials(Credentials::new(
                    settings.username.clone(),
                    settings.password.clone(),
                ))
                .build();

            Ok(Self { transport, from, to })
        }

        pub(crate) fn message(&self, notification: &Notification) -> Result<Message, NotifyError> {
            Message::builder()
                .from(self.from.clone())
                .to(self.to.clone())
                .subject(notification.subject())
                .header(ContentType::TEXT_PLAIN)
                .body(notification.body())
                .map_err(|e| NotifyError::Message(e.to_string()))
        }
    }

    #[async_trait]
    impl Notifier for SmtpNotifier {
        async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
            let message = self.message(notification)?;
            self.transport
                .send(message)
                .await
                .map_err(|e| NotifyError::Delivery(e.to_string()))?;
            tracing::info!(to = %self.to, subject = notification.subject(), "Notification sent");
            Ok(())
        }
    }

}
