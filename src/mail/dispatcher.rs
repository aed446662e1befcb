use chrono::{DateTime, Utc};
use log::{error, info, warn};
use thiserror::Error;

use super::template::{render_html, render_text, subject_line};
use crate::contact::{BlockReason, FormPayload, SubmissionResult};

pub const SENDER_NAME: &str = "Portfolio Contact";

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Submission rejected: {0}")]
    Rejected(#[from] BlockReason),
    #[error("Mail credentials are not configured")]
    NotConfigured,
    #[error("Invalid address {address}: {reason}")]
    Address { address: String, reason: String },
    #[error("Couldn't build message: {0}")]
    Build(String),
    #[error("Couldn't deliver message: {0}")]
    Transport(String),
}

/// A rendered notification, independent of the wire transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from_name: String,
    pub from_address: String,
    pub to_address: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingMail {
    pub fn compose(mailbox: &str, payload: &FormPayload, received: DateTime<Utc>) -> Self {
        Self {
            from_name: SENDER_NAME.to_string(),
            from_address: mailbox.to_string(),
            to_address: mailbox.to_string(),
            reply_to: payload.email.clone(),
            subject: subject_line(payload),
            text: render_text(payload),
            html: render_html(payload, received),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait MailTransport {
    async fn deliver(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Sends contact notifications to the service mailbox.
///
/// [`MailDispatcher::send`] never fails: every error is logged and turned
/// into `SubmissionResult { success: false }`.
pub struct MailDispatcher<T> {
    service: Option<(String, T)>,
}

impl<T: MailTransport> MailDispatcher<T> {
    pub fn new(mailbox: impl Into<String>, transport: T) -> Self {
        Self {
            service: Some((mailbox.into(), transport)),
        }
    }

    /// A dispatcher without credentials. Every send fails closed.
    pub fn unconfigured() -> Self {
        Self { service: None }
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    pub async fn send(&self, payload: &FormPayload) -> SubmissionResult {
        match self.try_send(payload).await {
            Ok(()) => {
                info!("Contact message from {} delivered", payload.email);
                SubmissionResult::sent()
            }
            Err(e @ MailError::Rejected(_)) => {
                warn!("{e}");
                SubmissionResult::failed()
            }
            Err(e) => {
                error!("Mail error: {e}");
                SubmissionResult::failed()
            }
        }
    }

    async fn try_send(&self, payload: &FormPayload) -> Result<(), MailError> {
        // the server function is reachable without going through the form
        payload.validate()?;
        let (mailbox, transport) = self.service.as_ref().ok_or(MailError::NotConfigured)?;
        let mail = OutgoingMail::compose(mailbox, payload, Utc::now());
        transport.deliver(mail).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::contact::Subject;

    // Keeps delivered mail in memory, or fails every delivery
    #[derive(Default)]
    struct FakeTransport {
        fail: bool,
        delivered: Mutex<Vec<OutgoingMail>>,
    }

    impl MailTransport for FakeTransport {
        async fn deliver(&self, mail: OutgoingMail) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Transport("connection refused".to_string()));
            }
            self.delivered
                .lock()
                .expect("should be able to lock outbox")
                .push(mail);
            Ok(())
        }
    }

    fn payload() -> FormPayload {
        FormPayload {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "9876543210".to_string(),
            subject: Subject::JobOpportunity,
            message: "<script>alert(1)</script>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_delivers_to_service_mailbox() {
        let dispatcher = MailDispatcher::new("me@portfolio.dev", FakeTransport::default());
        let res = dispatcher.send(&payload()).await;
        assert!(res.success);

        let (_, transport) = dispatcher.service.as_ref().expect("configured");
        let outbox = transport.delivered.lock().expect("should be able to lock outbox");
        assert_eq!(outbox.len(), 1);
        let mail = &outbox[0];
        assert_eq!(mail.from_name, "Portfolio Contact");
        assert_eq!(mail.from_address, "me@portfolio.dev");
        assert_eq!(mail.to_address, "me@portfolio.dev");
        assert_eq!(mail.reply_to, "ada@example.com");
        assert_eq!(mail.subject, "[Job Opportunity] Ada Lovelace");
        assert!(mail.html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!mail.html.contains("<script>"));
        assert!(mail.text.ends_with("<script>alert(1)</script>"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported_not_raised() {
        let transport = FakeTransport {
            fail: true,
            ..Default::default()
        };
        let dispatcher = MailDispatcher::new("me@portfolio.dev", transport);
        let res = dispatcher.send(&payload()).await;
        assert_eq!(res, SubmissionResult::failed());
    }

    #[tokio::test]
    async fn test_invalid_payload_is_rejected_before_delivery() {
        let dispatcher = MailDispatcher::new("me@portfolio.dev", FakeTransport::default());
        let blank = FormPayload {
            email: "ada@example.com".to_string(),
            phone: "9876543210".to_string(),
            ..Default::default()
        };
        let bad_phone = FormPayload {
            phone: "12345".to_string(),
            ..payload()
        };
        let bad_email = FormPayload {
            email: "ada@example".to_string(),
            ..payload()
        };
        for invalid in [blank, bad_phone, bad_email] {
            assert_eq!(dispatcher.send(&invalid).await, SubmissionResult::failed());
        }

        let (_, transport) = dispatcher.service.as_ref().expect("configured");
        let outbox = transport.delivered.lock().expect("should be able to lock outbox");
        assert!(outbox.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_dispatcher_fails_closed() {
        let dispatcher = MailDispatcher::<FakeTransport>::unconfigured();
        assert!(!dispatcher.is_configured());
        assert!(!dispatcher.send(&payload()).await.success);
    }
}
