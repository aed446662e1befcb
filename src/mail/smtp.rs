use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};

use super::dispatcher::{MailDispatcher, MailError, MailTransport, OutgoingMail};
use crate::config::{ContactConfig, MailCredentials};

pub type SmtpDispatcher = MailDispatcher<SmtpRelay>;

/// STARTTLS relay authenticated with the service account's app password.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    pub fn new(relay: &str, credentials: &MailCredentials) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(relay)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                credentials.user.clone(),
                credentials.app_password.clone(),
            ))
            .build();
        Ok(Self { transport })
    }
}

impl MailTransport for SmtpRelay {
    async fn deliver(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = build_message(mail)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        info!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}

fn mailbox(name: Option<String>, address: &str) -> Result<Mailbox, MailError> {
    let parsed = address.parse::<Address>().map_err(|e| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Mailbox::new(name, parsed))
}

fn build_message(mail: OutgoingMail) -> Result<Message, MailError> {
    Message::builder()
        .from(mailbox(Some(mail.from_name), &mail.from_address)?)
        .to(mailbox(None, &mail.to_address)?)
        .reply_to(mailbox(None, &mail.reply_to)?)
        .subject(mail.subject)
        .multipart(MultiPart::alternative_plain_html(mail.text, mail.html))
        .map_err(|e| MailError::Build(e.to_string()))
}

/// Builds the dispatcher for this deployment. Missing or unusable
/// credentials produce a dispatcher that fails every send.
pub fn dispatcher_from_config(config: &ContactConfig) -> SmtpDispatcher {
    let Some(credentials) = config.credentials.as_ref() else {
        warn!("Mail credentials missing, contact form will not deliver");
        return MailDispatcher::unconfigured();
    };
    match SmtpRelay::new(&config.relay, credentials) {
        Ok(relay) => {
            info!(relay = %config.relay, mailbox = %credentials.user, "Mail relay configured");
            MailDispatcher::new(credentials.user.clone(), relay)
        }
        Err(e) => {
            warn!(error = %e, "Couldn't set up mail relay, contact form will not deliver");
            MailDispatcher::unconfigured()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(reply_to: &str) -> OutgoingMail {
        OutgoingMail {
            from_name: "Portfolio Contact".to_string(),
            from_address: "me@portfolio.dev".to_string(),
            to_address: "me@portfolio.dev".to_string(),
            reply_to: reply_to.to_string(),
            subject: "[General Inquiry] Ada Lovelace".to_string(),
            text: "hello".to_string(),
            html: "<p>hello</p>".to_string(),
        }
    }

    #[test]
    fn test_message_headers() {
        let message = build_message(mail("ada@example.com")).expect("message should build");
        let headers = message.headers();
        assert_eq!(
            headers.get_raw("Subject"),
            Some("[General Inquiry] Ada Lovelace")
        );
        assert!(headers
            .get_raw("Reply-To")
            .is_some_and(|v| v.contains("ada@example.com")));
        assert!(headers
            .get_raw("To")
            .is_some_and(|v| v.contains("me@portfolio.dev")));
    }

    #[test]
    fn test_bad_reply_to_is_an_address_error() {
        let err = build_message(mail("not an address")).expect_err("should reject address");
        assert!(matches!(err, MailError::Address { .. }));
    }

    #[test]
    fn test_missing_credentials_fail_closed() {
        let config = ContactConfig {
            credentials: None,
            ..ContactConfig::default()
        };
        assert!(!dispatcher_from_config(&config).is_configured());
    }
}
