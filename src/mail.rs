//! Server-side notification for contact form submissions.

mod dispatcher;
#[cfg(feature = "ssr")]
mod smtp;
mod template;

pub use dispatcher::{MailDispatcher, MailError, MailTransport, OutgoingMail, SENDER_NAME};
#[cfg(feature = "ssr")]
pub use smtp::{dispatcher_from_config, SmtpDispatcher, SmtpRelay};
pub use template::{escape_html, render_html, render_text, subject_line};
