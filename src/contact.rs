//! Contact form submission pipeline, shared by the server and the browser.
//!
//! Nothing here touches the DOM or the network: the Leptos components in
//! `app::contact` drive a [`SubmissionGate`] and plug the `send_mail` server
//! function in as its [`Dispatch`].

use serde::{Deserialize, Serialize};

mod challenge;
mod error;
mod gate;
mod normalize;
mod payload;
mod shortcuts;

pub use challenge::{Challenge, ChallengeGenerator, Operator};
pub use error::BlockReason;
pub use gate::{
    AttemptCounter, Dispatch, GateState, Outcome, SubmissionGate, SubmitAttempt,
    ESCALATION_THRESHOLD,
};
pub use normalize::{normalize_email, normalize_phone, validate_email, validate_phone};
pub use payload::{Field, FormPayload, Subject, SubmissionResult, UnknownSubject};
pub use shortcuts::Shortcut;

/// `sessionStorage` key for the in-progress draft.
pub const DRAFT_STORAGE_KEY: &str = "contact_form_draft";

/// `name` of the hidden honeypot input.
pub const HONEYPOT_FIELD: &str = "company";

/// Public, per-deployment settings the browser needs to render the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSettings {
    pub verification_site_key: Option<String>,
}
