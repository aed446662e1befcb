use thiserror::Error;

use super::payload::Field;

/// Why a submission was stopped before dispatch.
///
/// Every reason maps to exactly one field to annotate and refocus. The
/// honeypot is not represented here: a tripped honeypot never produces
/// feedback.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    #[error("Please fill in this field")]
    Required(Field),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid 10-digit mobile number")]
    InvalidPhone,
    #[error("Incorrect answer, please try the new question")]
    WrongAnswer,
    #[error("Please complete the verification below")]
    VerificationRequired,
}

impl BlockReason {
    pub fn field(&self) -> Field {
        match self {
            BlockReason::Required(field) => *field,
            BlockReason::InvalidEmail => Field::Email,
            BlockReason::InvalidPhone => Field::Phone,
            BlockReason::WrongAnswer => Field::Challenge,
            BlockReason::VerificationRequired => Field::Verification,
        }
    }

    /// Short text for the transient notification.
    pub fn notice(&self) -> &'static str {
        match self {
            BlockReason::Required(_) => "Please fill in all required fields",
            BlockReason::InvalidEmail => "Invalid email address",
            BlockReason::InvalidPhone => "Invalid phone number",
            BlockReason::WrongAnswer => "Wrong answer to the security question",
            BlockReason::VerificationRequired => "Verification required",
        }
    }
}
