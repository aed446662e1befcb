use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::error::BlockReason;
use super::normalize::{normalize_email, normalize_phone, validate_email, validate_phone};

/// Subjects offered by the contact form's select box, in display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    #[default]
    #[serde(rename = "Job Opportunity")]
    JobOpportunity,
    #[serde(rename = "Project Collaboration")]
    ProjectCollaboration,
    #[serde(rename = "Technical Discussion")]
    TechnicalDiscussion,
    #[serde(rename = "General Inquiry")]
    GeneralInquiry,
}

impl Subject {
    pub const ALL: [Subject; 4] = [
        Subject::JobOpportunity,
        Subject::ProjectCollaboration,
        Subject::TechnicalDiscussion,
        Subject::GeneralInquiry,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Subject::JobOpportunity => "Job Opportunity",
            Subject::ProjectCollaboration => "Project Collaboration",
            Subject::TechnicalDiscussion => "Technical Discussion",
            Subject::GeneralInquiry => "General Inquiry",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown subject: {0}")]
pub struct UnknownSubject(pub String);

impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subject::ALL
            .into_iter()
            .find(|subject| subject.label() == s.trim())
            .ok_or_else(|| UnknownSubject(s.to_string()))
    }
}

/// User-editable fields of the contact form.
///
/// The honeypot is deliberately not a `Field`: it is never stored, only
/// inspected at submit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Subject,
    Message,
    Challenge,
    Verification,
}

impl Field {
    /// The `name` attribute of the matching form control.
    pub fn name(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Subject => "subject",
            Field::Message => "message",
            Field::Challenge => "challenge",
            Field::Verification => "verification_token",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub subject: Subject,
    pub message: String,
}

impl FormPayload {
    /// Stores a raw input value, normalizing email and phone on the way in.
    ///
    /// Unknown subjects leave the current selection untouched; the challenge
    /// and verification fields are not part of the payload and are ignored.
    pub fn set(&mut self, field: Field, value: &str) {
        match field {
            Field::FirstName => self.first_name = value.to_string(),
            Field::LastName => self.last_name = value.to_string(),
            Field::Email => self.email = normalize_email(value),
            Field::Phone => self.phone = normalize_phone(value),
            Field::Subject => {
                if let Ok(subject) = value.parse() {
                    self.subject = subject;
                }
            }
            Field::Message => self.message = value.to_string(),
            Field::Challenge | Field::Verification => {}
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::FirstName => Some(&self.first_name),
            Field::LastName => Some(&self.last_name),
            Field::Email => Some(&self.email),
            Field::Phone => Some(&self.phone),
            Field::Subject => Some(self.subject.label()),
            Field::Message => Some(&self.message),
            Field::Challenge | Field::Verification => None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_empty(&self) -> bool {
        *self == FormPayload::default()
    }

    /// Field checks shared by the browser gate and the server function:
    /// required text fields first, then email, then phone.
    pub fn validate(&self) -> Result<(), BlockReason> {
        for field in [Field::FirstName, Field::LastName, Field::Message] {
            if self.get(field).is_none_or(|v| v.trim().is_empty()) {
                return Err(BlockReason::Required(field));
            }
        }
        validate_email(&self.email)?;
        validate_phone(&self.phone)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub success: bool,
}

impl SubmissionResult {
    pub fn sent() -> Self {
        Self { success: true }
    }

    pub fn failed() -> Self {
        Self { success: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_labels_round_trip() {
        for subject in Subject::ALL {
            assert_eq!(subject.label().parse::<Subject>(), Ok(subject));
        }
        assert!("Sales pitch".parse::<Subject>().is_err());
    }

    #[test]
    fn test_set_normalizes_contact_fields() {
        let mut payload = FormPayload::default();
        payload.set(Field::Email, " Jane@Gmial.com");
        payload.set(Field::Phone, "+91 (987) 654-3210");
        payload.set(Field::Subject, "General Inquiry");
        payload.set(Field::Subject, "not an option");

        assert_eq!(payload.email, "jane@gmail.com");
        assert_eq!(payload.phone, "919876543210");
        assert_eq!(payload.subject, Subject::GeneralInquiry);
    }

    #[test]
    fn test_validate_requires_names_and_message() {
        let mut payload = FormPayload {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "9876543210".to_string(),
            message: "Hello".to_string(),
            ..Default::default()
        };
        assert_eq!(payload.validate(), Ok(()));

        payload.message = " \n ".to_string();
        assert_eq!(
            payload.validate(),
            Err(BlockReason::Required(Field::Message))
        );
        payload.last_name.clear();
        assert_eq!(
            payload.validate(),
            Err(BlockReason::Required(Field::LastName))
        );

        // required fields are reported before a bad email
        payload.email = "broken".to_string();
        assert_eq!(
            payload.validate(),
            Err(BlockReason::Required(Field::LastName))
        );
        payload.last_name = "Lovelace".to_string();
        payload.message = "Hello".to_string();
        assert_eq!(payload.validate(), Err(BlockReason::InvalidEmail));
    }

    #[test]
    fn test_payload_uses_camel_case_on_the_wire() {
        let payload = FormPayload {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            subject: Subject::TechnicalDiscussion,
            ..Default::default()
        };
        let json = serde_json::to_value(&payload).expect("payload should serialize");
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["lastName"], "Lovelace");
        assert_eq!(json["subject"], "Technical Discussion");
        assert_eq!(payload.full_name(), "Ada Lovelace");
    }
}
