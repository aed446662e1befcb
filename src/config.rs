use std::env;

use thiserror::Error;
use tracing::{info, warn};

use crate::contact::ContactSettings;

pub const DEFAULT_SMTP_RELAY: &str = "smtp.gmail.com";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable {0} not set")]
    Missing(&'static str),
    #[error("Environment variable {0} is empty")]
    Empty(&'static str),
}

#[derive(Clone)]
pub struct MailCredentials {
    pub user: String,
    pub app_password: String,
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("user", &self.user)
            .field("app_password", &"<redacted>")
            .finish()
    }
}

/// Deployment settings for the contact form, read from the environment.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    pub credentials: Option<MailCredentials>,
    pub relay: String,
    pub verification_site_key: Option<String>,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            relay: DEFAULT_SMTP_RELAY.to_string(),
            verification_site_key: None,
        }
    }
}

impl ContactConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            let value = lookup(key).ok_or(ConfigError::Missing(key))?;
            let value = value.trim().to_string();
            if value.is_empty() {
                return Err(ConfigError::Empty(key));
            }
            Ok(value)
        };

        let credentials = match (required("GMAIL_USER"), required("GMAIL_APP_PASSWORD")) {
            (Ok(user), Ok(app_password)) => Some(MailCredentials { user, app_password }),
            (user, password) => {
                for e in [user.err(), password.err()].into_iter().flatten() {
                    warn!("{e}");
                }
                None
            }
        };
        let relay = required("SMTP_RELAY").unwrap_or_else(|_| {
            info!("SMTP_RELAY not set, using default: {DEFAULT_SMTP_RELAY}");
            DEFAULT_SMTP_RELAY.to_string()
        });
        let verification_site_key = required("CAPTCHA_SITE_KEY")
            .map_err(|_| info!("CAPTCHA_SITE_KEY not set, hosted verification disabled"))
            .ok();

        Self {
            credentials,
            relay,
            verification_site_key,
        }
    }

    pub fn settings(&self) -> ContactSettings {
        ContactSettings {
            verification_site_key: self.verification_site_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> ContactConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ContactConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_full_environment() {
        let config = load(&[
            ("GMAIL_USER", "me@gmail.com"),
            ("GMAIL_APP_PASSWORD", "abcd efgh"),
            ("SMTP_RELAY", "smtp.example.com"),
            ("CAPTCHA_SITE_KEY", "0x4AAA"),
        ]);
        let creds = config.credentials.expect("credentials should load");
        assert_eq!(creds.user, "me@gmail.com");
        assert_eq!(creds.app_password, "abcd efgh");
        assert_eq!(config.relay, "smtp.example.com");
        assert_eq!(config.verification_site_key.as_deref(), Some("0x4AAA"));
    }

    #[test]
    fn test_partial_credentials_are_dropped() {
        let config = load(&[("GMAIL_USER", "me@gmail.com"), ("GMAIL_APP_PASSWORD", "  ")]);
        assert!(config.credentials.is_none());
        assert_eq!(config.relay, DEFAULT_SMTP_RELAY);
        assert_eq!(config.settings().verification_site_key, None);
    }

    #[test]
    fn test_password_is_redacted() {
        let creds = MailCredentials {
            user: "me@gmail.com".to_string(),
            app_password: "secret".to_string(),
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }
}
