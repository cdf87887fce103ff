use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::error::NotifyError;
use crate::validate::is_plausible_email;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    /// Addresses dropped because they are not shaped like an email address.
    #[serde(skip)]
    pub skipped: Vec<String>,
}

impl Notification {
    /// Builds one message for many recipients. Duplicates (ignoring case) keep
    /// their first occurrence.
    pub fn compose<I, S>(subject: &str, body: &str, recipients: I) -> Result<Self, NotifyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let subject = subject.trim();
        let body = body.trim();
        if subject.is_empty() {
            return Err(NotifyError::MissingSubject);
        }
        if body.is_empty() {
            return Err(NotifyError::MissingBody);
        }

        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        let mut skipped = Vec::new();

        for recipient in recipients {
            let address = recipient.as_ref().trim();
            if !is_plausible_email(address) {
                warn!(address, "skipping recipient");
                skipped.push(address.to_string());
                continue;
            }
            if seen.insert(address.to_lowercase()) {
                kept.push(address.to_string());
            }
        }

        if kept.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        Ok(Self {
            subject: subject.to_string(),
            body: body.to_string(),
            recipients: kept,
            skipped,
        })
    }
}
