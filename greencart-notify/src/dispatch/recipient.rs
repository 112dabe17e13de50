//! Recipient identifiers and records.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Identifier naming a recipient in the external directory.
///
/// Serialized untagged, so `42` and `"a1b2"` both round-trip through JSON
/// job payloads and recipient files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipientRef {
    /// Numeric primary key.
    Id(i64),
    /// String key (UUID, username or email address).
    Key(String),
}

impl fmt::Display for RecipientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

impl From<i64> for RecipientRef {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<String> for RecipientRef {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<&str> for RecipientRef {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

/// Integers parse as [`RecipientRef::Id`], anything else as [`RecipientRef::Key`].
impl FromStr for RecipientRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>().map_or_else(|_| Self::Key(s.to_string()), Self::Id))
    }
}

/// A resolved recipient, as supplied by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Directory identifier.
    pub id: RecipientRef,

    /// Name used to greet the recipient.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Contact email address.
    pub address: String,

    /// Whether the recipient has verified their email address.
    #[serde(default)]
    pub verified: bool,

    /// Pending email-verification token, if any.
    #[serde(default)]
    pub verification_token: Option<String>,
}

impl Recipient {
    /// Create an unverified recipient with no display name.
    #[must_use]
    pub fn new(id: impl Into<RecipientRef>, address: &str) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            address: address.to_string(),
            verified: false,
            verification_token: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    /// Set the verification status.
    #[must_use]
    pub const fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Set the pending verification token.
    #[must_use]
    pub fn with_verification_token(mut self, token: &str) -> Self {
        self.verification_token = Some(token.to_string());
        self
    }

    /// Name to greet the recipient with.
    ///
    /// Falls back to the local part of the address when no usable display
    /// name is set.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| {
                self.address
                    .split_once('@')
                    .map_or(self.address.as_str(), |(local, _)| local)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_ref_parsing() {
        assert_eq!("42".parse::<RecipientRef>(), Ok(RecipientRef::Id(42)));
        assert_eq!(
            "jane@example.com".parse::<RecipientRef>(),
            Ok(RecipientRef::Key("jane@example.com".to_string()))
        );
    }

    #[test]
    fn test_recipient_ref_display() {
        assert_eq!(RecipientRef::Id(7).to_string(), "7");
        assert_eq!(RecipientRef::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_recipient_ref_json_is_untagged() {
        let refs: Vec<RecipientRef> = serde_json::from_str(r#"[42, "a1b2"]"#).unwrap();
        assert_eq!(refs, vec![RecipientRef::Id(42), RecipientRef::from("a1b2")]);
        assert_eq!(serde_json::to_string(&refs).unwrap(), r#"[42,"a1b2"]"#);
    }

    #[test]
    fn test_greeting_name_prefers_display_name() {
        let recipient = Recipient::new(1, "john.doe@example.com").with_display_name("John");
        assert_eq!(recipient.greeting_name(), "John");
    }

    #[test]
    fn test_greeting_name_falls_back_to_local_part() {
        let recipient = Recipient::new(1, "john.doe@example.com").with_display_name("   ");
        assert_eq!(recipient.greeting_name(), "john.doe");

        let bare = Recipient::new(2, "localhost-user");
        assert_eq!(bare.greeting_name(), "localhost-user");
    }

    #[test]
    fn test_recipient_deserialize_defaults() {
        let recipient: Recipient =
            serde_json::from_str(r#"{"id": 5, "address": "five@example.com"}"#).unwrap();
        assert_eq!(recipient.id, RecipientRef::Id(5));
        assert!(!recipient.verified);
        assert!(recipient.display_name.is_none());
        assert!(recipient.verification_token.is_none());
    }
}
