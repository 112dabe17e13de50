//! Notification kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Recipient;

/// Which notification to send.
///
/// The kind selects the template, the subject line, the retry policy and the
/// precondition the recipient must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Sent once the recipient has verified their email address.
    Welcome,
    /// Nudges a recipient who has not verified their address yet.
    VerificationReminder,
}

impl NotificationKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 2] = [Self::Welcome, Self::VerificationReminder];

    /// Whether `recipient` is eligible for this kind.
    ///
    /// Welcome requires a verified address; a reminder is pointless once the
    /// address is verified.
    #[must_use]
    pub const fn precondition_met(self, recipient: &Recipient) -> bool {
        match self {
            Self::Welcome => recipient.verified,
            Self::VerificationReminder => !recipient.verified,
        }
    }

    /// Subject line for this kind.
    #[must_use]
    pub const fn subject(self) -> &'static str {
        match self {
            Self::Welcome => "Welcome to Green Cart - Your Eco-Friendly Shopping Journey Begins!",
            Self::VerificationReminder => "Complete Your Green Cart Registration - Verify Your Email",
        }
    }

    /// Stable name used in logs and configuration keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::VerificationReminder => "verification_reminder",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown notification kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for NotificationKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "welcome" => Ok(Self::Welcome),
            "verification_reminder" | "reminder" => Ok(Self::VerificationReminder),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_requires_verified_recipient() {
        let verified = Recipient::new(1, "a@example.com").verified(true);
        let unverified = Recipient::new(2, "b@example.com");

        assert!(NotificationKind::Welcome.precondition_met(&verified));
        assert!(!NotificationKind::Welcome.precondition_met(&unverified));
    }

    #[test]
    fn test_reminder_requires_unverified_recipient() {
        let verified = Recipient::new(1, "a@example.com").verified(true);
        let unverified = Recipient::new(2, "b@example.com");

        assert!(!NotificationKind::VerificationReminder.precondition_met(&verified));
        assert!(NotificationKind::VerificationReminder.precondition_met(&unverified));
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(
            "welcome".parse::<NotificationKind>(),
            Ok(NotificationKind::Welcome)
        );
        assert_eq!(
            "verification-reminder".parse::<NotificationKind>(),
            Ok(NotificationKind::VerificationReminder)
        );
        assert_eq!(
            "Verification_Reminder".parse::<NotificationKind>(),
            Ok(NotificationKind::VerificationReminder)
        );
        assert!("newsletter".parse::<NotificationKind>().is_err());
    }

    #[test]
    fn test_display_matches_serde_name() {
        for kind in NotificationKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
