//! Dispatch outcomes.
//!
//! Outcomes are values: the dispatcher never surfaces a failure as an `Err`.
//! Callers (the job queue, the admin CLI) decide whether to log, alert or
//! simply record them.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::RecipientRef;

/// Why a dispatch was skipped without attempting delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The recipient does not satisfy the kind's precondition.
    PreconditionUnmet,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreconditionUnmet => f.write_str("precondition unmet"),
        }
    }
}

/// Terminal failure of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum DispatchError {
    /// The directory has no such recipient. Permanent.
    #[error("recipient not found")]
    RecipientNotFound,

    /// The notification content could not be rendered. Permanent.
    #[error("failed to render notification: {0}")]
    Render(String),

    /// Delivery failed, either permanently or after exhausting retries.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Result of dispatching one notification to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The transport accepted the message.
    Sent {
        /// Delivery attempts made, including the successful one.
        attempts: u32,
    },

    /// Nothing was sent, by design.
    Skipped {
        /// Why the dispatch was skipped.
        reason: SkipReason,
    },

    /// Nothing was sent and the dispatcher gave up.
    Failed {
        /// What went wrong.
        error: DispatchError,
        /// Delivery attempts made before giving up.
        attempts_made: u32,
    },
}

impl DispatchOutcome {
    pub(crate) const fn not_found() -> Self {
        Self::Failed {
            error: DispatchError::RecipientNotFound,
            attempts_made: 0,
        }
    }

    /// Whether the message was delivered.
    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }

    /// Whether the dispatch was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Whether the dispatch failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Number of delivery attempts made.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Sent { attempts } => *attempts,
            Self::Skipped { .. } => 0,
            Self::Failed { attempts_made, .. } => *attempts_made,
        }
    }

    /// The failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&DispatchError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent { attempts: 1 } => f.write_str("sent"),
            Self::Sent { attempts } => write!(f, "sent after {attempts} attempts"),
            Self::Skipped { reason } => write!(f, "skipped ({reason})"),
            Self::Failed {
                error,
                attempts_made,
            } => write!(f, "failed after {attempts_made} attempts: {error}"),
        }
    }
}

/// Outcomes of a bulk dispatch, keyed by recipient in input order.
///
/// Every distinct recipient of the request appears exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkResult {
    entries: Vec<(RecipientRef, DispatchOutcome)>,
}

impl BulkResult {
    pub(crate) const fn from_entries(entries: Vec<(RecipientRef, DispatchOutcome)>) -> Self {
        Self { entries }
    }

    /// Outcome for `recipient`, if it was part of the request.
    #[must_use]
    pub fn get(&self, recipient: &RecipientRef) -> Option<&DispatchOutcome> {
        self.entries
            .iter()
            .find(|(key, _)| key == recipient)
            .map(|(_, outcome)| outcome)
    }

    /// Number of recipients in the result.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the result is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recipients in input order.
    pub fn recipients(&self) -> impl Iterator<Item = &RecipientRef> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// `(recipient, outcome)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&RecipientRef, &DispatchOutcome)> {
        self.entries.iter().map(|(key, outcome)| (key, outcome))
    }

    /// Number of delivered notifications.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_sent()).count()
    }

    /// Number of skipped recipients.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_skipped()).count()
    }

    /// Number of failed dispatches.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.is_failed()).count()
    }
}

impl IntoIterator for BulkResult {
    type Item = (RecipientRef, DispatchOutcome);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts() {
        assert_eq!(DispatchOutcome::Sent { attempts: 2 }.attempts(), 2);
        assert_eq!(
            DispatchOutcome::Skipped {
                reason: SkipReason::PreconditionUnmet
            }
            .attempts(),
            0
        );
        assert_eq!(DispatchOutcome::not_found().attempts(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(DispatchOutcome::Sent { attempts: 1 }.to_string(), "sent");
        assert_eq!(
            DispatchOutcome::Sent { attempts: 3 }.to_string(),
            "sent after 3 attempts"
        );
        assert_eq!(
            DispatchOutcome::not_found().to_string(),
            "failed after 0 attempts: recipient not found"
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = DispatchOutcome::Failed {
            error: DispatchError::Delivery("421 try later".to_string()),
            attempts_made: 4,
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"]["kind"], "delivery");
        assert_eq!(json["attempts_made"], 4);

        let back: DispatchOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(back, outcome);
    }

    #[test]
    fn test_bulk_result_lookup_and_counts() {
        let result = BulkResult::from_entries(vec![
            (RecipientRef::Id(1), DispatchOutcome::Sent { attempts: 1 }),
            (RecipientRef::Id(2), DispatchOutcome::not_found()),
            (
                RecipientRef::Id(3),
                DispatchOutcome::Skipped {
                    reason: SkipReason::PreconditionUnmet,
                },
            ),
        ]);

        assert_eq!(result.len(), 3);
        assert!(result.get(&RecipientRef::Id(1)).unwrap().is_sent());
        assert!(result.get(&RecipientRef::Id(2)).unwrap().is_failed());
        assert!(result.get(&RecipientRef::Id(9)).is_none());
        assert_eq!(result.sent_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.skipped_count(), 1);

        let order: Vec<_> = result.recipients().cloned().collect();
        assert_eq!(
            order,
            vec![RecipientRef::Id(1), RecipientRef::Id(2), RecipientRef::Id(3)]
        );
    }
}
