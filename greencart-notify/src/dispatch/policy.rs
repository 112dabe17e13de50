//! Retry policies.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::NotificationKind;

/// Bounded retry with exponential backoff.
///
/// The first delivery attempt is always made; `max_retries` more follow on
/// transient failure. The wait before retry `i` (0-based) is
/// `base_delay × 2^i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,

    /// Base backoff delay in seconds.
    pub base_delay_secs: u64,
}

impl RetryPolicy {
    /// Create a policy.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay_secs: u64) -> Self {
        Self {
            max_retries,
            base_delay_secs,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(0, 0)
    }

    /// Base backoff delay.
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        Duration::from_secs(self.base_delay_secs)
    }

    /// Total delivery attempts allowed.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait before retry number `retry_index` (0-based).
    #[must_use]
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        self.base_delay()
            .saturating_mul(2_u32.saturating_pow(retry_index))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 60)
    }
}

/// Per-kind retry policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchSettings {
    /// Policy for welcome emails.
    pub welcome: RetryPolicy,

    /// Policy for verification reminders.
    pub verification_reminder: RetryPolicy,
}

impl DispatchSettings {
    /// Use the same policy for every kind.
    #[must_use]
    pub const fn uniform(policy: RetryPolicy) -> Self {
        Self {
            welcome: policy,
            verification_reminder: policy,
        }
    }

    /// Policy applied to `kind`.
    #[must_use]
    pub const fn policy_for(&self, kind: NotificationKind) -> RetryPolicy {
        match kind {
            NotificationKind::Welcome => self.welcome,
            NotificationKind::VerificationReminder => self.verification_reminder,
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            welcome: RetryPolicy::new(3, 60),
            verification_reminder: RetryPolicy::new(2, 30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_policies() {
        let settings = DispatchSettings::default();
        assert_eq!(settings.policy_for(NotificationKind::Welcome), RetryPolicy::new(3, 60));
        assert_eq!(
            settings.policy_for(NotificationKind::VerificationReminder),
            RetryPolicy::new(2, 30)
        );
    }

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::new(3, 60);
        assert_eq!(policy.delay_for(0), Duration::from_secs(60));
        assert_eq!(policy.delay_for(1), Duration::from_secs(120));
        assert_eq!(policy.delay_for(2), Duration::from_secs(240));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_no_retry() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delay_for(0), Duration::ZERO);
    }

    #[test]
    fn test_huge_index_saturates() {
        let policy = RetryPolicy::new(u32::MAX, 1);
        assert_eq!(policy.max_attempts(), u32::MAX);
        assert!(policy.delay_for(200) >= policy.delay_for(31));
    }

    proptest! {
        #[test]
        fn delay_doubles_each_retry(base in 0_u64..10_000, index in 0_u32..16) {
            let policy = RetryPolicy::new(16, base);
            prop_assert_eq!(policy.delay_for(index + 1), policy.delay_for(index) * 2);
        }
    }
}
