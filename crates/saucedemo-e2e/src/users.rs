//! Storefront user identities and their behavioral classes.

use crate::config::TimeoutSettings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Password shared by every demo account
pub const SHARED_PASSWORD: &str = "secret_sauce";

/// A demo account, named by the bug class it exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserClass {
    /// Fully functional account
    Standard,
    /// Rejected at login
    LockedOut,
    /// Broken product images
    Problem,
    /// Artificial latency on every action
    PerformanceGlitch,
    /// Random errors on cart interactions
    Error,
    /// CSS corruption
    Visual,
}

impl UserClass {
    /// Every account, in the order the site lists them
    pub const ALL: [Self; 6] = [
        Self::Standard,
        Self::LockedOut,
        Self::Problem,
        Self::PerformanceGlitch,
        Self::Error,
        Self::Visual,
    ];

    /// Login identifier
    #[must_use]
    pub const fn username(self) -> &'static str {
        match self {
            Self::Standard => "standard_user",
            Self::LockedOut => "locked_out_user",
            Self::Problem => "problem_user",
            Self::PerformanceGlitch => "performance_glitch_user",
            Self::Error => "error_user",
            Self::Visual => "visual_user",
        }
    }

    /// Look up an account by login identifier
    #[must_use]
    pub fn from_username(username: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|user| user.username() == username)
    }

    /// Whether the account can reach the catalog at all
    #[must_use]
    pub const fn can_authenticate(self) -> bool {
        !matches!(self, Self::LockedOut)
    }

    /// Accounts whose product images are expected to fail visibility checks
    #[must_use]
    pub const fn tolerates_broken_images(self) -> bool {
        matches!(self, Self::Problem | Self::Visual)
    }

    /// Accounts with deliberately seeded bugs
    #[must_use]
    pub const fn is_buggy(self) -> bool {
        !matches!(self, Self::Standard | Self::LockedOut)
    }

    /// How long a login may take before it counts as failed
    #[must_use]
    pub const fn login_timeout(self, timeouts: &TimeoutSettings) -> Duration {
        match self {
            Self::PerformanceGlitch => timeouts.slow_login(),
            _ => timeouts.login(),
        }
    }

    /// Accounts that reach the catalog
    pub fn functional() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(|user| user.can_authenticate())
    }
}

impl fmt::Display for UserClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.username())
    }
}

impl FromStr for UserClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_username(s).ok_or_else(|| format!("unknown storefront user '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usernames_round_trip() {
        for user in UserClass::ALL {
            assert_eq!(UserClass::from_username(user.username()), Some(user));
            assert_eq!(user.to_string().parse::<UserClass>(), Ok(user));
        }
        assert!(UserClass::from_username("admin").is_none());
        assert!("admin".parse::<UserClass>().is_err());
    }

    #[test]
    fn test_only_locked_out_is_rejected() {
        let rejected: Vec<_> = UserClass::ALL
            .into_iter()
            .filter(|u| !u.can_authenticate())
            .collect();
        assert_eq!(rejected, vec![UserClass::LockedOut]);
        assert_eq!(UserClass::functional().count(), 5);
    }

    #[test]
    fn test_broken_image_tolerance() {
        assert!(UserClass::Problem.tolerates_broken_images());
        assert!(UserClass::Visual.tolerates_broken_images());
        assert!(!UserClass::Standard.tolerates_broken_images());
        assert!(!UserClass::Error.tolerates_broken_images());
    }

    #[test]
    fn test_login_timeout_for_slow_user() {
        let timeouts = TimeoutSettings::default();
        assert_eq!(
            UserClass::PerformanceGlitch.login_timeout(&timeouts),
            Duration::from_secs(15)
        );
        assert_eq!(
            UserClass::Standard.login_timeout(&timeouts),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_buggy_classes() {
        assert!(!UserClass::Standard.is_buggy());
        assert!(!UserClass::LockedOut.is_buggy());
        assert!(UserClass::PerformanceGlitch.is_buggy());
    }
}
