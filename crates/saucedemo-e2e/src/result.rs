//! Result and error types for the suite.

use thiserror::Error;

/// Result type for suite operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum E2eError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Driver-level failure (protocol error, closed session, not interactable)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// In-page script evaluation failed or returned an unexpected shape
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// A wait deadline elapsed
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Description of the condition
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// A required element never appeared
    #[error("Element {locator} not found after {ms}ms")]
    NotFound {
        /// Locator that was searched for
        locator: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// An element reference was used after the page changed
    #[error("Stale element reference to {locator}: the page changed since it was resolved")]
    StaleElement {
        /// Locator of the stale reference
        locator: String,
    },

    /// A resolved path step no longer matches anything
    #[error("Element {locator} no longer exists in the current snapshot")]
    ElementMissing {
        /// Locator that failed to resolve
        locator: String,
    },

    /// A required navigation was not confirmed
    #[error("Navigation failed: expected URL containing {expected}, got {actual}")]
    Navigation {
        /// Expected URL fragment
        expected: String,
        /// URL observed at the deadline
        actual: String,
    },

    /// Every navigation strategy was tried without reaching the target
    #[error("Could not open product '{product}' after {attempts} navigation strategies")]
    NavigationExhausted {
        /// Product name
        product: String,
        /// Number of strategies attempted
        attempts: usize,
    },

    /// Product missing from the current catalog snapshot
    #[error("Product not found: {name}")]
    ProductNotFound {
        /// Product name
        name: String,
    },

    /// Scenario assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl E2eError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a script error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create an assertion error
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Errors a polling wait treats as "not yet" rather than fatal.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StaleElement { .. } | Self::ElementMissing { .. } | Self::NotFound { .. }
        )
    }

    /// Whether this error came from a wait deadline.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(E2eError::StaleElement {
            locator: "css=.x".into()
        }
        .is_transient());
        assert!(E2eError::ElementMissing {
            locator: "css=.x".into()
        }
        .is_transient());
        assert!(!E2eError::driver("boom").is_transient());
        assert!(!E2eError::assertion("nope").is_transient());
    }

    #[test]
    fn test_timeout_classification() {
        let err = E2eError::Timeout {
            waited_for: "url".into(),
            ms: 10,
        };
        assert!(err.is_timeout());
        assert!(!E2eError::config("bad").is_timeout());
    }

    #[test]
    fn test_display_messages() {
        let err = E2eError::NavigationExhausted {
            product: "Sauce Labs Backpack".into(),
            attempts: 3,
        };
        assert_eq!(
            err.to_string(),
            "Could not open product 'Sauce Labs Backpack' after 3 navigation strategies"
        );
        let err = E2eError::NotFound {
            locator: "id=login-button".into(),
            ms: 15_000,
        };
        assert!(err.to_string().contains("15000ms"));
    }
}
