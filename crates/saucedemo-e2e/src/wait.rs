//! Wait Mechanisms
//!
//! Every state read against the remote document goes through a bounded
//! condition-polling wait. A check runs at least once, then every
//! `poll_interval` until it yields a value or the deadline passes.
//!
//! Call sites choose how a deadline surfaces:
//!
//! - throwing waits (`wait_until_present`, `wait_until_visible`, ...) return
//!   `E2eError::NotFound` / `E2eError::Timeout`
//! - boolean waits (`is_visible_within`, `wait_until_url_contains`, ...)
//!   resolve to `false`
//!
//! Sleeping uses `tokio::time`, so tests can run on paused virtual time.

use crate::config::TimeoutSettings;
use crate::driver::{Driver, ElementRef};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (15 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 15_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit-wait options taken from suite timeouts
    #[must_use]
    pub const fn from_timeouts(timeouts: &TimeoutSettings) -> Self {
        Self {
            timeout_ms: timeouts.explicit_wait_ms,
            poll_interval_ms: timeouts.poll_interval_ms,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set timeout from a duration
    #[must_use]
    pub const fn with_timeout_duration(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// PRESENCE
// =============================================================================

/// Tri-state element presence, read without waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    /// In the document and displayed
    VisibleAndPresent,
    /// In the document but not displayed
    PresentButHidden,
    /// Not in the document
    Absent,
}

impl Presence {
    /// Whether the element is in the document at all
    #[must_use]
    pub const fn is_present(self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Whether the element is displayed
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::VisibleAndPresent)
    }
}

// =============================================================================
// WAITER
// =============================================================================

/// Condition-polling waits against one driver
#[derive(Debug, Clone, Copy)]
pub struct Waiter<'a> {
    driver: &'a dyn Driver,
    options: WaitOptions,
}

impl<'a> Waiter<'a> {
    /// Create a waiter
    #[must_use]
    pub const fn new(driver: &'a dyn Driver, options: WaitOptions) -> Self {
        Self { driver, options }
    }

    /// Same waiter with a different deadline
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_timeout_duration(timeout);
        self
    }

    /// Active options
    #[must_use]
    pub const fn options(&self) -> WaitOptions {
        self.options
    }

    /// Poll `check` until it yields a value or the deadline passes.
    ///
    /// Transient errors (stale or missing elements) count as "not yet"; the
    /// last one is attached to the timeout error.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Timeout` at the deadline, or the first
    /// non-transient error the check returns.
    pub async fn poll<T, F, Fut>(&self, waited_for: &str, check: F) -> E2eResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Option<T>>>,
    {
        self.poll_retrying(waited_for, E2eError::is_transient, check)
            .await
    }

    async fn poll_retrying<T, F, Fut>(
        &self,
        waited_for: &str,
        retry: fn(&E2eError) -> bool,
        mut check: F,
    ) -> E2eResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Option<T>>>,
    {
        let deadline = Instant::now() + self.options.timeout();
        let mut last_transient: Option<E2eError> = None;
        loop {
            match check().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(err) if retry(&err) => last_transient = Some(err),
                Err(err) => return Err(err),
            }
            let now = Instant::now();
            if now >= deadline {
                let waited_for = match last_transient {
                    Some(err) => format!("{waited_for} (last error: {err})"),
                    None => waited_for.to_string(),
                };
                return Err(E2eError::Timeout {
                    waited_for,
                    ms: self.options.timeout_ms,
                });
            }
            tokio::time::sleep(self.options.poll_interval().min(deadline - now)).await;
        }
    }

    /// Wait for the first match of `locator` to exist.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn wait_until_present(&self, locator: Locator) -> E2eResult<ElementRef> {
        let driver = self.driver;
        self.poll(&format!("presence of {locator}"), || async move {
            Ok(driver.find_all(None, locator).await?.into_iter().next())
        })
        .await
        .map_err(|err| self.not_found(err, locator))
    }

    /// Wait for at least one match of `locator`; returns every match.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn wait_until_all_present(&self, locator: Locator) -> E2eResult<Vec<ElementRef>> {
        let driver = self.driver;
        self.poll(&format!("presence of all {locator}"), || async move {
            let found = driver.find_all(None, locator).await?;
            Ok((!found.is_empty()).then_some(found))
        })
        .await
        .map_err(|err| self.not_found(err, locator))
    }

    /// Wait for the first match of `locator` inside `scope` to exist.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout and `E2eError::StaleElement`
    /// as soon as `scope` belongs to a previous document.
    pub async fn wait_until_present_in(
        &self,
        scope: &ElementRef,
        locator: Locator,
    ) -> E2eResult<ElementRef> {
        let driver = self.driver;
        let waited_for = format!("presence of {locator} in {}", scope.describe());
        self.poll_retrying(&waited_for, retry_within_document, || async move {
            Ok(driver.find_all(Some(scope), locator).await?.into_iter().next())
        })
        .await
        .map_err(|err| self.not_found(err, locator))
    }

    /// Wait for the first match of `locator` to be displayed.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn wait_until_visible(&self, locator: Locator) -> E2eResult<ElementRef> {
        let driver = self.driver;
        self.poll(&format!("visibility of {locator}"), || async move {
            let Some(element) = driver.find_all(None, locator).await?.into_iter().next() else {
                return Ok(None);
            };
            let state = driver.state(&element).await?;
            Ok(state.displayed.then_some(element))
        })
        .await
        .map_err(|err| self.not_found(err, locator))
    }

    /// Non-throwing visibility check; `false` on timeout or driver failure.
    pub async fn is_visible_within(&self, locator: Locator) -> bool {
        match self.wait_until_visible(locator).await {
            Ok(_) => true,
            Err(err) if err.is_timeout() => false,
            Err(err) => {
                tracing::debug!(%locator, error = %err, "visibility check failed");
                false
            }
        }
    }

    /// Wait for an already resolved element to be displayed.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Timeout` on timeout and `E2eError::StaleElement`
    /// as soon as the reference belongs to a previous document.
    pub async fn wait_until_element_visible(&self, element: &ElementRef) -> E2eResult<()> {
        let driver = self.driver;
        let waited_for = format!("visibility of {}", element.describe());
        self.poll_retrying(&waited_for, retry_within_document, || async move {
            Ok(driver.state(element).await?.displayed.then_some(()))
        })
        .await
    }

    /// Wait for the first match of `locator` to be visible and enabled, then
    /// click it in the same polling step.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout, or the click's error.
    pub async fn wait_until_clickable_then_click(&self, locator: Locator) -> E2eResult<ElementRef> {
        let driver = self.driver;
        self.poll(&format!("clickability of {locator}"), || async move {
            let Some(element) = driver.find_all(None, locator).await?.into_iter().next() else {
                return Ok(None);
            };
            if !driver.state(&element).await?.is_interactable() {
                return Ok(None);
            }
            driver.click(&element).await?;
            Ok(Some(element))
        })
        .await
        .map_err(|err| self.not_found(err, locator))
    }

    /// Wait for the URL to contain `fragment`; `false` on timeout.
    pub async fn wait_until_url_contains(&self, fragment: &str) -> bool {
        self.wait_until_url_matches(&format!("URL containing {fragment}"), |url| {
            url.contains(fragment)
        })
        .await
    }

    /// Wait for the URL to satisfy `predicate`; `false` on timeout.
    pub async fn wait_until_url_matches<P>(&self, description: &str, predicate: P) -> bool
    where
        P: Fn(&str) -> bool,
    {
        let driver = self.driver;
        let predicate = &predicate;
        let result = self
            .poll(description, || async move {
                let url = driver.current_url().await?;
                Ok(predicate(&url).then_some(()))
            })
            .await;
        match result {
            Ok(()) => true,
            Err(err) if err.is_timeout() => false,
            Err(err) => {
                tracing::debug!(description, error = %err, "URL check failed");
                false
            }
        }
    }

    /// Wait for every match of `locator` to disappear or hide; `false` on timeout.
    pub async fn wait_until_gone(&self, locator: Locator) -> bool {
        let driver = self.driver;
        let result = self
            .poll(&format!("disappearance of {locator}"), || async move {
                let presence = presence(driver, locator).await?;
                Ok((!presence.is_visible()).then_some(()))
            })
            .await;
        result.is_ok()
    }

    /// Presence of `locator` right now
    ///
    /// # Errors
    ///
    /// Returns driver errors other than stale or missing elements.
    pub async fn presence(&self, locator: Locator) -> E2eResult<Presence> {
        presence(self.driver, locator).await
    }

    fn not_found(&self, err: E2eError, locator: Locator) -> E2eError {
        match err {
            E2eError::Timeout { .. } => E2eError::NotFound {
                locator: locator.to_string(),
                ms: self.options.timeout_ms,
            },
            other => other,
        }
    }
}

/// A stale reference never recovers; only missing elements are worth re-polling.
const fn retry_within_document(err: &E2eError) -> bool {
    matches!(err, E2eError::ElementMissing { .. } | E2eError::NotFound { .. })
}

/// Presence of the first match of `locator`, without waiting.
///
/// # Errors
///
/// Returns driver errors other than stale or missing elements.
pub async fn presence(driver: &dyn Driver, locator: Locator) -> E2eResult<Presence> {
    let Some(element) = driver.find_all(None, locator).await?.into_iter().next() else {
        return Ok(Presence::Absent);
    };
    element_presence(driver, &element).await
}

/// Presence of an already resolved element; stale or missing reads as absent.
///
/// # Errors
///
/// Returns driver errors other than stale or missing elements.
pub async fn element_presence(driver: &dyn Driver, element: &ElementRef) -> E2eResult<Presence> {
    match driver.state(element).await {
        Ok(state) if state.displayed => Ok(Presence::VisibleAndPresent),
        Ok(_) => Ok(Presence::PresentButHidden),
        Err(err) if err.is_transient() => Ok(Presence::Absent),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeStorefront;
    use crate::pages::login;

    fn fake() -> FakeStorefront {
        FakeStorefront::new("https://www.saucedemo.com/")
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = WaitOptions::default();
            assert_eq!(options.timeout(), Duration::from_secs(15));
            assert_eq!(options.poll_interval(), Duration::from_millis(100));
        }

        #[test]
        fn test_from_timeouts() {
            let timeouts = TimeoutSettings {
                explicit_wait_ms: 2_500,
                poll_interval_ms: 20,
                ..TimeoutSettings::default()
            };
            let options = WaitOptions::from_timeouts(&timeouts);
            assert_eq!(options.timeout_ms, 2_500);
            assert_eq!(options.poll_interval_ms, 20);
        }

        #[test]
        fn test_builders() {
            let options = WaitOptions::new()
                .with_timeout(500)
                .with_poll_interval(10);
            assert_eq!(options.timeout(), Duration::from_millis(500));
            let options = options.with_timeout_duration(Duration::from_secs(3));
            assert_eq!(options.timeout_ms, 3_000);
        }
    }

    mod presence_tests {
        use super::*;

        #[test]
        fn test_presence_flags() {
            assert!(Presence::VisibleAndPresent.is_visible());
            assert!(Presence::PresentButHidden.is_present());
            assert!(!Presence::PresentButHidden.is_visible());
            assert!(!Presence::Absent.is_present());
        }

        #[tokio::test(start_paused = true)]
        async fn test_presence_of_login_controls() {
            let driver = fake();
            driver.goto("https://www.saucedemo.com/").await.unwrap();
            let waiter = Waiter::new(&driver, WaitOptions::default());
            assert_eq!(
                waiter.presence(login::USERNAME_INPUT).await.unwrap(),
                Presence::VisibleAndPresent
            );
            assert_eq!(
                waiter.presence(login::ERROR_BANNER).await.unwrap(),
                Presence::Absent
            );
        }
    }

    mod polling_tests {
        use super::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[tokio::test(start_paused = true)]
        async fn test_poll_returns_first_value() {
            let driver = fake();
            let calls = AtomicUsize::new(0);
            let waiter = Waiter::new(&driver, WaitOptions::new().with_timeout(1_000));
            let value = waiter
                .poll("third call", || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move { Ok((n >= 2).then_some(n)) }
                })
                .await
                .unwrap();
            assert_eq!(value, 2);
        }

        #[tokio::test(start_paused = true)]
        async fn test_poll_times_out_with_description() {
            let driver = fake();
            let waiter = Waiter::new(&driver, WaitOptions::new().with_timeout(300));
            let start = Instant::now();
            let err = waiter
                .poll("never", || async { Ok(None::<()>) })
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::Timeout { ms: 300, .. }));
            assert!(err.to_string().contains("never"));
            assert!(start.elapsed() >= Duration::from_millis(300));
        }

        #[tokio::test(start_paused = true)]
        async fn test_transient_errors_keep_polling() {
            let driver = fake();
            let calls = AtomicUsize::new(0);
            let waiter = Waiter::new(&driver, WaitOptions::new().with_timeout(1_000));
            let value = waiter
                .poll("recovers", || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n == 0 {
                            Err(E2eError::StaleElement {
                                locator: "css=.x".into(),
                            })
                        } else {
                            Ok(Some("ok"))
                        }
                    }
                })
                .await
                .unwrap();
            assert_eq!(value, "ok");
        }

        #[tokio::test(start_paused = true)]
        async fn test_fatal_errors_abort_immediately() {
            let driver = fake();
            let calls = AtomicUsize::new(0);
            let waiter = Waiter::new(&driver, WaitOptions::default());
            let err = waiter
                .poll("fatal", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err::<Option<()>, _>(E2eError::driver("session closed")) }
                })
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::Driver { .. }));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_last_transient_error_is_reported() {
            let driver = fake();
            let waiter = Waiter::new(&driver, WaitOptions::new().with_timeout(200));
            let err = waiter
                .poll("stale forever", || async {
                    Err::<Option<()>, _>(E2eError::ElementMissing {
                        locator: "css=.gone".into(),
                    })
                })
                .await
                .unwrap_err();
            assert!(err.to_string().contains("css=.gone"));
        }
    }

    mod element_wait_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_missing_element_is_not_found() {
            let driver = fake();
            driver.goto("https://www.saucedemo.com/").await.unwrap();
            let waiter = Waiter::new(&driver, WaitOptions::new().with_timeout(500));
            let err = waiter
                .wait_until_present(login::ERROR_BANNER)
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::NotFound { ms: 500, .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_visible_within_false_on_timeout() {
            let driver = fake();
            driver.goto("https://www.saucedemo.com/").await.unwrap();
            let waiter = Waiter::new(&driver, WaitOptions::new().with_timeout(500));
            assert!(waiter.is_visible_within(login::LOGIN_BUTTON).await);
            assert!(!waiter.is_visible_within(login::ERROR_BANNER).await);
        }

        #[tokio::test(start_paused = true)]
        async fn test_clickable_then_click_clicks() {
            let driver = fake();
            driver.goto("https://www.saucedemo.com/").await.unwrap();
            let waiter = Waiter::new(&driver, WaitOptions::default());
            waiter
                .wait_until_clickable_then_click(login::LOGIN_BUTTON)
                .await
                .unwrap();
            assert!(driver.was_called("click:id=login-button"));
            assert!(waiter.is_visible_within(login::ERROR_BANNER).await);
        }

        #[tokio::test(start_paused = true)]
        async fn test_url_waits() {
            let driver = fake();
            driver.goto("https://www.saucedemo.com/").await.unwrap();
            let waiter = Waiter::new(&driver, WaitOptions::new().with_timeout(300));
            assert!(waiter.wait_until_url_contains("saucedemo").await);
            assert!(!waiter.wait_until_url_contains("/inventory.html").await);
            assert!(
                waiter
                    .wait_until_url_matches("https scheme", |url| url.starts_with("https://"))
                    .await
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_scoped_wait_on_stale_scope() {
            let driver = fake();
            driver.goto("https://www.saucedemo.com/").await.unwrap();
            let waiter = Waiter::new(&driver, WaitOptions::new().with_timeout(300));
            let button = waiter.wait_until_present(login::LOGIN_BUTTON).await.unwrap();
            driver.goto("https://www.saucedemo.com/").await.unwrap();
            let err = waiter
                .wait_until_present_in(&button, login::ERROR_CLOSE_BUTTON)
                .await
                .unwrap_err();
            assert!(matches!(err, E2eError::StaleElement { .. }));
        }
    }
}
