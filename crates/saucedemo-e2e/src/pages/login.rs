//! Login page: the storefront entry point.

use super::{BasePage, PageObject};
use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::locator::Locator;
use crate::result::E2eResult;
use crate::users::UserClass;
use std::time::Duration;

/// Username input
pub const USERNAME_INPUT: Locator = Locator::id("user-name");
/// Password input
pub const PASSWORD_INPUT: Locator = Locator::id("password");
/// Submit button
pub const LOGIN_BUTTON: Locator = Locator::id("login-button");
/// Error banner
pub const ERROR_BANNER: Locator = Locator::css("[data-test='error']");
/// Close button inside the error banner
pub const ERROR_CLOSE_BUTTON: Locator = Locator::class("error-button");

/// URL fragment of the page a successful login lands on
pub const LOGIN_SUCCESS_FRAGMENT: &str = "/inventory.html";

/// Login page object
#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'s> {
    base: BasePage<'s>,
}

impl PageObject for LoginPage<'_> {
    fn url_pattern(&self) -> &str {
        &self.base.config().base_url
    }

    fn page_name(&self) -> &str {
        "login"
    }
}

impl<'s> LoginPage<'s> {
    /// Create the page object
    #[must_use]
    pub const fn new(driver: &'s dyn Driver, config: &'s SuiteConfig) -> Self {
        Self {
            base: BasePage::new(driver, config),
        }
    }

    /// Load the entry URL and wait for the form
    ///
    /// # Errors
    ///
    /// Returns driver errors or `E2eError::NotFound` if the form never renders.
    pub async fn navigate(&self) -> E2eResult<()> {
        let config = self.base.config();
        self.base.navigate_to(&config.base_url).await?;
        self.base.find(USERNAME_INPUT).await.map(|_| ())
    }

    /// Type the username
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the input never appears.
    pub async fn enter_username(&self, username: &str) -> E2eResult<()> {
        self.base.type_into(USERNAME_INPUT, username).await
    }

    /// Type the password
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the input never appears.
    pub async fn enter_password(&self, password: &str) -> E2eResult<()> {
        self.base.type_into(PASSWORD_INPUT, password).await
    }

    /// Submit the form
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the button never becomes clickable.
    pub async fn click_login_button(&self) -> E2eResult<()> {
        self.base.click(LOGIN_BUTTON).await
    }

    /// Fill credentials and submit. `None` uses the configured shared password.
    ///
    /// A rejected login is not an error here; check
    /// [`LoginPage::is_login_successful`] or [`LoginPage::is_error_displayed`].
    ///
    /// # Errors
    ///
    /// Returns element lookup or driver errors.
    pub async fn login(&self, username: &str, password: Option<&str>) -> E2eResult<()> {
        let password = password.unwrap_or(&self.base.config().password);
        tracing::info!(username, "logging in");
        self.enter_username(username).await?;
        self.enter_password(password).await?;
        self.click_login_button().await
    }

    /// Log in as a demo account with the shared password
    ///
    /// # Errors
    ///
    /// Returns element lookup or driver errors.
    pub async fn login_as(&self, user: UserClass) -> E2eResult<()> {
        self.login(user.username(), None).await
    }

    /// Whether the catalog page loads within `timeout`
    pub async fn is_login_successful(&self, timeout: Duration) -> bool {
        let reached = self
            .base
            .waiter_for(timeout)
            .wait_until_url_contains(LOGIN_SUCCESS_FRAGMENT)
            .await;
        if !reached {
            tracing::debug!(timeout_ms = timeout.as_millis() as u64, "no catalog transition");
        }
        reached
    }

    /// Whether the error banner becomes visible within the banner deadline
    pub async fn is_error_displayed(&self) -> bool {
        self.base
            .is_visible(ERROR_BANNER, self.base.config().timeouts.error_banner())
            .await
    }

    /// Text of the error banner, if one is showing
    pub async fn error_message(&self) -> Option<String> {
        if !self.is_error_displayed().await {
            return None;
        }
        match self.base.text(ERROR_BANNER).await {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(error = %err, "error banner vanished before it could be read");
                None
            }
        }
    }

    /// Dismiss the error banner. Returns `false` when no banner was showing.
    ///
    /// # Errors
    ///
    /// Returns driver errors from the click.
    pub async fn close_error_message(&self) -> E2eResult<bool> {
        if !self.base.presence(ERROR_BANNER).await?.is_visible() {
            return Ok(false);
        }
        self.base.click(ERROR_CLOSE_BUTTON).await?;
        Ok(self.base.waiter().wait_until_gone(ERROR_BANNER).await)
    }

    /// Current value of the username input
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the input never appears.
    pub async fn username_value(&self) -> E2eResult<String> {
        let input = self.base.find(USERNAME_INPUT).await?;
        self.base.driver().input_value(&input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeOptions, FakeStorefront};
    use crate::users::SHARED_PASSWORD;

    fn setup() -> (FakeStorefront, SuiteConfig) {
        let config = SuiteConfig::default();
        (FakeStorefront::new(&config.base_url), config)
    }

    mod login_flow_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_standard_user_logs_in() {
            let (driver, config) = setup();
            let page = LoginPage::new(&driver, &config);
            page.navigate().await.unwrap();
            page.login_as(UserClass::Standard).await.unwrap();
            assert!(page.is_login_successful(config.timeouts.login()).await);
            assert!(driver.was_called(&format!("fill:{USERNAME_INPUT}")));
        }

        #[tokio::test(start_paused = true)]
        async fn test_explicit_password_is_used() {
            let (driver, config) = setup();
            let page = LoginPage::new(&driver, &config);
            page.navigate().await.unwrap();
            page.login("standard_user", Some("not-the-password"))
                .await
                .unwrap();
            assert!(!page.is_login_successful(Duration::from_secs(1)).await);
            let message = page.error_message().await.unwrap();
            assert!(message.contains("do not match"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_default_password_from_config() {
            let (driver, config) = setup();
            assert_eq!(config.password, SHARED_PASSWORD);
            let page = LoginPage::new(&driver, &config);
            page.navigate().await.unwrap();
            page.login("visual_user", None).await.unwrap();
            assert!(page.is_login_successful(config.timeouts.login()).await);
        }

        #[tokio::test(start_paused = true)]
        async fn test_slow_user_needs_extended_timeout() {
            let config = SuiteConfig::default();
            let driver = FakeStorefront::with_options(
                &config.base_url,
                FakeOptions::new().with_login_delay(Duration::from_secs(12)),
            );
            let page = LoginPage::new(&driver, &config);
            page.navigate().await.unwrap();
            page.login_as(UserClass::PerformanceGlitch).await.unwrap();
            assert!(!page.is_login_successful(config.timeouts.login()).await);
            assert!(
                page.is_login_successful(UserClass::PerformanceGlitch.login_timeout(&config.timeouts))
                    .await
            );
        }
    }

    mod error_banner_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_locked_out_error() {
            let (driver, config) = setup();
            let page = LoginPage::new(&driver, &config);
            page.navigate().await.unwrap();
            page.login_as(UserClass::LockedOut).await.unwrap();
            assert!(!page.is_login_successful(config.timeouts.login()).await);
            assert!(page.is_error_displayed().await);
            let message = page.error_message().await.unwrap();
            assert!(message.contains("locked out"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_no_error_before_submit() {
            let (driver, config) = setup();
            let page = LoginPage::new(&driver, &config);
            page.navigate().await.unwrap();
            assert!(!page.is_error_displayed().await);
            assert!(page.error_message().await.is_none());
            assert!(!page.close_error_message().await.unwrap());
        }

        #[tokio::test(start_paused = true)]
        async fn test_close_error_message() {
            let (driver, config) = setup();
            let page = LoginPage::new(&driver, &config);
            page.navigate().await.unwrap();
            page.click_login_button().await.unwrap();
            assert_eq!(
                page.error_message().await.as_deref(),
                Some("Epic sadface: Username is required")
            );
            assert!(page.close_error_message().await.unwrap());
            assert!(page.error_message().await.is_none());
        }

        #[tokio::test(start_paused = true)]
        async fn test_navigate_clears_fields() {
            let (driver, config) = setup();
            let page = LoginPage::new(&driver, &config);
            page.navigate().await.unwrap();
            page.enter_username("standard_user").await.unwrap();
            assert_eq!(page.username_value().await.unwrap(), "standard_user");
            page.navigate().await.unwrap();
            assert_eq!(page.username_value().await.unwrap(), "");
        }
    }
}
