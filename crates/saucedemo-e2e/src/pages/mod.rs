//! Page Object Model
//!
//! One type per storefront screen. Page objects are cheap borrowed views
//! over a session's driver and config: they own no state, so a scenario may
//! create them freely and every read goes back to the live document.
//!
//! Locators are `pub const` items of each page module.

pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod login;
pub mod product_detail;

pub use cart::CartPage;
pub use checkout::CheckoutPage;
pub use inventory::InventoryPage;
pub use login::LoginPage;
pub use product_detail::ProductDetailPage;

use crate::config::SuiteConfig;
use crate::driver::{Driver, ElementRef};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use crate::wait::{Presence, WaitOptions, Waiter};
use std::time::Duration;

/// Trait for page objects representing one storefront screen.
pub trait PageObject {
    /// URL fragment that identifies this page
    fn url_pattern(&self) -> &str;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared element helpers every page builds on
#[derive(Debug, Clone, Copy)]
pub struct BasePage<'s> {
    driver: &'s dyn Driver,
    config: &'s SuiteConfig,
}

impl<'s> BasePage<'s> {
    /// Create a base page
    #[must_use]
    pub const fn new(driver: &'s dyn Driver, config: &'s SuiteConfig) -> Self {
        Self { driver, config }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &'s dyn Driver {
        self.driver
    }

    /// Suite configuration
    #[must_use]
    pub const fn config(&self) -> &'s SuiteConfig {
        self.config
    }

    /// Waiter with the explicit-wait deadline
    #[must_use]
    pub const fn waiter(&self) -> Waiter<'s> {
        Waiter::new(self.driver, WaitOptions::from_timeouts(&self.config.timeouts))
    }

    /// Waiter with a custom deadline
    #[must_use]
    pub const fn waiter_for(&self, timeout: Duration) -> Waiter<'s> {
        self.waiter().with_timeout(timeout)
    }

    /// Load an absolute URL
    ///
    /// # Errors
    ///
    /// Returns driver errors.
    pub async fn navigate_to(&self, url: &str) -> E2eResult<()> {
        tracing::debug!(url, "navigating");
        self.driver.goto(url).await
    }

    /// Current URL
    ///
    /// # Errors
    ///
    /// Returns driver errors.
    pub async fn current_url(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    /// Whether the current URL contains the page's pattern, waiting up to `timeout`
    pub async fn is_on<P: PageObject + ?Sized>(&self, page: &P, timeout: Duration) -> bool {
        self.waiter_for(timeout)
            .wait_until_url_contains(page.url_pattern())
            .await
    }

    /// First match of `locator`, waiting up to the explicit wait
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn find(&self, locator: Locator) -> E2eResult<ElementRef> {
        self.waiter().wait_until_present(locator).await
    }

    /// Every match of `locator`, waiting up to `timeout` for the first one
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn find_all(&self, locator: Locator, timeout: Duration) -> E2eResult<Vec<ElementRef>> {
        self.waiter_for(timeout).wait_until_all_present(locator).await
    }

    /// First match of `locator` inside `scope`, waiting up to the implicit wait
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout or `E2eError::StaleElement`
    /// when `scope` belongs to a previous document.
    pub async fn find_in(&self, scope: &ElementRef, locator: Locator) -> E2eResult<ElementRef> {
        self.waiter_for(self.config.timeouts.implicit_wait())
            .wait_until_present_in(scope, locator)
            .await
    }

    /// First match of `locator` inside `scope`, without waiting
    ///
    /// # Errors
    ///
    /// Returns driver errors, including a stale `scope`.
    pub async fn try_find_in(
        &self,
        scope: &ElementRef,
        locator: Locator,
    ) -> E2eResult<Option<ElementRef>> {
        Ok(self
            .driver
            .find_all(Some(scope), locator)
            .await?
            .into_iter()
            .next())
    }

    /// Wait for `locator` to be clickable, then click it
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn click(&self, locator: Locator) -> E2eResult<()> {
        tracing::debug!(%locator, "click");
        self.waiter()
            .wait_until_clickable_then_click(locator)
            .await
            .map(|_| ())
    }

    /// Click a resolved element
    ///
    /// # Errors
    ///
    /// Returns `E2eError::StaleElement` for references from a previous
    /// document and driver errors for hidden elements.
    pub async fn click_element(&self, element: &ElementRef) -> E2eResult<()> {
        tracing::debug!(element = %element.describe(), "click");
        self.driver.click(element).await
    }

    /// Text of the first match of `locator`
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn text(&self, locator: Locator) -> E2eResult<String> {
        let element = self.find(locator).await?;
        self.driver.text(&element).await
    }

    /// Text of the first match of `locator` inside `scope`
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout or a stale-scope error.
    pub async fn text_in(&self, scope: &ElementRef, locator: Locator) -> E2eResult<String> {
        let element = self.find_in(scope, locator).await?;
        self.driver.text(&element).await
    }

    /// Replace the value of the input at `locator`
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn type_into(&self, locator: Locator, text: &str) -> E2eResult<()> {
        let element = self.find(locator).await?;
        self.driver.fill(&element, text).await
    }

    /// Attribute of the first match of `locator`
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn attribute(&self, locator: Locator, name: &str) -> E2eResult<Option<String>> {
        let element = self.find(locator).await?;
        self.driver.attribute(&element, name).await
    }

    /// Whether `locator` becomes visible within `timeout`
    pub async fn is_visible(&self, locator: Locator, timeout: Duration) -> bool {
        self.waiter_for(timeout).is_visible_within(locator).await
    }

    /// Presence of `locator` right now
    ///
    /// # Errors
    ///
    /// Returns driver errors.
    pub async fn presence(&self, locator: Locator) -> E2eResult<Presence> {
        self.waiter().presence(locator).await
    }

    /// Require the URL to contain `fragment` within `timeout`
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` with the URL observed at the deadline.
    pub async fn expect_url_contains(&self, fragment: &str, timeout: Duration) -> E2eResult<()> {
        if self.waiter_for(timeout).wait_until_url_contains(fragment).await {
            return Ok(());
        }
        let actual = self
            .current_url()
            .await
            .unwrap_or_else(|err| format!("<unavailable: {err}>"));
        Err(E2eError::Navigation {
            expected: fragment.to_string(),
            actual,
        })
    }
}
