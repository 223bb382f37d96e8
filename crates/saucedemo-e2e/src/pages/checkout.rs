//! Checkout pages: the information form, the order overview and the
//! confirmation screen.
//!
//! All three steps share one page object; each action confirms the URL of
//! the step it leads to.

use super::{cart, inventory, login, BasePage, PageObject};
use crate::catalog::{parse_price, sales_tax};
use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::locator::Locator;
use crate::product::Product;
use crate::result::{E2eError, E2eResult};
use std::time::Duration;

/// First name input
pub const FIRST_NAME_INPUT: Locator = Locator::id("first-name");
/// Last name input
pub const LAST_NAME_INPUT: Locator = Locator::id("last-name");
/// Postal code input
pub const POSTAL_CODE_INPUT: Locator = Locator::id("postal-code");
/// Continue button of the information form
pub const CONTINUE_BUTTON: Locator = Locator::id("continue");
/// Cancel button (information form and overview)
pub const CANCEL_BUTTON: Locator = Locator::id("cancel");
/// Validation banner of the information form
pub const ERROR_BANNER: Locator = login::ERROR_BANNER;
/// Price summary block of the overview
pub const SUMMARY_INFO: Locator = Locator::class("summary_info");
/// "Item total: $x" line
pub const ITEM_TOTAL_LABEL: Locator = Locator::class("summary_subtotal_label");
/// "Tax: $x" line
pub const TAX_LABEL: Locator = Locator::class("summary_tax_label");
/// "Total: $x" line
pub const TOTAL_LABEL: Locator = Locator::class("summary_total_label");
/// Finish button of the overview
pub const FINISH_BUTTON: Locator = Locator::id("finish");
/// Confirmation header
pub const COMPLETE_HEADER: Locator = Locator::class("complete-header");
/// Confirmation body text
pub const COMPLETE_TEXT: Locator = Locator::class("complete-text");
/// Confirmation image
pub const PONY_EXPRESS: Locator = Locator::class("pony_express");
/// Back-home button of the confirmation screen
pub const BACK_HOME: Locator = Locator::id("back-to-products");

/// URL fragment shared by every checkout step
pub const CHECKOUT_FRAGMENT: &str = "/checkout-";
/// URL fragment of the information form
pub const INFORMATION_FRAGMENT: &str = "/checkout-step-one.html";
/// URL fragment of the order overview
pub const OVERVIEW_FRAGMENT: &str = "/checkout-step-two.html";
/// URL fragment of the confirmation screen
pub const COMPLETE_FRAGMENT: &str = "/checkout-complete.html";

/// Buyer details entered on the information form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomerInfo<'a> {
    /// First name
    pub first_name: &'a str,
    /// Last name
    pub last_name: &'a str,
    /// Postal code
    pub postal_code: &'a str,
}

/// Customer the checkout flows buy as
pub const TEST_CUSTOMER: CustomerInfo<'static> = CustomerInfo {
    first_name: "Test",
    last_name: "User",
    postal_code: "12345",
};

/// Amounts on the order overview, in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSummary {
    /// Sum of the line prices before tax
    pub item_total: u64,
    /// Tax line
    pub tax: u64,
    /// Grand total
    pub total: u64,
}

impl OrderSummary {
    /// Tax matches the item total and the grand total adds up
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.tax == sales_tax(self.item_total) && self.total == self.item_total + self.tax
    }
}

/// Amount after the last `:` of a summary line
fn summary_amount(text: &str) -> E2eResult<u64> {
    text.rsplit_once(':')
        .and_then(|(_, amount)| parse_price(amount))
        .ok_or_else(|| E2eError::script(format!("unparseable summary line '{text}'")))
}

/// Checkout page object
#[derive(Debug, Clone, Copy)]
pub struct CheckoutPage<'s> {
    base: BasePage<'s>,
}

impl PageObject for CheckoutPage<'_> {
    fn url_pattern(&self) -> &str {
        CHECKOUT_FRAGMENT
    }

    fn page_name(&self) -> &str {
        "checkout"
    }
}

impl<'s> CheckoutPage<'s> {
    /// Create the page object
    #[must_use]
    pub const fn new(driver: &'s dyn Driver, config: &'s SuiteConfig) -> Self {
        Self {
            base: BasePage::new(driver, config),
        }
    }

    fn confirm_timeout(&self) -> Duration {
        self.base.config().timeouts.navigation_confirm()
    }

    async fn is_at(&self, fragment: &str) -> bool {
        self.base
            .waiter_for(self.confirm_timeout())
            .wait_until_url_contains(fragment)
            .await
    }

    async fn click_then_expect(&self, button: Locator, fragment: &str) -> E2eResult<()> {
        self.base.click(button).await?;
        self.base
            .expect_url_contains(fragment, self.confirm_timeout())
            .await
    }

    /// Whether the information form is showing
    pub async fn is_on_information_step(&self) -> bool {
        self.is_at(INFORMATION_FRAGMENT).await
    }

    /// Whether the order overview is showing
    pub async fn is_on_overview(&self) -> bool {
        self.is_at(OVERVIEW_FRAGMENT).await
    }

    /// Whether the confirmation screen is showing
    pub async fn is_complete(&self) -> bool {
        self.is_at(COMPLETE_FRAGMENT).await
    }

    /// Type the buyer details into the information form
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if an input never appears.
    pub async fn fill_information(&self, customer: &CustomerInfo<'_>) -> E2eResult<()> {
        tracing::debug!(first_name = customer.first_name, "filling checkout information");
        self.base
            .type_into(FIRST_NAME_INPUT, customer.first_name)
            .await?;
        self.base
            .type_into(LAST_NAME_INPUT, customer.last_name)
            .await?;
        self.base
            .type_into(POSTAL_CODE_INPUT, customer.postal_code)
            .await
    }

    /// Click continue without waiting for the overview
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the button never appears.
    pub async fn submit_information(&self) -> E2eResult<()> {
        self.base.click(CONTINUE_BUTTON).await
    }

    /// Fill the form, continue and wait for the overview
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` when the form is rejected.
    pub async fn continue_to_overview(&self, customer: &CustomerInfo<'_>) -> E2eResult<()> {
        self.fill_information(customer).await?;
        self.click_then_expect(CONTINUE_BUTTON, OVERVIEW_FRAGMENT)
            .await
    }

    /// Whether the validation banner becomes visible within the banner deadline
    pub async fn is_error_displayed(&self) -> bool {
        self.base
            .is_visible(ERROR_BANNER, self.base.config().timeouts.error_banner())
            .await
    }

    /// Text of the validation banner, if one is showing
    pub async fn error_message(&self) -> Option<String> {
        if !self.is_error_displayed().await {
            return None;
        }
        self.base
            .text(ERROR_BANNER)
            .await
            .ok()
            .filter(|text| !text.is_empty())
    }

    /// Leave the information form for the cart
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` if the cart does not load.
    pub async fn cancel_to_cart(&self) -> E2eResult<()> {
        self.click_then_expect(CANCEL_BUTTON, cart::CART_FRAGMENT)
            .await
    }

    /// Leave the overview for the catalog
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` if the catalog does not load.
    pub async fn cancel_to_catalog(&self) -> E2eResult<()> {
        self.click_then_expect(CANCEL_BUTTON, inventory::INVENTORY_FRAGMENT)
            .await
    }

    /// Lines listed on the overview
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the summary never renders.
    pub async fn overview_items(&self) -> E2eResult<Vec<Product>> {
        self.base.find(SUMMARY_INFO).await?;
        cart::line_items(&self.base).await
    }

    /// Item total, tax and total of the overview
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if a line never renders and
    /// `E2eError::Script` for an amount that does not parse.
    pub async fn summary(&self) -> E2eResult<OrderSummary> {
        let summary = OrderSummary {
            item_total: summary_amount(&self.base.text(ITEM_TOTAL_LABEL).await?)?,
            tax: summary_amount(&self.base.text(TAX_LABEL).await?)?,
            total: summary_amount(&self.base.text(TOTAL_LABEL).await?)?,
        };
        tracing::debug!(?summary, "order summary");
        Ok(summary)
    }

    /// Place the order and wait for the confirmation screen
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` if the confirmation does not load.
    pub async fn finish(&self) -> E2eResult<()> {
        tracing::info!("placing order");
        self.click_then_expect(FINISH_BUTTON, COMPLETE_FRAGMENT)
            .await
    }

    /// Confirmation header text
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn confirmation_header(&self) -> E2eResult<String> {
        self.base.text(COMPLETE_HEADER).await
    }

    /// Confirmation body text
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` on timeout.
    pub async fn confirmation_text(&self) -> E2eResult<String> {
        self.base.text(COMPLETE_TEXT).await
    }

    /// Whether the confirmation image shows
    pub async fn is_pony_express_visible(&self) -> bool {
        self.base
            .is_visible(PONY_EXPRESS, self.confirm_timeout())
            .await
    }

    /// Return to the catalog from the confirmation screen
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` if the catalog does not load.
    pub async fn back_home(&self) -> E2eResult<()> {
        self.click_then_expect(BACK_HOME, inventory::INVENTORY_FRAGMENT)
            .await
    }
}
