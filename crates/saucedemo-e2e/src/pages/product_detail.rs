//! Product detail page.

use super::{inventory, BasePage, PageObject};
use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::locator::Locator;
use crate::navigation::is_detail_url;
use crate::result::E2eResult;

/// Product name heading
pub const PRODUCT_NAME: Locator = Locator::class("inventory_details_name");
/// Product description
pub const PRODUCT_DESCRIPTION: Locator = Locator::class("inventory_details_desc");
/// Product price
pub const PRODUCT_PRICE: Locator = Locator::class("inventory_details_price");
/// Product image
pub const PRODUCT_IMAGE: Locator = Locator::class("inventory_details_img");
/// Back-to-catalog button
pub const BACK_TO_PRODUCTS: Locator = Locator::id("back-to-products");
/// Add-to-cart button
pub const ADD_TO_CART_BUTTON: Locator = inventory::ADD_TO_CART_BUTTON;
/// Remove-from-cart button
pub const REMOVE_BUTTON: Locator = inventory::REMOVE_BUTTON;

/// Product detail page object
#[derive(Debug, Clone, Copy)]
pub struct ProductDetailPage<'s> {
    base: BasePage<'s>,
}

impl PageObject for ProductDetailPage<'_> {
    fn url_pattern(&self) -> &str {
        "inventory-item.html"
    }

    fn page_name(&self) -> &str {
        "product detail"
    }
}

impl<'s> ProductDetailPage<'s> {
    /// Create the page object
    #[must_use]
    pub const fn new(driver: &'s dyn Driver, config: &'s SuiteConfig) -> Self {
        Self {
            base: BasePage::new(driver, config),
        }
    }

    /// Two-stage check: detail URL shape, then a visible product name, each
    /// within the detail page deadline.
    pub async fn is_on_detail_page(&self) -> bool {
        let timeout = self.base.config().timeouts.detail_page();
        let url_ok = self
            .base
            .waiter_for(timeout)
            .wait_until_url_matches("detail page URL", is_detail_url)
            .await;
        if !url_ok {
            tracing::debug!("URL never took the detail page shape");
            return false;
        }
        self.base.is_visible(PRODUCT_NAME, timeout).await
    }

    /// Product name
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the heading never renders.
    pub async fn product_name(&self) -> E2eResult<String> {
        self.base.text(PRODUCT_NAME).await
    }

    /// Product description
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the description never renders.
    pub async fn product_description(&self) -> E2eResult<String> {
        self.base.text(PRODUCT_DESCRIPTION).await
    }

    /// Formatted product price
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the price never renders.
    pub async fn product_price(&self) -> E2eResult<String> {
        self.base.text(PRODUCT_PRICE).await
    }

    /// Image `src` attribute
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the image never renders.
    pub async fn product_image_src(&self) -> E2eResult<Option<String>> {
        self.base.attribute(PRODUCT_IMAGE, "src").await
    }

    /// Whether the product image is displayed
    pub async fn is_product_image_visible(&self) -> bool {
        self.base
            .is_visible(PRODUCT_IMAGE, self.base.config().timeouts.detail_page())
            .await
    }

    /// Return to the catalog and confirm the URL.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` when the catalog URL is not reached.
    pub async fn back_to_products(&self) -> E2eResult<()> {
        tracing::info!("back to products");
        self.base.click(BACK_TO_PRODUCTS).await?;
        self.base
            .expect_url_contains(
                inventory::INVENTORY_FRAGMENT,
                self.base.config().timeouts.detail_page(),
            )
            .await
    }

    /// Add the product to the cart and wait for the remove button
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if either button never appears.
    pub async fn add_to_cart(&self) -> E2eResult<()> {
        self.base.click(ADD_TO_CART_BUTTON).await?;
        self.base.find(REMOVE_BUTTON).await.map(|_| ())
    }

    /// Remove the product from the cart and wait for the add button
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if either button never appears.
    pub async fn remove_from_cart(&self) -> E2eResult<()> {
        self.base.click(REMOVE_BUTTON).await?;
        self.base.find(ADD_TO_CART_BUTTON).await.map(|_| ())
    }

    /// Whether the product is in the cart (the remove button is showing)
    ///
    /// # Errors
    ///
    /// Returns driver errors.
    pub async fn is_added_to_cart(&self) -> E2eResult<bool> {
        Ok(self.base.presence(REMOVE_BUTTON).await?.is_visible())
    }
}
