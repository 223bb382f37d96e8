//! Cart page.

use super::{checkout, inventory, BasePage, PageObject};
use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::locator::Locator;
use crate::product::Product;
use crate::result::E2eResult;

/// One cart line
pub const CART_ITEM: Locator = Locator::class("cart_item");
/// Continue-shopping button
pub const CONTINUE_SHOPPING: Locator = Locator::id("continue-shopping");
/// Checkout button
pub const CHECKOUT: Locator = Locator::id("checkout");

/// URL fragment of the cart page
pub const CART_FRAGMENT: &str = "/cart.html";

/// Cart page object
#[derive(Debug, Clone, Copy)]
pub struct CartPage<'s> {
    base: BasePage<'s>,
}

impl PageObject for CartPage<'_> {
    fn url_pattern(&self) -> &str {
        CART_FRAGMENT
    }

    fn page_name(&self) -> &str {
        "cart"
    }
}

impl<'s> CartPage<'s> {
    /// Create the page object
    #[must_use]
    pub const fn new(driver: &'s dyn Driver, config: &'s SuiteConfig) -> Self {
        Self {
            base: BasePage::new(driver, config),
        }
    }

    /// Whether the cart page is showing
    pub async fn is_on_cart_page(&self) -> bool {
        self.base
            .is_on(self, self.base.config().timeouts.navigation_confirm())
            .await
    }

    /// Lines in the cart, in display order. Descriptions may be empty.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the page never renders, or a read error
    /// for a line whose name or price cannot be read.
    pub async fn items(&self) -> E2eResult<Vec<Product>> {
        self.base.find(CONTINUE_SHOPPING).await?;
        line_items(&self.base).await
    }

    /// Click checkout and wait for the information form
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` if the first checkout step does not load.
    pub async fn checkout(&self) -> E2eResult<()> {
        tracing::info!("starting checkout");
        self.base.click(CHECKOUT).await?;
        self.base
            .expect_url_contains(
                checkout::INFORMATION_FRAGMENT,
                self.base.config().timeouts.navigation_confirm(),
            )
            .await
    }

    /// Number of cart lines
    ///
    /// # Errors
    ///
    /// See [`CartPage::items`].
    pub async fn item_count(&self) -> E2eResult<usize> {
        Ok(self.items().await?.len())
    }

    /// Go back to the catalog
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` if the catalog does not load.
    pub async fn continue_shopping(&self) -> E2eResult<()> {
        self.base.click(CONTINUE_SHOPPING).await?;
        self.base
            .expect_url_contains(
                inventory::INVENTORY_FRAGMENT,
                self.base.config().timeouts.navigation_confirm(),
            )
            .await
    }
}

/// Cart-style lines of the current document (cart page and checkout overview)
pub(super) async fn line_items(base: &BasePage<'_>) -> E2eResult<Vec<Product>> {
    let driver = base.driver();
    let rows = driver.find_all(None, CART_ITEM).await?;
    let mut products = Vec::with_capacity(rows.len());
    for row in &rows {
        let description = match base.try_find_in(row, inventory::ITEM_DESC).await? {
            Some(element) => driver.text(&element).await?,
            None => String::new(),
        };
        products.push(Product {
            name: base.text_in(row, inventory::ITEM_NAME).await?,
            price: base.text_in(row, inventory::ITEM_PRICE).await?,
            description,
        });
    }
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeStorefront;
    use crate::pages::{InventoryPage, LoginPage};
    use crate::users::UserClass;

    #[tokio::test(start_paused = true)]
    async fn test_cart_lists_added_products() {
        let config = SuiteConfig::default();
        let driver = FakeStorefront::new(&config.base_url);
        let login = LoginPage::new(&driver, &config);
        login.navigate().await.unwrap();
        login.login_as(UserClass::Standard).await.unwrap();

        let inventory = InventoryPage::new(&driver, &config);
        inventory
            .add_product_to_cart_by_name("Sauce Labs Bike Light")
            .await
            .unwrap();
        inventory
            .add_product_to_cart_by_name("Sauce Labs Backpack")
            .await
            .unwrap();
        inventory.open_shopping_cart().await.unwrap();

        let cart = CartPage::new(&driver, &config);
        assert!(cart.is_on_cart_page().await);
        let items = cart.items().await.unwrap();
        let names: Vec<_> = items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Sauce Labs Bike Light", "Sauce Labs Backpack"]);
        assert_eq!(items[1].price, "$29.99");

        cart.continue_shopping().await.unwrap();
        assert!(inventory.is_on_inventory_page().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_cart() {
        let config = SuiteConfig::default();
        let driver = FakeStorefront::new(&config.base_url);
        let login = LoginPage::new(&driver, &config);
        login.navigate().await.unwrap();
        login.login_as(UserClass::Standard).await.unwrap();
        driver.goto(&config.url_for("cart.html")).await.unwrap();
        let cart = CartPage::new(&driver, &config);
        assert_eq!(cart.item_count().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_opens_information_step() {
        let config = SuiteConfig::default();
        let driver = FakeStorefront::new(&config.base_url);
        let login = LoginPage::new(&driver, &config);
        login.navigate().await.unwrap();
        login.login_as(UserClass::Standard).await.unwrap();
        let inventory = InventoryPage::new(&driver, &config);
        inventory
            .add_product_to_cart_by_name("Sauce Labs Onesie")
            .await
            .unwrap();
        inventory.open_shopping_cart().await.unwrap();

        CartPage::new(&driver, &config).checkout().await.unwrap();
        assert!(driver
            .current_url()
            .await
            .unwrap()
            .ends_with(checkout::INFORMATION_FRAGMENT));
    }
}
