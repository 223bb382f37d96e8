//! Inventory (catalog) page.
//!
//! Every query re-reads the live document; nothing read here is cached
//! between calls. [`InventoryPage::get_all_products`] isolates failures per
//! row: a row whose fields cannot be read is logged and skipped, and the
//! rest of the listing is still returned.

use super::{BasePage, PageObject};
use crate::catalog::{parse_price, SortOrder, EXPECTED_PRODUCT_COUNT};
use crate::config::SuiteConfig;
use crate::driver::{Driver, ElementRef};
use crate::locator::Locator;
use crate::navigation::{self, NavigationPlan, NavigationStrategy};
use crate::product::{CatalogEntry, CatalogSnapshot, Product, ProductHandles, ProductHealth};
use crate::result::{E2eError, E2eResult};
use crate::wait::element_presence;

/// One catalog row
pub const INVENTORY_ITEM: Locator = Locator::class("inventory_item");
/// Product name (also used by cart rows)
pub const ITEM_NAME: Locator = Locator::class("inventory_item_name");
/// Product price (also used by cart rows)
pub const ITEM_PRICE: Locator = Locator::class("inventory_item_price");
/// Product description (also used by cart rows)
pub const ITEM_DESC: Locator = Locator::class("inventory_item_desc");
/// Product image
pub const ITEM_IMAGE: Locator = Locator::css(".inventory_item_img img");
/// Link wrapping the product image
pub const IMAGE_LINK: Locator = Locator::css("a[id$='img_link']");
/// Link wrapping the product name
pub const TITLE_LINK: Locator = Locator::css("a[id$='title_link']");
/// Add-to-cart button
pub const ADD_TO_CART_BUTTON: Locator = Locator::css("button[id^='add-to-cart']");
/// Remove-from-cart button
pub const REMOVE_BUTTON: Locator = Locator::css("button[id^='remove']");
/// Cart item count badge, absent for an empty cart
pub const CART_BADGE: Locator = Locator::class("shopping_cart_badge");
/// Cart link in the header
pub const CART_LINK: Locator = Locator::class("shopping_cart_link");
/// Sort dropdown
pub const SORT_SELECT: Locator = Locator::class("product_sort_container");
/// Burger menu button
pub const MENU_BUTTON: Locator = Locator::id("react-burger-menu-btn");
/// Logout entry of the burger menu
pub const LOGOUT_LINK: Locator = Locator::id("logout_sidebar_link");

/// URL fragment of the catalog page
pub const INVENTORY_FRAGMENT: &str = "/inventory.html";

/// Inventory page object
#[derive(Debug, Clone, Copy)]
pub struct InventoryPage<'s> {
    base: BasePage<'s>,
}

impl PageObject for InventoryPage<'_> {
    fn url_pattern(&self) -> &str {
        INVENTORY_FRAGMENT
    }

    fn page_name(&self) -> &str {
        "inventory"
    }
}

impl<'s> InventoryPage<'s> {
    /// Create the page object
    #[must_use]
    pub const fn new(driver: &'s dyn Driver, config: &'s SuiteConfig) -> Self {
        Self {
            base: BasePage::new(driver, config),
        }
    }

    /// Shared element helpers
    #[must_use]
    pub const fn base(&self) -> &BasePage<'s> {
        &self.base
    }

    /// Whether the current URL is the catalog page
    pub async fn is_on_inventory_page(&self) -> bool {
        match self.base.current_url().await {
            Ok(url) => url.contains(INVENTORY_FRAGMENT),
            Err(err) => {
                tracing::debug!(error = %err, "could not read URL");
                false
            }
        }
    }

    /// Load the catalog page directly
    ///
    /// # Errors
    ///
    /// Returns driver errors or `E2eError::Navigation` when the site redirects
    /// elsewhere (for example to the login page).
    pub async fn open(&self) -> E2eResult<()> {
        let config = self.base.config();
        self.base
            .navigate_to(&config.url_for("inventory.html"))
            .await?;
        self.base
            .expect_url_contains(INVENTORY_FRAGMENT, config.timeouts.navigation_confirm())
            .await
    }

    /// Snapshot every readable catalog row.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if no row appears within the catalog
    /// deadline. Per-row read failures are logged and skipped, not returned.
    pub async fn get_all_products(&self) -> E2eResult<CatalogSnapshot> {
        let rows = self
            .base
            .find_all(INVENTORY_ITEM, self.base.config().timeouts.catalog())
            .await?;
        let token = rows
            .first()
            .map(|row| row.token.clone())
            .unwrap_or_default();

        let mut snapshot = CatalogSnapshot {
            token,
            entries: Vec::with_capacity(rows.len()),
            skipped: 0,
        };
        for (index, row) in rows.iter().enumerate() {
            match self.read_row(row).await {
                Ok(entry) => snapshot.entries.push(entry),
                Err(err) => {
                    tracing::warn!(row = index, error = %err, "skipping unreadable product row");
                    snapshot.skipped += 1;
                }
            }
        }
        if snapshot.len() < EXPECTED_PRODUCT_COUNT {
            tracing::warn!(
                read = snapshot.len(),
                skipped = snapshot.skipped,
                expected = EXPECTED_PRODUCT_COUNT,
                "catalog snapshot is incomplete"
            );
        }
        tracing::debug!(products = snapshot.len(), "catalog snapshot");
        Ok(snapshot)
    }

    async fn read_row(&self, row: &ElementRef) -> E2eResult<CatalogEntry> {
        let base = &self.base;
        let name = base.find_in(row, ITEM_NAME).await?;
        let price = base.find_in(row, ITEM_PRICE).await?;
        let description = base.find_in(row, ITEM_DESC).await?;
        let driver = base.driver();
        let product = Product {
            name: driver.text(&name).await?,
            price: driver.text(&price).await?,
            description: driver.text(&description).await?,
        };
        let handles = ProductHandles {
            row: row.clone(),
            image: base.find_in(row, ITEM_IMAGE).await?,
            image_link: base.find_in(row, IMAGE_LINK).await?,
            title_link: base.find_in(row, TITLE_LINK).await?,
            name,
            add_button: base.try_find_in(row, ADD_TO_CART_BUTTON).await?,
            remove_button: base.try_find_in(row, REMOVE_BUTTON).await?,
        };
        Ok(CatalogEntry { product, handles })
    }

    /// Number of readable products
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the catalog never renders.
    pub async fn product_count(&self) -> E2eResult<usize> {
        Ok(self.get_all_products().await?.len())
    }

    /// Product with an exact name, from a fresh snapshot
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the catalog never renders.
    pub async fn find_product(&self, name: &str) -> E2eResult<Option<CatalogEntry>> {
        let snapshot = self.get_all_products().await?;
        Ok(snapshot.find(name).cloned())
    }

    /// Whether a product with exactly this name and formatted price is listed
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the catalog never renders.
    pub async fn verify_product_exists(&self, name: &str, price: &str) -> E2eResult<bool> {
        Ok(self.get_all_products().await?.contains(name, price))
    }

    /// Run the five element checks on one row. Never fails: a read that
    /// errors reads as a failed check.
    pub async fn verify_product_elements(&self, handles: &ProductHandles) -> ProductHealth {
        let driver = self.base.driver();

        let has_visible_image = matches!(
            element_presence(driver, &handles.image).await,
            Ok(presence) if presence.is_visible()
        );
        let image_has_src = matches!(
            driver.attribute(&handles.image, "src").await,
            Ok(Some(src)) if !src.trim().is_empty()
        );
        let button_state = match &handles.add_button {
            Some(button) => driver.state(button).await.ok(),
            None => None,
        };
        let has_add_button = button_state.is_some_and(|state| state.displayed);
        let button_is_enabled = button_state.is_some_and(|state| state.enabled);
        let has_clickable_name = driver
            .state(&handles.name)
            .await
            .is_ok_and(|state| state.is_interactable());

        ProductHealth {
            has_visible_image,
            image_has_src,
            has_add_button,
            button_is_enabled,
            has_clickable_name,
        }
    }

    /// Open a product's detail page with the default navigation plan
    ///
    /// # Errors
    ///
    /// Returns `E2eError::ProductNotFound` when the product is not listed and
    /// `E2eError::NavigationExhausted` when no strategy reaches the page.
    pub async fn click_product_by_name(&self, name: &str) -> E2eResult<NavigationStrategy> {
        self.click_product_with_plan(name, &NavigationPlan::default())
            .await
    }

    /// Open a product's detail page, trying `plan`'s strategies in order
    ///
    /// # Errors
    ///
    /// See [`InventoryPage::click_product_by_name`].
    pub async fn click_product_with_plan(
        &self,
        name: &str,
        plan: &NavigationPlan,
    ) -> E2eResult<NavigationStrategy> {
        navigation::open_product(self, name, plan).await
    }

    async fn entry(&self, name: &str) -> E2eResult<CatalogEntry> {
        self.find_product(name)
            .await?
            .ok_or_else(|| E2eError::ProductNotFound {
                name: name.to_string(),
            })
    }

    /// Click a product's add-to-cart button
    ///
    /// # Errors
    ///
    /// Returns `E2eError::ProductNotFound` for unlisted products and
    /// `E2eError::ElementMissing` when the product is already in the cart.
    pub async fn add_product_to_cart_by_name(&self, name: &str) -> E2eResult<()> {
        let entry = self.entry(name).await?;
        let button = entry.handles.add_button.ok_or_else(|| E2eError::ElementMissing {
            locator: ADD_TO_CART_BUTTON.to_string(),
        })?;
        tracing::info!(product = name, "adding to cart");
        self.base.click_element(&button).await
    }

    /// Click a product's remove button
    ///
    /// # Errors
    ///
    /// Returns `E2eError::ProductNotFound` for unlisted products and
    /// `E2eError::ElementMissing` when the product is not in the cart.
    pub async fn remove_product_from_cart_by_name(&self, name: &str) -> E2eResult<()> {
        let entry = self.entry(name).await?;
        let button = entry.handles.remove_button.ok_or_else(|| E2eError::ElementMissing {
            locator: REMOVE_BUTTON.to_string(),
        })?;
        tracing::info!(product = name, "removing from cart");
        self.base.click_element(&button).await
    }

    /// Number shown on the cart badge; 0 when there is no badge
    ///
    /// # Errors
    ///
    /// Returns driver errors or `E2eError::Script` for a non-numeric badge.
    pub async fn get_cart_item_count(&self) -> E2eResult<usize> {
        let Some(badge) = self
            .base
            .driver()
            .find_all(None, CART_BADGE)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(0);
        };
        let text = self.base.driver().text(&badge).await?;
        text.trim()
            .parse()
            .map_err(|_| E2eError::script(format!("cart badge shows '{text}'")))
    }

    /// Open the cart page
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` if the cart page does not load.
    pub async fn open_shopping_cart(&self) -> E2eResult<()> {
        self.base.click(CART_LINK).await?;
        self.base
            .expect_url_contains(
                super::cart::CART_FRAGMENT,
                self.base.config().timeouts.navigation_confirm(),
            )
            .await
    }

    /// Choose a sort order and wait for the dropdown to reflect it
    ///
    /// # Errors
    ///
    /// Returns driver errors or `E2eError::Timeout` if the order never applies.
    pub async fn sort_by(&self, order: SortOrder) -> E2eResult<()> {
        let select = self.base.find(SORT_SELECT).await?;
        self.base
            .driver()
            .select_option(&select, order.value())
            .await?;
        tracing::debug!(%order, "sorted catalog");
        self.base
            .waiter()
            .poll(&format!("sort order {order}"), || async move {
                Ok((self.current_sort().await? == Some(order)).then_some(()))
            })
            .await
    }

    /// Sort order currently selected
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the dropdown never renders.
    pub async fn current_sort(&self) -> E2eResult<Option<SortOrder>> {
        let select = self.base.find(SORT_SELECT).await?;
        let value = self.base.driver().input_value(&select).await?;
        Ok(SortOrder::from_value(&value))
    }

    /// Product names in display order
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the catalog never renders.
    pub async fn product_names(&self) -> E2eResult<Vec<String>> {
        let snapshot = self.get_all_products().await?;
        Ok(snapshot.products().map(|p| p.name.clone()).collect())
    }

    /// Product prices in display order, in cents
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the catalog never renders and
    /// `E2eError::Script` for a price that does not parse.
    pub async fn product_prices(&self) -> E2eResult<Vec<u64>> {
        let snapshot = self.get_all_products().await?;
        snapshot
            .products()
            .map(|p| {
                parse_price(&p.price)
                    .ok_or_else(|| E2eError::script(format!("unparseable price '{}'", p.price)))
            })
            .collect()
    }

    /// Log out through the burger menu
    ///
    /// # Errors
    ///
    /// Returns `E2eError::NotFound` if the menu never opens and
    /// `E2eError::Navigation` if the login form does not return.
    pub async fn logout(&self) -> E2eResult<()> {
        tracing::info!("logging out");
        self.base.click(MENU_BUTTON).await?;
        self.base.click(LOGOUT_LINK).await?;
        if self
            .base
            .is_visible(super::login::LOGIN_BUTTON, self.base.config().timeouts.navigation_confirm())
            .await
        {
            return Ok(());
        }
        Err(E2eError::Navigation {
            expected: self.base.config().base_url.clone(),
            actual: self.base.current_url().await?,
        })
    }
}
