//! In-memory storefront driver.
//!
//! [`FakeStorefront`] implements [`Driver`] against a deterministic model of
//! the storefront: the login form and its error banners, the six-product
//! catalog, sorting, the cart, product detail pages, the three checkout
//! steps, the burger menu and history navigation. It reproduces the seeded
//! bug classes the suite tolerates (empty image sources and an ignored sort
//! dropdown for `problem_user`, a hidden image for `visual_user`, a delayed
//! login for `performance_glitch_user`, a dead remove button for
//! `error_user`).
//!
//! Snapshot tokens are `"{generation}|{url}"`. The generation increments on
//! every document load and whenever the catalog rows are reordered, so
//! element references die with the layout that produced them exactly as
//! they would in a browser.
//!
//! Only calls that act on the page are recorded; reads issued by polling
//! waits are not.
//!
//! Time is read from `tokio::time`, so the delayed login advances with
//! paused test time.

pub(crate) mod dom;
pub(crate) mod render;

use crate::catalog::SortOrder;
use crate::driver::{Driver, ElementRef, ElementState};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use crate::users::{UserClass, SHARED_PASSWORD};
use async_trait::async_trait;
use dom::{Action, Control, FakeNode};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

const LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";
const BAD_CREDENTIALS: &str =
    "Epic sadface: Username and password do not match any user in this service";
const USERNAME_REQUIRED: &str = "Epic sadface: Username is required";
const PASSWORD_REQUIRED: &str = "Epic sadface: Password is required";

const FIRST_NAME_REQUIRED: &str = "Error: First Name is required";
const LAST_NAME_REQUIRED: &str = "Error: Last Name is required";
const POSTAL_CODE_REQUIRED: &str = "Error: Postal Code is required";

fn login_required(path: &str) -> String {
    format!("Epic sadface: You can only access '/{path}' when you are logged in.")
}

/// Knobs for the fake storefront
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeOptions {
    /// How long `performance_glitch_user` waits before the catalog loads
    pub login_delay: Duration,
    /// Product image links do nothing when clicked
    pub dead_image_links: bool,
    /// Product name links do nothing when clicked
    pub dead_title_links: bool,
    /// Item ids whose catalog row renders without a price
    pub unreadable_rows: BTreeSet<usize>,
}

impl Default for FakeOptions {
    fn default() -> Self {
        Self {
            login_delay: Duration::from_secs(5),
            dead_image_links: false,
            dead_title_links: false,
            unreadable_rows: BTreeSet::new(),
        }
    }
}

impl FakeOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delayed-login duration
    #[must_use]
    pub const fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    /// Disable clicks on product image links
    #[must_use]
    pub const fn with_dead_image_links(mut self) -> Self {
        self.dead_image_links = true;
        self
    }

    /// Disable clicks on product name links
    #[must_use]
    pub const fn with_dead_title_links(mut self) -> Self {
        self.dead_title_links = true;
        self
    }

    /// Render a catalog row without its price
    #[must_use]
    pub fn with_unreadable_row(mut self, item_id: usize) -> Self {
        let _ = self.unreadable_rows.insert(item_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Route {
    Blank,
    Login,
    Inventory,
    Detail(usize),
    Cart,
    CheckoutInformation,
    CheckoutOverview,
    CheckoutComplete,
    Other(String),
}

#[derive(Debug)]
pub(crate) struct State {
    pub route: Route,
    pub history: Vec<Route>,
    pub generation: u64,
    pub user: Option<UserClass>,
    pub cart: Vec<usize>,
    pub sort: SortOrder,
    pub username: String,
    pub password: String,
    pub login_error: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
    pub checkout_error: Option<String>,
    pub menu_open: bool,
    pub pending_login: Option<(UserClass, Instant)>,
    pub closed: bool,
    pub calls: Vec<String>,
}

impl State {
    fn new() -> Self {
        Self {
            route: Route::Blank,
            history: Vec::new(),
            generation: 0,
            user: None,
            cart: Vec::new(),
            sort: SortOrder::default(),
            username: String::new(),
            password: String::new(),
            login_error: None,
            first_name: String::new(),
            last_name: String::new(),
            postal_code: String::new(),
            checkout_error: None,
            menu_open: false,
            pending_login: None,
            closed: false,
            calls: Vec::new(),
        }
    }

    /// Load a new document, recording the current one in history
    fn navigate(&mut self, route: Route) {
        let previous = std::mem::replace(&mut self.route, route);
        self.history.push(previous);
        self.load();
    }

    /// Per-document reset shared by navigation and history traversal
    fn load(&mut self) {
        self.generation += 1;
        self.menu_open = false;
        self.pending_login = None;
        self.login_error = None;
        self.checkout_error = None;
        match self.route {
            Route::Login => {
                self.username.clear();
                self.password.clear();
            }
            Route::Inventory => self.sort = SortOrder::default(),
            Route::CheckoutInformation => {
                self.first_name.clear();
                self.last_name.clear();
                self.postal_code.clear();
            }
            _ => {}
        }
    }

    /// Item ids in the order the catalog shows them
    pub fn display_order(&self) -> Vec<usize> {
        let order = match self.user {
            Some(UserClass::Problem) => SortOrder::default(),
            _ => self.sort,
        };
        render::sorted_ids(order)
    }

    /// Pick a sort option; reordering the rows invalidates every reference
    /// into the old layout
    fn select_sort(&mut self, order: SortOrder) {
        let before = self.display_order();
        self.sort = order;
        if self.display_order() != before {
            self.generation += 1;
        }
    }

    fn submit_checkout_information(&mut self) {
        let error = if self.first_name.is_empty() {
            FIRST_NAME_REQUIRED
        } else if self.last_name.is_empty() {
            LAST_NAME_REQUIRED
        } else if self.postal_code.is_empty() {
            POSTAL_CODE_REQUIRED
        } else {
            self.navigate(Route::CheckoutOverview);
            return;
        };
        self.checkout_error = Some(error.to_string());
    }

    /// Complete a delayed login whose time has come
    fn settle(&mut self) {
        if let Some((user, ready_at)) = self.pending_login {
            if Instant::now() >= ready_at {
                self.user = Some(user);
                self.navigate(Route::Inventory);
            }
        }
    }

    fn submit_login(&mut self, login_delay: Duration) {
        let error = if self.username.is_empty() {
            Some(USERNAME_REQUIRED)
        } else if self.password.is_empty() {
            Some(PASSWORD_REQUIRED)
        } else {
            match UserClass::from_username(&self.username) {
                Some(_) if self.password != SHARED_PASSWORD => Some(BAD_CREDENTIALS),
                None => Some(BAD_CREDENTIALS),
                Some(UserClass::LockedOut) => Some(LOCKED_OUT),
                Some(UserClass::PerformanceGlitch) => {
                    self.login_error = None;
                    self.pending_login =
                        Some((UserClass::PerformanceGlitch, Instant::now() + login_delay));
                    return;
                }
                Some(user) => {
                    self.user = Some(user);
                    self.navigate(Route::Inventory);
                    return;
                }
            }
        };
        self.login_error = error.map(str::to_string);
    }

    fn perform(&mut self, action: Action, options: &FakeOptions) {
        match action {
            Action::SubmitLogin => self.submit_login(options.login_delay),
            Action::DismissError => {
                self.login_error = None;
                self.checkout_error = None;
            }
            Action::OpenProduct(id) => self.navigate(Route::Detail(id)),
            Action::AddToCart(id) => {
                if !self.cart.contains(&id) {
                    self.cart.push(id);
                }
            }
            Action::RemoveFromCart(id) => self.cart.retain(|&item| item != id),
            Action::OpenCart => self.navigate(Route::Cart),
            Action::OpenMenu => self.menu_open = true,
            Action::Logout => {
                self.user = None;
                self.cart.clear();
                self.navigate(Route::Login);
            }
            Action::BackToProducts | Action::ContinueShopping | Action::BackHome => {
                self.navigate(Route::Inventory);
            }
            Action::Checkout => self.navigate(Route::CheckoutInformation),
            Action::ContinueCheckout => self.submit_checkout_information(),
            Action::CancelInformation => self.navigate(Route::Cart),
            Action::CancelOverview => self.navigate(Route::Inventory),
            Action::FinishCheckout => {
                self.cart.clear();
                self.navigate(Route::CheckoutComplete);
            }
        }
    }
}

/// Deterministic in-memory storefront implementing [`Driver`]
#[derive(Debug)]
pub struct FakeStorefront {
    base_url: String,
    options: FakeOptions,
    state: Mutex<State>,
}

impl FakeStorefront {
    /// Storefront served at `base_url`
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_options(base_url, FakeOptions::default())
    }

    /// Storefront with custom options
    #[must_use]
    pub fn with_options(base_url: &str, options: FakeOptions) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Self {
            base_url,
            options,
            state: Mutex::new(State::new()),
        }
    }

    /// Recorded page actions (navigation, clicks, fills, selects), oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().map(|state| state.calls.clone()).unwrap_or_default()
    }

    /// Check if a call starting with `prefix` was recorded
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock()
            .map(|state| state.calls.iter().any(|call| call.starts_with(prefix)))
            .unwrap_or(false)
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().map(|state| state.closed).unwrap_or(true)
    }

    /// Names of the products currently in the cart, in insertion order
    #[must_use]
    pub fn cart_contents(&self) -> Vec<&'static str> {
        self.lock()
            .map(|state| {
                state
                    .cart
                    .iter()
                    .map(|&id| render::PRODUCTS[id].name)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> E2eResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| E2eError::driver("fake storefront state poisoned"))
    }

    /// Lock, reject closed sessions and settle pending work
    fn enter(&self) -> E2eResult<MutexGuard<'_, State>> {
        let mut state = self.lock()?;
        if state.closed {
            return Err(E2eError::driver("session closed"));
        }
        state.settle();
        Ok(state)
    }

    /// [`Self::enter`] for a call that acts on the page, recording it
    fn enter_action(&self, call: String) -> E2eResult<MutexGuard<'_, State>> {
        let mut state = self.enter()?;
        state.calls.push(call);
        Ok(state)
    }

    fn url_of(&self, route: &Route) -> String {
        match route {
            Route::Blank => "about:blank".to_string(),
            Route::Login => self.base_url.clone(),
            Route::Inventory => format!("{}inventory.html", self.base_url),
            Route::Detail(id) => format!("{}inventory-item.html?id={id}", self.base_url),
            Route::Cart => format!("{}cart.html", self.base_url),
            Route::CheckoutInformation => format!("{}checkout-step-one.html", self.base_url),
            Route::CheckoutOverview => format!("{}checkout-step-two.html", self.base_url),
            Route::CheckoutComplete => format!("{}checkout-complete.html", self.base_url),
            Route::Other(url) => url.clone(),
        }
    }

    fn token_of(&self, state: &State) -> String {
        format!("{}|{}", state.generation, self.url_of(&state.route))
    }

    /// Route for a URL, plus the login error to show when an
    /// authenticated page is requested anonymously
    fn route_for(&self, state: &State, url: &str) -> (Route, Option<String>) {
        if url == "about:blank" {
            return (Route::Blank, None);
        }
        let Some(rest) = url.strip_prefix(&self.base_url) else {
            return (Route::Other(url.to_string()), None);
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let route = match path {
            "" | "index.html" => return (Route::Login, None),
            "inventory.html" => Route::Inventory,
            "cart.html" => Route::Cart,
            "checkout-step-one.html" => Route::CheckoutInformation,
            "checkout-step-two.html" => Route::CheckoutOverview,
            "checkout-complete.html" => Route::CheckoutComplete,
            "inventory-item.html" => Route::Detail(
                query
                    .split('&')
                    .find_map(|pair| pair.strip_prefix("id="))
                    .and_then(|id| id.parse().ok())
                    .unwrap_or(usize::MAX),
            ),
            _ => return (Route::Other(url.to_string()), None),
        };
        if state.user.is_some() {
            (route, None)
        } else {
            (Route::Login, Some(login_required(path)))
        }
    }

    /// Render the live document and resolve `element` in it
    fn with_element<T>(
        &self,
        state: &State,
        element: &ElementRef,
        read: impl FnOnce(&dom::Chain<'_>) -> E2eResult<T>,
    ) -> E2eResult<T> {
        if element.token != self.token_of(state) {
            return Err(E2eError::StaleElement {
                locator: element.describe(),
            });
        }
        let roots = render::render(state, &self.options);
        let chain = dom::resolve(&roots, element)?;
        read(&chain)
    }
}

fn not_interactable(element: &ElementRef, why: &str) -> E2eError {
    E2eError::driver(format!("element {} is not interactable: {why}", element.describe()))
}

#[async_trait]
impl Driver for FakeStorefront {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = self.enter_action(format!("goto:{url}"))?;
        let (route, error) = self.route_for(&state, url);
        state.navigate(route);
        state.login_error = error;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        let state = self.enter()?;
        Ok(self.url_of(&state.route))
    }

    async fn snapshot_token(&self) -> E2eResult<String> {
        let state = self.enter()?;
        Ok(self.token_of(&state))
    }

    async fn find_all(
        &self,
        scope: Option<&ElementRef>,
        locator: Locator,
    ) -> E2eResult<Vec<ElementRef>> {
        let state = self.enter()?;
        let token = self.token_of(&state);
        let Some(scope) = scope else {
            let roots = render::render(&state, &self.options);
            let count = dom::matches_in(&roots, locator).len();
            return Ok((0..count)
                .map(|index| ElementRef::root(token.clone(), locator, index))
                .collect());
        };
        let count = self.with_element(&state, scope, |chain| {
            Ok(dom::matches_in(&dom::target(chain).children, locator).len())
        })?;
        Ok((0..count).map(|index| scope.child(locator, index)).collect())
    }

    async fn state(&self, element: &ElementRef) -> E2eResult<ElementState> {
        let state = self.enter()?;
        self.with_element(&state, element, |chain| Ok(dom::state_of(chain)))
    }

    async fn text(&self, element: &ElementRef) -> E2eResult<String> {
        let state = self.enter()?;
        self.with_element(&state, element, |chain| {
            Ok(if dom::state_of(chain).displayed {
                dom::target(chain).inner_text()
            } else {
                String::new()
            })
        })
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> E2eResult<Option<String>> {
        let state = self.enter()?;
        self.with_element(&state, element, |chain| {
            Ok(dom::target(chain).attribute(name).map(str::to_string))
        })
    }

    async fn click(&self, element: &ElementRef) -> E2eResult<()> {
        let mut state = self.enter_action(format!("click:{}", element.describe()))?;
        let action = self.with_element(&state, element, |chain| {
            let element_state = dom::state_of(chain);
            if !element_state.displayed {
                return Err(not_interactable(element, "not displayed"));
            }
            Ok(element_state
                .enabled
                .then(|| dom::bubbled_action(chain))
                .flatten())
        })?;
        if let Some(action) = action {
            state.perform(action, &self.options);
        }
        Ok(())
    }

    async fn fill(&self, element: &ElementRef, text: &str) -> E2eResult<()> {
        let mut state = self.enter_action(format!("fill:{}", element.describe()))?;
        let control = self.with_element(&state, element, |chain| Ok(dom::target(chain).control))?;
        match control {
            Some(Control::Username) => state.username = text.to_string(),
            Some(Control::Password) => state.password = text.to_string(),
            Some(Control::FirstName) => state.first_name = text.to_string(),
            Some(Control::LastName) => state.last_name = text.to_string(),
            Some(Control::PostalCode) => state.postal_code = text.to_string(),
            _ => return Err(not_interactable(element, "not a text input")),
        }
        Ok(())
    }

    async fn select_option(&self, element: &ElementRef, value: &str) -> E2eResult<()> {
        let mut state =
            self.enter_action(format!("select_option:{}:{value}", element.describe()))?;
        let control = self.with_element(&state, element, |chain| Ok(dom::target(chain).control))?;
        if control != Some(Control::SortSelect) {
            return Err(not_interactable(element, "not a select"));
        }
        let order = SortOrder::from_value(value)
            .ok_or_else(|| E2eError::driver(format!("no option with value '{value}'")))?;
        state.select_sort(order);
        Ok(())
    }

    async fn input_value(&self, element: &ElementRef) -> E2eResult<String> {
        let state = self.enter()?;
        let control = self.with_element(&state, element, |chain| Ok(dom::target(chain).control))?;
        Ok(match control {
            Some(Control::Username) => state.username.clone(),
            Some(Control::Password) => state.password.clone(),
            Some(Control::FirstName) => state.first_name.clone(),
            Some(Control::LastName) => state.last_name.clone(),
            Some(Control::PostalCode) => state.postal_code.clone(),
            Some(Control::SortSelect) => state.sort.value().to_string(),
            None => String::new(),
        })
    }

    async fn go_back(&self) -> E2eResult<()> {
        let mut state = self.enter_action("go_back".to_string())?;
        if let Some(previous) = state.history.pop() {
            state.route = previous;
            state.load();
        }
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        let mut state = self.lock()?;
        state.calls.push("close".to_string());
        state.closed = true;
        Ok(())
    }
}

/// Nodes of the current document, for assertions in tests
#[cfg(test)]
pub(crate) fn render_current(storefront: &FakeStorefront) -> Vec<FakeNode> {
    storefront
        .lock()
        .map(|state| render::render(&state, &storefront.options))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{cart, checkout, inventory, login};
    use crate::wait::{WaitOptions, Waiter};

    const BASE: &str = "https://www.saucedemo.com/";

    async fn fill(store: &FakeStorefront, locator: Locator, text: &str) {
        let element = store.find_all(None, locator).await.unwrap().remove(0);
        store.fill(&element, text).await.unwrap();
    }

    async fn click(store: &FakeStorefront, locator: Locator) {
        let element = store.find_all(None, locator).await.unwrap().remove(0);
        store.click(&element).await.unwrap();
    }

    async fn login_as(store: &FakeStorefront, username: &str) {
        store.goto(BASE).await.unwrap();
        fill(store, login::USERNAME_INPUT, username).await;
        fill(store, login::PASSWORD_INPUT, SHARED_PASSWORD).await;
        click(store, login::LOGIN_BUTTON).await;
    }

    mod routing_tests {
        use super::*;

        #[tokio::test]
        async fn test_starts_blank() {
            let store = FakeStorefront::new(BASE);
            assert_eq!(store.current_url().await.unwrap(), "about:blank");
            assert!(render_current(&store).is_empty());
        }

        #[tokio::test]
        async fn test_base_url_normalized() {
            let store = FakeStorefront::new("https://www.saucedemo.com");
            store.goto(BASE).await.unwrap();
            assert_eq!(store.current_url().await.unwrap(), BASE);
        }

        #[tokio::test]
        async fn test_inventory_requires_login() {
            let store = FakeStorefront::new(BASE);
            store
                .goto("https://www.saucedemo.com/inventory.html")
                .await
                .unwrap();
            assert_eq!(store.current_url().await.unwrap(), BASE);
            let banner = store.find_all(None, login::ERROR_BANNER).await.unwrap();
            let text = store.text(&banner[0]).await.unwrap();
            assert!(text.contains("'/inventory.html' when you are logged in"));
        }

        #[tokio::test]
        async fn test_token_changes_on_every_load() {
            let store = FakeStorefront::new(BASE);
            store.goto(BASE).await.unwrap();
            let first = store.snapshot_token().await.unwrap();
            store.goto(BASE).await.unwrap();
            let second = store.snapshot_token().await.unwrap();
            assert_ne!(first, second);
            assert!(second.ends_with(BASE));
        }

        #[tokio::test]
        async fn test_go_back_restores_previous_route() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "standard_user").await;
            assert!(store.current_url().await.unwrap().ends_with("/inventory.html"));
            store.go_back().await.unwrap();
            assert_eq!(store.current_url().await.unwrap(), BASE);
        }
    }

    mod login_tests {
        use super::*;

        async fn error_text(store: &FakeStorefront) -> String {
            let banner = store.find_all(None, login::ERROR_BANNER).await.unwrap();
            store.text(&banner[0]).await.unwrap()
        }

        #[tokio::test]
        async fn test_standard_login_reaches_inventory() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "standard_user").await;
            assert_eq!(
                store.current_url().await.unwrap(),
                "https://www.saucedemo.com/inventory.html"
            );
            let rows = store.find_all(None, inventory::INVENTORY_ITEM).await.unwrap();
            assert_eq!(rows.len(), 6);
        }

        #[tokio::test]
        async fn test_locked_out_user_sees_error() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "locked_out_user").await;
            assert_eq!(store.current_url().await.unwrap(), BASE);
            assert_eq!(error_text(&store).await, LOCKED_OUT);
        }

        #[tokio::test]
        async fn test_missing_fields() {
            let store = FakeStorefront::new(BASE);
            store.goto(BASE).await.unwrap();
            click(&store, login::LOGIN_BUTTON).await;
            assert_eq!(error_text(&store).await, USERNAME_REQUIRED);
            fill(&store, login::USERNAME_INPUT, "standard_user").await;
            click(&store, login::LOGIN_BUTTON).await;
            assert_eq!(error_text(&store).await, PASSWORD_REQUIRED);
        }

        #[tokio::test]
        async fn test_wrong_password() {
            let store = FakeStorefront::new(BASE);
            store.goto(BASE).await.unwrap();
            fill(&store, login::USERNAME_INPUT, "standard_user").await;
            fill(&store, login::PASSWORD_INPUT, "wrong").await;
            click(&store, login::LOGIN_BUTTON).await;
            assert_eq!(error_text(&store).await, BAD_CREDENTIALS);
        }

        #[tokio::test]
        async fn test_dismiss_error() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "locked_out_user").await;
            click(&store, login::ERROR_CLOSE_BUTTON).await;
            assert!(store
                .find_all(None, login::ERROR_BANNER)
                .await
                .unwrap()
                .is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_performance_glitch_login_is_delayed() {
            let store = FakeStorefront::with_options(
                BASE,
                FakeOptions::new().with_login_delay(Duration::from_secs(4)),
            );
            login_as(&store, "performance_glitch_user").await;
            assert_eq!(store.current_url().await.unwrap(), BASE);
            tokio::time::sleep(Duration::from_secs(4)).await;
            assert!(store.current_url().await.unwrap().ends_with("/inventory.html"));
        }
    }

    mod element_tests {
        use super::*;

        #[tokio::test]
        async fn test_stale_reference_after_navigation() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "standard_user").await;
            let rows = store.find_all(None, inventory::INVENTORY_ITEM).await.unwrap();
            store
                .goto("https://www.saucedemo.com/cart.html")
                .await
                .unwrap();
            let err = store.text(&rows[0]).await.unwrap_err();
            assert!(matches!(err, E2eError::StaleElement { .. }));
        }

        #[tokio::test]
        async fn test_missing_step_after_in_page_change() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "standard_user").await;
            let rows = store.find_all(None, inventory::INVENTORY_ITEM).await.unwrap();
            let add = store
                .find_all(Some(&rows[0]), inventory::ADD_TO_CART_BUTTON)
                .await
                .unwrap()
                .remove(0);
            store.click(&add).await.unwrap();
            let err = store.state(&add).await.unwrap_err();
            assert!(matches!(err, E2eError::ElementMissing { .. }));
            assert_eq!(store.cart_contents(), vec!["Sauce Labs Backpack"]);
        }

        #[tokio::test]
        async fn test_click_hidden_element_fails() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "standard_user").await;
            let logout = store.find_all(None, inventory::LOGOUT_LINK).await.unwrap();
            let err = store.click(&logout[0]).await.unwrap_err();
            assert!(err.to_string().contains("not interactable"));
            click(&store, inventory::MENU_BUTTON).await;
            store.click(&logout[0]).await.unwrap();
            assert_eq!(store.current_url().await.unwrap(), BASE);
        }

        #[tokio::test]
        async fn test_problem_user_images_have_no_source() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "problem_user").await;
            let images = store.find_all(None, inventory::ITEM_IMAGE).await.unwrap();
            assert_eq!(images.len(), 6);
            let src = store.attribute(&images[0], "src").await.unwrap();
            assert_eq!(src.as_deref(), Some(""));
        }

        #[tokio::test]
        async fn test_sort_select() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "standard_user").await;
            let select = store.find_all(None, inventory::SORT_SELECT).await.unwrap().remove(0);
            store.select_option(&select, "hilo").await.unwrap();
            let select = store.find_all(None, inventory::SORT_SELECT).await.unwrap().remove(0);
            assert_eq!(store.input_value(&select).await.unwrap(), "hilo");
            let err = store.select_option(&select, "cheapest").await.unwrap_err();
            assert!(err.to_string().contains("no option with value 'cheapest'"));
        }

        #[tokio::test]
        async fn test_sort_retires_row_references() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "standard_user").await;
            let rows = store.find_all(None, inventory::INVENTORY_ITEM).await.unwrap();
            let select = store.find_all(None, inventory::SORT_SELECT).await.unwrap().remove(0);
            store.select_option(&select, "lohi").await.unwrap();
            let err = store.click(&rows[0]).await.unwrap_err();
            assert!(matches!(err, E2eError::StaleElement { .. }));
            assert!(store.cart_contents().is_empty());
        }

        #[tokio::test]
        async fn test_reselecting_the_same_order_keeps_references() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "standard_user").await;
            let rows = store.find_all(None, inventory::INVENTORY_ITEM).await.unwrap();
            let select = store.find_all(None, inventory::SORT_SELECT).await.unwrap().remove(0);
            store.select_option(&select, "az").await.unwrap();
            assert!(store.text(&rows[0]).await.is_ok());
        }

        #[tokio::test]
        async fn test_problem_user_sort_is_ignored() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "problem_user").await;
            let token = store.snapshot_token().await.unwrap();
            let select = store.find_all(None, inventory::SORT_SELECT).await.unwrap().remove(0);
            store.select_option(&select, "lohi").await.unwrap();
            assert_eq!(store.input_value(&select).await.unwrap(), "lohi");
            assert_eq!(store.snapshot_token().await.unwrap(), token);
            let names = store.find_all(None, inventory::ITEM_NAME).await.unwrap();
            assert_eq!(store.text(&names[0]).await.unwrap(), "Sauce Labs Backpack");
        }

        #[tokio::test]
        async fn test_error_user_remove_does_nothing() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "error_user").await;
            click(&store, inventory::ADD_TO_CART_BUTTON).await;
            click(&store, inventory::REMOVE_BUTTON).await;
            assert_eq!(store.cart_contents(), vec!["Sauce Labs Backpack"]);
            assert_eq!(store.find_all(None, inventory::REMOVE_BUTTON).await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn test_closed_session_rejects_calls() {
            let store = FakeStorefront::new(BASE);
            store.close().await.unwrap();
            assert!(store.is_closed());
            assert!(store.goto(BASE).await.is_err());
            assert!(store.was_called("close"));
        }
    }
    mod checkout_tests {
        use super::*;

        async fn at_information_step(store: &FakeStorefront) {
            login_as(store, "standard_user").await;
            click(store, inventory::ADD_TO_CART_BUTTON).await;
            click(store, inventory::CART_LINK).await;
            click(store, cart::CHECKOUT).await;
        }

        #[tokio::test]
        async fn test_checkout_routes() {
            let store = FakeStorefront::new(BASE);
            at_information_step(&store).await;
            assert!(store.current_url().await.unwrap().ends_with("/checkout-step-one.html"));
            fill(&store, checkout::FIRST_NAME_INPUT, "Test").await;
            fill(&store, checkout::LAST_NAME_INPUT, "User").await;
            fill(&store, checkout::POSTAL_CODE_INPUT, "12345").await;
            click(&store, checkout::CONTINUE_BUTTON).await;
            assert!(store.current_url().await.unwrap().ends_with("/checkout-step-two.html"));
            let total = store.find_all(None, checkout::TOTAL_LABEL).await.unwrap();
            assert_eq!(store.text(&total[0]).await.unwrap(), "Total: $32.39");
            click(&store, checkout::FINISH_BUTTON).await;
            assert!(store.current_url().await.unwrap().ends_with("/checkout-complete.html"));
            assert!(store.cart_contents().is_empty());
            assert!(store.find_all(None, inventory::CART_BADGE).await.unwrap().is_empty());
        }

        async fn banner_text(store: &FakeStorefront) -> String {
            let banner = store.find_all(None, checkout::ERROR_BANNER).await.unwrap();
            store.text(&banner[0]).await.unwrap()
        }

        #[tokio::test]
        async fn test_validation_order() {
            let store = FakeStorefront::new(BASE);
            at_information_step(&store).await;
            click(&store, checkout::CONTINUE_BUTTON).await;
            assert_eq!(banner_text(&store).await, FIRST_NAME_REQUIRED);
            fill(&store, checkout::FIRST_NAME_INPUT, "Test").await;
            click(&store, checkout::CONTINUE_BUTTON).await;
            assert_eq!(banner_text(&store).await, LAST_NAME_REQUIRED);
            fill(&store, checkout::LAST_NAME_INPUT, "User").await;
            click(&store, checkout::CONTINUE_BUTTON).await;
            assert_eq!(banner_text(&store).await, POSTAL_CODE_REQUIRED);
            click(&store, login::ERROR_CLOSE_BUTTON).await;
            assert!(store.find_all(None, checkout::ERROR_BANNER).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_checkout_requires_login() {
            let store = FakeStorefront::new(BASE);
            store
                .goto("https://www.saucedemo.com/checkout-step-two.html")
                .await
                .unwrap();
            assert_eq!(store.current_url().await.unwrap(), BASE);
        }
    }

    mod call_log_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_polling_does_not_grow_the_log() {
            let store = FakeStorefront::new(BASE);
            store.goto(BASE).await.unwrap();
            let before = store.calls();
            let waiter = Waiter::new(&store, WaitOptions::new().with_timeout(15_000));
            assert!(!waiter.is_visible_within(login::ERROR_BANNER).await);
            assert_eq!(store.calls(), before);
        }

        #[tokio::test]
        async fn test_actions_are_recorded_in_order() {
            let store = FakeStorefront::new(BASE);
            login_as(&store, "standard_user").await;
            let calls = store.calls();
            assert_eq!(calls.len(), 4);
            assert_eq!(calls[0], format!("goto:{BASE}"));
            assert!(calls[3].starts_with("click:"));
        }
    }
}
