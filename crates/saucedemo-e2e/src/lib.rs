//! saucedemo-e2e: Page Object Model end-to-end suite for the SauceDemo storefront
//!
//! Scenarios drive a browser through login, catalog, product detail, cart
//! and checkout flows and assert what the pages show. Page objects never
//! touch the browser directly; they go through the [`Driver`] trait and poll
//! with the explicit waits in [`wait`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  saucedemo-e2e Architecture                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │───►│ Page       │───►│ Waiter     │            │
//! │   │ (session)  │    │ Objects    │    │ (polling)  │            │
//! │   └────────────┘    └────────────┘    └─────┬──────┘            │
//! │                                             ▼                   │
//! │                     ┌───────────────────────────────────────┐   │
//! │                     │ Driver: CdpDriver | FakeStorefront    │   │
//! │                     └───────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use saucedemo_e2e::{scenario, SessionFixture, SuiteConfig, UserClass};
//! use std::sync::Arc;
//!
//! # async fn run() -> saucedemo_e2e::E2eResult<()> {
//! let fixture = SessionFixture::from_env(Arc::new(SuiteConfig::load()?));
//! fixture
//!     .run(|session| async move {
//!         scenario::complete_product_verification(&session, UserClass::Standard).await
//!     })
//!     .await
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod catalog;
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc)]
pub mod cdp;
pub mod config;
pub mod driver;
pub mod fake;
pub mod locator;
pub mod logging;
pub mod navigation;
pub mod pages;
pub mod product;
mod result;
pub mod scenario;
pub mod session;
pub mod users;
pub mod wait;

pub use catalog::{ExpectedProduct, SortOrder, EXPECTED_CATALOG, EXPECTED_PRODUCT_COUNT};
#[cfg(feature = "browser")]
pub use cdp::CdpDriver;
pub use config::{BrowserSettings, SuiteConfig, TimeoutSettings};
pub use driver::{Driver, ElementRef, ElementState};
pub use fake::{FakeOptions, FakeStorefront};
pub use locator::{Locator, Strategy};
pub use navigation::{NavigationPlan, NavigationStrategy};
pub use pages::{
    BasePage, CartPage, CheckoutPage, InventoryPage, LoginPage, PageObject, ProductDetailPage,
};
pub use product::{CatalogEntry, CatalogSnapshot, Product, ProductHandles, ProductHealth};
pub use result::{E2eError, E2eResult};
pub use session::{with_session, Backend, Session, SessionFixture};
pub use users::{UserClass, SHARED_PASSWORD};
pub use wait::{Presence, WaitOptions, Waiter};
