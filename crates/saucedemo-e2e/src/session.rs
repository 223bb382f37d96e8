//! Session and fixture management.
//!
//! A [`Session`] owns one driver (one browser, one window) plus the shared
//! configuration, and hands out page objects borrowing both. Scenarios run
//! inside [`with_session`], which closes the session on every exit path:
//! success, error and panic. A panic is re-raised after teardown.

use crate::config::SuiteConfig;
use crate::driver::Driver;
use crate::fake::{FakeOptions, FakeStorefront};
use crate::pages::{CartPage, CheckoutPage, InventoryPage, LoginPage, ProductDetailPage};
use crate::result::{E2eError, E2eResult};
use crate::users::UserClass;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Env var that opts the live suite in
pub const LIVE_ENV: &str = "SAUCEDEMO_LIVE";

/// One browser session for one scenario
#[derive(Debug)]
pub struct Session {
    driver: Box<dyn Driver>,
    config: Arc<SuiteConfig>,
    closed: AtomicBool,
}

impl Session {
    /// Wrap an existing driver
    #[must_use]
    pub fn new(driver: Box<dyn Driver>, config: Arc<SuiteConfig>) -> Self {
        Self {
            driver,
            config,
            closed: AtomicBool::new(false),
        }
    }

    /// Session against an in-memory storefront
    #[must_use]
    pub fn fake(config: Arc<SuiteConfig>, options: FakeOptions) -> Self {
        let driver = FakeStorefront::with_options(&config.base_url, options);
        Self::new(Box::new(driver), config)
    }

    /// Session against a freshly launched Chromium
    ///
    /// # Errors
    ///
    /// Returns `E2eError::BrowserLaunch` if Chromium cannot be started.
    #[cfg(feature = "browser")]
    pub async fn launch(config: Arc<SuiteConfig>) -> E2eResult<Self> {
        let driver = crate::cdp::CdpDriver::launch(&config.browser).await?;
        Ok(Self::new(Box::new(driver), config))
    }

    /// The session's driver
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Suite configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Login page object
    #[must_use]
    pub fn login_page(&self) -> LoginPage<'_> {
        LoginPage::new(self.driver(), self.config())
    }

    /// Inventory page object
    #[must_use]
    pub fn inventory_page(&self) -> InventoryPage<'_> {
        InventoryPage::new(self.driver(), self.config())
    }

    /// Product detail page object
    #[must_use]
    pub fn detail_page(&self) -> ProductDetailPage<'_> {
        ProductDetailPage::new(self.driver(), self.config())
    }

    /// Cart page object
    #[must_use]
    pub fn cart_page(&self) -> CartPage<'_> {
        CartPage::new(self.driver(), self.config())
    }

    /// Checkout page object
    #[must_use]
    pub fn checkout_page(&self) -> CheckoutPage<'_> {
        CheckoutPage::new(self.driver(), self.config())
    }

    /// Open the login page, log in and require the catalog to load within
    /// the account's login deadline.
    ///
    /// # Errors
    ///
    /// Returns `E2eError::Navigation` when the catalog does not load.
    pub async fn authenticate(&self, user: UserClass) -> E2eResult<()> {
        let login = self.login_page();
        login.navigate().await?;
        login.login_as(user).await?;
        if login
            .is_login_successful(user.login_timeout(&self.config.timeouts))
            .await
        {
            return Ok(());
        }
        Err(E2eError::Navigation {
            expected: crate::pages::login::LOGIN_SUCCESS_FRAGMENT.to_string(),
            actual: self.driver.current_url().await?,
        })
    }

    /// Close the browser. Later calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns the driver's close error from the first call.
    pub async fn close(&self) -> E2eResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!("closing session");
        self.driver.close().await
    }

    /// Whether [`Session::close`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Run `body` with `session`, closing the session afterwards no matter how
/// `body` ends.
///
/// The body's error wins over a teardown error; a panic in the body is
/// resumed after teardown.
///
/// # Errors
///
/// Returns the body's error, or the teardown error when the body succeeded.
pub async fn with_session<T, F, Fut>(session: Session, body: F) -> E2eResult<T>
where
    F: FnOnce(Arc<Session>) -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let session = Arc::new(session);
    let scoped = Arc::clone(&session);
    let outcome = AssertUnwindSafe(async move { body(scoped).await })
        .catch_unwind()
        .await;
    let teardown = session.close().await;

    match outcome {
        Err(panic) => {
            if let Err(err) = teardown {
                tracing::warn!(error = %err, "teardown failed after panic");
            }
            std::panic::resume_unwind(panic)
        }
        Ok(Err(err)) => {
            if let Err(teardown_err) = teardown {
                tracing::warn!(error = %teardown_err, "teardown failed after scenario error");
            }
            Err(err)
        }
        Ok(Ok(value)) => teardown.map(|()| value),
    }
}

// =============================================================================
// FIXTURE
// =============================================================================

/// Where a fixture's sessions come from
#[derive(Debug, Clone)]
pub enum Backend {
    /// In-memory storefront
    Fake(FakeOptions),
    /// Real Chromium against the configured base URL
    #[cfg(feature = "browser")]
    Chromium,
}

/// Factory for per-scenario sessions sharing one configuration
#[derive(Debug, Clone)]
pub struct SessionFixture {
    config: Arc<SuiteConfig>,
    backend: Backend,
}

impl SessionFixture {
    /// Fixture with an explicit backend
    #[must_use]
    pub const fn new(config: Arc<SuiteConfig>, backend: Backend) -> Self {
        Self { config, backend }
    }

    /// Fake-backed fixture with default options
    #[must_use]
    pub fn fake(config: Arc<SuiteConfig>) -> Self {
        Self::new(config, Backend::Fake(FakeOptions::default()))
    }

    /// Chromium when built with `browser` and `SAUCEDEMO_LIVE=1`, else the fake
    #[must_use]
    pub fn from_env(config: Arc<SuiteConfig>) -> Self {
        let live = std::env::var(LIVE_ENV).is_ok_and(|value| value == "1");
        #[cfg(feature = "browser")]
        if live {
            return Self::new(config, Backend::Chromium);
        }
        if live {
            tracing::warn!("{LIVE_ENV}=1 ignored: built without the `browser` feature");
        }
        Self::fake(config)
    }

    /// Shared configuration
    #[must_use]
    pub fn config(&self) -> &Arc<SuiteConfig> {
        &self.config
    }

    /// Selected backend
    #[must_use]
    pub const fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Open a new session
    ///
    /// # Errors
    ///
    /// Returns `E2eError::BrowserLaunch` if the browser cannot be started.
    pub async fn open(&self) -> E2eResult<Session> {
        match &self.backend {
            Backend::Fake(options) => Ok(Session::fake(Arc::clone(&self.config), options.clone())),
            #[cfg(feature = "browser")]
            Backend::Chromium => Session::launch(Arc::clone(&self.config)).await,
        }
    }

    /// Open a session, run `body`, and tear the session down
    ///
    /// # Errors
    ///
    /// See [`with_session`].
    pub async fn run<T, F, Fut>(&self, body: F) -> E2eResult<T>
    where
        F: FnOnce(Arc<Session>) -> Fut,
        Fut: Future<Output = E2eResult<T>>,
    {
        let session = self.open().await?;
        with_session(session, body).await
    }
}
