//! Opening a product's detail page.
//!
//! A single click is not a reliable way in: image links and name links have
//! both been seen to do nothing on some accounts. [`NavigationPlan`] is an
//! ordered list of [`NavigationStrategy`] values tried until one produces a
//! detail-page URL. The catalog is re-read before every attempt so no
//! element reference crosses a navigation.

use crate::pages::InventoryPage;
use crate::result::{E2eError, E2eResult};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// One way of reaching a product's detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationStrategy {
    /// Click the link wrapping the product image
    ImageLink,
    /// Click the link wrapping the product name
    TitleLink,
    /// Parse the item id from a row link and load the detail URL directly
    DirectUrl,
}

impl NavigationStrategy {
    /// Short name for logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ImageLink => "image-link",
            Self::TitleLink => "title-link",
            Self::DirectUrl => "direct-url",
        }
    }
}

impl fmt::Display for NavigationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one strategy attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The detail page URL appeared
    Reached,
    /// The action ran but the URL never changed shape
    NotReached,
    /// The action itself failed
    Failed(E2eError),
}

/// Ordered strategies for [`open_product`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPlan {
    /// Strategies, tried first to last
    pub strategies: Vec<NavigationStrategy>,
}

impl Default for NavigationPlan {
    fn default() -> Self {
        Self {
            strategies: vec![
                NavigationStrategy::ImageLink,
                NavigationStrategy::TitleLink,
                NavigationStrategy::DirectUrl,
            ],
        }
    }
}

impl NavigationPlan {
    /// Plan with an explicit strategy order
    #[must_use]
    pub fn new(strategies: impl IntoIterator<Item = NavigationStrategy>) -> Self {
        Self {
            strategies: strategies.into_iter().collect(),
        }
    }
}

fn item_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"item_(\d+)_").ok())
        .as_ref()
}

/// Numeric item id embedded in a row link id (`item_4_img_link` gives `4`)
#[must_use]
pub fn parse_item_id(link_id: &str) -> Option<u32> {
    item_id_pattern()?
        .captures(link_id)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Detail page URL for an item id
#[must_use]
pub fn detail_url(base_url: &str, item_id: u32) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/inventory-item.html?id={item_id}")
}

/// Whether a URL has the detail page shape
#[must_use]
pub fn is_detail_url(url: &str) -> bool {
    url.contains("inventory-item.html") || url.contains("?id=")
}

/// Try `plan`'s strategies in order until the detail page of `name` loads.
///
/// Returns the strategy that worked.
///
/// # Errors
///
/// Returns `E2eError::ProductNotFound` as soon as the product is missing from
/// the catalog and `E2eError::NavigationExhausted` once every strategy failed.
pub async fn open_product(
    page: &InventoryPage<'_>,
    name: &str,
    plan: &NavigationPlan,
) -> E2eResult<NavigationStrategy> {
    for (attempt, &strategy) in plan.strategies.iter().enumerate() {
        if attempt > 0 && !page.is_on_inventory_page().await {
            page.open().await?;
        }
        match attempt_strategy(page, name, strategy).await {
            AttemptOutcome::Reached => {
                tracing::info!(product = name, %strategy, "opened product");
                return Ok(strategy);
            }
            AttemptOutcome::NotReached => {
                tracing::debug!(product = name, %strategy, "detail page not reached");
            }
            AttemptOutcome::Failed(err @ E2eError::ProductNotFound { .. }) => return Err(err),
            AttemptOutcome::Failed(err) => {
                tracing::warn!(product = name, %strategy, error = %err, "navigation attempt failed");
            }
        }
    }
    Err(E2eError::NavigationExhausted {
        product: name.to_string(),
        attempts: plan.strategies.len(),
    })
}

async fn attempt_strategy(
    page: &InventoryPage<'_>,
    name: &str,
    strategy: NavigationStrategy,
) -> AttemptOutcome {
    match run_strategy(page, name, strategy).await {
        Ok(()) => {}
        Err(err) => return AttemptOutcome::Failed(err),
    }
    let base = page.base();
    let confirmed = base
        .waiter_for(base.config().timeouts.navigation_confirm())
        .wait_until_url_matches("detail page URL", is_detail_url)
        .await;
    if confirmed {
        AttemptOutcome::Reached
    } else {
        AttemptOutcome::NotReached
    }
}

async fn run_strategy(
    page: &InventoryPage<'_>,
    name: &str,
    strategy: NavigationStrategy,
) -> E2eResult<()> {
    let entry = page
        .find_product(name)
        .await?
        .ok_or_else(|| E2eError::ProductNotFound {
            name: name.to_string(),
        })?;
    let base = page.base();
    let handles = &entry.handles;
    match strategy {
        NavigationStrategy::ImageLink => base.click_element(&handles.image_link).await,
        NavigationStrategy::TitleLink => base.click_element(&handles.title_link).await,
        NavigationStrategy::DirectUrl => {
            let driver = base.driver();
            let mut item_id = None;
            for link in [&handles.image_link, &handles.title_link] {
                if let Some(id) = driver.attribute(link, "id").await? {
                    item_id = parse_item_id(&id);
                    if item_id.is_some() {
                        break;
                    }
                }
            }
            let item_id = item_id.ok_or_else(|| {
                E2eError::script(format!("no item id in the links of '{name}'"))
            })?;
            base.navigate_to(&detail_url(&base.config().base_url, item_id))
                .await
        }
    }
}
