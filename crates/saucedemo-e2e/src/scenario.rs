//! End-to-end flows.
//!
//! Each scenario is a linear sequence of page-object calls and checks run
//! against one [`Session`]. A failed check returns
//! `E2eError::AssertionFailed`; nothing after it runs. The same functions
//! back the fake-storefront tests and the opt-in live suite.

use crate::catalog::{
    parse_price, ExpectedProduct, SortOrder, CHECKOUT_PRODUCTS, DETAIL_NAVIGATION_CASES,
    EXPECTED_CATALOG, EXPECTED_PRODUCT_COUNT, ORDER_CONFIRMATION, VERIFICATION_PRODUCT,
};
use crate::pages::checkout::TEST_CUSTOMER;
use crate::pages::inventory::INVENTORY_FRAGMENT;
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use crate::users::UserClass;

/// Return `AssertionFailed` with a formatted message unless `cond` holds
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(E2eError::assertion(format!($($arg)+)));
        }
    };
}

/// Log every account in turn. The locked-out account must stay off the
/// catalog and see a non-empty error banner; every other account must reach
/// the catalog within its login deadline.
///
/// # Errors
///
/// Returns `E2eError::AssertionFailed` for the first account that misbehaves.
#[tracing::instrument(skip(session))]
pub async fn login_all_users(session: &Session) -> E2eResult<()> {
    let login = session.login_page();
    for user in UserClass::ALL {
        login.navigate().await?;
        login.login_as(user).await?;
        let timeout = user.login_timeout(&session.config().timeouts);
        if user.can_authenticate() {
            ensure!(
                login.is_login_successful(timeout).await,
                "{user} did not reach the catalog within {timeout:?}"
            );
            session.driver().go_back().await?;
        } else {
            ensure!(
                !login.is_login_successful(timeout).await,
                "{user} reached the catalog"
            );
            ensure!(
                login.is_error_displayed().await,
                "{user} saw no error banner"
            );
            let message = login.error_message().await.unwrap_or_default();
            ensure!(!message.trim().is_empty(), "{user} got an empty error message");
            tracing::info!(%user, %message, "login rejected");
        }
    }
    Ok(())
}

/// The locked-out account stays on the login page with an error message.
///
/// # Errors
///
/// Returns `E2eError::AssertionFailed` if the login goes through or no
/// message shows.
#[tracing::instrument(skip(session))]
pub async fn locked_out_user_is_rejected(session: &Session) -> E2eResult<()> {
    let user = UserClass::LockedOut;
    let login = session.login_page();
    login.navigate().await?;
    login.login_as(user).await?;
    ensure!(
        !login
            .is_login_successful(user.login_timeout(&session.config().timeouts))
            .await,
        "locked out user reached the catalog"
    );
    ensure!(login.is_error_displayed().await, "no error banner");
    let message = login.error_message().await.unwrap_or_default();
    ensure!(
        message.contains("locked out"),
        "unexpected error message '{message}'"
    );
    ensure!(
        login.close_error_message().await?,
        "error banner did not close"
    );
    Ok(())
}

/// Full catalog check for one account: every expected product listed,
/// element health per row, one detail page round trip and the product count
/// after returning.
///
/// # Errors
///
/// Returns `E2eError::AssertionFailed` for the first failed check and
/// navigation errors from the page objects.
#[tracing::instrument(skip(session))]
pub async fn complete_product_verification(session: &Session, user: UserClass) -> E2eResult<()> {
    tracing::info!(seeded_bugs = user.is_buggy(), "verifying catalog");
    session.authenticate(user).await?;
    let inventory = session.inventory_page();

    let snapshot = inventory.get_all_products().await?;
    ensure!(
        snapshot.len() == EXPECTED_PRODUCT_COUNT,
        "expected {EXPECTED_PRODUCT_COUNT} products, read {} ({} skipped)",
        snapshot.len(),
        snapshot.skipped
    );
    for expected in &EXPECTED_CATALOG {
        ensure!(
            snapshot.contains(expected.name, expected.price),
            "'{}' at {} is not listed",
            expected.name,
            expected.price
        );
    }

    for entry in &snapshot.entries {
        let health = inventory.verify_product_elements(&entry.handles).await;
        let failures = health.failures_for(user);
        ensure!(
            failures.is_empty(),
            "'{}' failed element checks for {user}: {}",
            entry.product.name,
            failures.join(", ")
        );
        if !health.is_healthy() {
            tracing::info!(product = %entry.product.name, failures = ?health.failures(), "tolerated element failures");
        }
    }

    let product = VERIFICATION_PRODUCT;
    inventory.click_product_by_name(product.name).await?;
    let detail = session.detail_page();
    ensure!(detail.is_on_detail_page().await, "detail page for '{}' did not load", product.name);
    let name = detail.product_name().await?;
    ensure!(name == product.name, "detail page shows '{name}'");
    let price = detail.product_price().await?;
    ensure!(price == product.price, "detail price is '{price}', expected {}", product.price);
    if !user.tolerates_broken_images() {
        ensure!(detail.is_product_image_visible().await, "detail image is not visible");
    }

    detail.back_to_products().await?;
    let url = session.driver().current_url().await?;
    ensure!(url.contains(INVENTORY_FRAGMENT), "back navigation landed on {url}");
    let count = inventory.product_count().await?;
    ensure!(
        count == EXPECTED_PRODUCT_COUNT,
        "catalog shows {count} products after returning"
    );
    Ok(())
}

/// Open one product as the standard account and check its detail fields and
/// the way back.
///
/// # Errors
///
/// Returns `E2eError::AssertionFailed` on a field mismatch.
#[tracing::instrument(skip(session))]
pub async fn product_detail_navigation(session: &Session, name: &str, price: &str) -> E2eResult<()> {
    session.authenticate(UserClass::Standard).await?;
    let inventory = session.inventory_page();
    ensure!(
        inventory.verify_product_exists(name, price).await?,
        "'{name}' at {price} is not listed"
    );
    let strategy = inventory.click_product_by_name(name).await?;
    tracing::debug!(%strategy, "detail page reached");

    let detail = session.detail_page();
    ensure!(detail.is_on_detail_page().await, "detail page for '{name}' did not load");
    let shown = detail.product_name().await?;
    ensure!(shown == name, "detail page shows '{shown}', expected '{name}'");
    let shown_price = detail.product_price().await?;
    ensure!(shown_price == price, "detail price is '{shown_price}', expected {price}");
    ensure!(
        !detail.product_description().await?.trim().is_empty(),
        "'{name}' has an empty description"
    );

    detail.back_to_products().await?;
    ensure!(inventory.is_on_inventory_page().await, "not back on the catalog");
    let count = inventory.product_count().await?;
    ensure!(count == EXPECTED_PRODUCT_COUNT, "catalog shows {count} products after returning");
    Ok(())
}

/// [`product_detail_navigation`] for every fixed detail case
///
/// # Errors
///
/// Stops at the first failing product.
pub async fn detail_navigation_cases(session: &Session) -> E2eResult<()> {
    for case in &DETAIL_NAVIGATION_CASES {
        product_detail_navigation(session, case.name, case.price).await?;
    }
    Ok(())
}

/// Add two products, check the badge and the cart page, then remove one from
/// the catalog and one from its detail page.
///
/// # Errors
///
/// Returns `E2eError::AssertionFailed` when the badge or the cart page
/// disagrees with what was added.
#[tracing::instrument(skip(session))]
pub async fn cart_round_trip(session: &Session) -> E2eResult<()> {
    session.authenticate(UserClass::Standard).await?;
    let inventory = session.inventory_page();
    let picks = [EXPECTED_CATALOG[0], EXPECTED_CATALOG[3]];

    ensure!(inventory.get_cart_item_count().await? == 0, "cart is not empty at start");
    for pick in &picks {
        inventory.add_product_to_cart_by_name(pick.name).await?;
    }
    let badge = inventory.get_cart_item_count().await?;
    ensure!(badge == picks.len(), "badge shows {badge} after adding {}", picks.len());

    inventory.open_shopping_cart().await?;
    let cart = session.cart_page();
    let lines = cart.items().await?;
    ensure!(lines.len() == picks.len(), "cart lists {} lines", lines.len());
    for pick in &picks {
        ensure!(
            lines.iter().any(|line| line.matches(pick.name, pick.price)),
            "'{}' missing from the cart",
            pick.name
        );
    }
    cart.continue_shopping().await?;

    inventory.remove_product_from_cart_by_name(picks[0].name).await?;
    ensure!(inventory.get_cart_item_count().await? == 1, "badge did not drop to 1");

    inventory.click_product_by_name(picks[1].name).await?;
    let detail = session.detail_page();
    ensure!(detail.is_added_to_cart().await?, "detail page does not show the item in the cart");
    detail.remove_from_cart().await?;
    detail.back_to_products().await?;
    ensure!(inventory.get_cart_item_count().await? == 0, "cart is not empty at the end");
    Ok(())
}

/// Apply every sort order and check the listing follows it.
///
/// # Errors
///
/// Returns `E2eError::AssertionFailed` for an order the listing ignores.
#[tracing::instrument(skip(session))]
pub async fn sort_orders(session: &Session) -> E2eResult<()> {
    session.authenticate(UserClass::Standard).await?;
    let inventory = session.inventory_page();
    for order in SortOrder::ALL {
        inventory.sort_by(order).await?;
        let sorted = if order.is_by_price() {
            order.prices_sorted(&inventory.product_prices().await?)
        } else {
            order.names_sorted(&inventory.product_names().await?)
        };
        ensure!(sorted, "listing is not sorted {order}");
    }
    Ok(())
}

/// Sort by descending price, add a product, and require both the dropdown
/// and the listing to keep that order.
///
/// # Errors
///
/// Returns `E2eError::AssertionFailed` when adding resets the order.
#[tracing::instrument(skip(session))]
pub async fn sort_survives_add_to_cart(session: &Session) -> E2eResult<()> {
    session.authenticate(UserClass::Standard).await?;
    let inventory = session.inventory_page();
    let order = SortOrder::PriceDescending;
    inventory.sort_by(order).await?;
    inventory
        .add_product_to_cart_by_name(VERIFICATION_PRODUCT.name)
        .await?;
    let selected = inventory.current_sort().await?;
    ensure!(selected == Some(order), "dropdown shows {selected:?} after adding");
    ensure!(
        order.prices_sorted(&inventory.product_prices().await?),
        "listing is no longer sorted {order}"
    );
    Ok(())
}

/// Add `picks` from the catalog and walk through the cart to the
/// information form.
async fn start_checkout(session: &Session, picks: &[ExpectedProduct]) -> E2eResult<()> {
    let inventory = session.inventory_page();
    for pick in picks {
        inventory.add_product_to_cart_by_name(pick.name).await?;
    }
    let badge = inventory.get_cart_item_count().await?;
    ensure!(badge == picks.len(), "badge shows {badge} after adding {}", picks.len());
    inventory.open_shopping_cart().await?;
    session.cart_page().checkout().await
}

/// Buy the checkout products as the standard account: information form,
/// overview amounts, confirmation and an empty cart afterwards.
///
/// # Errors
///
/// Returns `E2eError::AssertionFailed` when the overview or the confirmation
/// disagrees with the order, and navigation errors between steps.
#[tracing::instrument(skip(session))]
pub async fn checkout_flow(session: &Session) -> E2eResult<()> {
    session.authenticate(UserClass::Standard).await?;
    start_checkout(session, &CHECKOUT_PRODUCTS).await?;
    let checkout = session.checkout_page();
    checkout.continue_to_overview(&TEST_CUSTOMER).await?;

    let lines = checkout.overview_items().await?;
    ensure!(
        lines.len() == CHECKOUT_PRODUCTS.len(),
        "overview lists {} lines",
        lines.len()
    );
    for pick in &CHECKOUT_PRODUCTS {
        ensure!(
            lines.iter().any(|line| line.matches(pick.name, pick.price)),
            "'{}' missing from the overview",
            pick.name
        );
    }
    let summary = checkout.summary().await?;
    let expected: u64 = CHECKOUT_PRODUCTS
        .iter()
        .filter_map(|pick| parse_price(pick.price))
        .sum();
    ensure!(
        summary.item_total == expected,
        "item total is {} cents, expected {expected}",
        summary.item_total
    );
    ensure!(summary.is_consistent(), "overview amounts do not add up: {summary:?}");

    checkout.finish().await?;
    let header = checkout.confirmation_header().await?;
    ensure!(header == ORDER_CONFIRMATION, "confirmation reads '{header}'");
    let badge = session.inventory_page().get_cart_item_count().await?;
    ensure!(badge == 0, "badge shows {badge} after the order");
    checkout.back_home().await
}

/// Submit the information form empty, require the first-name error, then
/// cancel and require the cart to keep its line.
///
/// # Errors
///
/// Returns `E2eError::AssertionFailed` when the empty form goes through or
/// cancelling loses the cart.
#[tracing::instrument(skip(session))]
pub async fn checkout_requires_information(session: &Session) -> E2eResult<()> {
    session.authenticate(UserClass::Standard).await?;
    let pick = EXPECTED_CATALOG[0];
    start_checkout(session, &[pick]).await?;
    let checkout = session.checkout_page();

    checkout.submit_information().await?;
    let message = checkout.error_message().await.unwrap_or_default();
    ensure!(
        message.contains("First Name is required"),
        "unexpected validation message '{message}'"
    );
    ensure!(
        checkout.is_on_information_step().await,
        "empty form left the information step"
    );

    checkout.cancel_to_cart().await?;
    let lines = session.cart_page().items().await?;
    ensure!(
        lines.iter().any(|line| line.matches(pick.name, pick.price)),
        "'{}' left the cart after cancelling",
        pick.name
    );
    Ok(())
}

/// Log in, then out through the menu, and require the login form back.
///
/// # Errors
///
/// Returns navigation errors from the logout.
#[tracing::instrument(skip(session))]
pub async fn logout(session: &Session) -> E2eResult<()> {
    session.authenticate(UserClass::Standard).await?;
    session.inventory_page().logout().await?;
    let login = session.login_page();
    ensure!(
        login.username_value().await?.is_empty(),
        "username field kept its value after logout"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(cond: bool) -> E2eResult<u8> {
        ensure!(cond, "condition was {}", cond);
        Ok(1)
    }

    #[test]
    fn test_ensure_passes_through() {
        assert_eq!(check(true).unwrap(), 1);
    }

    #[test]
    fn test_ensure_returns_assertion_failure() {
        match check(false) {
            Err(E2eError::AssertionFailed { message }) => assert_eq!(message, "condition was false"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
