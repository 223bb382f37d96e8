//! Expected storefront catalog and sort orders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One (name, price) pair of ground truth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ExpectedProduct {
    /// Display name
    pub name: &'static str,
    /// Formatted price, exactly as rendered
    pub price: &'static str,
}

impl ExpectedProduct {
    const fn new(name: &'static str, price: &'static str) -> Self {
        Self { name, price }
    }
}

/// Number of products the catalog always lists
pub const EXPECTED_PRODUCT_COUNT: usize = 6;

/// The fixed catalog every functional user should see
pub const EXPECTED_CATALOG: [ExpectedProduct; EXPECTED_PRODUCT_COUNT] = [
    ExpectedProduct::new("Sauce Labs Bike Light", "$9.99"),
    ExpectedProduct::new("Sauce Labs Backpack", "$29.99"),
    ExpectedProduct::new("Sauce Labs Bolt T-Shirt", "$15.99"),
    ExpectedProduct::new("Sauce Labs Fleece Jacket", "$49.99"),
    ExpectedProduct::new("Sauce Labs Onesie", "$7.99"),
    ExpectedProduct::new("Test.allTheThings() T-Shirt (Red)", "$15.99"),
];

/// Product opened by the full verification flow
pub const VERIFICATION_PRODUCT: ExpectedProduct = EXPECTED_CATALOG[1];

/// (product, price) pairs the detail-navigation checks run over
pub const DETAIL_NAVIGATION_CASES: [ExpectedProduct; 3] = [
    EXPECTED_CATALOG[1],
    EXPECTED_CATALOG[0],
    EXPECTED_CATALOG[3],
];

/// Look up the expected price of a product
#[must_use]
pub fn expected_price(name: &str) -> Option<&'static str> {
    EXPECTED_CATALOG
        .iter()
        .find(|product| product.name == name)
        .map(|product| product.price)
}

/// Parse a rendered price (`$29.99`) into cents.
///
/// Returns `None` for anything that is not a dollar amount with exactly two
/// decimal places.
#[must_use]
pub fn parse_price(text: &str) -> Option<u64> {
    let digits = text.trim().strip_prefix('$')?;
    let (dollars, cents) = digits.split_once('.')?;
    if dollars.is_empty()
        || cents.len() != 2
        || !dollars.bytes().all(|b| b.is_ascii_digit())
        || !cents.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let dollars: u64 = dollars.parse().ok()?;
    let cents: u64 = cents.parse().ok()?;
    dollars.checked_mul(100)?.checked_add(cents)
}

/// Render cents as the storefront does
#[must_use]
pub fn format_price(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

// =============================================================================
// CHECKOUT
// =============================================================================

/// Sales tax added on the checkout overview, in percent
pub const TAX_RATE_PERCENT: u64 = 8;

/// Tax on an item total, rounded half up to the cent
#[must_use]
pub const fn sales_tax(item_total_cents: u64) -> u64 {
    (item_total_cents * TAX_RATE_PERCENT + 50) / 100
}

/// Header of the order confirmation page
pub const ORDER_CONFIRMATION: &str = "Thank you for your order!";

/// Products bought by the full checkout flow
pub const CHECKOUT_PRODUCTS: [ExpectedProduct; 2] = [EXPECTED_CATALOG[1], EXPECTED_CATALOG[0]];

// =============================================================================
// SORT ORDERS
// =============================================================================

/// Options of the product sort dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Name (A to Z)
    #[default]
    NameAscending,
    /// Name (Z to A)
    NameDescending,
    /// Price (low to high)
    PriceAscending,
    /// Price (high to low)
    PriceDescending,
}

impl SortOrder {
    /// Every option in dropdown order
    pub const ALL: [Self; 4] = [
        Self::NameAscending,
        Self::NameDescending,
        Self::PriceAscending,
        Self::PriceDescending,
    ];

    /// `value` attribute of the dropdown option
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::NameAscending => "az",
            Self::NameDescending => "za",
            Self::PriceAscending => "lohi",
            Self::PriceDescending => "hilo",
        }
    }

    /// Parse a dropdown option value
    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|order| order.value() == value)
    }

    /// Whether the order compares prices (otherwise names)
    #[must_use]
    pub const fn is_by_price(self) -> bool {
        matches!(self, Self::PriceAscending | Self::PriceDescending)
    }

    /// Check names against this order. Only meaningful for name orders.
    #[must_use]
    pub fn names_sorted<S: AsRef<str>>(self, names: &[S]) -> bool {
        names.windows(2).all(|pair| {
            let (a, b) = (pair[0].as_ref(), pair[1].as_ref());
            match self {
                Self::NameDescending => a >= b,
                _ => a <= b,
            }
        })
    }

    /// Check prices (in cents) against this order. Only meaningful for price orders.
    #[must_use]
    pub fn prices_sorted(self, prices: &[u64]) -> bool {
        prices.windows(2).all(|pair| match self {
            Self::PriceDescending => pair[0] >= pair[1],
            _ => pair[0] <= pair[1],
        })
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_value(s).ok_or_else(|| format!("unknown sort order '{s}'"))
    }
}
