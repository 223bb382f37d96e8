//! Product read projections.
//!
//! A catalog query yields a [`CatalogSnapshot`]: plain [`Product`] values
//! paired with [`ProductHandles`] that are only valid for the document the
//! snapshot was taken from. The snapshot token travels with the handles, so
//! using them after a navigation or a re-sort fails with a stale-element
//! error instead of touching the wrong element.

use crate::driver::ElementRef;
use crate::users::UserClass;
use serde::Serialize;

/// Display fields of one catalog row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Product {
    /// Product name
    pub name: String,
    /// Formatted price (`$29.99`)
    pub price: String,
    /// Description text
    pub description: String,
}

impl Product {
    /// Exact match on both name and formatted price
    #[must_use]
    pub fn matches(&self, name: &str, price: &str) -> bool {
        self.name == name && self.price == price
    }
}

/// Element references for one catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductHandles {
    /// The row container
    pub row: ElementRef,
    /// Product image
    pub image: ElementRef,
    /// Link wrapping the image
    pub image_link: ElementRef,
    /// Link wrapping the name
    pub title_link: ElementRef,
    /// Name element
    pub name: ElementRef,
    /// Add-to-cart button, absent once the product is in the cart
    pub add_button: Option<ElementRef>,
    /// Remove button, present once the product is in the cart
    pub remove_button: Option<ElementRef>,
}

impl ProductHandles {
    /// Snapshot token all handles were resolved in
    #[must_use]
    pub fn token(&self) -> &str {
        &self.row.token
    }
}

/// A product together with its element references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Display fields
    pub product: Product,
    /// Element references
    pub handles: ProductHandles,
}

/// All readable catalog rows of one rendered document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Snapshot token of the document the rows were read from
    pub token: String,
    /// Rows that were read completely
    pub entries: Vec<CatalogEntry>,
    /// Rows present in the document but skipped because a field could not be read
    pub skipped: usize,
}

impl CatalogSnapshot {
    /// Number of products read
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no products were read
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with an exact name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.product.name == name)
    }

    /// Whether a product with this exact name and price was read
    #[must_use]
    pub fn contains(&self, name: &str, price: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.product.matches(name, price))
    }

    /// Display fields only
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.entries.iter().map(|entry| &entry.product)
    }
}

/// Result of the five per-row element checks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProductHealth {
    /// Image is rendered and visible
    pub has_visible_image: bool,
    /// Image carries a non-empty `src`
    pub image_has_src: bool,
    /// Add-to-cart button is displayed
    pub has_add_button: bool,
    /// Add-to-cart button is enabled
    pub button_is_enabled: bool,
    /// Name is displayed and enabled
    pub has_clickable_name: bool,
}

impl ProductHealth {
    /// All checks passing
    pub const HEALTHY: Self = Self {
        has_visible_image: true,
        image_has_src: true,
        has_add_button: true,
        button_is_enabled: true,
        has_clickable_name: true,
    };

    /// Names of failing checks
    #[must_use]
    pub fn failures(&self) -> Vec<&'static str> {
        [
            ("has_visible_image", self.has_visible_image),
            ("image_has_src", self.image_has_src),
            ("has_add_button", self.has_add_button),
            ("button_is_enabled", self.button_is_enabled),
            ("has_clickable_name", self.has_clickable_name),
        ]
        .into_iter()
        .filter_map(|(name, ok)| (!ok).then_some(name))
        .collect()
    }

    /// Failing checks not excused for this user.
    ///
    /// Image checks are excused for accounts with known-broken images.
    #[must_use]
    pub fn failures_for(&self, user: UserClass) -> Vec<&'static str> {
        const IMAGE_CHECKS: [&str; 2] = ["has_visible_image", "image_has_src"];
        self.failures()
            .into_iter()
            .filter(|check| !(user.tolerates_broken_images() && IMAGE_CHECKS.contains(check)))
            .collect()
    }

    /// Whether every check passed
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.has_visible_image
            && self.image_has_src
            && self.has_add_button
            && self.button_is_enabled
            && self.has_clickable_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ElementRef;
    use crate::locator::Locator;

    fn handle(token: &str, value: &'static str) -> ElementRef {
        ElementRef::root(token, Locator::css(value), 0)
    }

    fn entry(name: &str, price: &str) -> CatalogEntry {
        CatalogEntry {
            product: Product {
                name: name.to_string(),
                price: price.to_string(),
                description: String::new(),
            },
            handles: ProductHandles {
                row: handle("t1", ".inventory_item"),
                image: handle("t1", "img"),
                image_link: handle("t1", "a"),
                title_link: handle("t1", "a"),
                name: handle("t1", ".inventory_item_name"),
                add_button: None,
                remove_button: None,
            },
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn test_contains_requires_exact_match() {
            let snapshot = CatalogSnapshot {
                token: "t1".into(),
                entries: vec![entry("Sauce Labs Backpack", "$29.99")],
                skipped: 0,
            };
            assert!(snapshot.contains("Sauce Labs Backpack", "$29.99"));
            assert!(!snapshot.contains("Sauce Labs Backpack", "29.99"));
            assert!(!snapshot.contains("sauce labs backpack", "$29.99"));
            assert!(snapshot.find("Sauce Labs Backpack").is_some());
            assert_eq!(snapshot.len(), 1);
            assert_eq!(snapshot.entries[0].handles.token(), "t1");
        }

        #[test]
        fn test_empty_snapshot() {
            let snapshot = CatalogSnapshot::default();
            assert!(snapshot.is_empty());
            assert!(snapshot.find("anything").is_none());
        }
    }

    mod health_tests {
        use super::*;

        #[test]
        fn test_healthy_has_no_failures() {
            assert!(ProductHealth::HEALTHY.is_healthy());
            assert!(ProductHealth::HEALTHY.failures().is_empty());
        }

        #[test]
        fn test_image_failures_excused_for_problem_user() {
            let health = ProductHealth {
                has_visible_image: false,
                image_has_src: false,
                ..ProductHealth::HEALTHY
            };
            assert_eq!(health.failures().len(), 2);
            assert!(health.failures_for(UserClass::Problem).is_empty());
            assert!(health.failures_for(UserClass::Visual).is_empty());
            assert_eq!(
                health.failures_for(UserClass::Standard),
                vec!["has_visible_image", "image_has_src"]
            );
        }

        #[test]
        fn test_button_failures_never_excused() {
            let health = ProductHealth {
                button_is_enabled: false,
                ..ProductHealth::HEALTHY
            };
            assert_eq!(
                health.failures_for(UserClass::Problem),
                vec!["button_is_enabled"]
            );
        }
    }
}
