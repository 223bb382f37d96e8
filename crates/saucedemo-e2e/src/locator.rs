//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a `(strategy, value)` pair naming where an element lives
//! in the remote document. Every page declares its locators as `const`
//! items; they carry no behavior beyond rendering themselves into a query
//! the driver can run.

use serde::Serialize;
use std::fmt;

/// Strategy used to interpret a locator value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// `id` attribute
    Id,
    /// Single class name
    Class,
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Tag name
    Tag,
}

impl Strategy {
    /// Short name used in logs and error messages
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Class => "class",
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Tag => "tag",
        }
    }
}

/// An immutable element locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locator {
    /// How `value` is interpreted
    pub strategy: Strategy,
    /// Selector text
    pub value: &'static str,
}

impl Locator {
    /// Locate by `id` attribute
    #[must_use]
    pub const fn id(value: &'static str) -> Self {
        Self {
            strategy: Strategy::Id,
            value,
        }
    }

    /// Locate by class name
    #[must_use]
    pub const fn class(value: &'static str) -> Self {
        Self {
            strategy: Strategy::Class,
            value,
        }
    }

    /// Locate by CSS selector
    #[must_use]
    pub const fn css(value: &'static str) -> Self {
        Self {
            strategy: Strategy::Css,
            value,
        }
    }

    /// Locate by XPath expression
    #[must_use]
    pub const fn xpath(value: &'static str) -> Self {
        Self {
            strategy: Strategy::XPath,
            value,
        }
    }

    /// Locate by tag name
    #[must_use]
    pub const fn tag(value: &'static str) -> Self {
        Self {
            strategy: Strategy::Tag,
            value,
        }
    }

    /// Render as a CSS selector, or `None` for XPath locators
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self.strategy {
            Strategy::Id => Some(format!("[id={:?}]", self.value)),
            Strategy::Class => Some(format!(".{}", self.value)),
            Strategy::Css | Strategy::Tag => Some(self.value.to_string()),
            Strategy::XPath => None,
        }
    }

    /// Render as a query the in-page resolver understands
    #[must_use]
    pub fn to_query(&self) -> Query {
        self.to_css().map_or_else(
            || Query {
                xpath: true,
                expr: self.value.to_string(),
            },
            |expr| Query { xpath: false, expr },
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.value)
    }
}

/// Locator rendered for in-page evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// Whether `expr` is an XPath expression (otherwise CSS)
    pub xpath: bool,
    /// Selector or expression text
    pub expr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod css_rendering_tests {
        use super::*;

        #[test]
        fn test_id_renders_attribute_selector() {
            let locator = Locator::id("user-name");
            assert_eq!(locator.to_css().as_deref(), Some("[id=\"user-name\"]"));
        }

        #[test]
        fn test_class_renders_dot_selector() {
            let locator = Locator::class("inventory_item");
            assert_eq!(locator.to_css().as_deref(), Some(".inventory_item"));
        }

        #[test]
        fn test_css_and_tag_pass_through() {
            assert_eq!(
                Locator::css("button[id^='add-to-cart']").to_css().as_deref(),
                Some("button[id^='add-to-cart']")
            );
            assert_eq!(Locator::tag("a").to_css().as_deref(), Some("a"));
        }

        #[test]
        fn test_xpath_has_no_css_form() {
            assert!(Locator::xpath("./parent::a").to_css().is_none());
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_xpath_query_flag() {
            let query = Locator::xpath("//a").to_query();
            assert!(query.xpath);
            assert_eq!(query.expr, "//a");
        }

        #[test]
        fn test_css_query_flag() {
            let query = Locator::class("shopping_cart_badge").to_query();
            assert!(!query.xpath);
            assert_eq!(query.expr, ".shopping_cart_badge");
        }

        #[test]
        fn test_query_serializes_for_script() {
            let json = serde_json::to_string(&Locator::id("password").to_query()).unwrap();
            assert_eq!(json, r#"{"xpath":false,"expr":"[id=\"password\"]"}"#);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Locator::id("login-button").to_string(), "id=login-button");
        assert_eq!(Locator::xpath("//a").to_string(), "xpath=//a");
    }

    #[test]
    fn test_const_equality() {
        const A: Locator = Locator::css(".inventory_item_name");
        const B: Locator = Locator::css(".inventory_item_name");
        assert_eq!(A, B);
        assert_ne!(A, Locator::class("inventory_item_name"));
    }
}
