//! Driver - Abstract Browser Automation Trait
//!
//! Page objects talk to the browser only through [`Driver`]. Two
//! implementations exist:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Driver (async trait)                                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────────┐   ┌────────────────────────────┐ │
//! │  │  CdpDriver             │   │  FakeStorefront            │ │
//! │  │  (feature "browser")   │   │  (always available)        │ │
//! │  │  Chromium over CDP via │   │  In-memory model of the    │ │
//! │  │  chromiumoxide         │   │  storefront for tests      │ │
//! │  └────────────────────────┘   └────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Element references
//!
//! An [`ElementRef`] is not a live handle. It is the path of
//! `(locator, index)` steps that found the element, plus the snapshot token
//! of the document it was found in. Drivers re-resolve the path on every
//! call and refuse to do so once the token has changed, so a reference can
//! never outlive a navigation or an in-place reorder of the catalog.

use crate::locator::Locator;
use crate::result::E2eResult;
use async_trait::async_trait;
use std::fmt;

/// One resolution step: the `index`-th match of `locator` inside the previous step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathStep {
    /// Locator evaluated in the scope of the previous step
    pub locator: Locator,
    /// Zero-based match index
    pub index: usize,
}

/// Re-resolvable reference to an element of one document snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    /// Snapshot token of the document the path was resolved in
    pub token: String,
    /// Steps from the document root
    pub path: Vec<PathStep>,
}

impl ElementRef {
    /// Reference to the `index`-th document-level match of `locator`
    #[must_use]
    pub fn root(token: impl Into<String>, locator: Locator, index: usize) -> Self {
        Self {
            token: token.into(),
            path: vec![PathStep { locator, index }],
        }
    }

    /// Reference to the `index`-th match of `locator` inside this element
    #[must_use]
    pub fn child(&self, locator: Locator, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(PathStep { locator, index });
        Self {
            token: self.token.clone(),
            path,
        }
    }

    /// Locator of the last step
    #[must_use]
    pub fn locator(&self) -> Option<Locator> {
        self.path.last().map(|step| step.locator)
    }

    /// Last-step locator rendered for error messages
    #[must_use]
    pub fn describe(&self) -> String {
        self.locator()
            .map_or_else(|| "<document>".to_string(), |locator| locator.to_string())
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<String> = self
            .path
            .iter()
            .map(|step| format!("{}[{}]", step.locator, step.index))
            .collect();
        write!(f, "{} @ {}", steps.join(" > "), self.token)
    }
}

/// Rendering state of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementState {
    /// Rendered with a non-empty box and not hidden by style
    pub displayed: bool,
    /// Not disabled
    pub enabled: bool,
}

impl ElementState {
    /// Visible and enabled
    #[must_use]
    pub const fn is_interactable(&self) -> bool {
        self.displayed && self.enabled
    }
}

/// Abstract driver trait for browser automation
///
/// Every operation taking an [`ElementRef`] fails with
/// `E2eError::StaleElement` when the reference's token no longer matches the
/// live document, and with `E2eError::ElementMissing` when a path step no
/// longer resolves.
#[async_trait]
pub trait Driver: Send + Sync + fmt::Debug {
    /// Navigate to URL and wait for the document to load
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Current URL
    async fn current_url(&self) -> E2eResult<String>;

    /// Token of the currently rendered document
    async fn snapshot_token(&self) -> E2eResult<String>;

    /// All matches of `locator`, inside `scope` when given (no waiting)
    async fn find_all(
        &self,
        scope: Option<&ElementRef>,
        locator: Locator,
    ) -> E2eResult<Vec<ElementRef>>;

    /// Displayed/enabled state
    async fn state(&self, element: &ElementRef) -> E2eResult<ElementState>;

    /// Rendered text, trimmed
    async fn text(&self, element: &ElementRef) -> E2eResult<String>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&self, element: &ElementRef, name: &str) -> E2eResult<Option<String>>;

    /// Click a displayed element
    async fn click(&self, element: &ElementRef) -> E2eResult<()>;

    /// Replace the value of a text input
    async fn fill(&self, element: &ElementRef, text: &str) -> E2eResult<()>;

    /// Choose an option of a `<select>` by its value
    async fn select_option(&self, element: &ElementRef, value: &str) -> E2eResult<()>;

    /// Current value of an input or select
    async fn input_value(&self, element: &ElementRef) -> E2eResult<String>;

    /// Go back one history entry
    async fn go_back(&self) -> E2eResult<()>;

    /// Close the browser session
    async fn close(&self) -> E2eResult<()>;
}
