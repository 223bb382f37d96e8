//! Minimal element tree for the fake storefront.
//!
//! Nodes declare which page locators select them instead of carrying real
//! markup; locator matching is plain equality. Resolution walks an
//! [`ElementRef`] path step by step, keeping the ancestor chain so clicks
//! can bubble and visibility can inherit.

use crate::driver::{ElementRef, ElementState};
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};

/// What happens when a node (or a descendant) is clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    SubmitLogin,
    DismissError,
    OpenProduct(usize),
    AddToCart(usize),
    RemoveFromCart(usize),
    OpenCart,
    OpenMenu,
    Logout,
    BackToProducts,
    ContinueShopping,
    Checkout,
    ContinueCheckout,
    CancelInformation,
    CancelOverview,
    FinishCheckout,
    BackHome,
}

/// Form control a node is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    Username,
    Password,
    FirstName,
    LastName,
    PostalCode,
    SortSelect,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeNode {
    pub matches: Vec<Locator>,
    pub text: String,
    pub attributes: Vec<(&'static str, String)>,
    pub displayed: bool,
    pub enabled: bool,
    pub action: Option<Action>,
    pub control: Option<Control>,
    pub children: Vec<FakeNode>,
}

impl FakeNode {
    pub fn new(matches: &[Locator]) -> Self {
        Self {
            matches: matches.to_vec(),
            text: String::new(),
            attributes: Vec::new(),
            displayed: true,
            enabled: true,
            action: None,
            control: None,
            children: Vec::new(),
        }
    }

    /// Structural node no page locator selects
    pub fn container() -> Self {
        Self::new(&[])
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.displayed = !hidden;
        self
    }

    pub const fn action(mut self, action: Option<Action>) -> Self {
        self.action = action;
        self
    }

    pub const fn control(mut self, control: Control) -> Self {
        self.control = Some(control);
        self
    }

    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// `innerText`-like rendering: own text followed by descendants', trimmed
    pub fn inner_text(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join("\n").trim().to_string()
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        if !self.displayed {
            return;
        }
        if !self.text.is_empty() {
            parts.push(&self.text);
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }
}

/// Root-to-node chain of a resolved element
pub(crate) type Chain<'a> = Vec<&'a FakeNode>;

/// Every match of `locator` among `nodes` and their descendants, in document order
pub(crate) fn matches_in<'a>(nodes: &'a [FakeNode], locator: Locator) -> Vec<Chain<'a>> {
    let mut out = Vec::new();
    let mut chain = Vec::new();
    collect(nodes, locator, &mut chain, &mut out);
    out
}

fn collect<'a>(
    nodes: &'a [FakeNode],
    locator: Locator,
    chain: &mut Chain<'a>,
    out: &mut Vec<Chain<'a>>,
) {
    for node in nodes {
        chain.push(node);
        if node.matches.contains(&locator) {
            out.push(chain.clone());
        }
        collect(&node.children, locator, chain, out);
        chain.pop();
    }
}

/// Walk `element`'s path from the document root.
///
/// Token checks are the caller's job; this only reports missing steps.
pub(crate) fn resolve<'a>(roots: &'a [FakeNode], element: &ElementRef) -> E2eResult<Chain<'a>> {
    let mut chain: Chain<'a> = Vec::new();
    for step in &element.path {
        let scope: &'a [FakeNode] = chain.last().map_or(roots, |node| node.children.as_slice());
        let found = matches_in(scope, step.locator)
            .into_iter()
            .nth(step.index)
            .ok_or_else(|| E2eError::ElementMissing {
                locator: step.locator.to_string(),
            })?;
        chain.extend(found);
    }
    if chain.is_empty() {
        return Err(E2eError::ElementMissing {
            locator: element.describe(),
        });
    }
    Ok(chain)
}

/// Last node of a chain
pub(crate) fn target<'a>(chain: &Chain<'a>) -> &'a FakeNode {
    chain[chain.len() - 1]
}

/// Visibility inherits from every ancestor
pub(crate) fn state_of(chain: &Chain<'_>) -> ElementState {
    ElementState {
        displayed: chain.iter().all(|node| node.displayed),
        enabled: target(chain).enabled,
    }
}

/// Nearest action on the chain, bubbling from the target up
pub(crate) fn bubbled_action(chain: &Chain<'_>) -> Option<Action> {
    chain.iter().rev().find_map(|node| node.action)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: Locator = Locator::class("row");
    const NAME: Locator = Locator::class("name");
    const LINK: Locator = Locator::css("a");

    fn tree() -> Vec<FakeNode> {
        (0..3)
            .map(|i| {
                FakeNode::new(&[ROW]).child(
                    FakeNode::new(&[LINK])
                        .action(Some(Action::OpenProduct(i)))
                        .child(FakeNode::new(&[NAME]).text(format!("item {i}"))),
                )
            })
            .collect()
    }

    #[test]
    fn test_matches_in_document_order() {
        let roots = tree();
        let names = matches_in(&roots, NAME);
        assert_eq!(names.len(), 3);
        assert_eq!(target(&names[2]).text, "item 2");
        assert_eq!(names[0].len(), 3);
    }

    #[test]
    fn test_resolve_scoped_path() {
        let roots = tree();
        let element = ElementRef::root("t", ROW, 1).child(NAME, 0);
        let chain = resolve(&roots, &element).unwrap();
        assert_eq!(target(&chain).inner_text(), "item 1");
        assert_eq!(bubbled_action(&chain), Some(Action::OpenProduct(1)));
    }

    #[test]
    fn test_resolve_missing_step() {
        let roots = tree();
        let element = ElementRef::root("t", ROW, 7);
        let err = resolve(&roots, &element).unwrap_err();
        assert!(matches!(err, E2eError::ElementMissing { .. }));
    }

    #[test]
    fn test_hidden_ancestor_hides_descendants() {
        let roots = vec![FakeNode::new(&[ROW])
            .hidden(true)
            .child(FakeNode::new(&[NAME]).text("secret"))];
        let chain = resolve(&roots, &ElementRef::root("t", NAME, 0)).unwrap();
        assert!(!state_of(&chain).displayed);
        assert_eq!(roots[0].inner_text(), "");
    }

    #[test]
    fn test_inner_text_joins_descendants() {
        let node = FakeNode::container()
            .child(FakeNode::container().text("Epic sadface"))
            .child(FakeNode::container().text(" "));
        assert_eq!(node.inner_text(), "Epic sadface");
    }
}
