//! Selectors and element references.
//!
//! A [`Selector`] describes how to find an element; an [`ElementRef`] is
//! either such a description or an already-resolved [`ElementHandle`]. Helpers
//! accept `impl Into<ElementRef>` and resolve it once at the start of each
//! operation.

use crate::result::ProbeResult;
use crate::session::{BrowserSession, ElementHandle};
use serde::{Deserialize, Serialize};

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Element id attribute
    Id(String),
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath expression
    XPath(String),
    /// Single class name
    ClassName(String),
    /// Tag name
    TagName(String),
    /// Name attribute
    Name(String),
    /// Exact anchor text
    LinkText(String),
}

impl Selector {
    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a class name selector
    #[must_use]
    pub fn class_name(name: impl Into<String>) -> Self {
        Self::ClassName(name.into())
    }

    /// Create a tag name selector
    #[must_use]
    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::TagName(tag.into())
    }

    /// Create a name attribute selector
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a link text selector
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// W3C WebDriver location strategy and value.
    ///
    /// Id, class and name selectors are rewritten to CSS, as the W3C protocol
    /// only knows css, xpath, tag name and link text.
    #[must_use]
    pub fn strategy(&self) -> (&'static str, String) {
        match self {
            Self::Id(id) => ("css selector", format!("[id=\"{}\"]", escape_css(id))),
            Self::Css(css) => ("css selector", css.clone()),
            Self::XPath(xpath) => ("xpath", xpath.clone()),
            Self::ClassName(class) => ("css selector", format!(".{}", escape_css(class))),
            Self::TagName(tag) => ("tag name", tag.clone()),
            Self::Name(name) => ("css selector", format!("[name=\"{}\"]", escape_css(name))),
            Self::LinkText(text) => ("link text", text.clone()),
        }
    }

    /// JavaScript expression returning the first match or null
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::XPath(s) => {
                format!("document.evaluate({s:?}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue")
            }
            Self::LinkText(t) => {
                format!("Array.from(document.querySelectorAll('a')).find(el => el.textContent.trim() === {t:?}) || null")
            }
            Self::TagName(tag) => format!("document.getElementsByTagName({tag:?})[0] || null"),
            _ => {
                let (_, css) = self.strategy();
                format!("document.querySelector({css:?})")
            }
        }
    }

    /// JavaScript expression returning the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        match self {
            Self::XPath(s) => {
                format!("document.evaluate({s:?}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength")
            }
            Self::LinkText(t) => {
                format!("Array.from(document.querySelectorAll('a')).filter(el => el.textContent.trim() === {t:?}).length")
            }
            Self::TagName(tag) => format!("document.getElementsByTagName({tag:?}).length"),
            _ => {
                let (_, css) = self.strategy();
                format!("document.querySelectorAll({css:?}).length")
            }
        }
    }
}

fn escape_css(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(v) => write!(f, "By.id: {v}"),
            Self::Css(v) => write!(f, "By.cssSelector: {v}"),
            Self::XPath(v) => write!(f, "By.xpath: {v}"),
            Self::ClassName(v) => write!(f, "By.className: {v}"),
            Self::TagName(v) => write!(f, "By.tagName: {v}"),
            Self::Name(v) => write!(f, "By.name: {v}"),
            Self::LinkText(v) => write!(f, "By.linkText: {v}"),
        }
    }
}

/// Either a selector to look up or an element already found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementRef {
    /// Resolve through the session on use
    ByLocator(Selector),
    /// Use as-is
    Resolved(ElementHandle),
}

impl ElementRef {
    /// Resolve to a handle, looking the selector up if needed
    pub fn resolve<S: BrowserSession + ?Sized>(&self, session: &S) -> ProbeResult<ElementHandle> {
        match self {
            Self::ByLocator(selector) => session.find_element(selector),
            Self::Resolved(handle) => Ok(handle.clone()),
        }
    }

    /// The selector, when this reference has one
    #[must_use]
    pub const fn selector(&self) -> Option<&Selector> {
        match self {
            Self::ByLocator(selector) => Some(selector),
            Self::Resolved(_) => None,
        }
    }
}

impl From<Selector> for ElementRef {
    fn from(selector: Selector) -> Self {
        Self::ByLocator(selector)
    }
}

impl From<&Selector> for ElementRef {
    fn from(selector: &Selector) -> Self {
        Self::ByLocator(selector.clone())
    }
}

impl From<ElementHandle> for ElementRef {
    fn from(handle: ElementHandle) -> Self {
        Self::Resolved(handle)
    }
}

impl From<&ElementHandle> for ElementRef {
    fn from(handle: &ElementHandle) -> Self {
        Self::Resolved(handle.clone())
    }
}

impl std::fmt::Display for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByLocator(selector) => write!(f, "{selector}"),
            Self::Resolved(handle) => write!(f, "element {}", handle.id),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::MockSession;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_strategy_rewrites_to_css() {
            assert_eq!(
                Selector::id("user-name").strategy(),
                ("css selector", "[id=\"user-name\"]".to_string())
            );
            assert_eq!(
                Selector::class_name("title").strategy(),
                ("css selector", ".title".to_string())
            );
            assert_eq!(
                Selector::xpath("//a[@class='shopping_cart_link']").strategy().0,
                "xpath"
            );
            assert_eq!(Selector::tag_name("h3").strategy().0, "tag name");
        }

        #[test]
        fn test_to_query() {
            assert_eq!(
                Selector::css("button.primary").to_query(),
                "document.querySelector(\"button.primary\")"
            );
            assert!(Selector::xpath("//h3").to_query().contains("FIRST_ORDERED_NODE_TYPE"));
        }

        #[test]
        fn test_to_count_query() {
            assert_eq!(
                Selector::class_name("inventory_item_price").to_count_query(),
                "document.querySelectorAll(\".inventory_item_price\").length"
            );
            assert!(Selector::xpath("//div").to_count_query().contains("snapshotLength"));
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::id("continue").to_string(), "By.id: continue");
        }

        #[test]
        fn test_quotes_escaped() {
            let (_, css) = Selector::name("a\"b").strategy();
            assert_eq!(css, "[name=\"a\\\"b\"]");
        }
    }

    mod element_ref_tests {
        use super::*;

        #[test]
        fn test_resolved_handle_skips_lookup() {
            let session = MockSession::new();
            let handle = ElementHandle::new("e-1");
            let resolved = ElementRef::from(&handle).resolve(&session).unwrap();
            assert_eq!(resolved, handle);
            assert_eq!(session.find_calls(), 0);
        }

        #[test]
        fn test_locator_is_looked_up() {
            let session = MockSession::new();
            let id = session.add_element(Selector::id("login-button"));
            let resolved = ElementRef::from(Selector::id("login-button"))
                .resolve(&session)
                .unwrap();
            assert_eq!(resolved, id);
            assert_eq!(session.find_calls(), 1);
        }

        #[test]
        fn test_selector_accessor() {
            let by = ElementRef::from(Selector::css("a"));
            assert!(by.selector().is_some());
            let resolved = ElementRef::from(ElementHandle::new("x"));
            assert!(resolved.selector().is_none());
        }
    }
}
