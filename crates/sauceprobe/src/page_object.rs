//! Page Object Model support.
//!
//! A page object knows which URLs it lives at and how to tell that it has
//! finished loading. [`PageRegistry`] maps a live URL back to the page that
//! owns it.

use crate::clock::Clock;
use crate::locator::Selector;
use crate::result::ProbeResult;
use crate::session::BrowserSession;
use crate::wait::{ConditionPoller, PollOutcome, WaitSpec};
use crate::waits::DEFAULT_IGNORED_KINDS;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::debug;

/// Default time a page gets to load
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 30_000;

/// A page (or component) of the application under test.
///
/// # Example
///
/// ```
/// use sauceprobe::{BrowserSession, PageObject, ProbeResult, Selector};
///
/// #[derive(Debug)]
/// struct InventoryPage;
///
/// impl PageObject for InventoryPage {
///     fn url_pattern(&self) -> &str {
///         "/inventory.html"
///     }
///
///     fn is_loaded<S: BrowserSession + ?Sized>(&self, session: &S) -> ProbeResult<bool> {
///         Ok(!session.find_elements(&Selector::id("inventory_container"))?.is_empty())
///     }
/// }
/// ```
pub trait PageObject {
    /// URL path pattern that matches this page (e.g. `/cart.html`, `/item/:id`)
    fn url_pattern(&self) -> &str;

    /// Whether the page is ready for interaction
    fn is_loaded<S: BrowserSession + ?Sized>(&self, _session: &S) -> ProbeResult<bool> {
        Ok(true)
    }

    /// Time the page gets to load, in milliseconds
    fn load_timeout_ms(&self) -> u64 {
        DEFAULT_LOAD_TIMEOUT_MS
    }

    /// Name used in logs
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Poll [`is_loaded`](Self::is_loaded) until it holds or the load
    /// timeout passes. Stale and missing elements are retried.
    fn wait_until_loaded<S, C>(&self, session: &S, poller: &ConditionPoller<C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        let spec = WaitSpec::new(Duration::from_millis(self.load_timeout_ms()))
            .ignoring_all(DEFAULT_IGNORED_KINDS)
            .describe(format!("{} loaded", self.page_name()));
        debug!(page = self.page_name(), "waiting for page load");
        poller.poll_until(session, &spec, |s: &S| {
            PollOutcome::from_check(self.is_loaded(s))
        })
    }
}

/// Builder for [`SimplePageObject`]
#[derive(Debug, Clone, Default)]
pub struct PageObjectBuilder {
    page: SimplePageObject,
}

impl PageObjectBuilder {
    /// Create a builder for a page at `/`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the URL pattern
    #[must_use]
    pub fn with_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.page.url_pattern = pattern.into();
        self
    }

    /// Name a selector
    #[must_use]
    pub fn with_locator(mut self, name: impl Into<String>, selector: Selector) -> Self {
        self.page.add_locator(name, selector);
        self
    }

    /// Element whose presence marks the page as loaded
    #[must_use]
    pub fn with_ready_selector(mut self, selector: Selector) -> Self {
        self.page.ready = Some(selector);
        self
    }

    /// Set the load timeout
    #[must_use]
    pub const fn with_load_timeout(mut self, timeout_ms: u64) -> Self {
        self.page.load_timeout_ms = timeout_ms;
        self
    }

    /// Finish building
    #[must_use]
    pub fn build(self) -> SimplePageObject {
        self.page
    }
}

/// Data-only page object: a URL pattern, named selectors and an optional
/// ready marker
#[derive(Debug, Clone)]
pub struct SimplePageObject {
    url_pattern: String,
    locators: HashMap<String, Selector>,
    ready: Option<Selector>,
    load_timeout_ms: u64,
}

impl Default for SimplePageObject {
    fn default() -> Self {
        Self::new("/")
    }
}

impl SimplePageObject {
    /// Create a page at `url_pattern`
    #[must_use]
    pub fn new(url_pattern: impl Into<String>) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            locators: HashMap::new(),
            ready: None,
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
        }
    }

    /// Selector registered under `name`
    #[must_use]
    pub fn locator(&self, name: &str) -> Option<&Selector> {
        self.locators.get(name)
    }

    /// Register a selector
    pub fn add_locator(&mut self, name: impl Into<String>, selector: Selector) {
        let _ = self.locators.insert(name.into(), selector);
    }

    /// Registered selector names, sorted
    #[must_use]
    pub fn locator_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.locators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PageObject for SimplePageObject {
    fn url_pattern(&self) -> &str {
        &self.url_pattern
    }

    fn is_loaded<S: BrowserSession + ?Sized>(&self, session: &S) -> ProbeResult<bool> {
        match &self.ready {
            Some(selector) => Ok(!session.find_elements(selector)?.is_empty()),
            None => Ok(true),
        }
    }

    fn load_timeout_ms(&self) -> u64 {
        self.load_timeout_ms
    }
}

/// Type-erased view of a page object, for registries
pub trait PageObjectInfo: std::fmt::Debug + Send + Sync {
    /// URL pattern
    fn url_pattern(&self) -> &str;

    /// Page name
    fn page_name(&self) -> &str;

    /// Load timeout in milliseconds
    fn load_timeout_ms(&self) -> u64;
}

impl<T: PageObject + std::fmt::Debug + Send + Sync + 'static> PageObjectInfo for T {
    fn url_pattern(&self) -> &str {
        PageObject::url_pattern(self)
    }

    fn page_name(&self) -> &str {
        PageObject::page_name(self)
    }

    fn load_timeout_ms(&self) -> u64 {
        PageObject::load_timeout_ms(self)
    }
}

/// Named page objects, looked up by name or by URL
#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: BTreeMap<String, (UrlMatcher, Box<dyn PageObjectInfo>)>,
}

impl PageRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page object under `name`
    pub fn register<T: PageObject + std::fmt::Debug + Send + Sync + 'static>(
        &mut self,
        name: impl Into<String>,
        page: T,
    ) {
        let matcher = UrlMatcher::new(PageObject::url_pattern(&page));
        let _ = self.pages.insert(name.into(), (matcher, Box::new(page)));
    }

    /// Page registered under `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn PageObjectInfo> {
        self.pages.get(name).map(|(_, page)| page.as_ref())
    }

    /// Registered names, sorted
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.pages.keys().map(String::as_str).collect()
    }

    /// Number of registered pages
    #[must_use]
    pub fn count(&self) -> usize {
        self.pages.len()
    }

    /// First page (by name) whose pattern matches the path of `url`
    #[must_use]
    pub fn page_for_url(&self, url: &str) -> Option<(&str, &dyn PageObjectInfo)> {
        self.pages
            .iter()
            .find(|(_, (matcher, _))| matcher.matches(url))
            .map(|(name, (_, page))| (name.as_str(), page.as_ref()))
    }
}

/// Matches URL paths against a page pattern
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone)]
enum UrlSegment {
    Literal(String),
    Wildcard,
    Parameter(String),
}

/// Path part of an absolute or relative URL, without query or fragment
#[must_use]
pub fn url_path(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| {
        rest.find('/').map_or("/", |i| &rest[i..])
    });
    let end = without_scheme
        .find(['?', '#'])
        .unwrap_or(without_scheme.len());
    &without_scheme[..end]
}

fn path_segments(url: &str) -> Vec<&str> {
    url_path(url).split('/').filter(|s| !s.is_empty()).collect()
}

impl UrlMatcher {
    /// Compile a pattern.
    ///
    /// Patterns support literal segments (`/cart.html`), wildcards
    /// (`/item/*`) and named parameters (`/item/:id`); each of the last two
    /// consumes exactly one segment.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = path_segments(pattern)
            .into_iter()
            .map(|s| match s {
                "*" => UrlSegment::Wildcard,
                _ => s.strip_prefix(':').map_or_else(
                    || UrlSegment::Literal(s.to_string()),
                    |name| UrlSegment::Parameter(name.to_string()),
                ),
            })
            .collect();
        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Whether the path of `url` matches
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let parts = path_segments(url);
        parts.len() == self.segments.len()
            && self.segments.iter().zip(&parts).all(|(segment, part)| match segment {
                UrlSegment::Literal(lit) => lit == part,
                UrlSegment::Wildcard | UrlSegment::Parameter(_) => true,
            })
    }

    /// Values of the named parameters in `url`
    #[must_use]
    pub fn extract_params(&self, url: &str) -> HashMap<String, String> {
        self.segments
            .iter()
            .zip(path_segments(url))
            .filter_map(|(segment, part)| match segment {
                UrlSegment::Parameter(name) => Some((name.clone(), part.to_string())),
                _ => None,
            })
            .collect()
    }

    /// The pattern as given
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::mock::MockSession;

    mod builder_tests {
        use super::*;

        #[test]
        fn test_builder() {
            let page = PageObjectBuilder::new()
                .with_url_pattern("/cart.html")
                .with_locator("checkout", Selector::id("checkout"))
                .with_locator("continue", Selector::id("continue-shopping"))
                .with_load_timeout(5000)
                .build();
            assert_eq!(PageObject::url_pattern(&page), "/cart.html");
            assert_eq!(PageObject::load_timeout_ms(&page), 5000);
            assert_eq!(page.locator("checkout"), Some(&Selector::id("checkout")));
            assert!(page.locator("finish").is_none());
            assert_eq!(page.locator_names(), vec!["checkout", "continue"]);
        }

        #[test]
        fn test_default_page() {
            let page = PageObjectBuilder::default().build();
            assert_eq!(PageObject::url_pattern(&page), "/");
            assert_eq!(PageObject::load_timeout_ms(&page), DEFAULT_LOAD_TIMEOUT_MS);
            assert!(PageObject::page_name(&page).contains("SimplePageObject"));
        }
    }

    mod load_tests {
        use super::*;

        #[test]
        fn test_loaded_without_marker() {
            let session = MockSession::new();
            assert!(SimplePageObject::new("/").is_loaded(&session).unwrap());
        }

        #[test]
        fn test_wait_until_loaded() {
            let session = MockSession::new();
            let marker = Selector::id("inventory_container");
            let _ = session.add_element(marker.clone());
            session.appear_after(&marker, 3);
            let page = PageObjectBuilder::new()
                .with_ready_selector(marker)
                .with_load_timeout(10_000)
                .build();
            let poller = ConditionPoller::with_clock(ManualClock::new());
            page.wait_until_loaded(&session, &poller).unwrap();
            assert_eq!(poller.clock().sleep_count(), 3);
        }

        #[test]
        fn test_wait_until_loaded_times_out() {
            let session = MockSession::new();
            let page = PageObjectBuilder::new()
                .with_ready_selector(Selector::id("never"))
                .with_load_timeout(1000)
                .build();
            let poller = ConditionPoller::with_clock(ManualClock::new());
            let err = page.wait_until_loaded(&session, &poller).unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("SimplePageObject loaded"));
        }

        #[test]
        fn test_lost_session_is_not_retried() {
            let session = MockSession::new();
            session.quit().unwrap();
            let page = PageObjectBuilder::new()
                .with_ready_selector(Selector::id("x"))
                .build();
            let poller = ConditionPoller::with_clock(ManualClock::new());
            let err = page.wait_until_loaded(&session, &poller).unwrap_err();
            assert!(!err.is_timeout());
            assert_eq!(poller.clock().sleep_count(), 0);
        }
    }

    mod registry_tests {
        use super::*;

        fn registry() -> PageRegistry {
            let mut registry = PageRegistry::new();
            registry.register("login", SimplePageObject::new("/"));
            registry.register("cart", SimplePageObject::new("/cart.html"));
            registry.register("item", SimplePageObject::new("/item/:id"));
            registry
        }

        #[test]
        fn test_register_and_get() {
            let registry = registry();
            assert_eq!(registry.count(), 3);
            assert_eq!(registry.list(), vec!["cart", "item", "login"]);
            assert_eq!(registry.get("cart").unwrap().url_pattern(), "/cart.html");
            assert!(registry.get("checkout").is_none());
        }

        #[test]
        fn test_page_for_url() {
            let registry = registry();
            let (name, _) = registry
                .page_for_url("https://www.saucedemo.com/cart.html?x=1")
                .unwrap();
            assert_eq!(name, "cart");
            assert_eq!(registry.page_for_url("https://www.saucedemo.com/").unwrap().0, "login");
            assert_eq!(registry.page_for_url("https://www.saucedemo.com").unwrap().0, "login");
            assert_eq!(registry.page_for_url("/item/4").unwrap().0, "item");
            assert!(registry.page_for_url("/inventory.html").is_none());
        }
    }

    mod url_matcher_tests {
        use super::*;

        #[test]
        fn test_url_path() {
            assert_eq!(url_path("https://www.saucedemo.com/inventory.html"), "/inventory.html");
            assert_eq!(url_path("https://www.saucedemo.com"), "/");
            assert_eq!(url_path("/cart.html#top"), "/cart.html");
            assert_eq!(url_path("http://h:8080/a/b?q=1"), "/a/b");
        }

        #[test]
        fn test_literal_match() {
            let matcher = UrlMatcher::new("/checkout-step-one.html");
            assert!(matcher.matches("https://www.saucedemo.com/checkout-step-one.html"));
            assert!(!matcher.matches("/checkout-step-two.html"));
            assert!(!matcher.matches("/checkout-step-one.html/extra"));
        }

        #[test]
        fn test_wildcard_and_parameter() {
            assert!(UrlMatcher::new("/item/*").matches("/item/4"));
            assert!(!UrlMatcher::new("/item/*").matches("/item"));
            let matcher = UrlMatcher::new("/item/:id/reviews/:review");
            let params = matcher.extract_params("/item/4/reviews/9");
            assert_eq!(params.get("id").map(String::as_str), Some("4"));
            assert_eq!(params.get("review").map(String::as_str), Some("9"));
            assert_eq!(matcher.pattern(), "/item/:id/reviews/:review");
        }
    }
}
