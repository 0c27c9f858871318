//! Page objects for the Sauce Labs demo storefront.
//!
//! Pages are stateless: selectors are associated functions and every
//! interaction takes the [`Actions`] it should run through.

use crate::actions::Actions;
use crate::clock::Clock;
use crate::data::Credentials;
use crate::locator::Selector;
use crate::ordering::parse_price;
use crate::page_object::{PageObject, PageRegistry};
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;
use crate::wait::PollOutcome;
use std::fmt;
use tracing::{error, info};
use uuid::Uuid;

fn marker_present<S: BrowserSession + ?Sized>(session: &S, marker: &Selector) -> ProbeResult<bool> {
    match session.find_elements(marker)?.first() {
        Some(handle) => session.is_displayed(handle),
        None => Ok(false),
    }
}

fn texts<S, C>(actions: &Actions<'_, S, C>, selector: &Selector) -> ProbeResult<Vec<String>>
where
    S: BrowserSession + ?Sized,
    C: Clock,
{
    let handles = actions.waits().wait_all_visible(selector)?;
    handles
        .iter()
        .map(|h| actions.waits().session().element_text(h))
        .collect()
}

fn prices<S, C>(actions: &Actions<'_, S, C>, selector: &Selector) -> ProbeResult<Vec<f64>>
where
    S: BrowserSession + ?Sized,
    C: Clock,
{
    Ok(texts(actions, selector)?
        .into_iter()
        .filter_map(|text| {
            let price = parse_price(&text);
            if price.is_none() {
                error!(text = %text, "could not parse price");
            }
            price
        })
        .collect())
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// Pages reachable in the checkout flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorefrontPage {
    /// Login form
    Login,
    /// Inventory listing
    Products,
    /// Shopping cart
    Cart,
    /// Checkout step one
    Checkout,
    /// Checkout step two
    Overview,
    /// Order confirmation
    Complete,
}

impl StorefrontPage {
    /// Every page, in flow order
    pub const ALL: [Self; 6] = [
        Self::Login,
        Self::Products,
        Self::Cart,
        Self::Checkout,
        Self::Overview,
        Self::Complete,
    ];

    /// Parse a page name as written in scenarios (case-insensitive)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|page| page.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Lowercase name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Products => "products",
            Self::Cart => "cart",
            Self::Checkout => "checkout",
            Self::Overview => "overview",
            Self::Complete => "complete",
        }
    }

    /// Heading shown in the `title` element; the login page has none
    #[must_use]
    pub const fn heading(self) -> Option<&'static str> {
        match self {
            Self::Login => None,
            Self::Products => Some("Products"),
            Self::Cart => Some("Your Cart"),
            Self::Checkout => Some("Checkout: Your Information"),
            Self::Overview => Some("Checkout: Overview"),
            Self::Complete => Some("Checkout: Complete!"),
        }
    }

    /// URL path of the page
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Products => "/inventory.html",
            Self::Cart => "/cart.html",
            Self::Checkout => "/checkout-step-one.html",
            Self::Overview => "/checkout-step-two.html",
            Self::Complete => "/checkout-complete.html",
        }
    }
}

impl fmt::Display for StorefrontPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Assert the browser shows `page`.
///
/// The login page is recognised by its visible username box; every other
/// page by its heading, compared case-insensitively and polled until the
/// wait timeout.
pub fn assert_on_page<S, C>(actions: &Actions<'_, S, C>, page: StorefrontPage) -> ProbeResult<()>
where
    S: BrowserSession + ?Sized,
    C: Clock,
{
    let waits = actions.waits();
    waits.wait_document_ready()?;
    let Some(expected) = page.heading() else {
        return LoginPage::assert_displayed(actions);
    };
    let title = LoginPage::title();
    let spec = waits.spec(format!("page heading '{expected}'"));
    let matched = waits.poller().poll_until_or_else(
        waits.session(),
        &spec,
        |s: &S| {
            PollOutcome::from_attempt(s.find_element(&title).and_then(|h| {
                let text = s.element_text(&h)?;
                Ok(if text.trim().eq_ignore_ascii_case(expected) {
                    PollOutcome::Satisfied(true)
                } else {
                    PollOutcome::pending_because(format!("heading is '{text}'"))
                })
            }))
        },
        |_| Ok(false),
    )?;
    if matched {
        info!(page = %page, "on expected page");
        Ok(())
    } else {
        Err(ProbeError::assertion(format!("expected to be on the {page} page")))
    }
}

/// Register every storefront page under its lowercase name
#[must_use]
pub fn storefront_registry() -> PageRegistry {
    let mut registry = PageRegistry::new();
    registry.register(StorefrontPage::Login.name(), LoginPage);
    registry.register(StorefrontPage::Products.name(), ProductsPage);
    registry.register(StorefrontPage::Cart.name(), CartPage);
    registry.register(StorefrontPage::Checkout.name(), CheckoutPage);
    registry.register(StorefrontPage::Overview.name(), OverviewPage);
    registry.register(StorefrontPage::Complete.name(), CompletePage);
    registry
}

// =============================================================================
// LOGIN
// =============================================================================

/// Login form, plus the burger menu and heading shared by logged-in pages
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginPage;

impl LoginPage {
    /// Username box
    #[must_use]
    pub fn username() -> Selector {
        Selector::id("user-name")
    }

    /// Password box
    #[must_use]
    pub fn password() -> Selector {
        Selector::id("password")
    }

    /// Login button
    #[must_use]
    pub fn login_button() -> Selector {
        Selector::id("login-button")
    }

    /// Error banner
    #[must_use]
    pub fn error_message() -> Selector {
        Selector::tag_name("h3")
    }

    /// Page heading
    #[must_use]
    pub fn title() -> Selector {
        Selector::class_name("title")
    }

    /// Burger menu button
    #[must_use]
    pub fn menu_button() -> Selector {
        Selector::id("react-burger-menu-btn")
    }

    /// Logout entry in the side bar
    #[must_use]
    pub fn logout_link() -> Selector {
        Selector::id("logout_sidebar_link")
    }

    /// Type into the username box
    pub fn set_username<S, C>(actions: &Actions<'_, S, C>, name: &str) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        info!(user = name, "setting username");
        actions.set_text(Self::username(), name).map(drop)
    }

    /// Type into the password box
    pub fn set_password<S, C>(actions: &Actions<'_, S, C>, password: &str) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.set_text(Self::password(), password).map(drop)
    }

    /// Submit the form
    pub fn click_login<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.click(Self::login_button())
    }

    /// Open the side bar
    pub fn open_menu<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.click(Self::menu_button())
    }

    /// Click logout in the side bar; the bar must already be open
    pub fn click_logout<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.click(Self::logout_link())
    }

    /// Fill in and submit the form once the page is ready
    pub fn login<S, C>(actions: &Actions<'_, S, C>, credentials: &Credentials) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.waits().wait_document_ready()?;
        Self::assert_displayed(actions)?;
        Self::set_username(actions, &credentials.name)?;
        Self::set_password(actions, &credentials.password)?;
        Self::click_login(actions)?;
        actions.waits().wait_document_ready()
    }

    /// Assert the username box is visible
    pub fn assert_displayed<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        if actions.waits().is_visible(Self::username())? {
            Ok(())
        } else {
            Err(ProbeError::assertion("login page is not displayed"))
        }
    }

    /// Assert the error banner reads exactly `expected`
    pub fn assert_error_message<S, C>(actions: &Actions<'_, S, C>, expected: &str) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        let shown = actions.text(Self::error_message())?;
        if shown == expected {
            Ok(())
        } else {
            Err(ProbeError::assertion(format!(
                "expected error '{expected}', found '{shown}'"
            )))
        }
    }
}

impl PageObject for LoginPage {
    fn url_pattern(&self) -> &str {
        StorefrontPage::Login.path()
    }

    fn is_loaded<S: BrowserSession + ?Sized>(&self, session: &S) -> ProbeResult<bool> {
        marker_present(session, &Self::username())
    }

    fn page_name(&self) -> &str {
        "login"
    }
}

// =============================================================================
// PRODUCTS
// =============================================================================

/// Products that scenarios add to the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    /// Sauce Labs Fleece Jacket
    FleeceJacket,
    /// Sauce Labs Backpack
    Backpack,
}

impl Product {
    /// Parse a short product name (case-insensitive)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "fleece jacket" => Some(Self::FleeceJacket),
            "backpack" => Some(Self::Backpack),
            _ => None,
        }
    }

    /// Name shown in listings
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::FleeceJacket => "Sauce Labs Fleece Jacket",
            Self::Backpack => "Sauce Labs Backpack",
        }
    }

    /// "Add to cart" button on the inventory page
    #[must_use]
    pub fn add_button(self) -> Selector {
        match self {
            Self::FleeceJacket => Selector::id("add-to-cart-sauce-labs-fleece-jacket"),
            Self::Backpack => Selector::id("add-to-cart-sauce-labs-backpack"),
        }
    }
}

/// Inventory listing
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductsPage;

impl ProductsPage {
    /// Listing container
    #[must_use]
    pub fn container() -> Selector {
        Selector::id("inventory_container")
    }

    /// Cart icon in the header
    #[must_use]
    pub fn cart_icon() -> Selector {
        Selector::xpath("//a[@class='shopping_cart_link']")
    }

    /// Sort dropdown
    #[must_use]
    pub fn sort_dropdown() -> Selector {
        Selector::xpath("//select[@class='product_sort_container']")
    }

    /// Price labels
    #[must_use]
    pub fn prices() -> Selector {
        Selector::class_name("inventory_item_price")
    }

    /// Product names
    #[must_use]
    pub fn names() -> Selector {
        Selector::xpath("//div[@class='inventory_item_name ']")
    }

    /// Click the product's "Add to cart" button
    pub fn add_to_cart<S, C>(actions: &Actions<'_, S, C>, product: Product) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        info!(product = product.display_name(), "adding to cart");
        actions.click(product.add_button())
    }

    /// Open the cart
    pub fn open_cart<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.click(Self::cart_icon())
    }

    /// Pick a sort order by its visible label
    pub fn sort_by<S, C>(actions: &Actions<'_, S, C>, label: &str) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.select_by_text(Self::sort_dropdown(), label)
    }

    /// Listed prices in page order; unparsable labels are logged and skipped
    pub fn listed_prices<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<Vec<f64>>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        prices(actions, &Self::prices())
    }

    /// Listed product names in page order
    pub fn listed_names<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<Vec<String>>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        texts(actions, &Self::names())
    }
}

impl PageObject for ProductsPage {
    fn url_pattern(&self) -> &str {
        StorefrontPage::Products.path()
    }

    fn is_loaded<S: BrowserSession + ?Sized>(&self, session: &S) -> ProbeResult<bool> {
        marker_present(session, &Self::container())
    }

    fn page_name(&self) -> &str {
        "products"
    }
}

// =============================================================================
// CART
// =============================================================================

/// Shopping cart
#[derive(Debug, Clone, Copy, Default)]
pub struct CartPage;

impl CartPage {
    /// Checkout button
    #[must_use]
    pub fn checkout_button() -> Selector {
        Selector::id("checkout")
    }

    /// Continue shopping button
    #[must_use]
    pub fn continue_shopping_button() -> Selector {
        Selector::id("continue-shopping")
    }

    /// Names of items in the cart
    #[must_use]
    pub fn item_names() -> Selector {
        Selector::class_name("inventory_item_name")
    }

    /// Go to checkout
    pub fn checkout<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.click(Self::checkout_button())
    }

    /// Back to the listing
    pub fn continue_shopping<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.click(Self::continue_shopping_button())
    }

    /// Assert some cart line names `product` (case-insensitive substring)
    pub fn assert_contains<S, C>(actions: &Actions<'_, S, C>, product: &str) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        let wanted = product.to_lowercase();
        let names = texts(actions, &Self::item_names())?;
        if names.iter().any(|n| n.to_lowercase().contains(&wanted)) {
            Ok(())
        } else {
            Err(ProbeError::assertion(format!(
                "'{product}' not in cart (found {names:?})"
            )))
        }
    }
}

impl PageObject for CartPage {
    fn url_pattern(&self) -> &str {
        StorefrontPage::Cart.path()
    }

    fn is_loaded<S: BrowserSession + ?Sized>(&self, session: &S) -> ProbeResult<bool> {
        marker_present(session, &Self::checkout_button())
    }

    fn page_name(&self) -> &str {
        "cart"
    }
}

// =============================================================================
// CHECKOUT
// =============================================================================

fn random_from(alphabet: &[u8], len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        for byte in Uuid::new_v4().as_bytes() {
            if out.len() == len {
                break;
            }
            out.push(char::from(alphabet[usize::from(*byte) % alphabet.len()]));
        }
    }
    out
}

/// Shipping details typed on checkout step one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutInfo {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Postal code
    pub postal_code: String,
}

impl CheckoutInfo {
    /// Six random letters for each name and nine random digits for the code
    #[must_use]
    pub fn random() -> Self {
        const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
        Self {
            first_name: random_from(LETTERS, 6),
            last_name: random_from(LETTERS, 6),
            postal_code: random_from(b"0123456789", 9),
        }
    }
}

/// Checkout step one
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutPage;

impl CheckoutPage {
    /// First name box
    #[must_use]
    pub fn first_name() -> Selector {
        Selector::id("first-name")
    }

    /// Last name box
    #[must_use]
    pub fn last_name() -> Selector {
        Selector::id("last-name")
    }

    /// Postal code box
    #[must_use]
    pub fn postal_code() -> Selector {
        Selector::id("postal-code")
    }

    /// Continue button
    #[must_use]
    pub fn continue_button() -> Selector {
        Selector::id("continue")
    }

    /// Cancel button
    #[must_use]
    pub fn cancel_button() -> Selector {
        Selector::id("cancel")
    }

    /// Type `info` into the form
    pub fn fill_in<S, C>(actions: &Actions<'_, S, C>, info: &CheckoutInfo) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        info!(first = %info.first_name, last = %info.last_name, "filling checkout form");
        let _ = actions.set_text(Self::first_name(), &info.first_name)?;
        let _ = actions.set_text(Self::last_name(), &info.last_name)?;
        let _ = actions.set_text(Self::postal_code(), &info.postal_code)?;
        Ok(())
    }

    /// Fill the form with random details and return them
    pub fn fill_in_random<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<CheckoutInfo>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        let info = CheckoutInfo::random();
        Self::fill_in(actions, &info)?;
        Ok(info)
    }

    /// Continue to the overview
    pub fn click_continue<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.click(Self::continue_button())
    }

    /// Back to the cart
    pub fn click_cancel<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.click(Self::cancel_button())
    }
}

impl PageObject for CheckoutPage {
    fn url_pattern(&self) -> &str {
        StorefrontPage::Checkout.path()
    }

    fn is_loaded<S: BrowserSession + ?Sized>(&self, session: &S) -> ProbeResult<bool> {
        marker_present(session, &Self::first_name())
    }

    fn page_name(&self) -> &str {
        "checkout"
    }
}

// =============================================================================
// OVERVIEW
// =============================================================================

/// Checkout step two
#[derive(Debug, Clone, Copy, Default)]
pub struct OverviewPage;

impl OverviewPage {
    /// Finish button
    #[must_use]
    pub fn finish_button() -> Selector {
        Selector::id("finish")
    }

    /// "Item total: $x" label
    #[must_use]
    pub fn subtotal() -> Selector {
        Selector::class_name("summary_subtotal_label")
    }

    /// Per-item price labels
    #[must_use]
    pub fn item_prices() -> Selector {
        Selector::class_name("inventory_item_price")
    }

    /// Place the order
    pub fn click_finish<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        actions.click(Self::finish_button())
    }

    /// Assert the current URL contains `expected`
    pub fn assert_url<S, C>(actions: &Actions<'_, S, C>, expected: &str) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        if actions.waits().is_url_containing(expected)? {
            Ok(())
        } else {
            let actual = actions.waits().session().current_url()?;
            Err(ProbeError::assertion(format!(
                "URL '{actual}' does not match '{expected}'"
            )))
        }
    }

    /// Assert the item total equals the sum of the listed item prices
    pub fn assert_total_matches_items<S, C>(actions: &Actions<'_, S, C>) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        let items: f64 = prices(actions, &Self::item_prices())?.iter().sum();
        let label = actions.text(Self::subtotal())?;
        let total = label
            .rsplit(':')
            .next()
            .and_then(parse_price)
            .ok_or_else(|| ProbeError::data(format!("unreadable item total '{label}'")))?;
        if (total - items).abs() < 0.005 {
            Ok(())
        } else {
            Err(ProbeError::assertion(format!(
                "item total {total:.2} differs from sum of items {items:.2}"
            )))
        }
    }
}

impl PageObject for OverviewPage {
    fn url_pattern(&self) -> &str {
        StorefrontPage::Overview.path()
    }

    fn is_loaded<S: BrowserSession + ?Sized>(&self, session: &S) -> ProbeResult<bool> {
        marker_present(session, &Self::finish_button())
    }

    fn page_name(&self) -> &str {
        "overview"
    }
}

// =============================================================================
// COMPLETE
// =============================================================================

/// Order confirmation
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletePage;

impl CompletePage {
    /// Confirmation block
    #[must_use]
    pub fn message_container() -> Selector {
        Selector::id("checkout_complete_container")
    }

    /// Assert the confirmation block contains `message`
    pub fn assert_message<S, C>(actions: &Actions<'_, S, C>, message: &str) -> ProbeResult<()>
    where
        S: BrowserSession + ?Sized,
        C: Clock,
    {
        let shown = actions.text(Self::message_container())?;
        if shown.contains(message) {
            Ok(())
        } else {
            Err(ProbeError::assertion(format!(
                "'{message}' not shown in confirmation '{shown}'"
            )))
        }
    }
}

impl PageObject for CompletePage {
    fn url_pattern(&self) -> &str {
        StorefrontPage::Complete.path()
    }

    fn is_loaded<S: BrowserSession + ?Sized>(&self, session: &S) -> ProbeResult<bool> {
        marker_present(session, &Self::message_container())
    }

    fn page_name(&self) -> &str {
        "complete"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::mock::MockSession;
    use crate::result::ErrorKind;
    use crate::wait::ConditionPoller;
    use crate::waits::Waits;
    use std::time::Duration;

    fn actions(session: &MockSession) -> Actions<'_, MockSession, ManualClock> {
        Actions::with_waits(
            Waits::with_poller(session, ConditionPoller::with_clock(ManualClock::new()))
                .with_timeout(Duration::from_secs(1))
                .with_poll_interval(Duration::from_millis(100)),
        )
    }

    fn heading(session: &MockSession, text: &str) {
        let h = session.add_element(LoginPage::title());
        session.set_text(&h, text);
    }

    mod navigation_tests {
        use super::*;

        #[test]
        fn test_page_names() {
            assert_eq!(StorefrontPage::from_name("Cart"), Some(StorefrontPage::Cart));
            assert_eq!(StorefrontPage::from_name(" overview "), Some(StorefrontPage::Overview));
            assert_eq!(StorefrontPage::from_name("admin"), None);
            assert_eq!(StorefrontPage::Complete.to_string(), "complete");
        }

        #[test]
        fn test_heading_is_case_insensitive() {
            let session = MockSession::new();
            heading(&session, "YOUR CART");
            assert_on_page(&actions(&session), StorefrontPage::Cart).unwrap();
        }

        #[test]
        fn test_heading_polled_until_it_changes() {
            let session = MockSession::new();
            let h = session.add_element(LoginPage::title());
            session.set_text_sequence(&h, &["Your Cart", "Your Cart", "Checkout: Your Information"]);
            assert_on_page(&actions(&session), StorefrontPage::Checkout).unwrap();
        }

        #[test]
        fn test_wrong_heading_is_assertion() {
            let session = MockSession::new();
            heading(&session, "Products");
            let err = assert_on_page(&actions(&session), StorefrontPage::Overview).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Assertion);
        }

        #[test]
        fn test_login_page_detected_by_username_box() {
            let session = MockSession::new();
            let _ = session.add_element(LoginPage::username());
            assert_on_page(&actions(&session), StorefrontPage::Login).unwrap();

            let empty = MockSession::new();
            let err = assert_on_page(&actions(&empty), StorefrontPage::Login).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Assertion);
        }

        #[test]
        fn test_registry_maps_urls() {
            let registry = storefront_registry();
            assert_eq!(registry.count(), 6);
            let (name, page) = registry
                .page_for_url("https://www.saucedemo.com/checkout-step-two.html")
                .unwrap();
            assert_eq!(name, "overview");
            assert_eq!(page.page_name(), "overview");
            assert_eq!(registry.page_for_url("https://www.saucedemo.com/").unwrap().0, "login");
        }
    }

    mod login_tests {
        use super::*;

        #[test]
        fn test_login_fills_form_and_submits() {
            let session = MockSession::new();
            let user = session.add_element(LoginPage::username());
            let pass = session.add_element(LoginPage::password());
            let button = session.add_element(LoginPage::login_button());
            let creds = Credentials {
                name: "standard_user".to_string(),
                password: "secret_sauce".to_string(),
            };
            LoginPage::login(&actions(&session), &creds).unwrap();
            assert_eq!(session.attribute(&user, "value").as_deref(), Some("standard_user"));
            assert_eq!(session.attribute(&pass, "value").as_deref(), Some("secret_sauce"));
            assert_eq!(session.clicks(), vec![button]);
        }

        #[test]
        fn test_error_message_exact() {
            let session = MockSession::new();
            let h3 = session.add_element(LoginPage::error_message());
            session.set_text(&h3, "Epic sadface: Sorry, this user has been locked out.");
            let a = actions(&session);
            LoginPage::assert_error_message(&a, "Epic sadface: Sorry, this user has been locked out.")
                .unwrap();
            let err = LoginPage::assert_error_message(&a, "Epic sadface").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Assertion);
        }

        #[test]
        fn test_logout_flow() {
            let session = MockSession::new();
            let menu = session.add_element(LoginPage::menu_button());
            let logout = session.add_element(LoginPage::logout_link());
            session.set_displayed_sequence(&logout, &[false, true]);
            let a = actions(&session);
            LoginPage::open_menu(&a).unwrap();
            LoginPage::click_logout(&a).unwrap();
            assert_eq!(session.clicks(), vec![menu, logout]);
        }
    }

    mod products_tests {
        use super::*;

        #[test]
        fn test_product_names() {
            assert_eq!(Product::from_name("Fleece Jacket"), Some(Product::FleeceJacket));
            assert_eq!(Product::from_name("BACKPACK"), Some(Product::Backpack));
            assert_eq!(Product::from_name("onesie"), None);
        }

        #[test]
        fn test_add_to_cart() {
            let session = MockSession::new();
            let button = session.add_element(Product::Backpack.add_button());
            ProductsPage::add_to_cart(&actions(&session), Product::Backpack).unwrap();
            assert_eq!(session.clicks(), vec![button]);
        }

        #[test]
        fn test_listed_prices_skip_garbage() {
            let session = MockSession::new();
            for text in ["$49.99", "n/a", "$7.99"] {
                let h = session.add_element(ProductsPage::prices());
                session.set_text(&h, text);
            }
            let prices = ProductsPage::listed_prices(&actions(&session)).unwrap();
            assert_eq!(prices, vec![49.99, 7.99]);
        }

        #[test]
        fn test_sort_by_label() {
            let session = MockSession::new();
            let select = session.add_element(ProductsPage::sort_dropdown());
            let _ = session.add_option(&select, "Name (A to Z)", "az");
            let low = session.add_option(&select, "Price (low to high)", "lohi");
            ProductsPage::sort_by(&actions(&session), "Price (low to high)").unwrap();
            assert!(session.selected(&low));
        }

        #[test]
        fn test_listed_names() {
            let session = MockSession::new();
            for text in ["Sauce Labs Backpack", "Sauce Labs Onesie"] {
                let h = session.add_element(ProductsPage::names());
                session.set_text(&h, text);
            }
            assert_eq!(
                ProductsPage::listed_names(&actions(&session)).unwrap(),
                vec!["Sauce Labs Backpack", "Sauce Labs Onesie"]
            );
        }
    }

    mod cart_tests {
        use super::*;

        #[test]
        fn test_assert_contains() {
            let session = MockSession::new();
            let h = session.add_element(CartPage::item_names());
            session.set_text(&h, "Sauce Labs Fleece Jacket");
            let a = actions(&session);
            CartPage::assert_contains(&a, "fleece jacket").unwrap();
            let err = CartPage::assert_contains(&a, "backpack").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Assertion);
        }
    }

    mod checkout_tests {
        use super::*;

        #[test]
        fn test_random_info_shape() {
            let info = CheckoutInfo::random();
            assert_eq!(info.first_name.len(), 6);
            assert!(info.first_name.chars().all(|c| c.is_ascii_alphabetic()));
            assert_eq!(info.last_name.len(), 6);
            assert_eq!(info.postal_code.len(), 9);
            assert!(info.postal_code.chars().all(|c| c.is_ascii_digit()));
        }

        #[test]
        fn test_fill_in_random() {
            let session = MockSession::new();
            let first = session.add_element(CheckoutPage::first_name());
            let _ = session.add_element(CheckoutPage::last_name());
            let postal = session.add_element(CheckoutPage::postal_code());
            let info = CheckoutPage::fill_in_random(&actions(&session)).unwrap();
            assert_eq!(session.attribute(&first, "value"), Some(info.first_name));
            assert_eq!(session.attribute(&postal, "value"), Some(info.postal_code));
        }
    }

    mod overview_tests {
        use super::*;

        fn overview(session: &MockSession, items: &[&str], total: &str) {
            for text in items {
                let h = session.add_element(OverviewPage::item_prices());
                session.set_text(&h, text);
            }
            let label = session.add_element(OverviewPage::subtotal());
            session.set_text(&label, total);
        }

        #[test]
        fn test_total_matches() {
            let session = MockSession::new();
            overview(&session, &["$49.99", "$29.99"], "Item total: $79.98");
            OverviewPage::assert_total_matches_items(&actions(&session)).unwrap();
        }

        #[test]
        fn test_total_mismatch() {
            let session = MockSession::new();
            overview(&session, &["$49.99"], "Item total: $79.98");
            let err = OverviewPage::assert_total_matches_items(&actions(&session)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Assertion);
        }

        #[test]
        fn test_assert_url() {
            let session = MockSession::new();
            session.set_url("https://www.saucedemo.com/checkout-step-two.html");
            let a = actions(&session);
            OverviewPage::assert_url(&a, "checkout-step-two").unwrap();
            let err = OverviewPage::assert_url(&a, "cart.html").unwrap_err();
            assert!(err.to_string().contains("checkout-step-two.html"));
        }
    }

    mod complete_tests {
        use super::*;

        #[test]
        fn test_assert_message() {
            let session = MockSession::new();
            let h = session.add_element(CompletePage::message_container());
            session.set_text(&h, "Thank you for your order!\nYour order has been dispatched");
            let a = actions(&session);
            CompletePage::assert_message(&a, "Thank you for your order!").unwrap();
            assert!(CompletePage::assert_message(&a, "Order cancelled").is_err());
        }
    }
}
