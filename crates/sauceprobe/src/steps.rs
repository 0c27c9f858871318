//! Step definitions keyed by Cucumber expressions.
//!
//! Supported parameter types: `{string}` (double or single quoted),
//! `{int}`, `{float}`, `{word}` and the anonymous `{}`. Everything else in an
//! expression is matched literally. Gherkin parsing is left to the caller:
//! feed [`StepRegistry::run`] one step line at a time.

use crate::actions::Actions;
use crate::clock::{Clock, SystemClock};
use crate::data::Credentials;
use crate::ordering::{
    is_ascending, is_descending, is_sorted_alphabetically, is_sorted_reverse_alphabetically,
};
use crate::pages::{
    assert_on_page, CartPage, CheckoutInfo, CheckoutPage, CompletePage, LoginPage, OverviewPage,
    Product, ProductsPage, StorefrontPage,
};
use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;
use regex::Regex;
use std::fmt;
use tracing::{debug, error, warn};

/// Gherkin keywords stripped from the front of a step line
pub const STEP_KEYWORDS: [&str; 6] = ["Given", "When", "Then", "And", "But", "*"];

/// Compile a Cucumber expression into an anchored regex with one capture
/// group per parameter (two for `{string}`, one per quote style)
pub fn compile_expression(expression: &str) -> ProbeResult<Regex> {
    let mut pattern = String::from("^");
    let mut rest = expression;
    while let Some(open) = rest.find('{') {
        pattern.push_str(&regex::escape(&rest[..open]));
        let close = rest[open..].find('}').ok_or_else(|| {
            ProbeError::invalid_argument(format!("unclosed parameter in '{expression}'"))
        })? + open;
        let group = match &rest[open + 1..close] {
            "string" => r#"(?:"([^"]*)"|'([^']*)')"#,
            "int" => r"(-?\d+)",
            "float" => r"(-?\d*\.?\d+)",
            "word" => r"(\S+)",
            "" => r"(.*)",
            other => {
                return Err(ProbeError::invalid_argument(format!(
                    "unknown parameter type {{{other}}} in '{expression}'"
                )))
            }
        };
        pattern.push_str(group);
        rest = &rest[close + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');
    Ok(Regex::new(&pattern)?)
}

/// Step text without its Gherkin keyword
#[must_use]
pub fn strip_keyword(line: &str) -> &str {
    let line = line.trim();
    STEP_KEYWORDS
        .iter()
        .find_map(|k| {
            line.strip_prefix(k)
                .filter(|rest| rest.starts_with(char::is_whitespace))
        })
        .map_or(line, str::trim_start)
}

type Handler<W> = Box<dyn Fn(&mut W, &[String]) -> ProbeResult<()>>;

/// One registered step
pub struct StepDefinition<W> {
    expression: String,
    regex: Regex,
    handler: Handler<W>,
}

impl<W> StepDefinition<W> {
    /// The expression as registered
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Arguments captured from `text`, or `None` when it does not match
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        self.regex.captures(text).map(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str().to_string())
                .collect()
        })
    }
}

impl<W> fmt::Debug for StepDefinition<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("expression", &self.expression)
            .finish_non_exhaustive()
    }
}

/// Step definitions for a world type `W`
pub struct StepRegistry<W> {
    steps: Vec<StepDefinition<W>>,
}

impl<W> Default for StepRegistry<W> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<W> fmt::Debug for StepRegistry<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.steps).finish()
    }
}

impl<W> StepRegistry<W> {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `expression`
    pub fn step<F>(&mut self, expression: &str, handler: F) -> ProbeResult<&mut Self>
    where
        F: Fn(&mut W, &[String]) -> ProbeResult<()> + 'static,
    {
        let regex = compile_expression(expression)?;
        self.steps.push(StepDefinition {
            expression: expression.to_string(),
            regex,
            handler: Box::new(handler),
        });
        Ok(self)
    }

    /// Number of registered steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Registered expressions in registration order
    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(StepDefinition::expression)
    }

    /// The single step matching `line` and its arguments
    pub fn find(&self, line: &str) -> ProbeResult<(&StepDefinition<W>, Vec<String>)> {
        let text = strip_keyword(line);
        let mut found = self
            .steps
            .iter()
            .filter_map(|step| step.captures(text).map(|args| (step, args)));
        let first = found
            .next()
            .ok_or_else(|| ProbeError::invalid_argument(format!("undefined step: {text}")))?;
        if let Some((other, _)) = found.next() {
            return Err(ProbeError::invalid_argument(format!(
                "ambiguous step '{text}': matches '{}' and '{}'",
                first.0.expression, other.expression
            )));
        }
        Ok(first)
    }

    /// Run the step matching `line` against `world`
    pub fn run(&self, world: &mut W, line: &str) -> ProbeResult<()> {
        let (step, args) = self.find(line)?;
        debug!(step = %step.expression, ?args, "running step");
        (step.handler)(world, &args)
    }
}

// =============================================================================
// STOREFRONT STEPS
// =============================================================================

/// State shared by the storefront steps of one scenario
#[derive(Debug)]
pub struct StorefrontWorld<'s, S: ?Sized, C = SystemClock> {
    /// Interactions with the browser
    pub actions: Actions<'s, S, C>,
    /// Credentials used by the "correct credentials" step
    pub credentials: Option<Credentials>,
    /// Details typed on the last checkout form
    pub checkout: Option<CheckoutInfo>,
}

impl<'s, S: BrowserSession + ?Sized, C: Clock> StorefrontWorld<'s, S, C> {
    /// World without credentials
    #[must_use]
    pub const fn new(actions: Actions<'s, S, C>) -> Self {
        Self {
            actions,
            credentials: None,
            checkout: None,
        }
    }

    /// Use `credentials` for the login step
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

fn arg(args: &[String], index: usize) -> &str {
    args.get(index).map_or("", String::as_str)
}

fn check(holds: bool, message: impl FnOnce() -> String) -> ProbeResult<()> {
    if holds {
        Ok(())
    } else {
        Err(ProbeError::assertion(message()))
    }
}

/// Register the storefront steps.
///
/// Unknown buttons, products and sort orders are logged and skipped rather
/// than failing the step.
pub fn storefront_steps<'s, S, C>() -> ProbeResult<StepRegistry<StorefrontWorld<'s, S, C>>>
where
    S: BrowserSession + ?Sized + 's,
    C: Clock + 's,
{
    let mut registry = StepRegistry::new();

    // Login page
    let _ = registry
        .step("user set the username: {string}", |w: &mut StorefrontWorld<'s, S, C>, a| {
            LoginPage::set_username(&w.actions, arg(a, 0))
        })?
        .step("user set the Password: {string}", |w, a| {
            LoginPage::set_password(&w.actions, arg(a, 0))
        })?
        .step("user click on {string} button", |w, a| {
            match arg(a, 0).to_lowercase().as_str() {
                "login" => LoginPage::click_login(&w.actions),
                "logout" => LoginPage::click_logout(&w.actions),
                "menu-icon" => LoginPage::open_menu(&w.actions),
                other => {
                    warn!(button = other, "unknown button");
                    Ok(())
                }
            }
        })?
        .step("user sets correct credentials for SauceLabs", |w, _| {
            let credentials = w
                .credentials
                .clone()
                .ok_or_else(|| ProbeError::config("no credentials loaded"))?;
            LoginPage::login(&w.actions, &credentials)
        })?
        .step("validate error message {string} is displayed", |w, a| {
            LoginPage::assert_error_message(&w.actions, arg(a, 0))
        })?;

    for expression in ["user is redirected to {string} page", "user should be on the {string} page"] {
        let _ = registry.step(expression, |w, a| {
            let name = arg(a, 0);
            match StorefrontPage::from_name(name) {
                Some(page) => assert_on_page(&w.actions, page),
                None => {
                    error!(page = name, "unknown page");
                    Ok(())
                }
            }
        })?;
    }

    // Products page
    for expression in ["user clicks on {string} icon", "user adds {string} to the cart"] {
        let _ = registry.step(expression, |w, a| {
            let name = arg(a, 0);
            if name.eq_ignore_ascii_case("cart") {
                return ProductsPage::open_cart(&w.actions);
            }
            match Product::from_name(name) {
                Some(product) => ProductsPage::add_to_cart(&w.actions, product),
                None => {
                    warn!(product = name, "unknown product");
                    Ok(())
                }
            }
        })?;
    }

    let _ = registry
        .step("user selects {string} from the sort dropdown", |w, a| {
            ProductsPage::sort_by(&w.actions, arg(a, 0))
        })?
        .step("the products should be sorted in {string} order by price", |w, a| {
            let order = arg(a, 0).to_lowercase();
            let sorted: fn(&[f64]) -> bool = match order.as_str() {
                "descending" => is_descending,
                "ascending" => is_ascending,
                _ => {
                    warn!(order = %order, "not a price sort order");
                    return Ok(());
                }
            };
            let prices = ProductsPage::listed_prices(&w.actions)?;
            check(sorted(&prices), || {
                format!("prices {prices:?} are not in {order} order")
            })
        })?
        .step("the products should be sorted in {string} order by name", |w, a| {
            let order = arg(a, 0).to_lowercase();
            let sorted: fn(&[String]) -> bool = match order.as_str() {
                "alphabetical" => is_sorted_alphabetically,
                "reverse alphabetical" => is_sorted_reverse_alphabetically,
                _ => {
                    warn!(order = %order, "not a name sort order");
                    return Ok(());
                }
            };
            let names = ProductsPage::listed_names(&w.actions)?;
            check(sorted(&names), || {
                format!("names {names:?} are not in {order} order")
            })
        })?;

    // Cart page
    let _ = registry
        .step("validate {string} product is added to cart", |w, a| {
            CartPage::assert_contains(&w.actions, arg(a, 0))
        })?
        .step("user clicks on {string} button in cart page", |w, a| {
            match arg(a, 0).to_lowercase().as_str() {
                "continue shopping" => CartPage::continue_shopping(&w.actions),
                "checkout" => CartPage::checkout(&w.actions),
                other => {
                    warn!(button = other, "unknown button");
                    Ok(())
                }
            }
        })?;

    // Checkout page
    let _ = registry
        .step("user fills in the checkout information", |w, _| {
            w.checkout = Some(CheckoutPage::fill_in_random(&w.actions)?);
            Ok(())
        })?
        .step("user clicks on {string} button in checkout page", |w, a| {
            match arg(a, 0).to_lowercase().as_str() {
                "continue" => CheckoutPage::click_continue(&w.actions),
                "cancel" => CheckoutPage::click_cancel(&w.actions),
                other => {
                    warn!(button = other, "unknown button");
                    Ok(())
                }
            }
        })?;

    // Overview and complete pages
    let _ = registry
        .step("user verify that URL matched with {string}", |w, a| {
            OverviewPage::assert_url(&w.actions, arg(a, 0))
        })?
        .step("user validate total price are equal item price", |w, _| {
            OverviewPage::assert_total_matches_items(&w.actions)
        })?
        .step("user click on Finish", |w, _| OverviewPage::click_finish(&w.actions))?
        .step("user validate {string} and {string} messages are shown", |w, a| {
            CompletePage::assert_message(&w.actions, arg(a, 0))?;
            CompletePage::assert_message(&w.actions, arg(a, 1))
        })?;

    Ok(registry)
}
