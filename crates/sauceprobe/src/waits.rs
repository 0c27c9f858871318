//! Element and page waits over a [`BrowserSession`].
//!
//! Every helper is a thin predicate handed to [`ConditionPoller`]. Two
//! conventions sit side by side:
//!
//! - `wait_*` returns `Err(ProbeError::Timeout)` when the condition is not met
//!   in time. Use it where the test cannot continue otherwise.
//! - `is_*` returns `Ok(false)` on timeout. Fatal errors (lost session,
//!   invalid selector) still come back as `Err`.
//!
//! Stale-element and no-such-element failures are retried by default, since
//! both are expected while a page re-renders.

use crate::clock::{Clock, SystemClock};
use crate::locator::{ElementRef, Selector};
use crate::result::{ErrorKind, ProbeError, ProbeResult};
use crate::scripts;
use crate::session::{BrowserSession, ElementHandle, FrameRef, ScriptArg};
use crate::wait::{ConditionPoller, PollOutcome, WaitSpec};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Failure kinds every element wait retries unless told otherwise
pub const DEFAULT_IGNORED_KINDS: [ErrorKind; 2] =
    [ErrorKind::StaleElement, ErrorKind::NoSuchElement];

/// Default spec used by [`Waits`]
#[must_use]
pub fn default_element_spec() -> WaitSpec {
    WaitSpec::default().ignoring_all(DEFAULT_IGNORED_KINDS)
}

type Attempt<R> = ProbeResult<PollOutcome<R>>;

/// Wait helpers bound to one session
#[derive(Debug)]
pub struct Waits<'s, S: ?Sized, C = SystemClock> {
    session: &'s S,
    poller: ConditionPoller<C>,
    defaults: WaitSpec,
}

impl<'s, S: BrowserSession + ?Sized> Waits<'s, S> {
    /// Create waits on real time with the default spec
    #[must_use]
    pub fn new(session: &'s S) -> Self {
        Self::with_poller(session, ConditionPoller::new())
    }
}

impl<'s, S: BrowserSession + ?Sized, C: Clock> Waits<'s, S, C> {
    /// Create waits driven by `poller`
    #[must_use]
    pub fn with_poller(session: &'s S, poller: ConditionPoller<C>) -> Self {
        Self {
            session,
            poller,
            defaults: default_element_spec(),
        }
    }

    /// Override the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.defaults.timeout = timeout;
        self
    }

    /// Override the polling interval
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.defaults.poll_interval = interval;
        self
    }

    /// Replace the whole default spec; its description is ignored
    #[must_use]
    pub fn with_spec(mut self, spec: WaitSpec) -> Self {
        self.defaults = spec;
        self
    }

    /// The session being observed
    #[must_use]
    pub const fn session(&self) -> &'s S {
        self.session
    }

    /// The underlying poller
    #[must_use]
    pub const fn poller(&self) -> &ConditionPoller<C> {
        &self.poller
    }

    /// Default spec with a description attached
    #[must_use]
    pub fn spec(&self, description: impl Into<String>) -> WaitSpec {
        self.defaults.clone().describe(description)
    }

    fn wait<R>(
        &self,
        description: impl Into<String>,
        mut probe: impl FnMut(&S) -> Attempt<R>,
    ) -> ProbeResult<R> {
        let spec = self.spec(description);
        debug!(
            condition = %spec.description,
            timeout_ms = spec.timeout.as_millis() as u64,
            "waiting"
        );
        self.poller.poll_until(self.session, &spec, |s: &S| {
            PollOutcome::from_attempt(probe(s))
        })
    }

    fn check<R>(
        &self,
        description: impl Into<String>,
        mut probe: impl FnMut(&S) -> Attempt<R>,
    ) -> ProbeResult<bool> {
        let spec = self.spec(description);
        self.poller.poll_until_or_else(
            self.session,
            &spec,
            |s: &S| PollOutcome::from_attempt(probe(s)).map(|_| true),
            |report| {
                debug!(
                    condition = %report.condition,
                    attempts = report.attempts,
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "condition not met"
                );
                Ok(false)
            },
        )
    }

    /// Run `wait` on the top document, then inside every top-level iframe.
    ///
    /// The session is switched back to default content after each frame,
    /// including when the wait inside it fails.
    pub fn in_every_frame(&self, mut wait: impl FnMut(&Self) -> ProbeResult<()>) -> ProbeResult<()> {
        wait(self)?;
        let frames = self.session.find_elements(&Selector::tag_name("iframe"))?;
        debug!(frames = frames.len(), "repeating wait inside frames");
        for frame in frames {
            self.session.switch_to_frame(&FrameRef::Element(frame))?;
            let result = wait(self);
            self.session.switch_to_default_content()?;
            result?;
        }
        Ok(())
    }

    // =========================================================================
    // DOCUMENT
    // =========================================================================

    /// Wait until `document.readyState` is `complete`
    pub fn wait_document_ready(&self) -> ProbeResult<()> {
        self.wait("document ready state to be 'complete'", document_ready)
    }

    /// Whether the document reaches `complete` in time
    pub fn is_document_ready(&self) -> ProbeResult<bool> {
        self.check("document ready state to be 'complete'", document_ready)
    }

    /// [`wait_document_ready`](Self::wait_document_ready) on the page and
    /// each of its frames
    pub fn wait_document_ready_including_frames(&self) -> ProbeResult<()> {
        self.in_every_frame(Self::wait_document_ready)
    }

    /// Wait until jQuery reports no active requests; returns at once when
    /// the page does not load jQuery
    pub fn wait_ajax_idle(&self) -> ProbeResult<()> {
        let present = self.session.execute_script(scripts::JQUERY_PRESENT, &[])?;
        if !present.as_bool().unwrap_or(false) {
            debug!("jQuery not loaded, skipping ajax wait");
            return Ok(());
        }
        self.wait("jQuery.active to reach 0", |s| {
            let idle = s.execute_script(scripts::JQUERY_IDLE, &[])?;
            Ok(PollOutcome::from_bool(idle.as_bool().unwrap_or(false)))
        })
    }

    /// [`wait_ajax_idle`](Self::wait_ajax_idle) on the page and each frame
    pub fn wait_ajax_idle_including_frames(&self) -> ProbeResult<()> {
        self.in_every_frame(Self::wait_ajax_idle)
    }

    // =========================================================================
    // PRESENCE AND VISIBILITY
    // =========================================================================

    /// Wait until at least one element matches and return the first
    pub fn wait_present(&self, selector: &Selector) -> ProbeResult<ElementHandle> {
        self.wait(format!("{selector} to be present"), |s| {
            Ok(PollOutcome::from_option(
                s.find_elements(selector)?.into_iter().next(),
            ))
        })
    }

    /// Resolve `element`, waiting for presence when it is a selector
    pub fn wait_present_ref(&self, element: impl Into<ElementRef>) -> ProbeResult<ElementHandle> {
        match element.into() {
            ElementRef::ByLocator(selector) => self.wait_present(&selector),
            ElementRef::Resolved(handle) => Ok(handle),
        }
    }

    /// Whether an element matching `selector` shows up in time
    pub fn is_present(&self, selector: &Selector) -> ProbeResult<bool> {
        self.check(format!("{selector} to be present"), |s| {
            Ok(PollOutcome::from_bool(!s.find_elements(selector)?.is_empty()))
        })
    }

    /// Wait until at least one element matches and return all of them
    pub fn wait_all_present(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        self.wait(format!("all of {selector} to be present"), |s| {
            Ok(non_empty(s.find_elements(selector)?))
        })
    }

    /// Wait until the element is displayed and return it
    pub fn wait_visible(&self, element: impl Into<ElementRef>) -> ProbeResult<ElementHandle> {
        let element = element.into();
        self.wait(format!("{element} to be visible"), |s| visible(s, &element))
    }

    /// Whether the element is displayed in time
    pub fn is_visible(&self, element: impl Into<ElementRef>) -> ProbeResult<bool> {
        let element = element.into();
        self.check(format!("{element} to be visible"), |s| visible(s, &element))
    }

    /// Wait until the element takes part in layout (`offsetParent` set)
    pub fn wait_rendered(&self, element: impl Into<ElementRef>) -> ProbeResult<ElementHandle> {
        let element = element.into();
        self.wait(format!("{element} to have an offsetParent"), |s| {
            let handle = element.resolve(s)?;
            let rendered = s.execute_script(scripts::OFFSET_PARENT_VISIBLE, &[(&handle).into()])?;
            Ok(if rendered.as_bool().unwrap_or(false) {
                PollOutcome::Satisfied(handle)
            } else {
                PollOutcome::pending_because("offsetParent is null")
            })
        })
    }

    /// Wait until every match is displayed (and there is at least one)
    pub fn wait_all_visible(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        self.wait(format!("all of {selector} to be visible"), |s| {
            let elements = s.find_elements(selector)?;
            if elements.is_empty() {
                return Ok(PollOutcome::pending_because("no matches"));
            }
            let mut hidden = 0;
            for element in &elements {
                if !s.is_displayed(element)? {
                    hidden += 1;
                }
            }
            Ok(if hidden == 0 {
                PollOutcome::Satisfied(elements)
            } else {
                PollOutcome::pending_because(format!("{hidden} of {} hidden", elements.len()))
            })
        })
    }

    /// Wait until the element is hidden or gone
    pub fn wait_invisible(&self, element: impl Into<ElementRef>) -> ProbeResult<()> {
        let element = element.into();
        self.wait(format!("{element} to be invisible"), |s| invisible(s, &element))
    }

    /// Whether the element is hidden or gone in time
    pub fn is_invisible(&self, element: impl Into<ElementRef>) -> ProbeResult<bool> {
        let element = element.into();
        self.check(format!("{element} to be invisible"), |s| invisible(s, &element))
    }

    /// Wait until every match is hidden; no matches counts as hidden
    pub fn wait_all_invisible(&self, selector: &Selector) -> ProbeResult<()> {
        self.wait(format!("all of {selector} to be invisible"), |s| {
            all_hidden(s, s.find_elements(selector)?)
        })
    }

    /// Wait until no element matching `selector` with exactly `text` is shown
    pub fn wait_invisible_with_text(&self, selector: &Selector, text: &str) -> ProbeResult<()> {
        self.wait(format!("{selector} with text '{text}' to be invisible"), |s| {
            let mut with_text = Vec::new();
            for element in s.find_elements(selector)? {
                match s.element_text(&element) {
                    Ok(t) if t.trim() == text => with_text.push(element),
                    Ok(_) => {}
                    Err(e) if e.kind() == ErrorKind::StaleElement => {}
                    Err(e) => return Err(e),
                }
            }
            all_hidden(s, with_text)
        })
    }

    /// Wait until the element is displayed and enabled
    pub fn wait_clickable(&self, element: impl Into<ElementRef>) -> ProbeResult<ElementHandle> {
        let element = element.into();
        self.wait(format!("{element} to be clickable"), |s| clickable(s, &element))
    }

    /// Whether the element becomes clickable in time
    pub fn is_clickable(&self, element: impl Into<ElementRef>) -> ProbeResult<bool> {
        let element = element.into();
        self.check(format!("{element} to be clickable"), |s| clickable(s, &element))
    }

    /// Wait until the element's selection state equals `selected`
    pub fn wait_selection_state(
        &self,
        element: impl Into<ElementRef>,
        selected: bool,
    ) -> ProbeResult<()> {
        let element = element.into();
        let state = if selected { "selected" } else { "deselected" };
        self.wait(format!("{element} to be {state}"), |s| {
            let handle = element.resolve(s)?;
            Ok(PollOutcome::from_bool(s.is_selected(&handle)? == selected))
        })
    }

    /// Wait until elements matching `class` are displayed; returns the first
    pub fn wait_displayed_by_class_name(&self, class: &str) -> ProbeResult<ElementHandle> {
        self.wait_visible(Selector::class_name(class))
    }

    /// Wait for the document, then for every match of `selector` to be
    /// visible, and return the matches
    pub fn wait_and_get_elements(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        self.wait_document_ready()?;
        self.wait_all_visible(selector)
    }

    // =========================================================================
    // ATTRIBUTES AND TEXT
    // =========================================================================

    /// Wait until attribute `name` contains `value`
    pub fn wait_attribute_contains(
        &self,
        element: impl Into<ElementRef>,
        name: &str,
        value: &str,
    ) -> ProbeResult<()> {
        let element = element.into();
        self.wait(
            format!("{element} attribute '{name}' to contain '{value}'"),
            |s| attribute_matches(s, &element, name, |v| v.contains(value)),
        )
    }

    /// Whether attribute `name` contains `value` in time
    pub fn is_attribute_containing(
        &self,
        element: impl Into<ElementRef>,
        name: &str,
        value: &str,
    ) -> ProbeResult<bool> {
        let element = element.into();
        self.check(
            format!("{element} attribute '{name}' to contain '{value}'"),
            |s| attribute_matches(s, &element, name, |v| v.contains(value)),
        )
    }

    /// Wait until attribute `name` equals `value`
    pub fn wait_attribute_equals(
        &self,
        element: impl Into<ElementRef>,
        name: &str,
        value: &str,
    ) -> ProbeResult<()> {
        let element = element.into();
        self.wait(
            format!("{element} attribute '{name}' to equal '{value}'"),
            |s| attribute_matches(s, &element, name, |v| v == value),
        )
    }

    /// Whether attribute `name` equals `value` in time
    pub fn is_attribute_equal(
        &self,
        element: impl Into<ElementRef>,
        name: &str,
        value: &str,
    ) -> ProbeResult<bool> {
        let element = element.into();
        self.check(
            format!("{element} attribute '{name}' to equal '{value}'"),
            |s| attribute_matches(s, &element, name, |v| v == value),
        )
    }

    /// Wait until attribute `name` has a non-empty value and return it
    pub fn wait_attribute_not_empty(
        &self,
        element: impl Into<ElementRef>,
        name: &str,
    ) -> ProbeResult<String> {
        let element = element.into();
        self.wait(format!("{element} attribute '{name}' to be set"), |s| {
            let handle = element.resolve(s)?;
            Ok(PollOutcome::from_option(
                s.element_attribute(&handle, name)?
                    .filter(|v| !v.trim().is_empty()),
            ))
        })
    }

    /// Wait until the element carries an attribute called `name`
    pub fn wait_attribute_name_present(
        &self,
        element: impl Into<ElementRef>,
        name: &str,
    ) -> ProbeResult<()> {
        let element = element.into();
        self.wait(format!("{element} to have attribute '{name}'"), |s| {
            let handle = element.resolve(s)?;
            let names = s.execute_script(scripts::ATTRIBUTE_NAMES, &[(&handle).into()])?;
            let found = names
                .as_array()
                .is_some_and(|list| list.iter().any(|n| n.as_str() == Some(name)));
            Ok(PollOutcome::from_bool(found))
        })
    }

    /// Wait until the element's text contains `text`
    pub fn wait_text_present(&self, element: impl Into<ElementRef>, text: &str) -> ProbeResult<()> {
        let element = element.into();
        self.wait(format!("{element} text to contain '{text}'"), |s| {
            text_contains(s, &element, text)
        })
    }

    /// Whether the element's text contains `text` in time
    pub fn is_text_present(&self, element: impl Into<ElementRef>, text: &str) -> ProbeResult<bool> {
        let element = element.into();
        self.check(format!("{element} text to contain '{text}'"), |s| {
            text_contains(s, &element, text)
        })
    }

    /// Wait until the element's text differs from `previous`; returns the
    /// new text
    pub fn wait_text_changes(
        &self,
        element: impl Into<ElementRef>,
        previous: &str,
    ) -> ProbeResult<String> {
        let element = element.into();
        self.wait(format!("{element} text to change from '{previous}'"), |s| {
            let handle = element.resolve(s)?;
            let text = s.element_text(&handle)?;
            Ok(if text == previous {
                PollOutcome::pending()
            } else {
                PollOutcome::Satisfied(text)
            })
        })
    }

    // =========================================================================
    // PAGE
    // =========================================================================

    /// Wait until the title contains `fragment`
    pub fn wait_title_contains(&self, fragment: &str) -> ProbeResult<()> {
        self.wait(format!("title to contain '{fragment}'"), |s| {
            observed("title", s.title()?, |t| t.contains(fragment))
        })
    }

    /// Whether the title contains `fragment` in time
    pub fn is_title_containing(&self, fragment: &str) -> ProbeResult<bool> {
        self.check(format!("title to contain '{fragment}'"), |s| {
            observed("title", s.title()?, |t| t.contains(fragment))
        })
    }

    /// Wait until the title equals `title`
    pub fn wait_title_equals(&self, title: &str) -> ProbeResult<()> {
        self.wait(format!("title to equal '{title}'"), |s| {
            observed("title", s.title()?, |t| t == title)
        })
    }

    /// Wait until the URL contains `fragment`
    pub fn wait_url_contains(&self, fragment: &str) -> ProbeResult<()> {
        self.wait(format!("url to contain '{fragment}'"), |s| {
            observed("url", s.current_url()?, |u| u.contains(fragment))
        })
    }

    /// Whether the URL contains `fragment` in time
    pub fn is_url_containing(&self, fragment: &str) -> ProbeResult<bool> {
        self.check(format!("url to contain '{fragment}'"), |s| {
            observed("url", s.current_url()?, |u| u.contains(fragment))
        })
    }

    /// Wait until the URL equals `url`
    pub fn wait_url_equals(&self, url: &str) -> ProbeResult<()> {
        self.wait(format!("url to equal '{url}'"), |s| {
            observed("url", s.current_url()?, |u| u == url)
        })
    }

    /// Wait until exactly `count` windows are open
    pub fn wait_window_count(&self, count: usize) -> ProbeResult<()> {
        self.wait(format!("{count} window(s) to be open"), |s| {
            let open = s.window_count()?;
            Ok(if open == count {
                PollOutcome::Satisfied(())
            } else {
                PollOutcome::pending_because(format!("{open} open"))
            })
        })
    }

    /// Wait until an alert is open and return its text
    pub fn wait_alert_present(&self) -> ProbeResult<String> {
        self.wait("alert to be present", alert_text)
    }

    /// Whether an alert opens in time
    pub fn is_alert_present(&self) -> ProbeResult<bool> {
        self.check("alert to be present", alert_text)
    }

    // =========================================================================
    // COUNTS
    // =========================================================================

    /// Wait until more than `count` elements match
    pub fn wait_count_more_than(
        &self,
        selector: &Selector,
        count: usize,
    ) -> ProbeResult<Vec<ElementHandle>> {
        self.wait(format!("more than {count} of {selector}"), |s| {
            counted(s.find_elements(selector)?, |n| n > count)
        })
    }

    /// Wait until fewer than `count` elements match
    pub fn wait_count_less_than(
        &self,
        selector: &Selector,
        count: usize,
    ) -> ProbeResult<Vec<ElementHandle>> {
        self.wait(format!("fewer than {count} of {selector}"), |s| {
            counted(s.find_elements(selector)?, |n| n < count)
        })
    }

    /// Wait until exactly `count` elements match
    pub fn wait_count_equals(
        &self,
        selector: &Selector,
        count: usize,
    ) -> ProbeResult<Vec<ElementHandle>> {
        self.wait(format!("exactly {count} of {selector}"), |s| {
            counted(s.find_elements(selector)?, |n| n == count)
        })
    }

    /// Wait until the select element has at least one option; returns them
    pub fn wait_dropdown_populated(
        &self,
        select: impl Into<ElementRef>,
    ) -> ProbeResult<Vec<ElementHandle>> {
        let select = select.into();
        self.wait(format!("{select} to have options"), |s| {
            let handle = select.resolve(s)?;
            Ok(non_empty(
                s.find_child_elements(&handle, &Selector::tag_name("option"))?,
            ))
        })
    }

    // =========================================================================
    // SCRIPTS
    // =========================================================================

    /// Wait until some element matching `css` under `container` (the
    /// document when `None`) passes `filter`, a function body over `i`
    pub fn wait_selector_filter_displayed(
        &self,
        container: Option<&ElementHandle>,
        css: &str,
        filter: &str,
    ) -> ProbeResult<()> {
        let script = scripts::selector_filter_exists(container.is_some(), filter);
        let args = [ScriptArg::from(container), ScriptArg::from(css)];
        self.wait(format!("'{css}' passing filter"), |s| script_true(s, &script, &args))
    }

    /// Whether some element passes the filter in time
    pub fn is_selector_filter_displayed(
        &self,
        container: Option<&ElementHandle>,
        css: &str,
        filter: &str,
    ) -> ProbeResult<bool> {
        let script = scripts::selector_filter_exists(container.is_some(), filter);
        let args = [ScriptArg::from(container), ScriptArg::from(css)];
        self.check(format!("'{css}' passing filter"), |s| script_true(s, &script, &args))
    }

    /// Wait until some element passes the filter and return all that do
    pub fn wait_selector_filter_elements(
        &self,
        container: Option<&ElementHandle>,
        css: &str,
        filter: &str,
    ) -> ProbeResult<Vec<ElementHandle>> {
        let script = scripts::selector_filter_elements(container.is_some(), filter);
        let args = [ScriptArg::from(container), ScriptArg::from(css)];
        self.wait(format!("'{css}' passing filter"), |s| {
            let value = s.execute_script(&script, &args)?;
            Ok(non_empty(ElementHandle::list_from_value(&value)?))
        })
    }

    /// Wait until `script` returns `true`
    pub fn wait_js_true(&self, script: &str, args: &[ScriptArg]) -> ProbeResult<()> {
        self.wait(format!("script to return true: {script}"), |s| {
            script_true(s, script, args)
        })
    }

    /// Whether `script` returns `true` in time
    pub fn is_js_true(&self, script: &str, args: &[ScriptArg]) -> ProbeResult<bool> {
        self.check(format!("script to return true: {script}"), |s| {
            script_true(s, script, args)
        })
    }
}

// =============================================================================
// PROBES
// =============================================================================

fn document_ready<S: BrowserSession + ?Sized>(s: &S) -> Attempt<()> {
    let state = s.ready_state()?;
    Ok(if state == "complete" {
        PollOutcome::Satisfied(())
    } else {
        PollOutcome::pending_because(format!("readyState={state}"))
    })
}

fn non_empty(elements: Vec<ElementHandle>) -> PollOutcome<Vec<ElementHandle>> {
    if elements.is_empty() {
        PollOutcome::pending_because("no matches")
    } else {
        PollOutcome::Satisfied(elements)
    }
}

fn counted(
    elements: Vec<ElementHandle>,
    accept: impl FnOnce(usize) -> bool,
) -> Attempt<Vec<ElementHandle>> {
    let n = elements.len();
    Ok(if accept(n) {
        PollOutcome::Satisfied(elements)
    } else {
        PollOutcome::pending_because(format!("{n} matched"))
    })
}

fn observed(what: &str, value: String, accept: impl FnOnce(&str) -> bool) -> Attempt<()> {
    Ok(if accept(&value) {
        PollOutcome::Satisfied(())
    } else {
        PollOutcome::pending_because(format!("{what} was '{value}'"))
    })
}

fn visible<S: BrowserSession + ?Sized>(s: &S, element: &ElementRef) -> Attempt<ElementHandle> {
    let handle = element.resolve(s)?;
    Ok(if s.is_displayed(&handle)? {
        PollOutcome::Satisfied(handle)
    } else {
        PollOutcome::pending_because(format!("{element} is not displayed"))
    })
}

fn invisible<S: BrowserSession + ?Sized>(s: &S, element: &ElementRef) -> Attempt<()> {
    match element {
        ElementRef::ByLocator(selector) => all_hidden(s, s.find_elements(selector)?),
        ElementRef::Resolved(handle) => all_hidden(s, vec![handle.clone()]),
    }
}

fn all_hidden<S: BrowserSession + ?Sized>(s: &S, elements: Vec<ElementHandle>) -> Attempt<()> {
    for element in &elements {
        match s.is_displayed(element) {
            Ok(true) => {
                return Ok(PollOutcome::pending_because(format!(
                    "element {} still displayed",
                    element.id
                )))
            }
            Ok(false) => {}
            Err(e) if e.kind() == ErrorKind::StaleElement => {}
            Err(e) => return Err(e),
        }
    }
    Ok(PollOutcome::Satisfied(()))
}

fn clickable<S: BrowserSession + ?Sized>(s: &S, element: &ElementRef) -> Attempt<ElementHandle> {
    let handle = element.resolve(s)?;
    if !s.is_displayed(&handle)? {
        return Ok(PollOutcome::pending_because(format!("{element} is not displayed")));
    }
    Ok(if s.is_enabled(&handle)? {
        PollOutcome::Satisfied(handle)
    } else {
        PollOutcome::pending_because(format!("{element} is disabled"))
    })
}

fn attribute_matches<S: BrowserSession + ?Sized>(
    s: &S,
    element: &ElementRef,
    name: &str,
    accept: impl FnOnce(&str) -> bool,
) -> Attempt<()> {
    let handle = element.resolve(s)?;
    Ok(match s.element_attribute(&handle, name)? {
        Some(value) if accept(&value) => PollOutcome::Satisfied(()),
        Some(value) => PollOutcome::pending_because(format!("{name}='{value}'")),
        None => PollOutcome::pending_because(format!("{name} not set")),
    })
}

fn text_contains<S: BrowserSession + ?Sized>(s: &S, element: &ElementRef, text: &str) -> Attempt<()> {
    let handle = element.resolve(s)?;
    let actual = s.element_text(&handle)?;
    Ok(if actual.contains(text) {
        PollOutcome::Satisfied(())
    } else {
        PollOutcome::pending_because(format!("text was '{actual}'"))
    })
}

fn alert_text<S: BrowserSession + ?Sized>(s: &S) -> Attempt<String> {
    match s.alert_text() {
        Ok(text) => Ok(PollOutcome::Satisfied(text)),
        Err(ProbeError::NoAlert) => Ok(PollOutcome::pending()),
        Err(e) => Err(e),
    }
}

fn script_true<S: BrowserSession + ?Sized>(s: &S, script: &str, args: &[ScriptArg]) -> Attempt<()> {
    let value = s.execute_script(script, args)?;
    Ok(PollOutcome::from_bool(value == Value::Bool(true)))
}
