//! Element interactions.
//!
//! Each action first waits for the element to be actionable through
//! [`Waits`], then performs the call. Script-driven variants (`js_*`) go
//! through the snippets in [`crate::scripts`].

use crate::clock::{Clock, SystemClock};
use crate::locator::ElementRef;
use crate::result::{ErrorKind, ProbeError, ProbeResult};
use crate::scripts;
use crate::session::{BrowserSession, ElementHandle, FrameRef, ScriptArg, KEY_BACKSPACE, KEY_ENTER};
use crate::wait::PollOutcome;
use crate::waits::Waits;
use serde_json::Value;
use tracing::{debug, info};

/// How to pick an option in a select element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMatch<'a> {
    /// Visible text
    Text(&'a str),
    /// `value` attribute
    Value(&'a str),
    /// Zero-based position
    Index(usize),
}

impl std::fmt::Display for OptionMatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(t) => write!(f, "text '{t}'"),
            Self::Value(v) => write!(f, "value '{v}'"),
            Self::Index(i) => write!(f, "index {i}"),
        }
    }
}

/// Interactions bound to one session
#[derive(Debug)]
pub struct Actions<'s, S: ?Sized, C = SystemClock> {
    waits: Waits<'s, S, C>,
}

impl<'s, S: BrowserSession + ?Sized> Actions<'s, S> {
    /// Create actions on real time with default waits
    #[must_use]
    pub fn new(session: &'s S) -> Self {
        Self {
            waits: Waits::new(session),
        }
    }
}

impl<'s, S: BrowserSession + ?Sized, C: Clock> Actions<'s, S, C> {
    /// Create actions that wait through `waits`
    #[must_use]
    pub const fn with_waits(waits: Waits<'s, S, C>) -> Self {
        Self { waits }
    }

    /// The waits used before each action
    #[must_use]
    pub const fn waits(&self) -> &Waits<'s, S, C> {
        &self.waits
    }

    fn session(&self) -> &'s S {
        self.waits.session()
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    /// Click once the element is clickable
    pub fn click(&self, element: impl Into<ElementRef>) -> ProbeResult<()> {
        let element = element.into();
        let handle = self.waits.wait_clickable(element.clone())?;
        debug!(element = %element, "click");
        self.session().click(&handle)
    }

    /// Replace the element's value with `text`
    pub fn set_text(&self, element: impl Into<ElementRef>, text: &str) -> ProbeResult<ElementHandle> {
        let element = element.into();
        let handle = self.waits.wait_visible(element.clone())?;
        debug!(element = %element, "set text");
        self.session().clear(&handle)?;
        self.session().send_keys(&handle, text)?;
        Ok(handle)
    }

    /// [`set_text`](Self::set_text) followed by Enter
    pub fn set_text_and_enter(&self, element: impl Into<ElementRef>, text: &str) -> ProbeResult<()> {
        let handle = self.set_text(element, text)?;
        self.session().send_keys(&handle, &KEY_ENTER.to_string())
    }

    /// Clear the element's value
    pub fn clear(&self, element: impl Into<ElementRef>) -> ProbeResult<()> {
        let handle = self.waits.wait_visible(element)?;
        self.session().clear(&handle)
    }

    /// Clear by sending one Backspace per character, for inputs that ignore
    /// a plain clear
    pub fn clear_with_backspace(&self, element: impl Into<ElementRef>) -> ProbeResult<()> {
        let handle = self.waits.wait_visible(element)?;
        let current = self
            .session()
            .element_attribute(&handle, "value")?
            .unwrap_or_default();
        let keys: String = std::iter::repeat(KEY_BACKSPACE)
            .take(current.chars().count())
            .collect();
        if keys.is_empty() {
            return Ok(());
        }
        self.session().send_keys(&handle, &keys)
    }

    /// Visible text of the element
    pub fn text(&self, element: impl Into<ElementRef>) -> ProbeResult<String> {
        let handle = self.waits.wait_visible(element)?;
        self.session().element_text(&handle)
    }

    /// Attribute value of the element, `None` when absent
    pub fn attribute(&self, element: impl Into<ElementRef>, name: &str) -> ProbeResult<Option<String>> {
        let handle = self.waits.wait_present_ref(element)?;
        self.session().element_attribute(&handle, name)
    }

    // =========================================================================
    // DROPDOWNS
    // =========================================================================

    fn options(&self, select: impl Into<ElementRef>) -> ProbeResult<(ElementHandle, Vec<ElementHandle>)> {
        let select = select.into();
        let handle = self.waits.wait_visible(select.clone())?;
        let options = self.waits.wait_dropdown_populated(&handle)?;
        Ok((handle, options))
    }

    fn find_option(&self, options: &[ElementHandle], wanted: OptionMatch<'_>) -> ProbeResult<Option<ElementHandle>> {
        if let OptionMatch::Index(i) = wanted {
            return Ok(options.get(i).cloned());
        }
        for option in options {
            let matched = match wanted {
                OptionMatch::Text(text) => self.session().element_text(option)?.trim() == text,
                OptionMatch::Value(value) => {
                    self.session().element_attribute(option, "value")?.as_deref() == Some(value)
                }
                OptionMatch::Index(_) => false,
            };
            if matched {
                return Ok(Some(option.clone()));
            }
        }
        Ok(None)
    }

    fn is_multiple(&self, select: &ElementHandle) -> ProbeResult<bool> {
        Ok(self.session().element_attribute(select, "multiple")?.is_some())
    }

    /// Select the option matching `wanted`
    pub fn select(&self, select: impl Into<ElementRef>, wanted: OptionMatch<'_>) -> ProbeResult<()> {
        let (_, options) = self.options(select)?;
        let option = self
            .find_option(&options, wanted)?
            .ok_or_else(|| ProbeError::no_such_element(format!("option with {wanted}")))?;
        info!(option = %wanted, "select option");
        if !self.session().is_selected(&option)? {
            self.session().click(&option)?;
        }
        Ok(())
    }

    /// Select by visible text
    pub fn select_by_text(&self, select: impl Into<ElementRef>, text: &str) -> ProbeResult<()> {
        self.select(select, OptionMatch::Text(text))
    }

    /// Select by `value` attribute
    pub fn select_by_value(&self, select: impl Into<ElementRef>, value: &str) -> ProbeResult<()> {
        self.select(select, OptionMatch::Value(value))
    }

    /// Select by position
    pub fn select_by_index(&self, select: impl Into<ElementRef>, index: usize) -> ProbeResult<()> {
        self.select(select, OptionMatch::Index(index))
    }

    /// Deselect the option matching `wanted` in a multi-select
    pub fn deselect(&self, select: impl Into<ElementRef>, wanted: OptionMatch<'_>) -> ProbeResult<()> {
        let (handle, options) = self.options(select)?;
        if !self.is_multiple(&handle)? {
            return Err(ProbeError::invalid_argument(
                "only options of a multi-select can be deselected",
            ));
        }
        let option = self
            .find_option(&options, wanted)?
            .ok_or_else(|| ProbeError::no_such_element(format!("option with {wanted}")))?;
        if self.session().is_selected(&option)? {
            self.session().click(&option)?;
        }
        Ok(())
    }

    /// Deselect by visible text
    pub fn deselect_by_text(&self, select: impl Into<ElementRef>, text: &str) -> ProbeResult<()> {
        self.deselect(select, OptionMatch::Text(text))
    }

    /// Deselect by `value` attribute
    pub fn deselect_by_value(&self, select: impl Into<ElementRef>, value: &str) -> ProbeResult<()> {
        self.deselect(select, OptionMatch::Value(value))
    }

    /// Deselect by position
    pub fn deselect_by_index(&self, select: impl Into<ElementRef>, index: usize) -> ProbeResult<()> {
        self.deselect(select, OptionMatch::Index(index))
    }

    /// Deselect every option of a multi-select
    pub fn deselect_all(&self, select: impl Into<ElementRef>) -> ProbeResult<()> {
        let (handle, options) = self.options(select)?;
        if !self.is_multiple(&handle)? {
            return Err(ProbeError::invalid_argument(
                "only options of a multi-select can be deselected",
            ));
        }
        for option in &options {
            if self.session().is_selected(option)? {
                self.session().click(option)?;
            }
        }
        Ok(())
    }

    /// Texts of the selected options
    pub fn selected_options(&self, select: impl Into<ElementRef>) -> ProbeResult<Vec<String>> {
        let (_, options) = self.options(select)?;
        let mut texts = Vec::new();
        for option in &options {
            if self.session().is_selected(option)? {
                texts.push(self.session().element_text(option)?);
            }
        }
        Ok(texts)
    }

    /// Texts of every option
    pub fn all_options(&self, select: impl Into<ElementRef>) -> ProbeResult<Vec<String>> {
        let (_, options) = self.options(select)?;
        options
            .iter()
            .map(|option| self.session().element_text(option))
            .collect()
    }

    // =========================================================================
    // FRAMES AND ALERTS
    // =========================================================================

    /// Switch into `frame` once it can be switched to
    pub fn switch_to_frame(&self, frame: &FrameRef) -> ProbeResult<()> {
        let spec = self
            .waits
            .spec(format!("{frame} to be available"))
            .ignoring(ErrorKind::NoSuchFrame);
        let session = self.session();
        self.waits.poller().poll_until(session, &spec, |s: &S| {
            PollOutcome::from_check(s.switch_to_frame(frame).map(|()| true))
        })
    }

    /// Return to the top-level document
    pub fn switch_to_default_content(&self) -> ProbeResult<()> {
        self.session().switch_to_default_content()
    }

    /// Accept the alert once it opens; returns its text
    pub fn accept_alert(&self) -> ProbeResult<String> {
        let text = self.waits.wait_alert_present()?;
        self.session().accept_alert()?;
        Ok(text)
    }

    /// Dismiss the alert once it opens; returns its text
    pub fn dismiss_alert(&self) -> ProbeResult<String> {
        let text = self.waits.wait_alert_present()?;
        self.session().dismiss_alert()?;
        Ok(text)
    }

    /// Text of the alert once it opens
    pub fn alert_text(&self) -> ProbeResult<String> {
        self.waits.wait_alert_present()
    }

    /// Type into the prompt once it opens
    pub fn send_alert_keys(&self, text: &str) -> ProbeResult<()> {
        let _ = self.waits.wait_alert_present()?;
        self.session().send_alert_text(text)
    }

    // =========================================================================
    // SCRIPTED
    // =========================================================================

    fn run_on(&self, element: impl Into<ElementRef>, script: &str, extra: Option<ScriptArg>) -> ProbeResult<Value> {
        let handle = self.waits.wait_present_ref(element)?;
        let mut args = vec![ScriptArg::from(handle)];
        args.extend(extra);
        self.session().execute_script(script, &args)
    }

    /// Click through `HTMLElement.click()`
    pub fn js_click(&self, element: impl Into<ElementRef>) -> ProbeResult<()> {
        self.run_on(element, scripts::CLICK, None).map(drop)
    }

    /// Dispatch a `dblclick` event
    pub fn js_double_click(&self, element: impl Into<ElementRef>) -> ProbeResult<()> {
        self.run_on(element, scripts::DOUBLE_CLICK, None).map(drop)
    }

    /// Assign `value` to the element's value property
    pub fn js_write(&self, element: impl Into<ElementRef>, value: &str) -> ProbeResult<()> {
        self.run_on(element, scripts::WRITE_VALUE, Some(ScriptArg::from(value)))
            .map(drop)
    }

    /// Focus the element
    pub fn js_focus(&self, element: impl Into<ElementRef>) -> ProbeResult<()> {
        self.run_on(element, scripts::FOCUS, None).map(drop)
    }

    /// Dispatch a `mouseover` event
    pub fn js_mouse_over(&self, element: impl Into<ElementRef>) -> ProbeResult<()> {
        self.run_on(element, scripts::MOUSE_OVER, None).map(drop)
    }

    /// Scroll the element into view
    pub fn scroll_into_view(&self, element: impl Into<ElementRef>) -> ProbeResult<()> {
        self.run_on(element, scripts::SCROLL_INTO_VIEW, None).map(drop)
    }

    /// Scroll the window up by `pixels`
    pub fn scroll_up(&self, pixels: u32) -> ProbeResult<()> {
        self.session()
            .execute_script(scripts::SCROLL_BY, &[Value::from(-i64::from(pixels)).into()])
            .map(drop)
    }

    /// Scroll the window down by `pixels`
    pub fn scroll_down(&self, pixels: u32) -> ProbeResult<()> {
        self.session()
            .execute_script(scripts::SCROLL_BY, &[Value::from(pixels).into()])
            .map(drop)
    }

    /// Navigate through `window.location`
    pub fn js_navigate(&self, url: &str) -> ProbeResult<()> {
        info!(url, "navigate");
        self.session()
            .execute_script(scripts::NAVIGATE, &[url.into()])
            .map(drop)
    }

    /// Set a global on `window`
    pub fn set_window_variable(&self, name: &str, value: Value) -> ProbeResult<()> {
        self.session()
            .execute_script(scripts::SET_WINDOW_VARIABLE, &[name.into(), value.into()])
            .map(drop)
    }

    // =========================================================================
    // LOOKUPS
    // =========================================================================

    /// First match of `css` inside the shadow root of `host`
    pub fn shadow_root_find(&self, host: impl Into<ElementRef>, css: &str) -> ProbeResult<Option<ElementHandle>> {
        let value = self.run_on(host, scripts::SHADOW_ROOT_QUERY, Some(ScriptArg::from(css)))?;
        Ok(ElementHandle::from_value(&value))
    }

    /// Nearest ancestor of `element` matching `css`
    pub fn parent_matching(&self, element: impl Into<ElementRef>, css: &str) -> ProbeResult<Option<ElementHandle>> {
        let value = self.run_on(element, scripts::CLOSEST_PARENT, Some(ScriptArg::from(css)))?;
        Ok(ElementHandle::from_value(&value))
    }

    /// Elements with tag `tag` whose trimmed text is `text`
    pub fn elements_with_tag_and_text(&self, tag: &str, text: &str) -> ProbeResult<Vec<ElementHandle>> {
        let value = self
            .session()
            .execute_script(scripts::TAG_WITH_TEXT, &[tag.into(), text.into()])?;
        ElementHandle::list_from_value(&value)
    }

    /// Buttons whose trimmed text is `text`, waiting until one exists
    pub fn buttons_with_text(&self, text: &str) -> ProbeResult<Vec<ElementHandle>> {
        self.waits
            .wait_selector_filter_elements(None, "button", &scripts::button_text_filter(text))
    }

    /// Enabled, writable, rendered inputs under `container`
    pub fn active_inputs(&self, container: Option<&ElementHandle>) -> ProbeResult<Vec<ElementHandle>> {
        self.waits
            .wait_selector_filter_elements(container, "input", scripts::ACTIVE_INPUT_FILTER)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::locator::Selector;
    use crate::mock::MockSession;
    use crate::wait::ConditionPoller;
    use crate::session::W3C_ELEMENT_KEY;
    use serde_json::json;
    use std::time::Duration;

    fn actions(session: &MockSession) -> Actions<'_, MockSession, ManualClock> {
        Actions::with_waits(
            Waits::with_poller(session, ConditionPoller::with_clock(ManualClock::new()))
                .with_timeout(Duration::from_secs(1))
                .with_poll_interval(Duration::from_millis(100)),
        )
    }

    mod input_tests {
        use super::*;

        #[test]
        fn test_click_waits_for_enabled() {
            let session = MockSession::new();
            let h = session.add_element(Selector::id("login-button"));
            session.set_displayed_sequence(&h, &[false, true]);
            actions(&session).click(Selector::id("login-button")).unwrap();
            assert_eq!(session.clicks(), vec![h]);
        }

        #[test]
        fn test_click_times_out_on_disabled() {
            let session = MockSession::new();
            let h = session.add_element(Selector::id("finish"));
            session.set_enabled(&h, false);
            let err = actions(&session).click(&h).unwrap_err();
            assert!(err.is_timeout());
            assert!(session.clicks().is_empty());
        }

        #[test]
        fn test_set_text_replaces_value() {
            let session = MockSession::new();
            let h = session.add_element(Selector::id("first-name"));
            session.set_attribute(&h, "value", "old");
            let _ = actions(&session).set_text(&h, "Ada").unwrap();
            assert_eq!(session.attribute(&h, "value").as_deref(), Some("Ada"));
        }

        #[test]
        fn test_clear_with_backspace() {
            let session = MockSession::new();
            let h = session.add_element(Selector::id("postal-code"));
            session.set_attribute(&h, "value", "90210");
            actions(&session).clear_with_backspace(&h).unwrap();
            assert_eq!(session.attribute(&h, "value").as_deref(), Some(""));
        }

        #[test]
        fn test_text_and_attribute() {
            let session = MockSession::new();
            let h = session.add_element(Selector::class_name("title"));
            session.set_text(&h, "Products");
            session.set_attribute(&h, "data-test", "title");
            let actions = actions(&session);
            assert_eq!(actions.text(Selector::class_name("title")).unwrap(), "Products");
            assert_eq!(
                actions.attribute(&h, "data-test").unwrap().as_deref(),
                Some("title")
            );
            assert_eq!(actions.attribute(&h, "missing").unwrap(), None);
        }
    }

    mod dropdown_tests {
        use super::*;

        fn sort_dropdown(session: &MockSession) -> ElementHandle {
            let select = session.add_element(Selector::class_name("product_sort_container"));
            let _ = session.add_option(&select, "Name (A to Z)", "az");
            let _ = session.add_option(&select, "Name (Z to A)", "za");
            let _ = session.add_option(&select, "Price (low to high)", "lohi");
            let _ = session.add_option(&select, "Price (high to low)", "hilo");
            select
        }

        #[test]
        fn test_select_by_text_value_index() {
            let session = MockSession::new();
            let select = sort_dropdown(&session);
            let actions = actions(&session);
            actions.select_by_text(&select, "Price (low to high)").unwrap();
            assert_eq!(actions.selected_options(&select).unwrap(), vec!["Price (low to high)"]);
            actions.select_by_value(&select, "za").unwrap();
            assert_eq!(actions.selected_options(&select).unwrap(), vec!["Name (Z to A)"]);
            actions.select_by_index(&select, 3).unwrap();
            assert_eq!(actions.selected_options(&select).unwrap(), vec!["Price (high to low)"]);
            assert_eq!(actions.all_options(&select).unwrap().len(), 4);
        }

        #[test]
        fn test_select_unknown_option() {
            let session = MockSession::new();
            let select = sort_dropdown(&session);
            let err = actions(&session).select_by_text(&select, "Newest").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NoSuchElement);
        }

        #[test]
        fn test_deselect_requires_multiple() {
            let session = MockSession::new();
            let select = sort_dropdown(&session);
            let err = actions(&session).deselect_all(&select).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }

        #[test]
        fn test_multi_select_deselect() {
            let session = MockSession::new();
            let select = sort_dropdown(&session);
            session.set_attribute(&select, "multiple", "");
            let actions = actions(&session);
            actions.select_by_index(&select, 0).unwrap();
            actions.select_by_index(&select, 1).unwrap();
            assert_eq!(actions.selected_options(&select).unwrap().len(), 2);
            actions.deselect_by_value(&select, "az").unwrap();
            assert_eq!(actions.selected_options(&select).unwrap(), vec!["Name (Z to A)"]);
            actions.deselect_all(&select).unwrap();
            assert!(actions.selected_options(&select).unwrap().is_empty());
        }
    }

    mod frame_alert_tests {
        use super::*;

        #[test]
        fn test_switch_to_frame_by_name() {
            let session = MockSession::new();
            let frame = session.add_iframe();
            session.set_attribute(&frame, "name", "checkout");
            actions(&session)
                .switch_to_frame(&FrameRef::Name("checkout".into()))
                .unwrap();
            assert_eq!(session.current_frame(), Some(frame.id));
        }

        #[test]
        fn test_switch_to_missing_frame_times_out() {
            let session = MockSession::new();
            let err = actions(&session)
                .switch_to_frame(&FrameRef::Index(0))
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[test]
        fn test_alert_handling() {
            let session = MockSession::new();
            session.open_alert("Delete item?");
            let actions = actions(&session);
            actions.send_alert_keys("y").unwrap();
            assert_eq!(actions.accept_alert().unwrap(), "Delete item?");
            assert!(!session.alert_open());
            assert!(actions.dismiss_alert().unwrap_err().is_timeout());
        }
    }

    mod scripted_tests {
        use super::*;

        #[test]
        fn test_js_actions_pass_element() {
            let session = MockSession::new();
            let h = session.add_element(Selector::id("checkout"));
            let actions = actions(&session);
            actions.js_click(&h).unwrap();
            actions.js_write(&h, "x").unwrap();
            actions.scroll_into_view(&h).unwrap();
            actions.scroll_down(200).unwrap();
            actions.js_navigate("https://www.saucedemo.com/").unwrap();
            let executed = session.executed_scripts();
            assert_eq!(executed[0], scripts::CLICK);
            assert_eq!(executed[1], scripts::WRITE_VALUE);
            assert_eq!(executed[4], scripts::NAVIGATE);
        }

        #[test]
        fn test_shadow_root_and_parent() {
            let session = MockSession::new();
            let host = session.add_element(Selector::tag_name("my-widget"));
            session.on_script("shadowRoot", json!({ W3C_ELEMENT_KEY: "inner" }));
            session.on_script("closest", Value::Null);
            let actions = actions(&session);
            assert_eq!(
                actions.shadow_root_find(&host, "button").unwrap(),
                Some(ElementHandle::new("inner"))
            );
            assert_eq!(actions.parent_matching(&host, "form").unwrap(), None);
        }

        #[test]
        fn test_buttons_with_text() {
            let session = MockSession::new();
            session.on_script("querySelectorAll", json!([{ W3C_ELEMENT_KEY: "btn" }]));
            let found = actions(&session).buttons_with_text("Checkout").unwrap();
            assert_eq!(found, vec![ElementHandle::new("btn")]);
            assert!(session.executed_scripts()[0].contains("\"Checkout\""));
        }

        #[test]
        fn test_tag_and_text() {
            let session = MockSession::new();
            session.on_script("getElementsByTagName", json!([{ W3C_ELEMENT_KEY: "d1" }]));
            let found = actions(&session)
                .elements_with_tag_and_text("div", "Sauce Labs Backpack")
                .unwrap();
            assert_eq!(found.len(), 1);
        }
    }
}
