//! Scriptable in-memory browser session.
//!
//! [`MockSession`] implements [`BrowserSession`] over a small element table so
//! waits, actions, page objects and steps can be exercised without a browser.
//! Most observable values are sequences: each read consumes the front value
//! until only the last one is left, which then sticks. That is enough to model
//! an element that becomes visible on the third poll or a title that changes
//! after a click.

use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::scripts;
use crate::session::{
    BrowserSession, ElementHandle, FrameRef, ScriptArg, KEY_BACKSPACE, KEY_ENTER,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Bytes returned by [`MockSession::screenshot`] unless replaced
pub const MOCK_SCREENSHOT: &[u8] = b"\x89PNG\r\n\x1a\nmock";

#[derive(Debug, Clone)]
struct Sequence<T> {
    values: VecDeque<T>,
}

impl<T: Clone> Sequence<T> {
    fn constant(value: T) -> Self {
        Self {
            values: VecDeque::from([value]),
        }
    }

    fn of(values: impl IntoIterator<Item = T>, fallback: T) -> Self {
        let values: VecDeque<T> = values.into_iter().collect();
        if values.is_empty() {
            Self::constant(fallback)
        } else {
            Self { values }
        }
    }

    fn next(&mut self) -> Option<T> {
        if self.values.len() > 1 {
            self.values.pop_front()
        } else {
            self.values.front().cloned()
        }
    }

    fn current(&self) -> Option<&T> {
        self.values.front()
    }
}

#[derive(Debug, Clone)]
struct MockElement {
    id: String,
    selectors: Vec<Selector>,
    parent: Option<String>,
    frame: Option<String>,
    text: Sequence<String>,
    attributes: HashMap<String, String>,
    displayed: Sequence<bool>,
    enabled: bool,
    selected: bool,
    attached: bool,
    stale_reads: usize,
    navigate_on_click: Option<String>,
}

impl MockElement {
    fn new(id: String, selector: Selector, parent: Option<String>, frame: Option<String>) -> Self {
        Self {
            id,
            selectors: vec![selector],
            parent,
            frame,
            text: Sequence::constant(String::new()),
            attributes: HashMap::new(),
            displayed: Sequence::constant(true),
            enabled: true,
            selected: false,
            attached: true,
            stale_reads: 0,
            navigate_on_click: None,
        }
    }

    fn is_option(&self) -> bool {
        self.selectors
            .iter()
            .any(|s| matches!(s, Selector::TagName(t) if t.eq_ignore_ascii_case("option")))
    }
}

#[derive(Debug)]
struct MockState {
    active: bool,
    elements: Vec<MockElement>,
    current_frame: Option<String>,
    frame_log: Vec<String>,
    ready_states: HashMap<Option<String>, Sequence<String>>,
    title: Sequence<String>,
    url: Sequence<String>,
    window_counts: Sequence<usize>,
    alert: Option<String>,
    alert_input: Option<String>,
    scripts: Vec<(String, Sequence<Value>)>,
    executed: Vec<String>,
    clicks: Vec<String>,
    hidden: HashMap<Selector, usize>,
    invalid: HashSet<Selector>,
    screenshot: Vec<u8>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            active: true,
            elements: Vec::new(),
            current_frame: None,
            frame_log: Vec::new(),
            ready_states: HashMap::new(),
            title: Sequence::constant(String::new()),
            url: Sequence::constant("about:blank".to_string()),
            window_counts: Sequence::constant(1),
            alert: None,
            alert_input: None,
            scripts: Vec::new(),
            executed: Vec::new(),
            clicks: Vec::new(),
            hidden: HashMap::new(),
            invalid: HashSet::new(),
            screenshot: MOCK_SCREENSHOT.to_vec(),
        }
    }
}

impl MockState {
    fn element_mut(&mut self, id: &str) -> Option<&mut MockElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    fn matching(
        &mut self,
        selector: &Selector,
        parent: Option<&str>,
    ) -> ProbeResult<Vec<ElementHandle>> {
        if self.invalid.contains(selector) {
            return Err(ProbeError::InvalidSelector {
                selector: selector.to_string(),
                message: "rejected by the browser".to_string(),
            });
        }
        if let Some(remaining) = self.hidden.get_mut(selector) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(Vec::new());
            }
        }
        let frame = self.current_frame.clone();
        Ok(self
            .elements
            .iter()
            .filter(|e| e.attached && e.frame == frame)
            .filter(|e| e.selectors.contains(selector))
            .filter(|e| parent.map_or(true, |p| e.parent.as_deref() == Some(p)))
            .map(|e| ElementHandle::new(e.id.clone()))
            .collect())
    }
}

/// In-memory [`BrowserSession`] for tests
#[derive(Debug, Default)]
pub struct MockSession {
    state: Mutex<MockState>,
    find_calls: AtomicUsize,
}

impl MockSession {
    /// Create an empty session on `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live_state(&self) -> ProbeResult<MutexGuard<'_, MockState>> {
        let state = self.state();
        if state.active {
            Ok(state)
        } else {
            Err(ProbeError::session_lost("session has been quit"))
        }
    }

    fn insert(&self, selector: Selector, parent: Option<String>, frame: Option<String>) -> ElementHandle {
        let mut state = self.state();
        let id = format!("mock-{}", state.elements.len() + 1);
        state
            .elements
            .push(MockElement::new(id.clone(), selector, parent, frame));
        ElementHandle::new(id)
    }

    fn with_element<T>(
        &self,
        handle: &ElementHandle,
        f: impl FnOnce(&mut MockElement) -> T,
    ) -> ProbeResult<T> {
        let mut state = self.live_state()?;
        let element = state
            .element_mut(&handle.id)
            .ok_or_else(|| ProbeError::stale(format!("unknown element {}", handle.id)))?;
        if !element.attached {
            return Err(ProbeError::stale(format!("element {} is detached", handle.id)));
        }
        if element.stale_reads > 0 {
            element.stale_reads -= 1;
            return Err(ProbeError::stale(format!("element {} was re-rendered", handle.id)));
        }
        Ok(f(element))
    }

    fn configure(&self, handle: &ElementHandle, f: impl FnOnce(&mut MockElement)) {
        if let Some(element) = self.state().element_mut(&handle.id) {
            f(element);
        }
    }

    // -------------------------------------------------------------------------
    // Element setup
    // -------------------------------------------------------------------------

    /// Add a top-level element in the current document matching `selector`
    pub fn add_element(&self, selector: Selector) -> ElementHandle {
        let frame = self.state().current_frame.clone();
        self.insert(selector, None, frame)
    }

    /// Add an element below `parent`
    pub fn add_child(&self, parent: &ElementHandle, selector: Selector) -> ElementHandle {
        let frame = self
            .state()
            .elements
            .iter()
            .find(|e| e.id == parent.id)
            .and_then(|e| e.frame.clone());
        self.insert(selector, Some(parent.id.clone()), frame)
    }

    /// Add an element inside the document of iframe `frame`
    pub fn add_element_in_frame(&self, frame: &ElementHandle, selector: Selector) -> ElementHandle {
        self.insert(selector, None, Some(frame.id.clone()))
    }

    /// Add an `iframe` element to the top-level document
    pub fn add_iframe(&self) -> ElementHandle {
        self.insert(Selector::tag_name("iframe"), None, None)
    }

    /// Make an existing element also match `selector`
    pub fn also_matches(&self, handle: &ElementHandle, selector: Selector) {
        self.configure(handle, |e| e.selectors.push(selector));
    }

    /// Add an `option` child with the given text and value
    pub fn add_option(&self, select: &ElementHandle, text: &str, value: &str) -> ElementHandle {
        let option = self.add_child(select, Selector::tag_name("option"));
        self.set_text(&option, text);
        self.set_attribute(&option, "value", value);
        option
    }

    /// Set the element text
    pub fn set_text(&self, handle: &ElementHandle, text: &str) {
        self.configure(handle, |e| e.text = Sequence::constant(text.to_string()));
    }

    /// Successive text values, one per read
    pub fn set_text_sequence(&self, handle: &ElementHandle, texts: &[&str]) {
        self.configure(handle, |e| {
            e.text = Sequence::of(texts.iter().map(|t| (*t).to_string()), String::new());
        });
    }

    /// Set an attribute
    pub fn set_attribute(&self, handle: &ElementHandle, name: &str, value: &str) {
        self.configure(handle, |e| {
            let _ = e.attributes.insert(name.to_string(), value.to_string());
        });
    }

    /// Remove an attribute
    pub fn remove_attribute(&self, handle: &ElementHandle, name: &str) {
        self.configure(handle, |e| {
            let _ = e.attributes.remove(name);
        });
    }

    /// Set whether the element is rendered
    pub fn set_displayed(&self, handle: &ElementHandle, displayed: bool) {
        self.configure(handle, |e| e.displayed = Sequence::constant(displayed));
    }

    /// Successive visibility values, one per read
    pub fn set_displayed_sequence(&self, handle: &ElementHandle, values: &[bool]) {
        self.configure(handle, |e| {
            e.displayed = Sequence::of(values.iter().copied(), true);
        });
    }

    /// Set whether the element accepts input
    pub fn set_enabled(&self, handle: &ElementHandle, enabled: bool) {
        self.configure(handle, |e| e.enabled = enabled);
    }

    /// Set the selection state
    pub fn set_selected(&self, handle: &ElementHandle, selected: bool) {
        self.configure(handle, |e| e.selected = selected);
    }

    /// Remove the element from the DOM; later reads are stale
    pub fn detach(&self, handle: &ElementHandle) {
        self.configure(handle, |e| e.attached = false);
    }

    /// Fail the next `reads` operations on the element as stale
    pub fn stale_for(&self, handle: &ElementHandle, reads: usize) {
        self.configure(handle, |e| e.stale_reads = reads);
    }

    /// Navigate to `url` when the element is clicked
    pub fn navigate_on_click(&self, handle: &ElementHandle, url: &str) {
        self.configure(handle, |e| e.navigate_on_click = Some(url.to_string()));
    }

    /// Hide matches of `selector` from the next `lookups` searches
    pub fn appear_after(&self, selector: &Selector, lookups: usize) {
        let _ = self.state().hidden.insert(selector.clone(), lookups);
    }

    /// Reject searches for `selector` as malformed
    pub fn reject_selector(&self, selector: &Selector) {
        let _ = self.state().invalid.insert(selector.clone());
    }

    // -------------------------------------------------------------------------
    // Page setup
    // -------------------------------------------------------------------------

    /// Set the title
    pub fn set_title(&self, title: &str) {
        self.state().title = Sequence::constant(title.to_string());
    }

    /// Successive titles, one per read
    pub fn set_title_sequence(&self, titles: &[&str]) {
        self.state().title = Sequence::of(titles.iter().map(|t| (*t).to_string()), String::new());
    }

    /// Set the current URL
    pub fn set_url(&self, url: &str) {
        self.state().url = Sequence::constant(url.to_string());
    }

    /// Successive window counts, one per read
    pub fn set_window_counts(&self, counts: &[usize]) {
        self.state().window_counts = Sequence::of(counts.iter().copied(), 1);
    }

    /// Successive ready states of the top document, or of `frame`'s document
    pub fn set_ready_states(&self, frame: Option<&ElementHandle>, states: &[&str]) {
        let key = frame.map(|f| f.id.clone());
        let _ = self.state().ready_states.insert(
            key,
            Sequence::of(states.iter().map(|s| (*s).to_string()), "complete".to_string()),
        );
    }

    /// Open an alert with `text`
    pub fn open_alert(&self, text: &str) {
        self.state().alert = Some(text.to_string());
    }

    /// Bytes returned by later screenshots
    pub fn set_screenshot(&self, png: &[u8]) {
        self.state().screenshot = png.to_vec();
    }

    /// Answer scripts containing `fragment` with `value`
    pub fn on_script(&self, fragment: &str, value: Value) {
        self.on_script_sequence(fragment, vec![value]);
    }

    /// Answer scripts containing `fragment` with successive values
    pub fn on_script_sequence(&self, fragment: &str, values: Vec<Value>) {
        self.state()
            .scripts
            .push((fragment.to_string(), Sequence::of(values, Value::Null)));
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Number of `find_element`/`find_elements` calls so far
    #[must_use]
    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Clicked elements, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<ElementHandle> {
        self.state().clicks.iter().map(ElementHandle::new).collect()
    }

    /// Executed scripts, in order
    #[must_use]
    pub fn executed_scripts(&self) -> Vec<String> {
        self.state().executed.clone()
    }

    /// Frame switches, in order (`"default"` for the top document)
    #[must_use]
    pub fn frame_log(&self) -> Vec<String> {
        self.state().frame_log.clone()
    }

    /// Id of the frame currently switched into
    #[must_use]
    pub fn current_frame(&self) -> Option<String> {
        self.state().current_frame.clone()
    }

    /// Current attribute value without consuming anything
    #[must_use]
    pub fn attribute(&self, handle: &ElementHandle, name: &str) -> Option<String> {
        self.state()
            .elements
            .iter()
            .find(|e| e.id == handle.id)
            .and_then(|e| e.attributes.get(name).cloned())
    }

    /// Whether the element is currently selected
    #[must_use]
    pub fn selected(&self, handle: &ElementHandle) -> bool {
        self.state()
            .elements
            .iter()
            .any(|e| e.id == handle.id && e.selected)
    }

    /// Text sent to the last prompt
    #[must_use]
    pub fn alert_input(&self) -> Option<String> {
        self.state().alert_input.clone()
    }

    /// Whether an alert is open
    #[must_use]
    pub fn alert_open(&self) -> bool {
        self.state().alert.is_some()
    }

    fn builtin_script(state: &mut MockState, code: &str, args: &[ScriptArg]) -> Value {
        let target = match args.first() {
            Some(ScriptArg::Element(handle)) => state.element_mut(&handle.id),
            _ => None,
        };
        match (code, target) {
            (scripts::OFFSET_PARENT_VISIBLE, Some(e)) => {
                Value::Bool(e.displayed.current().copied().unwrap_or(false))
            }
            (scripts::ATTRIBUTE_NAMES, Some(e)) => {
                let mut names: Vec<&String> = e.attributes.keys().collect();
                names.sort();
                Value::from(names.into_iter().cloned().collect::<Vec<_>>())
            }
            (scripts::ATTRIBUTE_VALUE, Some(e)) => {
                let name = args.get(1).map(ScriptArg::to_value);
                name.as_ref()
                    .and_then(Value::as_str)
                    .and_then(|n| e.attributes.get(n))
                    .map_or(Value::Null, |v| Value::String(v.clone()))
            }
            _ => Value::Null,
        }
    }
}

impl BrowserSession for MockSession {
    fn find_element(&self, selector: &Selector) -> ProbeResult<ElementHandle> {
        let _ = self.find_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.live_state()?;
        state
            .matching(selector, None)?
            .into_iter()
            .next()
            .ok_or_else(|| ProbeError::no_such_element(selector.to_string()))
    }

    fn find_elements(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>> {
        let _ = self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.live_state()?.matching(selector, None)
    }

    fn find_child_elements(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ProbeResult<Vec<ElementHandle>> {
        self.with_element(parent, |_| ())?;
        self.live_state()?.matching(selector, Some(&parent.id))
    }

    fn execute_script(&self, code: &str, args: &[ScriptArg]) -> ProbeResult<Value> {
        let mut state = self.live_state()?;
        state.executed.push(code.to_string());
        if let Some(ScriptArg::Element(handle)) = args.first() {
            let attached = state
                .elements
                .iter()
                .any(|e| e.id == handle.id && e.attached);
            if !attached {
                return Err(ProbeError::stale(format!("element {} is detached", handle.id)));
            }
        }
        if let Some((_, responses)) = state
            .scripts
            .iter_mut()
            .find(|(fragment, _)| code.contains(fragment.as_str()))
        {
            return Ok(responses.next().unwrap_or(Value::Null));
        }
        Ok(Self::builtin_script(&mut state, code, args))
    }

    fn ready_state(&self) -> ProbeResult<String> {
        let mut state = self.live_state()?;
        let frame = state.current_frame.clone();
        Ok(state
            .ready_states
            .get_mut(&frame)
            .and_then(Sequence::next)
            .unwrap_or_else(|| "complete".to_string()))
    }

    fn element_text(&self, element: &ElementHandle) -> ProbeResult<String> {
        self.with_element(element, |e| e.text.next().unwrap_or_default())
    }

    fn element_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> ProbeResult<Option<String>> {
        self.with_element(element, |e| e.attributes.get(name).cloned())
    }

    fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.with_element(element, |e| e.displayed.next().unwrap_or(false))
    }

    fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.with_element(element, |e| e.enabled)
    }

    fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool> {
        self.with_element(element, |e| e.selected)
    }

    fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        let (interactable, is_option, parent, navigate) = self.with_element(element, |e| {
            (
                e.enabled && e.displayed.current().copied().unwrap_or(false),
                e.is_option(),
                e.parent.clone(),
                e.navigate_on_click.clone(),
            )
        })?;
        if !interactable {
            return Err(ProbeError::ElementNotInteractable {
                message: format!("element {} cannot be clicked", element.id),
            });
        }

        let mut state = self.live_state()?;
        state.clicks.push(element.id.clone());
        if let Some(url) = navigate {
            state.url = Sequence::constant(url);
        }
        if is_option {
            let multiple = parent
                .as_deref()
                .and_then(|p| state.elements.iter().find(|e| e.id == p))
                .is_some_and(|p| p.attributes.contains_key("multiple"));
            for e in &mut state.elements {
                if e.id == element.id {
                    e.selected = if multiple { !e.selected } else { true };
                } else if !multiple && e.parent.is_some() && e.parent == parent {
                    e.selected = false;
                }
            }
        }
        Ok(())
    }

    fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let result = self.with_element(element, |e| {
            if !e.enabled {
                return false;
            }
            let value = e.attributes.entry("value".to_string()).or_default();
            for c in text.chars() {
                match c {
                    KEY_BACKSPACE => {
                        let _ = value.pop();
                    }
                    KEY_ENTER => {}
                    other => value.push(other),
                }
            }
            true
        })?;
        if result {
            Ok(())
        } else {
            Err(ProbeError::ElementNotInteractable {
                message: format!("element {} is disabled", element.id),
            })
        }
    }

    fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        self.with_element(element, |e| {
            let _ = e.attributes.insert("value".to_string(), String::new());
        })
    }

    fn title(&self) -> ProbeResult<String> {
        Ok(self.live_state()?.title.next().unwrap_or_default())
    }

    fn current_url(&self) -> ProbeResult<String> {
        Ok(self.live_state()?.url.next().unwrap_or_default())
    }

    fn navigate(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.live_state()?;
        state.url = Sequence::constant(url.to_string());
        state.current_frame = None;
        Ok(())
    }

    fn window_count(&self) -> ProbeResult<usize> {
        Ok(self.live_state()?.window_counts.next().unwrap_or(1))
    }

    fn switch_to_frame(&self, frame: &FrameRef) -> ProbeResult<()> {
        let mut state = self.live_state()?;
        let current = state.current_frame.clone();
        let iframes: Vec<&MockElement> = state
            .elements
            .iter()
            .filter(|e| e.attached && e.frame == current)
            .filter(|e| e.selectors.contains(&Selector::tag_name("iframe")))
            .collect();
        let target = match frame {
            FrameRef::Index(i) => iframes.get(*i).map(|e| e.id.clone()),
            FrameRef::Name(name) => iframes
                .iter()
                .find(|e| {
                    e.attributes.get("name") == Some(name) || e.attributes.get("id") == Some(name)
                })
                .map(|e| e.id.clone()),
            FrameRef::Element(handle) => iframes
                .iter()
                .find(|e| e.id == handle.id)
                .map(|e| e.id.clone()),
        };
        let id = target.ok_or_else(|| ProbeError::NoSuchFrame {
            frame: frame.to_string(),
        })?;
        state.frame_log.push(id.clone());
        state.current_frame = Some(id);
        Ok(())
    }

    fn switch_to_default_content(&self) -> ProbeResult<()> {
        let mut state = self.live_state()?;
        state.frame_log.push("default".to_string());
        state.current_frame = None;
        Ok(())
    }

    fn alert_text(&self) -> ProbeResult<String> {
        self.live_state()?.alert.clone().ok_or(ProbeError::NoAlert)
    }

    fn accept_alert(&self) -> ProbeResult<()> {
        self.live_state()?
            .alert
            .take()
            .map(|_| ())
            .ok_or(ProbeError::NoAlert)
    }

    fn dismiss_alert(&self) -> ProbeResult<()> {
        self.accept_alert()
    }

    fn send_alert_text(&self, text: &str) -> ProbeResult<()> {
        let mut state = self.live_state()?;
        if state.alert.is_none() {
            return Err(ProbeError::NoAlert);
        }
        state.alert_input = Some(text.to_string());
        Ok(())
    }

    fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        Ok(self.live_state()?.screenshot.clone())
    }

    fn is_active(&self) -> bool {
        self.state().active
    }

    fn quit(&self) -> ProbeResult<()> {
        self.state().active = false;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::result::ErrorKind;
    use serde_json::json;

    mod element_tests {
        use super::*;

        #[test]
        fn test_find_missing_element() {
            let session = MockSession::new();
            let err = session.find_element(&Selector::id("nope")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NoSuchElement);
            assert_eq!(session.find_calls(), 1);
        }

        #[test]
        fn test_sequences_stick_on_last_value() {
            let session = MockSession::new();
            let h = session.add_element(Selector::class_name("title"));
            session.set_text_sequence(&h, &["Loading", "Products"]);
            assert_eq!(session.element_text(&h).unwrap(), "Loading");
            assert_eq!(session.element_text(&h).unwrap(), "Products");
            assert_eq!(session.element_text(&h).unwrap(), "Products");
        }

        #[test]
        fn test_detached_element_is_stale() {
            let session = MockSession::new();
            let h = session.add_element(Selector::id("cart"));
            session.detach(&h);
            assert_eq!(
                session.is_displayed(&h).unwrap_err().kind(),
                ErrorKind::StaleElement
            );
            assert!(session.find_elements(&Selector::id("cart")).unwrap().is_empty());
        }

        #[test]
        fn test_stale_for_counts_down() {
            let session = MockSession::new();
            let h = session.add_element(Selector::id("cart"));
            session.stale_for(&h, 1);
            assert!(session.is_displayed(&h).is_err());
            assert!(session.is_displayed(&h).unwrap());
        }

        #[test]
        fn test_appear_after() {
            let session = MockSession::new();
            let selector = Selector::id("late");
            let _ = session.add_element(selector.clone());
            session.appear_after(&selector, 2);
            assert!(session.find_element(&selector).is_err());
            assert!(session.find_element(&selector).is_err());
            assert!(session.find_element(&selector).is_ok());
        }

        #[test]
        fn test_send_keys_and_backspace() {
            let session = MockSession::new();
            let h = session.add_element(Selector::id("user-name"));
            session.send_keys(&h, "abc").unwrap();
            session.send_keys(&h, &KEY_BACKSPACE.to_string()).unwrap();
            assert_eq!(session.attribute(&h, "value").as_deref(), Some("ab"));
            session.clear(&h).unwrap();
            assert_eq!(session.attribute(&h, "value").as_deref(), Some(""));
        }

        #[test]
        fn test_click_hidden_element_fails() {
            let session = MockSession::new();
            let h = session.add_element(Selector::id("finish"));
            session.set_displayed(&h, false);
            assert_eq!(
                session.click(&h).unwrap_err().kind(),
                ErrorKind::ElementNotInteractable
            );
        }

        #[test]
        fn test_single_select_option_click() {
            let session = MockSession::new();
            let select = session.add_element(Selector::tag_name("select"));
            let a = session.add_option(&select, "A to Z", "az");
            let b = session.add_option(&select, "Z to A", "za");
            session.click(&a).unwrap();
            session.click(&b).unwrap();
            assert!(!session.selected(&a));
            assert!(session.selected(&b));
        }
    }

    mod page_tests {
        use super::*;

        #[test]
        fn test_frames_scope_lookups() {
            let session = MockSession::new();
            let frame = session.add_iframe();
            let _ = session.add_element_in_frame(&frame, Selector::id("inner"));
            assert!(session.find_element(&Selector::id("inner")).is_err());
            session.switch_to_frame(&FrameRef::Index(0)).unwrap();
            assert!(session.find_element(&Selector::id("inner")).is_ok());
            session.switch_to_default_content().unwrap();
            assert_eq!(session.frame_log(), vec![frame.id, "default".to_string()]);
        }

        #[test]
        fn test_missing_frame() {
            let session = MockSession::new();
            let err = session
                .switch_to_frame(&FrameRef::Name("ads".into()))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NoSuchFrame);
        }

        #[test]
        fn test_alerts() {
            let session = MockSession::new();
            assert_eq!(session.alert_text().unwrap_err().kind(), ErrorKind::NoAlert);
            session.open_alert("Are you sure?");
            session.send_alert_text("yes").unwrap();
            assert_eq!(session.alert_text().unwrap(), "Are you sure?");
            session.accept_alert().unwrap();
            assert!(!session.alert_open());
            assert_eq!(session.alert_input().as_deref(), Some("yes"));
        }

        #[test]
        fn test_script_responses() {
            let session = MockSession::new();
            session.on_script_sequence(scripts::JQUERY_IDLE, vec![json!(false), json!(true)]);
            assert_eq!(session.execute_script(scripts::JQUERY_IDLE, &[]).unwrap(), json!(false));
            assert_eq!(session.execute_script(scripts::JQUERY_IDLE, &[]).unwrap(), json!(true));
            assert_eq!(session.execute_script("return 1", &[]).unwrap(), Value::Null);
            assert_eq!(session.executed_scripts().len(), 3);
        }

        #[test]
        fn test_builtin_attribute_names() {
            let session = MockSession::new();
            let h = session.add_element(Selector::id("x"));
            session.set_attribute(&h, "data-test", "1");
            session.set_attribute(&h, "class", "btn");
            let names = session
                .execute_script(scripts::ATTRIBUTE_NAMES, &[ScriptArg::from(&h)])
                .unwrap();
            assert_eq!(names, json!(["class", "data-test"]));
        }

        #[test]
        fn test_quit_loses_session() {
            let session = MockSession::new();
            session.quit().unwrap();
            assert!(!session.is_active());
            assert_eq!(session.title().unwrap_err().kind(), ErrorKind::SessionLost);
        }

        #[test]
        fn test_ready_state_default_complete() {
            let session = MockSession::new();
            session.set_ready_states(None, &["loading", "complete"]);
            assert_eq!(session.ready_state().unwrap(), "loading");
            assert_eq!(session.ready_state().unwrap(), "complete");
        }
    }
}
