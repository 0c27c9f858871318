//! JavaScript snippets executed through [`BrowserSession::execute_script`].
//!
//! Kept apart from the waits so the poller only ever sees booleans, strings
//! and element lists. Snippets take their inputs through `arguments[n]`; the
//! few that need a literal (filters with embedded text) build it with
//! [`js_string`].
//!
//! [`BrowserSession::execute_script`]: crate::session::BrowserSession::execute_script

/// `document.readyState` of the current context
pub const READY_STATE: &str = "return document.readyState";

/// Whether jQuery is loaded in the page
pub const JQUERY_PRESENT: &str = "return typeof(jQuery) != 'undefined'";

/// Whether jQuery has no requests in flight
pub const JQUERY_IDLE: &str = "return jQuery.active == 0";

/// Whether `arguments[0]` takes part in layout
pub const OFFSET_PARENT_VISIBLE: &str = "return arguments[0].offsetParent !== null";

/// Attribute names of `arguments[0]`
pub const ATTRIBUTE_NAMES: &str = "return arguments[0].getAttributeNames()";

/// Value of attribute `arguments[1]` on `arguments[0]`
pub const ATTRIBUTE_VALUE: &str = "return arguments[0].getAttribute(arguments[1])";

/// First match of CSS `arguments[1]` inside the shadow root of `arguments[0]`
pub const SHADOW_ROOT_QUERY: &str =
    "var root = arguments[0].shadowRoot; return root ? root.querySelector(arguments[1]) : null";

/// Elements with tag `arguments[0]` whose trimmed text equals `arguments[1]`
pub const TAG_WITH_TEXT: &str = "var tag = arguments[0], text = arguments[1]; \
     return Array.prototype.slice.call(document.getElementsByTagName(tag))\
     .filter(function (e) { return e.textContent.trim() === text; })";

/// Nearest ancestor of `arguments[0]` matching CSS `arguments[1]`
pub const CLOSEST_PARENT: &str =
    "var p = arguments[0].parentElement; return p ? p.closest(arguments[1]) : null";

/// Filter body keeping enabled, writable, rendered inputs
pub const ACTIVE_INPUT_FILTER: &str =
    "return !i.disabled && !i.readOnly && i.offsetParent !== null;";

/// Click `arguments[0]` without pointer simulation
pub const CLICK: &str = "arguments[0].click();";

/// Dispatch a double click on `arguments[0]`
pub const DOUBLE_CLICK: &str = "var ev = new MouseEvent('dblclick', \
     {bubbles: true, cancelable: true, view: window}); arguments[0].dispatchEvent(ev);";

/// Set the value of `arguments[0]` to `arguments[1]`
pub const WRITE_VALUE: &str = "arguments[0].value = arguments[1];";

/// Focus `arguments[0]`
pub const FOCUS: &str = "arguments[0].focus();";

/// Dispatch mouseover on `arguments[0]`
pub const MOUSE_OVER: &str = "var ev = new MouseEvent('mouseover', \
     {bubbles: true, cancelable: true, view: window}); arguments[0].dispatchEvent(ev);";

/// Scroll `arguments[0]` into view
pub const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView(true);";

/// Scroll the window by `arguments[0]` pixels vertically
pub const SCROLL_BY: &str = "window.scrollBy(0, arguments[0]);";

/// Navigate the window to `arguments[0]`
pub const NAVIGATE: &str = "window.location.href = arguments[0];";

/// Set `window[arguments[0]] = arguments[1]`
pub const SET_WINDOW_VARIABLE: &str = "window[arguments[0]] = arguments[1];";

/// Filter body used when the caller gives none
pub const ACCEPT_ALL_FILTER: &str = "return true;";

/// Quote `value` as a JavaScript string literal
#[must_use]
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn filter_body(filter: &str) -> &str {
    if filter.trim().is_empty() {
        ACCEPT_ALL_FILTER
    } else {
        filter
    }
}

fn container(in_element: bool) -> &'static str {
    if in_element {
        "arguments[0]"
    } else {
        "document"
    }
}

/// Elements matching CSS `arguments[1]` under the container that pass
/// `filter`, a function body over the candidate `i`.
///
/// The container is `arguments[0]` when `in_element`, otherwise `document`.
#[must_use]
pub fn selector_filter_elements(in_element: bool, filter: &str) -> String {
    format!(
        "return Array.prototype.slice.call({}.querySelectorAll(arguments[1]))\
         .filter(function (i) {{ {} }})",
        container(in_element),
        filter_body(filter)
    )
}

/// Whether at least one element passes [`selector_filter_elements`]
#[must_use]
pub fn selector_filter_exists(in_element: bool, filter: &str) -> String {
    format!("{}.length > 0", selector_filter_elements(in_element, filter))
}

/// Filter body keeping buttons whose trimmed text equals `text`
#[must_use]
pub fn button_text_filter(text: &str) -> String {
    format!("return i.textContent.trim() === {};", js_string(text))
}
