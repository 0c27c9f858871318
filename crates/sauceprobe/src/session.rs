//! Browser session capability.
//!
//! [`BrowserSession`] is the seam between this crate and whatever automation
//! library actually drives the browser. Nothing here speaks a wire protocol;
//! implementations wrap a WebDriver client, a CDP connection or, in tests,
//! [`MockSession`](crate::mock::MockSession).

use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which W3C WebDriver serializes element references
pub const W3C_ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// WebDriver key code for Backspace
pub const KEY_BACKSPACE: char = '\u{e003}';

/// WebDriver key code for Enter
pub const KEY_ENTER: char = '\u{e007}';

/// Opaque reference to a DOM element owned by the session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Session-assigned element id
    pub id: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Serialize as a script argument / return value
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({ W3C_ELEMENT_KEY: self.id })
    }

    /// Parse a serialized element reference
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .get(W3C_ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(Self::new)
    }

    /// Parse a script result that is a list of element references
    pub fn list_from_value(value: &Value) -> ProbeResult<Vec<Self>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    Self::from_value(item).ok_or_else(|| {
                        ProbeError::script(format!("expected element reference, got {item}"))
                    })
                })
                .collect(),
            other => Self::from_value(other)
                .map(|e| vec![e])
                .ok_or_else(|| ProbeError::script(format!("expected element list, got {other}"))),
        }
    }
}

/// Argument passed to a remote script as `arguments[n]`
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptArg {
    /// Element reference
    Element(ElementHandle),
    /// Plain JSON value
    Value(Value),
    /// JavaScript null
    Null,
}

impl ScriptArg {
    /// Create a string argument
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Value(Value::String(value.into()))
    }

    /// Serialize for transport
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Element(handle) => handle.to_value(),
            Self::Value(value) => value.clone(),
            Self::Null => Value::Null,
        }
    }
}

impl From<ElementHandle> for ScriptArg {
    fn from(handle: ElementHandle) -> Self {
        Self::Element(handle)
    }
}

impl From<&ElementHandle> for ScriptArg {
    fn from(handle: &ElementHandle) -> Self {
        Self::Element(handle.clone())
    }
}

impl From<Option<&ElementHandle>> for ScriptArg {
    fn from(handle: Option<&ElementHandle>) -> Self {
        handle.map_or(Self::Null, |h| Self::Element(h.clone()))
    }
}

impl From<&str> for ScriptArg {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

impl From<String> for ScriptArg {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<Value> for ScriptArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Frame to switch into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameRef {
    /// Zero-based index among the page's frames
    Index(usize),
    /// Frame name or id attribute
    Name(String),
    /// Frame element
    Element(ElementHandle),
}

impl std::fmt::Display for FrameRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "frame #{i}"),
            Self::Name(name) => write!(f, "frame '{name}'"),
            Self::Element(e) => write!(f, "frame element {}", e.id),
        }
    }
}

/// Capability to observe and drive one browser session.
///
/// All methods take `&self`; implementations hold whatever interior state
/// their transport needs.
pub trait BrowserSession {
    /// Find the first element matching `selector`
    fn find_element(&self, selector: &Selector) -> ProbeResult<ElementHandle>;

    /// Find every element matching `selector` (empty when none)
    fn find_elements(&self, selector: &Selector) -> ProbeResult<Vec<ElementHandle>>;

    /// Find every element matching `selector` below `parent`
    fn find_child_elements(
        &self,
        parent: &ElementHandle,
        selector: &Selector,
    ) -> ProbeResult<Vec<ElementHandle>>;

    /// Run `code` in the page with `args` bound to `arguments`
    fn execute_script(&self, code: &str, args: &[ScriptArg]) -> ProbeResult<Value>;

    /// `document.readyState` of the current browsing context
    fn ready_state(&self) -> ProbeResult<String> {
        let value = self.execute_script(crate::scripts::READY_STATE, &[])?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Rendered text of an element
    fn element_text(&self, element: &ElementHandle) -> ProbeResult<String>;

    /// Attribute value, `None` when absent
    fn element_attribute(&self, element: &ElementHandle, name: &str)
        -> ProbeResult<Option<String>>;

    /// Whether the element is rendered
    fn is_displayed(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Whether the element accepts input
    fn is_enabled(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Whether a checkbox, radio or option is selected
    fn is_selected(&self, element: &ElementHandle) -> ProbeResult<bool>;

    /// Click the element
    fn click(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Type into the element
    fn send_keys(&self, element: &ElementHandle, text: &str) -> ProbeResult<()>;

    /// Clear an input
    fn clear(&self, element: &ElementHandle) -> ProbeResult<()>;

    /// Page title
    fn title(&self) -> ProbeResult<String>;

    /// Current URL
    fn current_url(&self) -> ProbeResult<String>;

    /// Navigate the top-level context
    fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// Number of open windows
    fn window_count(&self) -> ProbeResult<usize>;

    /// Switch the browsing context into a frame
    fn switch_to_frame(&self, frame: &FrameRef) -> ProbeResult<()>;

    /// Switch back to the top-level document
    fn switch_to_default_content(&self) -> ProbeResult<()>;

    /// Text of the open alert
    fn alert_text(&self) -> ProbeResult<String>;

    /// Accept the open alert
    fn accept_alert(&self) -> ProbeResult<()>;

    /// Dismiss the open alert
    fn dismiss_alert(&self) -> ProbeResult<()>;

    /// Type into the open prompt
    fn send_alert_text(&self, text: &str) -> ProbeResult<()>;

    /// PNG screenshot of the viewport
    fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Whether the session can still take commands
    fn is_active(&self) -> bool;

    /// End the session
    fn quit(&self) -> ProbeResult<()>;
}
