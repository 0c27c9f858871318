//! sauceprobe: polling waits and page objects for storefront end-to-end tests
//!
//! Browser-driven scenarios spend most of their time waiting: for a page to
//! finish loading, for an element to become clickable, for a title to change.
//! This crate puts every one of those waits on a single engine,
//! [`ConditionPoller`], and layers the storefront's page objects, step
//! definitions and scenario hooks on top of it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Steps        │──►│ Page objects │──►│ Actions /    │──►│ Condition    │
//! │ (expressions)│   │ (storefront) │   │ Waits        │   │ Poller       │
//! └──────────────┘   └──────────────┘   └──────┬───────┘   └──────┬───────┘
//!                                              │                  │
//!                                       ┌──────▼───────┐   ┌──────▼───────┐
//!                                       │ Browser      │   │ Clock        │
//!                                       │ Session      │   │              │
//!                                       └──────────────┘   └──────────────┘
//! ```
//!
//! The browser itself sits behind [`BrowserSession`]; [`MockSession`] is an
//! in-memory implementation for tests.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod actions;
mod clock;
mod command;
mod config;
mod locator;
mod mock;
mod page_object;
mod reachability;
mod result;
mod session;
mod wait;
mod waits;

/// Flat test-data files (JSON, YAML, CSV)
pub mod data;

/// Scenario lifecycle hooks and the reporting sink
pub mod hooks;

/// Ordering checks for listed values
pub mod ordering;

/// Storefront page objects
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod pages;

/// JavaScript snippets run through the browser session
pub mod scripts;

/// Step definitions
pub mod steps;

pub use actions::{Actions, OptionMatch};
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{run_command, CommandOutput};
pub use config::{ProbeConfig, ENV_PREFIX};
pub use locator::{ElementRef, Selector};
pub use mock::{MockSession, MOCK_SCREENSHOT};
pub use page_object::{
    url_path, PageObject, PageObjectBuilder, PageObjectInfo, PageRegistry, SimplePageObject,
    UrlMatcher, DEFAULT_LOAD_TIMEOUT_MS,
};
pub use reachability::{Probe, ReachabilityCache, TcpProbe, DEFAULT_PROBE_TIMEOUT, ECHO_PORT};
pub use result::{ErrorKind, ProbeError, ProbeResult};
pub use session::{
    BrowserSession, ElementHandle, FrameRef, ScriptArg, KEY_BACKSPACE, KEY_ENTER, W3C_ELEMENT_KEY,
};
pub use wait::{
    wait_until, CancelToken, ConditionPoller, PollOutcome, TimeoutReport, WaitSpec,
    DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT,
};
pub use waits::{default_element_spec, Waits, DEFAULT_IGNORED_KINDS};

/// Common imports for scenario code
pub mod prelude {
    pub use super::data::{Credentials, TestData};
    pub use super::hooks::{Scenario, ScenarioHooks, ScenarioReporter};
    pub use super::pages::{assert_on_page, StorefrontPage};
    pub use super::steps::{storefront_steps, StepRegistry, StorefrontWorld};
    pub use super::{
        Actions, BrowserSession, Clock, ConditionPoller, ElementRef, PollOutcome, ProbeConfig,
        ProbeError, ProbeResult, Selector, SystemClock, WaitSpec, Waits,
    };
}
