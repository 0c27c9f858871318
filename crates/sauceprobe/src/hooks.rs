//! Scenario lifecycle hooks.
//!
//! [`ScenarioHooks`] is driven by whatever runs the scenarios: call
//! [`before_scenario`](ScenarioHooks::before_scenario) first,
//! [`after_step`](ScenarioHooks::after_step) after every step and
//! [`after_scenario`](ScenarioHooks::after_scenario) last. Attachments go to a
//! [`ScenarioReporter`].

use crate::result::{ProbeError, ProbeResult};
use crate::session::BrowserSession;
use chrono::NaiveDateTime;
use tracing::{info, warn};

/// Longest screenshot file name, in characters
pub const MAX_SCREENSHOT_NAME_LEN: usize = 170;

/// Tag marking scenarios that drive a browser
pub const DEFAULT_UI_TAG: &str = "@ui";

/// Sink for scenario attachments
pub trait ScenarioReporter {
    /// Attach `data` of MIME type `mime` under `label`
    fn attach(&mut self, data: &[u8], mime: &str, label: &str);
}

/// One recorded attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Raw bytes
    pub data: Vec<u8>,
    /// MIME type
    pub mime: String,
    /// Label
    pub label: String,
}

/// Reporter that keeps attachments in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    /// Attachments in arrival order
    pub attachments: Vec<Attachment>,
}

impl RecordingReporter {
    /// Create an empty reporter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attachments with the given MIME type
    pub fn with_mime<'a>(&'a self, mime: &'a str) -> impl Iterator<Item = &'a Attachment> + 'a {
        self.attachments.iter().filter(move |a| a.mime == mime)
    }
}

impl ScenarioReporter for RecordingReporter {
    fn attach(&mut self, data: &[u8], mime: &str, label: &str) {
        self.attachments.push(Attachment {
            data: data.to_vec(),
            mime: mime.to_string(),
            label: label.to_string(),
        });
    }
}

/// What the hooks need to know about the running scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Scenario title
    pub name: String,
    /// Tags including the leading `@`
    pub tags: Vec<String>,
}

impl Scenario {
    /// Create a scenario description
    #[must_use]
    pub fn new(name: impl Into<String>, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether any tag equals one of `tags`, ignoring case
    #[must_use]
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags
            .iter()
            .any(|t| tags.iter().any(|u| t.eq_ignore_ascii_case(u)))
    }
}

/// Screenshot file name: `yy_MM_dd_HH_mm_ss` followed by the scenario name
/// with unsafe characters replaced, cut to [`MAX_SCREENSHOT_NAME_LEN`]
#[must_use]
pub fn screenshot_file_name(scenario: &str, at: NaiveDateTime) -> String {
    let safe: String = scenario
        .chars()
        .filter_map(|c| match c {
            ' ' | '<' | '>' | '&' | ':' | '\'' => Some('_'),
            '"' | '/' => None,
            other => Some(other),
        })
        .collect();
    format!("{}{safe}", at.format("%y_%m_%d_%H_%M_%S"))
        .chars()
        .take(MAX_SCREENSHOT_NAME_LEN)
        .collect()
}

#[cfg(feature = "media")]
fn reduce_png(png: &[u8]) -> ProbeResult<Vec<u8>> {
    use image::{imageops::FilterType, ImageFormat};
    use std::io::Cursor;

    let img = image::load_from_memory_with_format(png, ImageFormat::Png)
        .map_err(|e| ProbeError::data(format!("screenshot is not a PNG: {e}")))?;
    let reduced = img.resize(
        (img.width() / 2).max(1),
        (img.height() / 2).max(1),
        FilterType::Triangle,
    );
    let mut out = Vec::new();
    reduced
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| ProbeError::data(format!("could not encode screenshot: {e}")))?;
    Ok(out)
}

#[cfg(not(feature = "media"))]
fn reduce_png(png: &[u8]) -> ProbeResult<Vec<u8>> {
    Ok(png.to_vec())
}

/// Scenario hooks: log banners, pending text attachments, per-step
/// screenshots and browser shutdown for UI scenarios
#[derive(Debug, Clone)]
pub struct ScenarioHooks {
    ui_tags: Vec<String>,
    reduce_screenshot_size: bool,
    pending_text: String,
    text_attachments: usize,
}

impl Default for ScenarioHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioHooks {
    /// Hooks treating `@ui` (any case) as the UI tag
    #[must_use]
    pub fn new() -> Self {
        Self {
            ui_tags: vec![DEFAULT_UI_TAG.to_string()],
            reduce_screenshot_size: false,
            pending_text: String::new(),
            text_attachments: 0,
        }
    }

    /// Replace the UI tags
    #[must_use]
    pub fn with_ui_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ui_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Halve screenshot dimensions before attaching
    #[must_use]
    pub const fn with_reduced_screenshots(mut self, reduce: bool) -> Self {
        self.reduce_screenshot_size = reduce;
        self
    }

    /// Whether `scenario` drives a browser
    #[must_use]
    pub fn is_ui(&self, scenario: &Scenario) -> bool {
        scenario.has_any_tag(&self.ui_tags)
    }

    /// Queue text to attach after the current step, replacing earlier text
    pub fn set_text_to_attach(&mut self, text: impl Into<String>) {
        self.pending_text = text.into();
    }

    /// Log the start banner
    pub fn before_scenario(&self, scenario: &Scenario) {
        info!(scenario = %scenario.name, "#################### Execution Started. ###################");
    }

    /// Flush queued text, then screenshot UI scenarios.
    ///
    /// Screenshot failures are logged and never fail the step.
    pub fn after_step<S, R>(&mut self, scenario: &Scenario, session: &S, reporter: &mut R)
    where
        S: BrowserSession + ?Sized,
        R: ScenarioReporter + ?Sized,
    {
        let text = std::mem::take(&mut self.pending_text);
        if !text.is_empty() {
            let label = format!("HTTP data {}", self.text_attachments);
            self.text_attachments += 1;
            reporter.attach(text.as_bytes(), "text/plain", &label);
        }

        if !self.is_ui(scenario) {
            return;
        }
        let file_name = screenshot_file_name(&scenario.name, chrono::Local::now().naive_local());
        info!(file = %file_name, "creating screenshot");
        match self.screenshot(session) {
            Ok(Some(png)) => {
                reporter.attach(&png, "image/png", &format!("screenshot {file_name}"));
                info!("after step screenshot attached");
            }
            Ok(None) => warn!(scenario = %scenario.name, "no active session to screenshot"),
            Err(e) => warn!(scenario = %scenario.name, error = %e, "could not attach screenshot"),
        }
    }

    fn screenshot<S: BrowserSession + ?Sized>(&self, session: &S) -> ProbeResult<Option<Vec<u8>>> {
        if !session.is_active() {
            return Ok(None);
        }
        let png = session.screenshot()?;
        if self.reduce_screenshot_size {
            reduce_png(&png).map(Some)
        } else {
            Ok(Some(png))
        }
    }

    /// Quit the session of a UI scenario, then log the finish banner
    pub fn after_scenario<S: BrowserSession + ?Sized>(
        &self,
        scenario: &Scenario,
        session: &S,
    ) -> ProbeResult<()> {
        let result = if self.is_ui(scenario) && session.is_active() {
            session.quit().map(|()| info!("browser session quit"))
        } else {
            Ok(())
        };
        info!(scenario = %scenario.name, "#################### Execution Finished. ###################");
        result
    }
}
