//! Run configuration.
//!
//! Loaded from YAML, then overridden by `SAUCEPROBE_*` environment variables.
//! Every field has a default so an empty file is a valid configuration.

use crate::hooks::{ScenarioHooks, DEFAULT_UI_TAG};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{WaitSpec, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT};
use crate::waits::DEFAULT_IGNORED_KINDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "SAUCEPROBE_";

/// Settings shared by the library and the runner CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Storefront root URL
    pub base_url: String,
    /// Default wait timeout in milliseconds
    pub timeout_ms: u64,
    /// Default polling interval in milliseconds
    pub poll_interval_ms: u64,
    /// JSON file holding credentials and other test data
    pub test_data_path: PathBuf,
    /// Directory of `.feature` files
    pub feature_dir: PathBuf,
    /// Directory receiving the HTML and JSON reports
    pub report_dir: PathBuf,
    /// Cucumber executable the runner delegates to
    pub cucumber_executable: String,
    /// Glue packages passed to Cucumber
    pub glue: Vec<String>,
    /// Tags marking browser scenarios
    pub ui_tags: Vec<String>,
    /// Halve screenshot dimensions before attaching
    pub reduce_screenshot_size: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.saucedemo.com/".to_string(),
            timeout_ms: DEFAULT_WAIT_TIMEOUT.as_millis() as u64,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            test_data_path: PathBuf::from("src/test/resources/testData/data.json"),
            feature_dir: PathBuf::from("src/test/resources/features"),
            report_dir: PathBuf::from("target/cucumber"),
            cucumber_executable: "cucumber".to_string(),
            glue: vec![
                "com.sauceLabs.stepDefinitions".to_string(),
                "com.sauceLabs.common.utils".to_string(),
            ],
            ui_tags: vec![DEFAULT_UI_TAG.to_string()],
            reduce_screenshot_size: false,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> ProbeResult<T> {
    raw.trim().parse().map_err(|_| {
        ProbeError::config(format!("{ENV_PREFIX}{name}: cannot parse '{raw}'"))
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl ProbeConfig {
    /// Parse YAML text
    pub fn from_yaml(text: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file
    pub fn from_file(path: &Path) -> ProbeResult<Self> {
        debug!(path = %path.display(), "loading config");
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> ProbeResult<Self> {
        Self::default().with_env_overrides()
    }

    /// `path` (or the defaults when `None`), then environment overrides
    pub fn load(path: Option<&Path>) -> ProbeResult<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)?
            .with_env_overrides()
    }

    /// Apply `SAUCEPROBE_*` variables from the process environment
    pub fn with_env_overrides(self) -> ProbeResult<Self> {
        self.with_overrides(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())
    }

    /// Apply overrides from `lookup`, which receives names without the prefix
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> ProbeResult<Self> {
        if let Some(v) = lookup("BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("TIMEOUT_MS") {
            self.timeout_ms = parse_env("TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_env("POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = lookup("TEST_DATA") {
            self.test_data_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("FEATURES") {
            self.feature_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("REPORT_DIR") {
            self.report_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("CUCUMBER") {
            self.cucumber_executable = v;
        }
        if let Some(v) = lookup("GLUE") {
            self.glue = split_list(&v);
        }
        if let Some(v) = lookup("UI_TAGS") {
            self.ui_tags = split_list(&v);
        }
        if let Some(v) = lookup("REDUCE_SCREENSHOT_SIZE") {
            self.reduce_screenshot_size = parse_env("REDUCE_SCREENSHOT_SIZE", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings no wait could run with
    pub fn validate(&self) -> ProbeResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::config("poll_interval_ms must be positive"));
        }
        if self.cucumber_executable.trim().is_empty() {
            return Err(ProbeError::config("cucumber_executable is empty"));
        }
        Ok(())
    }

    /// Default wait timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Default polling interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Element wait spec built from these settings
    #[must_use]
    pub fn wait_spec(&self) -> WaitSpec {
        WaitSpec::new(self.timeout())
            .with_poll_interval(self.poll_interval())
            .ignoring_all(DEFAULT_IGNORED_KINDS)
    }

    /// Scenario hooks built from these settings
    #[must_use]
    pub fn hooks(&self) -> ScenarioHooks {
        ScenarioHooks::new()
            .with_ui_tags(self.ui_tags.iter().cloned())
            .with_reduced_screenshots(self.reduce_screenshot_size)
    }

    /// Cucumber arguments: glue, report plugins and feature directory,
    /// followed by `extra`
    #[must_use]
    pub fn cucumber_args(&self, extra: &[String]) -> Vec<String> {
        let mut args = Vec::new();
        for glue in &self.glue {
            args.push("--glue".to_string());
            args.push(glue.clone());
        }
        let report = |name: &str| self.report_dir.join(name).display().to_string();
        for plugin in [
            "pretty".to_string(),
            format!("html:{}", report("report.html")),
            format!("json:{}", report("report.json")),
        ] {
            args.push("--plugin".to_string());
            args.push(plugin);
        }
        args.push(self.feature_dir.display().to_string());
        args.extend(extra.iter().cloned());
        args
    }
}
