//! sauceprobe CLI library
//!
//! Command definitions, configuration and the Cucumber runner behind the
//! `sauceprobe` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod logging;
mod runner;

pub use commands::{CheckHostArgs, Cli, ColorArg, Commands, ConfigArgs, ConfigFormat, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use runner::CucumberRunner;
