//! Trapcheck CLI Library
//!
//! Command-line interface for the Trapcheck dialog focus harness.

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
mod output;
pub mod suite;

pub use commands::{
    Cli, ColorArg, Commands, FixturesArgs, FormatArg, RunArgs, SimulateArgs, SuiteArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_logging;
pub use output::{emit, render_report, OutputFormat};
pub use suite::{load_suite, resolve_suite, select_scenarios};
