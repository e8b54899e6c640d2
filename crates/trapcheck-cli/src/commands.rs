//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Trapcheck: keyboard focus-cycle and ARIA checks for modal dialogs
#[derive(Parser, Debug)]
#[command(name = "trapcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the suite against a live page in Chromium
    Run(RunArgs),

    /// Run the suite against the built-in simulated dialog page
    Simulate(SimulateArgs),

    /// Print the resolved suite configuration as YAML
    Fixtures(FixturesArgs),
}

/// Options shared by every command that runs scenarios
#[derive(Parser, Debug, Clone, Default)]
pub struct SuiteArgs {
    /// Suite configuration file (YAML); the built-in modal example if omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scenario to run (repeatable); all scenarios if omitted
    #[arg(short, long = "scenario", value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// Settle window after Tab/Shift+Tab in milliseconds
    #[arg(long, value_name = "MS")]
    pub settle_timeout_ms: Option<u64>,

    /// Window for a dialog to appear in milliseconds
    #[arg(long, value_name = "MS")]
    pub open_timeout_ms: Option<u64>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// URL of the dialog page (overrides the config file)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Path to the Chromium executable
    #[arg(long, value_name = "PATH")]
    pub chromium_path: Option<String>,

    /// Disable the Chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    #[command(flatten)]
    pub suite: SuiteArgs,
}

/// Arguments for the simulate command
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub suite: SuiteArgs,
}

/// Arguments for the fixtures command
#[derive(Parser, Debug)]
pub struct FixturesArgs {
    /// Suite configuration file (YAML); the built-in modal example if omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Report format argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

/// Color argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}
