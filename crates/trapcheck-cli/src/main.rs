//! Trapcheck CLI: keyboard focus checks for modal dialogs
//!
//! ## Usage
//!
//! ```bash
//! trapcheck run --url http://localhost:8080/dialog.html   # Live page in Chromium
//! trapcheck run --url ... --scenario key-tab              # One scenario
//! trapcheck simulate --format json                         # Simulated page
//! trapcheck fixtures > suite.yaml                          # Dump the built-in suite
//! ```

use clap::Parser;
use std::process::ExitCode;
use trapcheck::{MockDriver, SuiteReport, SuiteRunner};
use trapcheck_cli::{
    emit, init_logging, render_report, resolve_suite, select_scenarios, Cli, CliConfig,
    CliError, CliResult, ColorChoice, Commands, FixturesArgs, RunArgs, SimulateArgs, SuiteArgs,
    Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    // Build configuration from CLI args
    let config = build_config(&cli);
    let use_color = config.color.should_color();
    console::set_colors_enabled(use_color);
    init_logging(config.verbosity, use_color);

    match cli.command {
        Commands::Run(args) => {
            let config = config.with_format(args.suite.format.into());
            run_live(&config, &args)
        }
        Commands::Simulate(args) => {
            let config = config.with_format(args.suite.format.into());
            run_simulate(&config, &args)
        }
        Commands::Fixtures(args) => run_fixtures(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.into();

    CliConfig::new().with_verbosity(verbosity).with_color(color)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create runtime: {e}")))
}

fn run_simulate(config: &CliConfig, args: &SimulateArgs) -> CliResult<()> {
    let suite = resolve_suite(&args.suite, None)?;
    let scenarios = select_scenarios(&args.suite.scenarios)?;
    let driver = MockDriver::from_suite(&suite)?;

    let rt = runtime()?;
    let report = rt.block_on(async {
        let mut runner = SuiteRunner::new(driver, suite);
        runner.run(&scenarios).await
    });
    finish(config, &args.suite, &report)
}

#[cfg(feature = "browser")]
fn run_live(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    use trapcheck::{ChromiumDriver, DriverConfig, FocusDriver};

    let suite = resolve_suite(&args.suite, args.url.as_deref())?;
    let url = suite.url.clone().ok_or_else(|| {
        CliError::invalid_argument("no page URL; pass --url or set `url` in the suite file")
    })?;
    let scenarios = select_scenarios(&args.suite.scenarios)?;

    let mut driver_config = DriverConfig::new().headless(!args.headed);
    if let Some(ref path) = args.chromium_path {
        driver_config = driver_config.with_chromium_path(path);
    }
    if args.no_sandbox {
        driver_config = driver_config.with_no_sandbox();
    }

    let rt = runtime()?;
    let report = rt.block_on(async {
        let mut driver = ChromiumDriver::launch(driver_config).await?;
        driver.navigate(&url).await?;

        let mut runner = SuiteRunner::new(driver, suite);
        let report = runner.run(&scenarios).await;

        let mut driver = runner.into_driver();
        if let Err(e) = driver.close().await {
            tracing::warn!(error = %e, "failed to close browser");
        }
        Ok::<_, CliError>(report)
    })?;
    finish(config, &args.suite, &report)
}

#[cfg(not(feature = "browser"))]
fn run_live(_config: &CliConfig, _args: &RunArgs) -> CliResult<()> {
    Err(CliError::FeatureDisabled { feature: "browser" })
}

fn run_fixtures(args: &FixturesArgs) -> CliResult<()> {
    let suite = trapcheck_cli::load_suite(args.config.as_deref())?;
    emit(&suite.to_yaml()?, None)
}

/// Print the report and turn scenario failures into a non-zero exit
fn finish(config: &CliConfig, args: &SuiteArgs, report: &SuiteReport) -> CliResult<()> {
    let quiet_pass = config.verbosity.is_quiet() && report.all_passed() && args.output.is_none();
    if !quiet_pass {
        let use_color = args.output.is_none() && config.color.should_color();
        let rendered = render_report(report, config.format, use_color)?;
        emit(&rendered, args.output.as_deref())?;
    }

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed_count(),
            total: report.scenarios.len(),
        })
    }
}
