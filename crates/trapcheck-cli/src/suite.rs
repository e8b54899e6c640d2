//! Suite resolution from files and flags

use crate::commands::SuiteArgs;
use crate::error::{CliError, CliResult};
use std::path::Path;
use trapcheck::{Scenario, SuiteConfig};

/// Load the suite file, or the built-in modal example when none is given
pub fn load_suite(path: Option<&Path>) -> CliResult<SuiteConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config(format!(
                    "suite file not found: {}",
                    path.display()
                )));
            }
            tracing::debug!(path = %path.display(), "loading suite");
            Ok(SuiteConfig::load(path)?)
        }
        None => Ok(SuiteConfig::modal_example()),
    }
}

/// Resolve the suite and apply flag overrides on top of the file
pub fn resolve_suite(args: &SuiteArgs, url: Option<&str>) -> CliResult<SuiteConfig> {
    let mut suite = load_suite(args.config.as_deref())?;
    if let Some(url) = url {
        suite.url = Some(url.to_string());
    }
    if let Some(ms) = args.settle_timeout_ms {
        suite.timing.settle_timeout_ms = ms;
    }
    if let Some(ms) = args.open_timeout_ms {
        suite.timing.open_timeout_ms = ms;
    }
    suite.validate()?;
    Ok(suite)
}

/// Parse scenario names; every scenario when the list is empty
pub fn select_scenarios(names: &[String]) -> CliResult<Vec<Scenario>> {
    if names.is_empty() {
        return Ok(Scenario::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| {
            name.parse::<Scenario>()
                .map_err(|e| CliError::invalid_argument(e.to_string()))
        })
        .collect()
}
