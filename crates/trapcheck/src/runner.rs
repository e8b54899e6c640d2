//! Suite runner.
//!
//! Runs named scenarios one after another against a single session. Each
//! scenario starts from a freshly loaded page, and a driver error ends only
//! the scenario it happened in.

use crate::aria;
use crate::driver::FocusDriver;
use crate::fixture::SuiteConfig;
use crate::report::{ScenarioReport, SuiteReport};
use crate::result::{TrapError, TrapResult};
use crate::verifier::FocusCycleVerifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// A named scenario of the suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Tab cycles forward through every dialog
    KeyTab,
    /// Shift+Tab cycles backward through every dialog
    KeyShiftTab,
    /// Escape closes every dialog from every focusable
    KeyEscape,
    /// Dialog count and container tag
    DialogRole,
    /// `aria-labelledby` references
    AriaLabelledby,
    /// `aria-describedby` references
    AriaDescribedby,
    /// `aria-modal="true"`
    AriaModal,
}

impl Scenario {
    /// Every scenario, in run order
    pub const ALL: [Self; 7] = [
        Self::DialogRole,
        Self::AriaLabelledby,
        Self::AriaDescribedby,
        Self::AriaModal,
        Self::KeyTab,
        Self::KeyShiftTab,
        Self::KeyEscape,
    ];

    /// Stable scenario name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::KeyTab => "key-tab",
            Self::KeyShiftTab => "key-shift-tab",
            Self::KeyEscape => "key-escape",
            Self::DialogRole => "dialog-role",
            Self::AriaLabelledby => "aria-labelledby",
            Self::AriaDescribedby => "aria-describedby",
            Self::AriaModal => "aria-modal",
        }
    }

    /// Number of assertions the scenario makes against `suite`
    #[must_use]
    pub fn plan(self, suite: &SuiteConfig) -> usize {
        match self {
            Self::KeyTab | Self::KeyShiftTab => {
                suite.dialogs.iter().map(|d| d.cycle_len() + 1).sum()
            }
            Self::KeyEscape => suite.dialogs.iter().map(|d| d.cycle_len()).sum(),
            Self::DialogRole => aria::dialog_role_plan(&suite.aria),
            Self::AriaLabelledby | Self::AriaDescribedby | Self::AriaModal => 1,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = TrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sc| sc.name() == s)
            .ok_or_else(|| TrapError::Config {
                message: format!(
                    "unknown scenario '{s}' (expected one of: {})",
                    Self::ALL.map(Self::name).join(", ")
                ),
            })
    }
}

/// Runs scenarios from a suite configuration
#[derive(Debug)]
pub struct SuiteRunner<D: FocusDriver> {
    verifier: FocusCycleVerifier<D>,
    suite: SuiteConfig,
}

impl<D: FocusDriver> SuiteRunner<D> {
    /// Create a runner; the suite's timing is applied to the verifier
    pub fn new(driver: D, suite: SuiteConfig) -> Self {
        let verifier = FocusCycleVerifier::new(driver).with_timing(suite.timing);
        Self { verifier, suite }
    }

    /// The suite being run
    pub const fn suite(&self) -> &SuiteConfig {
        &self.suite
    }

    /// The underlying verifier
    pub const fn verifier(&self) -> &FocusCycleVerifier<D> {
        &self.verifier
    }

    /// Give the session back
    pub fn into_driver(self) -> D {
        self.verifier.into_driver()
    }

    /// Run every scenario
    pub async fn run_all(&mut self) -> SuiteReport {
        self.run(&Scenario::ALL).await
    }

    /// Run the given scenarios in order
    pub async fn run(&mut self, scenarios: &[Scenario]) -> SuiteReport {
        let started = Instant::now();
        let mut suite_report = SuiteReport::new(self.suite_name());
        for &scenario in scenarios {
            suite_report.push(self.run_scenario(scenario).await);
        }
        suite_report.duration = started.elapsed();
        tracing::info!(
            passed = suite_report.passed_count(),
            failed = suite_report.failed_count(),
            "suite finished"
        );
        suite_report
    }

    /// Run one scenario from a freshly loaded page
    pub async fn run_scenario(&mut self, scenario: Scenario) -> ScenarioReport {
        let started = Instant::now();
        let mut report = ScenarioReport::new(scenario.name());
        report.plan(scenario.plan(&self.suite));
        tracing::info!(scenario = %scenario, "scenario started");

        if let Err(e) = self.scenario_body(scenario, &mut report).await {
            tracing::warn!(scenario = %scenario, error = %e, "scenario aborted");
            report.fail_with(&e);
        }

        report.duration = started.elapsed();
        tracing::info!(
            scenario = %scenario,
            status = ?report.status(),
            assertions = report.count(),
            "scenario finished"
        );
        report
    }

    async fn scenario_body(
        &mut self,
        scenario: Scenario,
        report: &mut ScenarioReport,
    ) -> TrapResult<()> {
        let Self { verifier, suite } = self;
        verifier.reload().await?;
        match scenario {
            Scenario::DialogRole => {
                aria::check_dialog_role(verifier.driver(), &suite.aria, report).await
            }
            Scenario::AriaLabelledby => {
                aria::check_labelledby(verifier.driver(), &suite.aria, report).await
            }
            Scenario::AriaDescribedby => {
                aria::check_describedby(verifier.driver(), &suite.aria, report).await
            }
            Scenario::AriaModal => aria::check_modal(verifier.driver(), &suite.aria, report).await,
            Scenario::KeyTab => {
                for (i, fixture) in suite.dialogs.iter().enumerate() {
                    if i > 0 {
                        verifier.reload().await?;
                    }
                    verifier.verify_tab_cycle(fixture, report).await?;
                }
                Ok(())
            }
            Scenario::KeyShiftTab => {
                for (i, fixture) in suite.dialogs.iter().enumerate() {
                    if i > 0 {
                        verifier.reload().await?;
                    }
                    verifier.verify_shift_tab_cycle(fixture, report).await?;
                }
                Ok(())
            }
            Scenario::KeyEscape => {
                for fixture in &suite.dialogs {
                    verifier.verify_escape(fixture, report).await?;
                }
                Ok(())
            }
        }
    }

    fn suite_name(&self) -> String {
        self.suite
            .url
            .clone()
            .unwrap_or_else(|| "dialog-modal".to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;
    use crate::wait::Timing;

    fn runner() -> SuiteRunner<MockDriver> {
        let mut suite = SuiteConfig::modal_example();
        suite.timing = Timing {
            settle_timeout_ms: 20,
            open_timeout_ms: 50,
            poll_interval_ms: 2,
        };
        let page = MockDriver::from_suite(&suite).unwrap();
        SuiteRunner::new(page, suite)
    }

    mod scenario_tests {
        use super::*;

        #[test]
        fn test_names_round_trip() {
            for scenario in Scenario::ALL {
                assert_eq!(scenario.name().parse::<Scenario>().unwrap(), scenario);
            }
            let err = "key-space".parse::<Scenario>().unwrap_err();
            assert!(err.to_string().contains("key-tab"));
        }

        #[test]
        fn test_plans_for_modal_example() {
            let suite = SuiteConfig::modal_example();
            let plans: Vec<(&str, usize)> = Scenario::ALL
                .iter()
                .map(|s| (s.name(), s.plan(&suite)))
                .collect();
            assert_eq!(
                plans,
                vec![
                    ("dialog-role", 5),
                    ("aria-labelledby", 1),
                    ("aria-describedby", 1),
                    ("aria-modal", 1),
                    ("key-tab", 18),
                    ("key-shift-tab", 18),
                    ("key-escape", 14),
                ]
            );
        }

        #[test]
        fn test_serde_names() {
            let json = serde_json::to_string(&Scenario::KeyShiftTab).unwrap();
            assert_eq!(json, "\"key-shift-tab\"");
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_modal_example_passes() {
            let mut runner = runner();
            let report = runner.run_all().await;
            assert!(report.all_passed(), "{}", report.render_text());
            assert_eq!(report.scenarios.len(), 7);
            assert_eq!(report.assertion_count(), 5 + 1 + 1 + 1 + 18 + 18 + 14);
        }

        #[tokio::test]
        async fn test_selected_scenarios_only() {
            let mut runner = runner();
            let report = runner.run(&[Scenario::AriaModal, Scenario::KeyEscape]).await;
            let names: Vec<&str> = report.scenarios.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec!["aria-modal", "key-escape"]);
        }

        #[tokio::test]
        async fn test_error_isolated_to_one_scenario() {
            let mut runner = runner();
            runner.verifier.driver_mut().never_open("dialog2").unwrap();
            let report = runner
                .run(&[Scenario::KeyTab, Scenario::AriaModal])
                .await;
            let tab = report.scenario("key-tab").unwrap();
            assert!(!tab.passed());
            assert!(tab.error.as_deref().unwrap().contains("dialog2"));
            // dialog1 completed before the failure
            assert_eq!(tab.count(), 9 + 1);
            assert!(report.scenario("aria-modal").unwrap().passed());
        }

        #[tokio::test]
        async fn test_fault_shows_in_report() {
            let mut runner = runner();
            runner.verifier.driver_mut().break_wrap("dialog1").unwrap();
            let report = runner.run(&[Scenario::KeyShiftTab]).await;
            let text = report.render_text();
            assert!(text.starts_with("FAIL key-shift-tab (18/18 assertions"));
            assert!(text.contains("(focus is on body)"));
        }

        #[tokio::test]
        async fn test_each_scenario_starts_from_reload() {
            let mut runner = runner();
            runner.run(&[Scenario::AriaModal]).await;
            let driver = runner.into_driver();
            assert_eq!(driver.history()[0], "navigate:mock://dialog-modal");
        }
    }
}
