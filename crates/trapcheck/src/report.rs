//! Scenario and suite reporting.
//!
//! A scenario declares how many assertions it expects to make (its plan)
//! and records each one as it goes. Failures are collected, never thrown,
//! so one bad step does not hide the rest of the scenario. A scenario
//! passes only when every assertion passed, the count matches the plan,
//! and no driver error cut it short.

use crate::result::{TrapError, TrapResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One recorded assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionRecord {
    /// Whether the assertion held
    pub passed: bool,
    /// Human-readable description of what was checked
    pub message: String,
    /// Position in the scenario (0-based)
    pub index: usize,
}

/// Test result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// All assertions passed and the plan was met
    Passed,
    /// At least one assertion failed, the plan was missed, or the run errored
    Failed,
}

/// Assertions collected for a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Expected number of assertions
    pub planned: Option<usize>,
    /// Assertions in the order they were made
    pub assertions: Vec<AssertionRecord>,
    /// Error that ended the scenario early
    pub error: Option<String>,
    /// Wall-clock duration
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl ScenarioReport {
    /// Start an empty report
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            planned: None,
            assertions: Vec::new(),
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Declare the expected assertion count
    pub fn plan(&mut self, count: usize) {
        self.planned = Some(count);
    }

    /// Record an assertion outcome
    pub fn record(&mut self, passed: bool, message: impl Into<String>) {
        let message = message.into();
        if !passed {
            tracing::warn!(scenario = %self.name, %message, "assertion failed");
        }
        self.assertions.push(AssertionRecord {
            passed,
            message,
            index: self.assertions.len(),
        });
    }

    /// Record an assertion that must be true
    pub fn assert_true(&mut self, condition: bool, message: impl Into<String>) {
        self.record(condition, message);
    }

    /// Record an assertion that must be false
    pub fn assert_false(&mut self, condition: bool, message: impl Into<String>) {
        self.record(!condition, message);
    }

    /// Record an equality assertion
    pub fn assert_eq<T: PartialEq + std::fmt::Debug>(
        &mut self,
        actual: &T,
        expected: &T,
        message: impl Into<String>,
    ) {
        let message = message.into();
        if actual == expected {
            self.record(true, message);
        } else {
            self.record(false, format!("{message} (expected {expected:?}, got {actual:?})"));
        }
    }

    /// Mark the scenario as cut short by an error
    pub fn fail_with(&mut self, error: &TrapError) {
        self.error = Some(error.to_string());
    }

    /// Number of assertions made
    #[must_use]
    pub fn count(&self) -> usize {
        self.assertions.len()
    }

    /// Number of failing assertions
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.assertions.iter().filter(|a| !a.passed).count()
    }

    /// Whether the recorded count differs from the plan
    #[must_use]
    pub fn plan_missed(&self) -> bool {
        self.planned.is_some_and(|p| p != self.count())
    }

    /// Overall status
    #[must_use]
    pub fn status(&self) -> ScenarioStatus {
        if self.error.is_none() && self.failed_count() == 0 && !self.plan_missed() {
            ScenarioStatus::Passed
        } else {
            ScenarioStatus::Failed
        }
    }

    /// Whether the scenario passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status() == ScenarioStatus::Passed
    }

    /// Failing assertions
    #[must_use]
    pub fn failures(&self) -> Vec<&AssertionRecord> {
        self.assertions.iter().filter(|a| !a.passed).collect()
    }
}

/// Results from running a suite
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite_name: String,
    /// Per-scenario reports in run order
    pub scenarios: Vec<ScenarioReport>,
    /// Total duration
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl SuiteReport {
    /// Create an empty suite report
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            suite_name: name.into(),
            ..Default::default()
        }
    }

    /// Add a finished scenario
    pub fn push(&mut self, scenario: ScenarioReport) {
        self.scenarios.push(scenario);
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.scenarios.iter().filter(|s| s.passed()).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.scenarios.len() - self.passed_count()
    }

    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }

    /// Total assertions across scenarios
    #[must_use]
    pub fn assertion_count(&self) -> usize {
        self.scenarios.iter().map(ScenarioReport::count).sum()
    }

    /// Look up a scenario by name
    #[must_use]
    pub fn scenario(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    /// Generate summary string
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} scenarios passed, {} assertions",
            self.suite_name,
            self.passed_count(),
            self.scenarios.len(),
            self.assertion_count()
        )
    }

    /// Plain-text report
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for scenario in &self.scenarios {
            let mark = if scenario.passed() { "ok  " } else { "FAIL" };
            let plan = scenario
                .planned
                .map_or_else(String::new, |p| format!("/{p}"));
            out.push_str(&format!(
                "{mark} {} ({}{plan} assertions, {}ms)\n",
                scenario.name,
                scenario.count(),
                scenario.duration.as_millis()
            ));
            for failure in scenario.failures() {
                out.push_str(&format!("     #{} {}\n", failure.index + 1, failure.message));
            }
            if scenario.plan_missed() {
                out.push_str(&format!(
                    "     planned {} assertion(s), made {}\n",
                    scenario.planned.unwrap_or_default(),
                    scenario.count()
                ));
            }
            if let Some(ref error) = scenario.error {
                out.push_str(&format!("     error: {error}\n"));
            }
        }
        out.push_str(&self.summary());
        out.push('\n');
        out
    }

    /// JSON report
    pub fn render_json(&self) -> TrapResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
