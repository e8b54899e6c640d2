//! Dialog fixtures and suite configuration.
//!
//! A fixture is an immutable description of one dialog on the page under
//! test: how to open it and the exact order its focusable elements are
//! expected to be visited in. Fixtures are loaded once, from YAML or from
//! the built-in modal example, and never mutated during a run.
//!
//! ```yaml
//! url: http://localhost:8080/dialog-modal/dialog.html
//! timing:
//!   settle_timeout_ms: 200
//! dialogs:
//!   - name: dialog4
//!     container: "#dialog4"
//!     trigger:
//!       - "#ex1 button"
//!       - "#dialog1 .dialog_form_actions button:nth-child(1)"
//!       - "#dialog2 .dialog_form_actions button:nth-child(2)"
//!     focusable:
//!       - "#dialog4 button"
//! ```

use crate::result::{TrapError, TrapResult};
use crate::wait::Timing;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One dialog under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogFixture {
    /// Fixture name, used in messages
    pub name: String,
    /// CSS locator of the dialog container
    pub container: String,
    /// Locators clicked in order, starting from the page root, to reveal the dialog
    pub trigger: Vec<String>,
    /// Focusable elements in expected Tab order
    pub focusable: Vec<String>,
    /// Tab presses from initial focus to the first focusable element
    #[serde(default)]
    pub tab_lead_in: usize,
    /// Shift+Tab presses from initial focus to the last focusable element
    #[serde(default = "default_shift_tab_lead_in")]
    pub shift_tab_lead_in: usize,
}

const fn default_shift_tab_lead_in() -> usize {
    1
}

impl DialogFixture {
    /// Create a fixture whose initial focus is its first focusable element
    #[must_use]
    pub fn new(name: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            container: container.into(),
            trigger: Vec::new(),
            focusable: Vec::new(),
            tab_lead_in: 0,
            shift_tab_lead_in: default_shift_tab_lead_in(),
        }
    }

    /// Append a click to the trigger path
    #[must_use]
    pub fn click(mut self, selector: impl Into<String>) -> Self {
        self.trigger.push(selector.into());
        self
    }

    /// Append a focusable element to the cycle
    #[must_use]
    pub fn focusable(mut self, selector: impl Into<String>) -> Self {
        self.focusable.push(selector.into());
        self
    }

    /// Set both lead-in counts
    #[must_use]
    pub const fn with_lead_in(mut self, tab: usize, shift_tab: usize) -> Self {
        self.tab_lead_in = tab;
        self.shift_tab_lead_in = shift_tab;
        self
    }

    /// Number of elements in the focus cycle
    #[must_use]
    pub fn cycle_len(&self) -> usize {
        self.focusable.len()
    }

    /// First element of the cycle
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.focusable.first().map(String::as_str)
    }

    /// Last element of the cycle
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.focusable.last().map(String::as_str)
    }

    /// Check the fixture is usable
    pub fn validate(&self) -> TrapResult<()> {
        if self.name.trim().is_empty() {
            return Err(TrapError::invalid_fixture("fixture name is empty"));
        }
        if self.container.trim().is_empty() {
            return Err(TrapError::invalid_fixture(format!(
                "{}: container locator is empty",
                self.name
            )));
        }
        if self.trigger.is_empty() {
            return Err(TrapError::invalid_fixture(format!(
                "{}: trigger path is empty",
                self.name
            )));
        }
        if self.focusable.is_empty() {
            return Err(TrapError::invalid_fixture(format!(
                "{}: no focusable elements",
                self.name
            )));
        }
        let mut seen = HashSet::new();
        for selector in &self.focusable {
            if !seen.insert(selector.as_str()) {
                return Err(TrapError::invalid_fixture(format!(
                    "{}: focusable locator listed twice: {selector}",
                    self.name
                )));
            }
        }
        if self.tab_lead_in > self.cycle_len() || self.shift_tab_lead_in > self.cycle_len() + 1 {
            return Err(TrapError::invalid_fixture(format!(
                "{}: lead-in longer than the focus cycle",
                self.name
            )));
        }
        Ok(())
    }
}

/// Expectations for the static ARIA scenarios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AriaExpectations {
    /// Locator matching every dialog container
    pub dialog_selector: String,
    /// Number of dialogs the page must contain
    pub expected_dialog_count: usize,
    /// Tag every dialog container must use
    pub expected_tag: String,
    /// Locator of the dialogs that must carry `aria-describedby`
    pub describedby_selector: String,
}

impl Default for AriaExpectations {
    fn default() -> Self {
        Self {
            dialog_selector: r#"[role="dialog"]"#.to_string(),
            expected_dialog_count: 4,
            expected_tag: "div".to_string(),
            describedby_selector:
                r#"#dialog2[role="dialog"],#dialog3[role="dialog"],#dialog4[role="dialog"]"#
                    .to_string(),
        }
    }
}

/// Complete, immutable input for one suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Page under test
    #[serde(default)]
    pub url: Option<String>,
    /// Wait timing
    #[serde(default)]
    pub timing: Timing,
    /// ARIA scenario expectations
    #[serde(default)]
    pub aria: AriaExpectations,
    /// Dialog fixtures in run order
    pub dialogs: Vec<DialogFixture>,
}

impl SuiteConfig {
    /// Fixtures for the modal dialog example page
    ///
    /// dialog1 is the address form, dialog2 the verification result (its
    /// initial focus sits on a heading before the cycle), dialog3 the
    /// "address added" notice, and dialog4 the single-button end dialog.
    #[must_use]
    pub fn modal_example() -> Self {
        const OPEN: &str = "#ex1 button";
        const VERIFY: &str = "#dialog1 .dialog_form_actions button:nth-child(1)";
        const ADD: &str = "#dialog1 .dialog_form_actions button:nth-child(2)";
        const ACCEPT: &str = "#dialog2 .dialog_form_actions button:nth-child(2)";

        let dialog1 = DialogFixture::new("dialog1", "#dialog1")
            .click(OPEN)
            .focusable("#dialog1 .dialog_form_item:nth-child(1) input")
            .focusable("#dialog1 .dialog_form_item:nth-child(2) input")
            .focusable("#dialog1 .dialog_form_item:nth-child(3) input")
            .focusable("#dialog1 .dialog_form_item:nth-child(4) input")
            .focusable("#dialog1 .dialog_form_item:nth-child(5) input")
            .focusable("#dialog1 button:nth-child(1)")
            .focusable("#dialog1 button:nth-child(2)")
            .focusable("#dialog1 button:nth-child(3)");

        let dialog2 = DialogFixture::new("dialog2", "#dialog2")
            .click(OPEN)
            .click(VERIFY)
            .focusable("#dialog2 a")
            .focusable("#dialog2 button:nth-child(2)")
            .focusable("#dialog2 button:nth-child(3)")
            .with_lead_in(1, 2);

        let dialog3 = DialogFixture::new("dialog3", "#dialog3")
            .click(OPEN)
            .click(ADD)
            .focusable("#dialog3 button")
            .focusable("#dialog3 a");

        let dialog4 = DialogFixture::new("dialog4", "#dialog4")
            .click(OPEN)
            .click(VERIFY)
            .click(ACCEPT)
            .focusable("#dialog4 button")
            .with_lead_in(0, 0);

        Self {
            url: None,
            timing: Timing::default(),
            aria: AriaExpectations::default(),
            dialogs: vec![dialog1, dialog2, dialog3, dialog4],
        }
    }

    /// Parse and validate a suite from YAML
    pub fn from_yaml(yaml: &str) -> TrapResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a suite from a YAML file
    pub fn load(path: &Path) -> TrapResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> TrapResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Validate timing and every fixture
    pub fn validate(&self) -> TrapResult<()> {
        self.timing.validate()?;
        if self.dialogs.is_empty() {
            return Err(TrapError::Config {
                message: "suite defines no dialogs".to_string(),
            });
        }
        let mut names = HashSet::new();
        for dialog in &self.dialogs {
            dialog.validate()?;
            if !names.insert(dialog.name.as_str()) {
                return Err(TrapError::invalid_fixture(format!(
                    "duplicate fixture name: {}",
                    dialog.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a fixture by name
    #[must_use]
    pub fn dialog(&self, name: &str) -> Option<&DialogFixture> {
        self.dialogs.iter().find(|d| d.name == name)
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self::modal_example()
    }
}
