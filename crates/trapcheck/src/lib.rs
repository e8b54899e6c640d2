//! Trapcheck: keyboard focus-cycle verification for modal dialogs
//!
//! Trapcheck drives a browser session through a modal dialog page, opening
//! each dialog by clicking its trigger path and asserting where focus lands
//! after every Tab, Shift+Tab and Escape. Static ARIA attributes of the
//! dialog containers are checked alongside.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   TRAPCHECK Architecture                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────────────┐    │
//! │   │ SuiteConfig│    │ SuiteRunner│    │ FocusDriver        │    │
//! │   │ (YAML)     │───►│ Verifier   │───►│ Chromium │ Mock    │    │
//! │   └────────────┘    └─────┬──────┘    └────────────────────┘    │
//! │                           ▼                                     │
//! │                     ┌────────────┐                              │
//! │                     │ SuiteReport│ text / JSON                  │
//! │                     └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Static ARIA attribute checks
pub mod aria;

/// Chromium driver (DevTools protocol)
#[cfg(feature = "browser")]
pub mod cdp;

/// Browser driver seam
pub mod driver;

/// Dialog fixtures and suite configuration
pub mod fixture;

/// Keyboard input
pub mod keys;

/// Simulated dialog page
pub mod mock;

/// Assertion records and reports
pub mod report;

/// Error types
pub mod result;

/// Scenario runner
pub mod runner;

/// Focus-cycle verifier
pub mod verifier;

/// Bounded polling
pub mod wait;

pub use aria::{check_describedby, check_dialog_role, check_labelledby, check_modal};
#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;
pub use driver::{id_locator, DriverConfig, ElementHandle, FocusDriver};
pub use fixture::{AriaExpectations, DialogFixture, SuiteConfig};
pub use keys::{Direction, Key, KeyChord, KeyTarget};
pub use mock::MockDriver;
pub use report::{AssertionRecord, ScenarioReport, ScenarioStatus, SuiteReport};
pub use result::{TrapError, TrapResult};
pub use runner::{Scenario, SuiteRunner};
pub use verifier::FocusCycleVerifier;
pub use wait::{poll_until, Timing, WaitOptions, WaitOutcome};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        DialogFixture, Direction, FocusCycleVerifier, FocusDriver, MockDriver, Scenario,
        ScenarioReport, SuiteConfig, SuiteReport, SuiteRunner, Timing, TrapError, TrapResult,
    };
    #[cfg(feature = "browser")]
    pub use super::{ChromiumDriver, DriverConfig};
}
