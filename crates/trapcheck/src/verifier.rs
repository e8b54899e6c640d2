//! Focus-Cycle Verifier
//!
//! Drives one browser session through the dialog interaction script and
//! records the focused element after every key press.
//!
//! ```text
//! open_dialog ──► lead-in presses ──► assert #1 ─Tab─► assert #2 ─Tab─► ...
//!                                                            │
//!                               assert #1 (wrapped) ◄─Tab─ assert #N
//! ```
//!
//! Assertion failures go to the [`ScenarioReport`] and never stop the
//! script. Driver errors are returned and end the current scenario.

use crate::driver::FocusDriver;
use crate::fixture::DialogFixture;
use crate::keys::{Direction, KeyChord, KeyTarget};
use crate::report::ScenarioReport;
use crate::result::{TrapError, TrapResult};
use crate::wait::{poll_until, Timing, WaitOutcome};

/// Runs focus scenarios against a single exclusively-owned session
#[derive(Debug)]
pub struct FocusCycleVerifier<D: FocusDriver> {
    driver: D,
    timing: Timing,
}

impl<D: FocusDriver> FocusCycleVerifier<D> {
    /// Wrap a session with default timing
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            timing: Timing::default(),
        }
    }

    /// Override timing
    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Current timing
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Borrow the session
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Borrow the session mutably
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Give the session back
    pub fn into_driver(self) -> D {
        self.driver
    }

    // =========================================================================
    // STEPS
    // =========================================================================

    /// Click through the trigger path and wait for the container to show.
    pub async fn open_dialog(
        &mut self,
        fixture: &DialogFixture,
        report: &mut ScenarioReport,
    ) -> TrapResult<()> {
        for selector in &fixture.trigger {
            tracing::debug!(dialog = %fixture.name, %selector, "click");
            self.driver.click(selector).await?;
        }

        let driver = &self.driver;
        let container = fixture.container.as_str();
        let outcome = poll_until(self.timing.open(), || async move {
            driver.is_displayed(container).await
        })
        .await?;

        if outcome.timed_out() {
            report.record(false, format!("{} should have successfully opened", fixture.name));
            return Err(TrapError::DialogNotOpened {
                dialog: fixture.name.clone(),
                ms: self.timing.open_timeout_ms,
            });
        }
        tracing::debug!(dialog = %fixture.name, polls = outcome.polls, "dialog open");
        Ok(())
    }

    /// Record whether `locator` resolves to the active element.
    ///
    /// Identity is compared in the page, never by text or attributes.
    pub async fn assert_focus(
        &self,
        report: &mut ScenarioReport,
        locator: &str,
        step: usize,
        direction: Direction,
        dialog: &str,
    ) -> TrapResult<bool> {
        let focused = self.driver.is_active(locator).await?;
        let message = format!(
            "Focus should be on \"{locator}\" after {step} {} have been sent to {dialog}",
            direction.press_noun()
        );
        if focused {
            report.record(true, message);
        } else {
            let observed = self
                .driver
                .active_element()
                .await?
                .map_or_else(|| "nothing".to_string(), |e| e.describe());
            report.record(false, format!("{message} (focus is on {observed})"));
        }
        Ok(focused)
    }

    /// Like [`Self::assert_focus`], but a mismatch is returned as
    /// [`TrapError::FocusMismatch`] instead of being recorded.
    pub async fn require_focus(&self, locator: &str, step: usize) -> TrapResult<()> {
        if self.driver.is_active(locator).await? {
            return Ok(());
        }
        let observed = self
            .driver
            .active_element()
            .await?
            .map_or_else(|| "nothing".to_string(), |e| e.describe());
        Err(TrapError::FocusMismatch {
            expected: locator.to_string(),
            observed,
            step,
        })
    }

    /// Press Tab or Shift+Tab on the focused element and wait for focus to
    /// move. A settle timeout is logged, not raised.
    pub async fn advance_focus(&mut self, direction: Direction) -> TrapResult<WaitOutcome> {
        self.press_and_settle(direction, true).await
    }

    /// `expect_move` is false when focus may legitimately stay put, as in a
    /// single-element cycle; a timeout is then only logged at debug level.
    async fn press_and_settle(
        &mut self,
        direction: Direction,
        expect_move: bool,
    ) -> TrapResult<WaitOutcome> {
        let before = self.driver.active_element().await?.map(|e| e.node_id);
        let chord = direction.chord();
        self.driver.send_keys(KeyTarget::Active, chord).await?;

        let driver = &self.driver;
        let before = before.as_deref();
        let outcome = poll_until(self.timing.settle(), || async move {
            let now = driver.active_element().await?;
            Ok::<_, TrapError>(now.as_ref().map(|e| e.node_id.as_str()) != before)
        })
        .await?;

        if outcome.timed_out() && expect_move {
            tracing::warn!(
                key = %chord,
                timeout_ms = self.timing.settle_timeout_ms,
                "focus did not move within settle window"
            );
        } else if outcome.timed_out() {
            tracing::debug!(key = %chord, "focus stayed on the only cycle element");
        } else {
            tracing::debug!(key = %chord, polls = outcome.polls, "focus settled");
        }
        Ok(outcome)
    }

    /// Send Escape straight to `locator` and record that the dialog closed.
    pub async fn send_escape(
        &mut self,
        fixture: &DialogFixture,
        locator: &str,
        report: &mut ScenarioReport,
    ) -> TrapResult<bool> {
        tracing::debug!(dialog = %fixture.name, %locator, "escape");
        self.driver
            .send_keys(KeyTarget::Selector(locator), KeyChord::ESCAPE)
            .await?;
        let closed = !self.driver.is_displayed(&fixture.container).await?;
        report.assert_true(
            closed,
            format!(
                "{} should be closed after sending escape to \"{locator}\"",
                fixture.name
            ),
        );
        Ok(closed)
    }

    /// Reload the current page
    pub async fn reload(&mut self) -> TrapResult<()> {
        self.driver.reload().await
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    /// Tab through the cycle and back to the first element.
    ///
    /// Records `len + 1` assertions once the dialog is open.
    pub async fn verify_tab_cycle(
        &mut self,
        fixture: &DialogFixture,
        report: &mut ScenarioReport,
    ) -> TrapResult<()> {
        self.walk_cycle(fixture, Direction::Forward, report).await
    }

    /// Shift+Tab through the cycle in reverse and back to the last element.
    ///
    /// Records `len + 1` assertions once the dialog is open.
    pub async fn verify_shift_tab_cycle(
        &mut self,
        fixture: &DialogFixture,
        report: &mut ScenarioReport,
    ) -> TrapResult<()> {
        self.walk_cycle(fixture, Direction::Backward, report).await
    }

    /// Escape from every focusable closes the dialog. Records `len`
    /// assertions and leaves the page freshly reloaded.
    pub async fn verify_escape(
        &mut self,
        fixture: &DialogFixture,
        report: &mut ScenarioReport,
    ) -> TrapResult<()> {
        for locator in &fixture.focusable {
            self.open_dialog(fixture, report).await?;
            self.send_escape(fixture, locator, report).await?;
            self.reload().await?;
        }
        Ok(())
    }

    async fn walk_cycle(
        &mut self,
        fixture: &DialogFixture,
        direction: Direction,
        report: &mut ScenarioReport,
    ) -> TrapResult<()> {
        self.open_dialog(fixture, report).await?;

        let (lead_in, order): (usize, Vec<&String>) = match direction {
            Direction::Forward => (fixture.tab_lead_in, fixture.focusable.iter().collect()),
            Direction::Backward => (
                fixture.shift_tab_lead_in,
                fixture.focusable.iter().rev().collect(),
            ),
        };
        let Some(&wrapped) = order.first() else {
            return Err(TrapError::invalid_fixture(format!(
                "{} has no focusable elements",
                fixture.name
            )));
        };

        let expect_move = fixture.cycle_len() > 1;
        for _ in 0..lead_in {
            self.press_and_settle(direction, expect_move).await?;
        }

        let mut step = lead_in;
        for locator in order {
            self.assert_focus(report, locator, step, direction, &fixture.name)
                .await?;
            self.press_and_settle(direction, expect_move).await?;
            step += 1;
        }
        self.assert_focus(report, wrapped, step, direction, &fixture.name)
            .await?;
        Ok(())
    }
}
