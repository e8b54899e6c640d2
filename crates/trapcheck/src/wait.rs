//! Wait Mechanisms
//!
//! Bounded polling used to synchronize with the browser's asynchronous
//! focus updates and dialog transitions.
//!
//! Key dispatch returns before the browser has moved focus, so every key
//! press is followed by a settle wait: poll a predicate until it holds or
//! the timeout expires. A timeout is reported to the caller, never raised;
//! the caller decides whether it matters.

use crate::result::{TrapError, TrapResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default settle timeout after a focus-moving key press (200ms)
///
/// Focus updates that land after this window are observed by the next
/// assertion instead, which shows up as a mismatch. Known source of
/// nondeterminism on slow machines; raise it through `Timing`.
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 200;

/// Default timeout for a dialog to become displayed (2 seconds)
pub const DEFAULT_OPEN_TIMEOUT_MS: u64 = 2_000;

/// Default polling interval (10ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for a single bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// TIMING
// =============================================================================

/// Timing knobs for a suite run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Settle window after Tab/Shift+Tab
    pub settle_timeout_ms: u64,
    /// Window for a dialog to appear after its trigger path is clicked
    pub open_timeout_ms: u64,
    /// Poll interval shared by both waits
    pub poll_interval_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
            open_timeout_ms: DEFAULT_OPEN_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Timing {
    /// Wait options for the post-key settle wait
    #[must_use]
    pub const fn settle(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.settle_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Wait options for the dialog-open wait
    #[must_use]
    pub const fn open(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.open_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Reject values that make every wait meaningless
    pub fn validate(&self) -> TrapResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(TrapError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        if self.open_timeout_ms == 0 {
            return Err(TrapError::Config {
                message: "open_timeout_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// WAIT OUTCOME
// =============================================================================

/// Result of a bounded poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Predicate held before the timeout
    pub satisfied: bool,
    /// Number of predicate evaluations
    pub polls: usize,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Configured timeout
    pub timeout: Duration,
}

impl WaitOutcome {
    /// Whether the wait ended without the predicate holding
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        !self.satisfied
    }

    /// Convert a timed-out wait into `TrapError::SettleTimeout`
    pub fn into_result(self) -> TrapResult<Self> {
        if self.satisfied {
            Ok(self)
        } else {
            Err(TrapError::SettleTimeout {
                ms: self.timeout.as_millis() as u64,
            })
        }
    }
}

/// Poll `predicate` until it returns `true` or the timeout expires.
///
/// The predicate is evaluated at least once, even with a zero timeout.
/// Errors from the predicate abort the wait.
pub async fn poll_until<F, Fut>(options: WaitOptions, mut predicate: F) -> TrapResult<WaitOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TrapResult<bool>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let mut polls = 0;

    loop {
        polls += 1;
        if predicate().await? {
            return Ok(WaitOutcome {
                satisfied: true,
                polls,
                elapsed: start.elapsed(),
                timeout,
            });
        }

        if start.elapsed() >= timeout {
            return Ok(WaitOutcome {
                satisfied: false,
                polls,
                elapsed: start.elapsed(),
                timeout,
            });
        }

        tokio::time::sleep(options.poll_interval()).await;
    }
}
