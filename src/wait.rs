//! Bounded polling.
use std::time::{Duration, Instant};

use crate::resources::error::ResourceError;

/// Timing for [`poll_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Give up after this long.
    pub timeout: Duration,
    /// Sleep between checks.
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            interval: Duration::from_millis(500),
        }
    }
}

/// Call `condition` until it returns `true` or `opts.timeout` elapses.
///
/// The condition is checked once before any sleeping, so an already
/// satisfied condition returns immediately. A timeout too large to represent
/// as an [`Instant`] means no deadline.
///
/// # Errors
///
/// Returns [`ResourceError::Timeout`] naming `what` when the deadline passes
/// without the condition holding.
pub fn poll_until(
    what: &str,
    opts: PollOptions,
    mut condition: impl FnMut() -> bool,
) -> Result<(), ResourceError> {
    let deadline = Instant::now().checked_add(opts.timeout);
    loop {
        if condition() {
            return Ok(());
        }
        let now = Instant::now();
        let pause = match deadline {
            Some(deadline) if now >= deadline => {
                return Err(ResourceError::Timeout {
                    what: what.to_string(),
                    secs: opts.timeout.as_secs(),
                });
            }
            Some(deadline) => opts.interval.min(deadline - now),
            None => opts.interval,
        };
        std::thread::sleep(pause);
    }
}
