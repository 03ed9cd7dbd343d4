//! Typed errors for resource checks and waits.

use thiserror::Error;

/// Errors that arise from resource checks and bounded waits.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The package manager's "list installed" query failed.
    ///
    /// Fatal for the whole package phase: without the installed set every
    /// package would be reinstalled blindly.
    #[error("querying installed packages with {manager} failed: {output}")]
    QueryFailed {
        /// Package manager that was queried.
        manager: String,
        /// Captured output of the failed query.
        output: String,
    },

    /// A bounded wait expired before its condition held.
    #[error("timed out after {secs}s waiting for {what}")]
    Timeout {
        /// What was being waited for.
        what: String,
        /// Timeout that elapsed, in seconds.
        secs: u64,
    },
}
