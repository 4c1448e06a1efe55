//! Verdict layer: canonicalize both sides and explain any divergence.

use fleetdiff_canonical::{canonicalize, CanonicalizationError};
use serde::Serialize;
use tracing::trace;

use crate::differ::unified_diff;

/// Context lines shown around each change in the reported diff.
const DIFF_CONTEXT: usize = 1;

/// Error returned when either side of a comparison cannot be
/// canonicalized. No partial comparison is attempted.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// The checked-in expected policy failed to canonicalize.
    #[error("failed to prepare expected policy: {0}")]
    Expected(#[source] CanonicalizationError),
    /// The downloaded policy failed to canonicalize.
    #[error("failed to prepare found policy: {0}")]
    Found(#[source] CanonicalizationError),
}

/// Machine-readable comparison outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    /// Whether the canonical forms were byte-identical.
    pub equal: bool,
    /// Unified diff between the canonical forms; empty when `equal`.
    pub diff: String,
}

/// Canonicalizes both policies independently and compares the results.
///
/// Returns an empty string when the canonical forms are byte-identical,
/// and a unified diff (labels `want`/`got`, one line of context)
/// otherwise. A mismatch is a normal outcome, distinct from the error
/// channel; only canonicalization failures are errors.
pub fn compare_policies(expected: &[u8], found: &[u8]) -> Result<String, CompareError> {
    let want = canonicalize(expected).map_err(CompareError::Expected)?;
    let got = canonicalize(found).map_err(CompareError::Found)?;
    trace!(
        "expected policy after cleaning:\n{}",
        String::from_utf8_lossy(&want)
    );
    trace!(
        "found policy after cleaning:\n{}",
        String::from_utf8_lossy(&got)
    );

    if want == got {
        return Ok(String::new());
    }
    Ok(unified_diff(
        &String::from_utf8_lossy(&want),
        &String::from_utf8_lossy(&got),
        DIFF_CONTEXT,
    ))
}

/// [`compare_policies`] packaged as a serializable report.
pub fn compare_report(expected: &[u8], found: &[u8]) -> Result<ComparisonReport, CompareError> {
    let diff = compare_policies(expected, found)?;
    Ok(ComparisonReport {
        equal: diff.is_empty(),
        diff,
    })
}
