//! Golden-fixture comparison for canonicalized Fleet agent policies.
//!
//! The test runner downloads the policy a package under test produced,
//! canonicalizes it together with the checked-in fixture, and fails the
//! test with a unified diff when the canonical forms differ.

pub mod compare;
pub mod differ;
pub mod fixtures;

pub use compare::{compare_policies, compare_report, CompareError, ComparisonReport};
pub use differ::unified_diff;
pub use fixtures::expected_path;
