//! Canonical form builder for Fleet agent policies.
//!
//! A policy downloaded from the Fleet API differs from a checked-in
//! fixture in server-generated noise: random identifiers, revision
//! counters, deployment-dependent outputs, and non-deterministic names
//! for embedded collector components. This crate reduces both documents
//! to a canonical byte form that is identical whenever the two policies
//! are semantically equivalent:
//!
//! 1. component identifiers are rewritten to stable, order-derived
//!    placeholders before parsing ([`components`]);
//! 2. the document is parsed into an order-preserving tree ([`tree`]);
//! 3. a fixed, declarative rule table removes or normalizes generated
//!    fields ([`rules`]);
//! 4. the tree is re-serialized with sorted keys ([`canonicalizer`]).
#![deny(missing_docs)]

/// The raw-bytes-to-canonical-bytes pipeline and its error type.
pub mod canonicalizer;
/// Pre-parse rewrite of collector component identifiers.
pub mod components;
/// The filter rule engine and the fixed policy rule table.
pub mod rules;
/// Parsed policy tree with dotted-path accessors.
pub mod tree;

pub use canonicalizer::{canonicalize, CanonicalizationError, ENDPOINT_PLACEHOLDER};
pub use components::rewrite_component_ids;
pub use rules::{apply_filters, EntryFilter, FilterAction, POLICY_ENTRY_FILTERS};
pub use tree::Policy;
