//! The full pipeline from raw policy bytes to canonical bytes.

use serde_yaml::Value;

use crate::components::rewrite_component_ids;
use crate::rules::{apply_filters, POLICY_ENTRY_FILTERS};
use crate::tree::Policy;

/// Placeholder host that every exporter endpoint is normalized to, so
/// deployment-specific endpoints never cause a mismatch.
pub const ENDPOINT_PLACEHOLDER: &str = "https://elasticsearch:9200";

/// Error returned when a policy cannot be canonicalized.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// The policy is not valid UTF-8 text.
    #[error("policy is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
    /// The policy could not be decoded as YAML, or the cleaned tree could
    /// not be re-encoded.
    #[error("failed to decode policy: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The document root is not a map.
    #[error("failed to decode policy: expected a map at the document root, found {found}")]
    InvalidDocument {
        /// Kind of the unexpected root value.
        found: &'static str,
    },
    /// A filter expected a list at a path but found a different kind.
    /// Signals that the document's shape changed in a way the rule table
    /// does not anticipate.
    #[error("expected list at {path}, found {found}")]
    ExpectedList {
        /// Dotted path of the unexpected value.
        path: String,
        /// Kind of the value actually found.
        found: &'static str,
    },
    /// A filter expected a map at a path but found a different kind.
    #[error("expected map at {path}, found {found}")]
    ExpectedMap {
        /// Dotted path of the unexpected value.
        path: String,
        /// Kind of the value actually found.
        found: &'static str,
    },
}

/// Reduces a policy document as returned by the download API to its
/// canonical form: component identifiers renamed to stable placeholders,
/// generated fields removed per the fixed rule table, exporter endpoints
/// normalized, and the tree re-serialized with sorted keys.
///
/// Two semantically equivalent policies canonicalize to identical bytes,
/// and canonicalizing canonical output returns it unchanged.
pub fn canonicalize(policy: &[u8]) -> Result<Vec<u8>, CanonicalizationError> {
    // Component ID replacement runs before parsing. The IDs are keys in
    // maps, numbered by declaration order within each section, and they are
    // referenced as bare strings inside ordered lists; neither survives a
    // parsed-and-resorted tree.
    let text = std::str::from_utf8(policy)?;
    let rewritten = rewrite_component_ids(text);

    let mut policy = Policy::parse(rewritten.as_bytes())?;
    apply_filters(&mut policy, POLICY_ENTRY_FILTERS)?;
    normalize_exporter_endpoints(&mut policy);

    policy.to_canonical_yaml()
}

/// Replaces every string element of `exporters.<any>.endpoints` with
/// [`ENDPOINT_PLACEHOLDER`]. The endpoints point at whatever cluster the
/// stack under test runs on; only their presence is meaningful.
fn normalize_exporter_endpoints(policy: &mut Policy) {
    let exporters = match policy.get_mut("exporters").and_then(Value::as_mapping_mut) {
        Some(exporters) => exporters,
        None => return,
    };
    for (_, exporter) in exporters.iter_mut() {
        let endpoints = exporter
            .as_mapping_mut()
            .and_then(|exporter| exporter.get_mut("endpoints"))
            .and_then(Value::as_sequence_mut);
        if let Some(endpoints) = endpoints {
            for endpoint in endpoints.iter_mut() {
                if endpoint.is_string() {
                    *endpoint = Value::String(ENDPOINT_PLACEHOLDER.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_documents_canonicalize_to_an_empty_map() {
        assert_eq!(canonicalize(b"").unwrap(), b"{}\n".to_vec());
        assert_eq!(canonicalize(b"\n").unwrap(), b"{}\n".to_vec());
    }

    #[test]
    fn non_document_input_is_a_decode_error() {
        let err = canonicalize(b"404 Not Found\n").unwrap_err();
        assert!(matches!(
            err,
            CanonicalizationError::InvalidDocument { found: "string" }
        ));
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let err = canonicalize(b"\xff\xfe").unwrap_err();
        assert!(matches!(err, CanonicalizationError::InvalidEncoding(_)));
    }

    #[test]
    fn exporter_endpoints_collapse_to_the_placeholder() {
        let canonical = canonicalize(
            b"exporters:\n  elasticsearch/default:\n    endpoints:\n    - https://node1.elastic.cloud:443\n    - https://node2.elastic.cloud:443\n    - http://node3.example.com:9200\n",
        )
        .unwrap();
        let text = String::from_utf8(canonical).unwrap();
        assert_eq!(text.matches(ENDPOINT_PLACEHOLDER).count(), 3);
        assert!(!text.contains("elastic.cloud"));
        assert!(text.contains("elasticsearch/componentid-0"));
    }
}
