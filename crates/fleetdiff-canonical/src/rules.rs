//! Declarative filter rules applied to a parsed policy before comparison.
//!
//! The rules remove or normalize fields whose content is generated by the
//! stack and is not relevant for a package test: random identifiers,
//! revision counters, deployment-dependent outputs, signatures. The table
//! is ordered; later rules act on the tree as mutated by earlier rules.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use regex::Regex;
use serde_yaml::Value;

use crate::canonicalizer::CanonicalizationError;
use crate::tree::{value_kind, Policy};

/// One filter applied to a dotted path of the policy.
#[derive(Debug, Clone, Copy)]
pub struct EntryFilter {
    /// Dotted field path the filter acts on. An absent path is a no-op.
    pub path: &'static str,
    /// What to do with the value at `path`.
    pub action: FilterAction,
}

/// The action variants a filter can take.
#[derive(Debug, Clone, Copy)]
pub enum FilterAction {
    /// Remove the field.
    Delete,
    /// Remove the field only when its value is empty: absent, null, an
    /// empty map, an empty list, or a list whose only elements appear in
    /// `ignore_values`.
    DeleteIfEmpty {
        /// Scalar values disregarded when testing a list for emptiness.
        ignore_values: &'static [&'static str],
    },
    /// The value must be a list of maps; apply the nested filters to each
    /// element in place.
    Recurse(&'static [EntryFilter]),
    /// The value must be a map; move entries whose key matches `pattern`
    /// to `replacement`. Used to normalize volatile identifiers that occur
    /// as map keys.
    RenameKeys {
        /// Anchored pattern matched against each key.
        pattern: &'static str,
        /// Stable key the matching entries are moved to.
        replacement: &'static str,
    },
}

/// Filters applied to every policy before comparison. Ported across stack
/// versions as the download API changes; order matters.
pub const POLICY_ENTRY_FILTERS: &[EntryFilter] = &[
    // IDs are not relevant.
    EntryFilter {
        path: "id",
        action: FilterAction::Delete,
    },
    EntryFilter {
        path: "inputs",
        action: FilterAction::Recurse(&[
            EntryFilter {
                path: "id",
                action: FilterAction::Delete,
            },
            EntryFilter {
                path: "package_policy_id",
                action: FilterAction::Delete,
            },
            EntryFilter {
                path: "streams",
                action: FilterAction::Recurse(&[EntryFilter {
                    path: "id",
                    action: FilterAction::Delete,
                }]),
            },
        ]),
    },
    EntryFilter {
        path: "secret_references",
        action: FilterAction::Recurse(&[EntryFilter {
            path: "id",
            action: FilterAction::Delete,
        }]),
    },
    // Avoid having to regenerate files every time the package version changes.
    EntryFilter {
        path: "inputs",
        action: FilterAction::Recurse(&[EntryFilter {
            path: "meta.package.version",
            action: FilterAction::Delete,
        }]),
    },
    // Revision is not relevant, it is usually the same.
    EntryFilter {
        path: "revision",
        action: FilterAction::Delete,
    },
    EntryFilter {
        path: "inputs",
        action: FilterAction::Recurse(&[EntryFilter {
            path: "revision",
            action: FilterAction::Delete,
        }]),
    },
    // Outputs, agent and fleet can depend on the deployment.
    EntryFilter {
        path: "agent",
        action: FilterAction::Delete,
    },
    EntryFilter {
        path: "fleet",
        action: FilterAction::Delete,
    },
    EntryFilter {
        path: "outputs",
        action: FilterAction::Delete,
    },
    // Signatures that change from installation to installation.
    EntryFilter {
        path: "agent.protection.uninstall_token_hash",
        action: FilterAction::Delete,
    },
    EntryFilter {
        path: "agent.protection.signing_key",
        action: FilterAction::Delete,
    },
    EntryFilter {
        path: "signed",
        action: FilterAction::Delete,
    },
    // We want to check permissions, but one is stored under a random UUID,
    // replace it.
    EntryFilter {
        path: "output_permissions.default",
        action: FilterAction::RenameKeys {
            pattern: r"^[a-z0-9]{4,}(-[a-z0-9]{4,})+$",
            replacement: "uuid-for-permissions-on-related-indices",
        },
    },
    // Namespaces may not be present in older versions of the stack.
    EntryFilter {
        path: "namespaces",
        action: FilterAction::DeleteIfEmpty {
            ignore_values: &["default"],
        },
    },
    // Values set by Fleet in input packages starting on 9.1.0.
    EntryFilter {
        path: "inputs",
        action: FilterAction::Recurse(&[EntryFilter {
            path: "streams",
            action: FilterAction::Recurse(&[
                EntryFilter {
                    path: "data_stream.type",
                    action: FilterAction::Delete,
                },
                EntryFilter {
                    path: "data_stream.elasticsearch.dynamic_dataset",
                    action: FilterAction::Delete,
                },
                EntryFilter {
                    path: "data_stream.elasticsearch.dynamic_namespace",
                    action: FilterAction::Delete,
                },
                EntryFilter {
                    path: "data_stream.elasticsearch",
                    action: FilterAction::DeleteIfEmpty { ignore_values: &[] },
                },
            ]),
        }]),
    },
];

/// Applies an ordered list of filters to a policy, in table order.
pub fn apply_filters(
    policy: &mut Policy,
    filters: &[EntryFilter],
) -> Result<(), CanonicalizationError> {
    for filter in filters {
        match filter.action {
            FilterAction::Delete => {
                policy.delete(filter.path);
            }
            FilterAction::DeleteIfEmpty { ignore_values } => {
                let empty = match policy.get(filter.path) {
                    None => continue,
                    Some(value) => is_empty(value, ignore_values),
                };
                if empty {
                    policy.delete(filter.path);
                }
            }
            FilterAction::Recurse(nested) => {
                let value = match policy.get(filter.path) {
                    None => continue,
                    Some(value) => value.clone(),
                };
                let items = match value {
                    Value::Sequence(items) => items,
                    other => {
                        return Err(CanonicalizationError::ExpectedList {
                            path: filter.path.to_string(),
                            found: value_kind(&other),
                        })
                    }
                };
                let mut clean = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let mapping = match item {
                        Value::Mapping(mapping) => mapping,
                        other => {
                            return Err(CanonicalizationError::ExpectedMap {
                                path: format!("{}[{}]", filter.path, index),
                                found: value_kind(&other),
                            })
                        }
                    };
                    let mut element = Policy::from(mapping);
                    apply_filters(&mut element, nested)?;
                    clean.push(Value::Mapping(element.into_inner()));
                }
                policy.put(filter.path, Value::Sequence(clean))?;
            }
            FilterAction::RenameKeys {
                pattern,
                replacement,
            } => {
                let regex = key_pattern(pattern);
                let value = match policy.get_mut(filter.path) {
                    None => continue,
                    Some(value) => value,
                };
                let kind = value_kind(value);
                let mapping = match value.as_mapping_mut() {
                    Some(mapping) => mapping,
                    None => {
                        return Err(CanonicalizationError::ExpectedMap {
                            path: filter.path.to_string(),
                            found: kind,
                        })
                    }
                };
                let matching: Vec<String> = mapping
                    .iter()
                    .filter_map(|(key, _)| key.as_str())
                    .filter(|key| regex.is_match(key))
                    .map(str::to_string)
                    .collect();
                for key in matching {
                    if let Some(entry) = mapping.remove(key.as_str()) {
                        mapping.insert(Value::String(replacement.to_string()), entry);
                    }
                }
            }
        }
    }
    Ok(())
}

/// Key patterns, compiled once per distinct pattern rather than per
/// document. The clone is cheap; `Regex` shares its compiled program.
static KEY_PATTERNS: OnceLock<Mutex<HashMap<&'static str, Regex>>> = OnceLock::new();

fn key_pattern(pattern: &'static str) -> Regex {
    let cache = KEY_PATTERNS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    cache
        .entry(pattern)
        .or_insert_with(|| Regex::new(pattern).expect("invalid key pattern"))
        .clone()
}

fn is_empty(value: &Value, ignore_values: &[&str]) -> bool {
    match value {
        Value::Null => true,
        Value::Mapping(mapping) => mapping.is_empty(),
        Value::Sequence(items) => items
            .iter()
            .all(|item| matches!(item.as_str(), Some(s) if ignore_values.contains(&s))),
        _ => false,
    }
}
