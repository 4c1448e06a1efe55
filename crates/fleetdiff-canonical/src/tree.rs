//! Order-preserving tree model for parsed policies, with dotted-path access.

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

use crate::canonicalizer::CanonicalizationError;

/// A parsed policy document.
///
/// The root is always a string-keyed map. Field access uses dotted paths
/// (`agent.protection.signing_key`); a missing path is reported as `None`
/// or a no-op, never as an error, so filters can tolerate documents from
/// stack versions that omit optional sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Policy {
    root: Mapping,
}

impl Policy {
    /// Parses a policy document from raw YAML bytes.
    ///
    /// An empty or `null` document parses as an empty policy. Anchors and
    /// aliases are expanded by the deserializer, so the resulting tree
    /// never contains shared substructure.
    pub fn parse(bytes: &[u8]) -> Result<Self, CanonicalizationError> {
        let value: Value = serde_yaml::from_slice(bytes)?;
        match value {
            Value::Null => Ok(Self::default()),
            Value::Mapping(root) => Ok(Self { root }),
            other => Err(CanonicalizationError::InvalidDocument {
                found: value_kind(&other),
            }),
        }
    }

    /// Returns the value at a dotted path, or `None` if any segment is absent
    /// or an intermediate value is not a map.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut value = self.root.get(segments.next()?)?;
        for segment in segments {
            value = value.as_mapping()?.get(segment)?;
        }
        Some(value)
    }

    /// Mutable variant of [`Policy::get`].
    pub fn get_mut(&mut self, path: &str) -> Option<&mut Value> {
        let mut segments = path.split('.');
        let mut value = self.root.get_mut(segments.next()?)?;
        for segment in segments {
            value = value.as_mapping_mut()?.get_mut(segment)?;
        }
        Some(value)
    }

    /// Sets the value at a dotted path, creating intermediate maps as needed.
    ///
    /// Fails if an existing intermediate value is not a map; the error names
    /// the path prefix of the offending intermediate.
    pub fn put(&mut self, path: &str, value: Value) -> Result<(), CanonicalizationError> {
        let (parent, key) = match path.rsplit_once('.') {
            Some((parent, key)) => (Some(parent), key),
            None => (None, path),
        };

        let mut current = &mut self.root;
        if let Some(parent) = parent {
            let mut walked = 0;
            for segment in parent.split('.') {
                walked += segment.len() + usize::from(walked > 0);
                let slot = current
                    .entry(Value::String(segment.to_string()))
                    .or_insert_with(|| Value::Mapping(Mapping::new()));
                let kind = value_kind(slot);
                current = match slot.as_mapping_mut() {
                    Some(mapping) => mapping,
                    None => {
                        return Err(CanonicalizationError::ExpectedMap {
                            path: parent[..walked].to_string(),
                            found: kind,
                        })
                    }
                };
            }
        }
        current.insert(Value::String(key.to_string()), value);
        Ok(())
    }

    /// Removes the value at a dotted path. Returns whether anything was
    /// removed; an absent path is a no-op.
    pub fn delete(&mut self, path: &str) -> bool {
        match path.rsplit_once('.') {
            None => self.root.remove(path).is_some(),
            Some((parent, key)) => match self.get_mut(parent).and_then(Value::as_mapping_mut) {
                Some(mapping) => mapping.remove(key).is_some(),
                None => false,
            },
        }
    }

    /// Serializes the policy to canonical YAML bytes: map keys are sorted
    /// recursively, so structurally equal trees always serialize to the same
    /// bytes regardless of construction order.
    pub fn to_canonical_yaml(&self) -> Result<Vec<u8>, CanonicalizationError> {
        let sorted = sort_value(Value::Mapping(self.root.clone()));
        let text = serde_yaml::to_string(&sorted)?;
        Ok(text.into_bytes())
    }

    /// Consumes the policy, returning the underlying mapping.
    pub fn into_inner(self) -> Mapping {
        self.root
    }
}

impl From<Mapping> for Policy {
    fn from(root: Mapping) -> Self {
        Self { root }
    }
}

/// Returns a recursively key-sorted copy of a value.
pub fn sort_value(value: Value) -> Value {
    match value {
        Value::Mapping(mapping) => {
            let mut entries: Vec<(Value, Value)> = mapping
                .into_iter()
                .map(|(key, value)| (key, sort_value(value)))
                .collect();
            entries.sort_by_key(|(key, _)| key_order(key));
            Value::Mapping(entries.into_iter().collect())
        }
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(sort_value).collect()),
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag,
            value: sort_value(tagged.value),
        })),
        other => other,
    }
}

fn key_order(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "~".to_string(),
        other => format!("{:?}", other),
    }
}

/// Human-readable kind of a value, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "map",
        Value::Tagged(_) => "tagged value",
    }
}
