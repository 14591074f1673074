//! Recorded arguments of a single step call.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reserved keyword under which a step's resource handle is injected.
pub const RESOURCE_KWARG: &str = "conn";

/// A keyword argument of a step call.
///
/// Resource handles cannot be persisted, so they are recorded as an explicit
/// marker. The marker serializes as the placeholder string
/// `"<resource:{locator}>"`; reading a record back yields a plain value.
#[derive(Debug, Clone, PartialEq)]
pub enum StepArg {
    /// A plain serializable value.
    Value(Value),
    /// An injected resource handle, identified by its locator.
    Resource {
        /// Where the resource was opened from.
        locator: String,
    },
}

impl StepArg {
    /// Creates a resource marker.
    #[must_use]
    pub fn resource(locator: impl Into<String>) -> Self {
        Self::Resource {
            locator: locator.into(),
        }
    }

    /// Returns the value this argument persists as.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Resource { locator } => Value::String(format!("<resource:{locator}>")),
        }
    }

    /// Returns true for resource markers.
    #[must_use]
    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource { .. })
    }
}

impl From<Value> for StepArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl Serialize for StepArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Resource { locator } => {
                serializer.serialize_str(&format!("<resource:{locator}>"))
            }
        }
    }
}

impl<'de> Deserialize<'de> for StepArg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::Value)
    }
}

/// The exact arguments a step was invoked with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepInput {
    /// Positional arguments, in order.
    #[serde(default)]
    pub args: Vec<Value>,
    /// Keyword arguments.
    #[serde(default)]
    pub kwargs: BTreeMap<String, StepArg>,
}

impl StepInput {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an argument list with a single positional value.
    #[must_use]
    pub fn positional(value: Value) -> Self {
        Self {
            args: vec![value],
            kwargs: BTreeMap::new(),
        }
    }

    /// Records the carried-forward input of a step, if any.
    #[must_use]
    pub fn from_input(input: Option<&Value>) -> Self {
        input.map_or_else(Self::new, |value| Self::positional(value.clone()))
    }

    /// Adds a keyword argument.
    #[must_use]
    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<StepArg>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Records a resource handle under the reserved keyword.
    #[must_use]
    pub fn with_resource(self, locator: impl Into<String>) -> Self {
        self.with_kwarg(RESOURCE_KWARG, StepArg::resource(locator))
    }

    /// Returns the first positional argument.
    #[must_use]
    pub fn first_arg(&self) -> Option<&Value> {
        self.args.first()
    }

    /// Returns the arguments as a JSON value, for logging.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_input() {
        assert_eq!(StepInput::from_input(None), StepInput::new());
        assert_eq!(
            StepInput::from_input(Some(&json!(0))),
            StepInput::positional(json!(0))
        );
    }

    #[test]
    fn test_resource_marker_serializes_as_placeholder() {
        let input = StepInput::positional(json!([1, 2])).with_resource("data.db");

        assert_eq!(
            input.to_json(),
            json!({"args": [[1, 2]], "kwargs": {"conn": "<resource:data.db>"}})
        );
    }

    #[test]
    fn test_placeholder_reads_back_as_plain_value() {
        let input = StepInput::new().with_resource(":memory:");
        let encoded = serde_json::to_string(&input).unwrap();
        let decoded: StepInput = serde_json::from_str(&encoded).unwrap();

        let conn = decoded.kwargs.get(RESOURCE_KWARG).unwrap();
        assert!(!conn.is_resource());
        assert_eq!(conn.to_value(), json!("<resource::memory:>"));
    }

    #[test]
    fn test_missing_sections_default() {
        let decoded: StepInput = serde_json::from_str("{}").unwrap();
        assert!(decoded.args.is_empty());
        assert!(decoded.kwargs.is_empty());
        assert_eq!(decoded.first_arg(), None);
    }
}
