//! Normalized job declarations
//!
//! These are the values the schema validator produces from one declaration
//! document. They are transient: the compiler turns them into
//! [`StepRegistration`](crate::registry::StepRegistration)s and drops them.
//! All maps keep the order of the source document.

use indexmap::IndexMap;
use serde::Serialize;

/// Processor class of a step that does not declare `class`
pub const DEFAULT_PROCESSOR_CLASS: &str = "ItemStep";

/// One connector's job declarations (one per document)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorDeclaration {
    /// Connector name, never empty
    pub name: String,

    /// Jobs keyed by job name, in declared order
    pub jobs: IndexMap<String, JobSpec>,
}

/// A job: its type and its ordered steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSpec {
    #[serde(rename = "type")]
    pub job_type: String,

    /// Steps keyed by step name, in declared order
    pub steps: IndexMap<String, StepSpec>,
}

/// A step: processor class plus the wiring handed to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSpec {
    #[serde(rename = "class")]
    pub processor_class: String,

    /// Setter name to service id, resolved only at execution time
    #[serde(rename = "services")]
    pub collaborators: IndexMap<String, String>,

    /// Setter name to scalar value
    pub parameters: IndexMap<String, ScalarValue>,
}

impl Default for StepSpec {
    fn default() -> Self {
        Self {
            processor_class: DEFAULT_PROCESSOR_CLASS.to_string(),
            collaborators: IndexMap::new(),
            parameters: IndexMap::new(),
        }
    }
}

/// A step parameter value, carried through exactly as declared
#[derive(Debug, Clone, PartialEq, Hash, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Number(serde_yaml::Number),
    String(String),
}

impl ScalarValue {
    /// Convert a YAML value, or `None` if it is not a scalar
    pub fn from_yaml(value: &serde_yaml::Value) -> Option<Self> {
        match value {
            serde_yaml::Value::Null => Some(ScalarValue::Null),
            serde_yaml::Value::Bool(b) => Some(ScalarValue::Bool(*b)),
            serde_yaml::Value::Number(n) => Some(ScalarValue::Number(n.clone())),
            serde_yaml::Value::String(s) => Some(ScalarValue::String(s.clone())),
            serde_yaml::Value::Sequence(_)
            | serde_yaml::Value::Mapping(_)
            | serde_yaml::Value::Tagged(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "null"),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Number(n) => write!(f, "{}", n),
            ScalarValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Number(value.into())
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Number(value.into())
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}
