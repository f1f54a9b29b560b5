//! Connector declaration schema
//!
//! The schema is a table of [`FieldRule`]s per node level. One routine checks
//! a node against its table: required fields must be present, every present
//! field must have the expected shape, and keys outside the table are handled
//! according to the [`UnknownKeyPolicy`].
//!
//! ```yaml
//! name: demo_connector            # required, non-empty string
//! jobs:                           # required mapping, job name -> job
//!   export_products:
//!     type: export                # required string
//!     steps:                      # required mapping, step name -> step
//!       read:
//!         class: ItemStep         # optional, defaults to DEFAULT_PROCESSOR_CLASS
//!         services:               # optional mapping, setter -> service id
//!           reader: app.reader.csv
//!         parameters:             # optional mapping, setter -> scalar
//!           batchSize: 100
//!       write: ~                  # a step with every default
//! ```
//!
//! A `null` where a mapping is expected counts as an empty mapping. Mapping
//! keys that are plain scalars (`1:`, `true:`) are used in their string form.
//! Validation is pure and performs no I/O.

use crate::config::UnknownKeyPolicy;
use crate::declaration::{ConnectorDeclaration, JobSpec, ScalarValue, StepSpec, DEFAULT_PROCESSOR_CLASS};
use crate::discovery::JobDefinitionSource;
use crate::error::{RegistryError, Result};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Shape a field value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    String,
    Mapping,
}

impl Shape {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Shape::String => matches!(value, Value::String(_)),
            Shape::Mapping => matches!(value, Value::Mapping(_) | Value::Null),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::String => "a string",
            Shape::Mapping => "a mapping",
        }
    }
}

/// Whether a field must be present, and its value when it is not
#[derive(Debug, Clone, Copy)]
enum Presence {
    Required,
    Defaulted(Fallback),
}

#[derive(Debug, Clone, Copy)]
enum Fallback {
    Text(&'static str),
    EmptyMapping,
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    key: &'static str,
    shape: Shape,
    presence: Presence,
}

impl FieldRule {
    const fn required(key: &'static str, shape: Shape) -> Self {
        Self {
            key,
            shape,
            presence: Presence::Required,
        }
    }

    const fn defaulted(key: &'static str, shape: Shape, fallback: Fallback) -> Self {
        Self {
            key,
            shape,
            presence: Presence::Defaulted(fallback),
        }
    }
}

const CONNECTOR_RULES: &[FieldRule] = &[
    FieldRule::required("name", Shape::String),
    FieldRule::required("jobs", Shape::Mapping),
];

const JOB_RULES: &[FieldRule] = &[
    FieldRule::required("type", Shape::String),
    FieldRule::required("steps", Shape::Mapping),
];

const STEP_RULES: &[FieldRule] = &[
    FieldRule::defaulted("class", Shape::String, Fallback::Text(DEFAULT_PROCESSOR_CLASS)),
    FieldRule::defaulted("services", Shape::Mapping, Fallback::EmptyMapping),
    FieldRule::defaulted("parameters", Shape::Mapping, Fallback::EmptyMapping),
];

/// Validates declaration documents and normalizes them into
/// [`ConnectorDeclaration`]s
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaValidator {
    unknown_keys: UnknownKeyPolicy,
}

impl SchemaValidator {
    pub fn new(unknown_keys: UnknownKeyPolicy) -> Self {
        Self { unknown_keys }
    }

    pub fn unknown_keys(&self) -> UnknownKeyPolicy {
        self.unknown_keys
    }

    /// Parse a source's YAML and validate it
    pub fn parse(&self, source: &JobDefinitionSource) -> Result<ConnectorDeclaration> {
        let document: Value = serde_yaml::from_str(source.text()?)
            .map_err(|e| RegistryError::parse(&source.path, e.to_string()))?;
        self.validate(&source.path, &document)
    }

    /// Validate an already parsed document. `path` only labels errors.
    pub fn validate(&self, path: &Path, document: &Value) -> Result<ConnectorDeclaration> {
        let pass = Pass {
            path,
            unknown_keys: self.unknown_keys,
        };

        let root = pass.check(document, "", CONNECTOR_RULES)?;
        let name = root.text("name");
        if name.trim().is_empty() {
            return Err(pass.error("name", "connector name cannot be empty"));
        }

        let mut jobs = IndexMap::new();
        for (job_name, job_value) in pass.entries(root.mapping("jobs"), "jobs")? {
            let job_field = join("jobs", &job_name);
            let job = pass.check(job_value, &job_field, JOB_RULES)?;

            let steps_field = join(&job_field, "steps");
            let mut steps = IndexMap::new();
            for (step_name, step_value) in pass.entries(job.mapping("steps"), &steps_field)? {
                let step_field = join(&steps_field, &step_name);
                steps.insert(step_name, pass.step(step_value, &step_field)?);
            }

            jobs.insert(
                job_name,
                JobSpec {
                    job_type: job.text("type"),
                    steps,
                },
            );
        }

        Ok(ConnectorDeclaration { name, jobs })
    }
}

/// One validation run over one document
struct Pass<'p> {
    path: &'p Path,
    unknown_keys: UnknownKeyPolicy,
}

/// A node whose fields passed their rules
struct CheckedNode<'a> {
    node: Option<&'a Mapping>,
    rules: &'static [FieldRule],
}

impl<'a> CheckedNode<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.node.and_then(|m| m.get(key))
    }

    fn rule(&self, key: &str) -> Option<&'static FieldRule> {
        self.rules.iter().find(|r| r.key == key)
    }

    /// String field, or its fallback when absent or null
    fn text(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            _ => match self.rule(key).map(|r| r.presence) {
                Some(Presence::Defaulted(Fallback::Text(text))) => text.to_string(),
                _ => String::new(),
            },
        }
    }

    /// Mapping field; `None` stands for the empty mapping
    fn mapping(&self, key: &str) -> Option<&'a Mapping> {
        match self.get(key) {
            Some(Value::Mapping(m)) => Some(m),
            _ => None,
        }
    }
}

impl<'p> Pass<'p> {
    fn error(&self, field: &str, message: impl Into<String>) -> RegistryError {
        let field = if field.is_empty() { "<root>" } else { field };
        RegistryError::schema(self.path, field, message)
    }

    /// Check a node against its rule table
    fn check<'a>(
        &self,
        value: &'a Value,
        field: &str,
        rules: &'static [FieldRule],
    ) -> Result<CheckedNode<'a>> {
        let node = match value {
            Value::Mapping(m) => Some(m),
            Value::Null => None,
            other => {
                return Err(self.error(
                    field,
                    format!("expected a mapping, found {}", kind(other)),
                ))
            },
        };

        if let Some(node) = node {
            for key in node.keys() {
                let known = key
                    .as_str()
                    .is_some_and(|k| rules.iter().any(|r| r.key == k));
                if !known {
                    let name = key_name(key).unwrap_or_else(|| format!("{:?}", key));
                    self.unknown_key(&join(field, &name))?;
                }
            }
        }

        for rule in rules {
            let key_field = join(field, rule.key);
            match node.and_then(|m| m.get(rule.key)) {
                None | Some(Value::Null) if rule.shape == Shape::String => {
                    if let Presence::Required = rule.presence {
                        return Err(self.error(&key_field, "required field is missing"));
                    }
                },
                None => {
                    if let Presence::Required = rule.presence {
                        return Err(self.error(&key_field, "required field is missing"));
                    }
                },
                Some(value) if !rule.shape.accepts(value) => {
                    return Err(self.error(
                        &key_field,
                        format!("expected {}, found {}", rule.shape.describe(), kind(value)),
                    ));
                },
                Some(_) => {},
            }
        }

        Ok(CheckedNode { node, rules })
    }

    fn unknown_key(&self, field: &str) -> Result<()> {
        match self.unknown_keys {
            UnknownKeyPolicy::Reject => Err(self.error(field, "unknown key")),
            UnknownKeyPolicy::Ignore => {
                debug!(path = %self.path.display(), field, "Ignoring unknown key");
                Ok(())
            },
        }
    }

    /// Entries of a user-keyed mapping, in document order, with string keys
    fn entries<'a>(&self, map: Option<&'a Mapping>, field: &str) -> Result<Vec<(String, &'a Value)>> {
        let Some(map) = map else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::with_capacity(map.len());
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            let name = key_name(key).ok_or_else(|| {
                self.error(field, format!("keys must be scalars, found {}", kind(key)))
            })?;
            if !seen.insert(name.clone()) {
                return Err(self.error(&join(field, &name), "key is declared more than once"));
            }
            entries.push((name, value));
        }
        Ok(entries)
    }

    fn step(&self, value: &Value, field: &str) -> Result<StepSpec> {
        let step = self.check(value, field, STEP_RULES)?;

        let services_field = join(field, "services");
        let mut collaborators = IndexMap::new();
        for (setter, service) in self.entries(step.mapping("services"), &services_field)? {
            match service {
                Value::String(id) => {
                    collaborators.insert(setter, id.clone());
                },
                other => {
                    return Err(self.error(
                        &join(&services_field, &setter),
                        format!("service id must be a string, found {}", kind(other)),
                    ))
                },
            }
        }

        let parameters_field = join(field, "parameters");
        let mut parameters = IndexMap::new();
        for (setter, value) in self.entries(step.mapping("parameters"), &parameters_field)? {
            let scalar = ScalarValue::from_yaml(value).ok_or_else(|| {
                self.error(
                    &join(&parameters_field, &setter),
                    format!("parameter must be a scalar, found {}", kind(value)),
                )
            })?;
            parameters.insert(setter, scalar);
        }

        Ok(StepSpec {
            processor_class: step.text("class"),
            collaborators,
            parameters,
        })
    }
}

/// Dotted field path of `key` under `prefix`
fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// String form of a scalar mapping key
fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
