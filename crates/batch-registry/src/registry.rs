//! Job registry
//!
//! The compiler appends one [`StepRegistration`] per declared step to a
//! [`RegistrySink`]. [`InMemoryJobRegistry`] is the sink used by default; once
//! compilation is done it is frozen into a [`FrozenJobRegistry`], which is
//! immutable and cheap to share across executor threads.

use crate::declaration::ScalarValue;
use crate::error::{RegistryError, Result};
use crate::services::ServiceLocator;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// One step of one job, as registered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRegistration {
    pub connector_name: String,
    pub job_type: String,
    pub job_name: String,
    pub step_name: String,
    pub processor_class: String,

    /// Setter name to service id
    pub collaborators: IndexMap<String, String>,

    /// Setter name to scalar value
    pub parameters: IndexMap<String, ScalarValue>,
}

impl StepRegistration {
    /// Resolve every collaborator id, keeping setter order.
    ///
    /// Fails on the first id the locator does not know.
    pub fn resolve_collaborators<L>(&self, locator: &L) -> Result<IndexMap<String, L::Handle>>
    where
        L: ServiceLocator + ?Sized,
    {
        self.collaborators
            .iter()
            .map(|(setter, id)| {
                locator
                    .resolve(id)
                    .map(|handle| (setter.clone(), handle))
                    .ok_or_else(|| RegistryError::UnknownService {
                        step: format!("{}.{}", self.job_name, self.step_name),
                        setter: setter.clone(),
                        service_id: id.clone(),
                    })
            })
            .collect()
    }
}

/// Destination of compiled step registrations
pub trait RegistrySink {
    fn add_step_to_job(&mut self, registration: StepRegistration);
}

impl RegistrySink for Vec<StepRegistration> {
    fn add_step_to_job(&mut self, registration: StepRegistration) {
        self.push(registration);
    }
}

/// Read access to registered steps, in registration order
pub trait JobCatalog {
    fn records(&self) -> &[StepRegistration];

    fn len(&self) -> usize {
        self.records().len()
    }

    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Job names, in order of first registration
    fn jobs(&self) -> Vec<&str> {
        distinct(self.records().iter().map(|r| r.job_name.as_str()))
    }

    /// Steps of `job`, in registration order
    fn steps_for(&self, job: &str) -> Vec<&StepRegistration> {
        self.records().iter().filter(|r| r.job_name == job).collect()
    }

    /// Connector names, in order of first registration
    fn connectors(&self) -> Vec<&str> {
        distinct(self.records().iter().map(|r| r.connector_name.as_str()))
    }
}

fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Mutable registry filled during compilation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryJobRegistry {
    records: Vec<StepRegistration>,
}

impl InMemoryJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop accepting registrations and share the result
    pub fn freeze(self) -> FrozenJobRegistry {
        FrozenJobRegistry {
            records: self.records.into(),
        }
    }
}

impl RegistrySink for InMemoryJobRegistry {
    fn add_step_to_job(&mut self, registration: StepRegistration) {
        self.records.push(registration);
    }
}

impl JobCatalog for InMemoryJobRegistry {
    fn records(&self) -> &[StepRegistration] {
        &self.records
    }
}

/// Immutable registry; clones share the same records
#[derive(Debug, Clone)]
pub struct FrozenJobRegistry {
    records: Arc<[StepRegistration]>,
}

impl JobCatalog for FrozenJobRegistry {
    fn records(&self) -> &[StepRegistration] {
        &self.records
    }
}

impl Serialize for FrozenJobRegistry {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn step(connector: &str, job: &str, step: &str) -> StepRegistration {
        StepRegistration {
            connector_name: connector.to_string(),
            job_type: "export".to_string(),
            job_name: job.to_string(),
            step_name: step.to_string(),
            processor_class: "ItemStep".to_string(),
            collaborators: IndexMap::new(),
            parameters: IndexMap::new(),
        }
    }

    #[test]
    fn test_catalog_queries_keep_registration_order() {
        let mut registry = InMemoryJobRegistry::new();
        registry.add_step_to_job(step("csv", "export_b", "read"));
        registry.add_step_to_job(step("csv", "export_a", "read"));
        registry.add_step_to_job(step("xml", "export_b", "write"));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.jobs(), vec!["export_b", "export_a"]);
        assert_eq!(registry.connectors(), vec!["csv", "xml"]);

        let steps: Vec<&str> = registry
            .steps_for("export_b")
            .iter()
            .map(|r| r.step_name.as_str())
            .collect();
        assert_eq!(steps, vec!["read", "write"]);
        assert!(registry.steps_for("missing").is_empty());
    }

    #[test]
    fn test_freeze_keeps_records_and_shares_them() {
        let mut registry = InMemoryJobRegistry::new();
        registry.add_step_to_job(step("csv", "export", "read"));
        let expected = registry.records().to_vec();

        let frozen = registry.freeze();
        let clone = frozen.clone();
        assert_eq!(frozen.records(), expected.as_slice());
        assert!(std::ptr::eq(frozen.records(), clone.records()));
    }

    #[test]
    fn test_vec_is_a_sink() {
        let mut sink: Vec<StepRegistration> = Vec::new();
        sink.add_step_to_job(step("csv", "export", "read"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_resolve_collaborators() {
        let mut registration = step("csv", "export", "write");
        registration
            .collaborators
            .insert("writer".to_string(), "app.writer.csv".to_string());
        registration
            .collaborators
            .insert("processor".to_string(), "app.processor".to_string());

        let mut services: HashMap<String, &str> = HashMap::new();
        services.insert("app.writer.csv".to_string(), "csv writer");
        services.insert("app.processor".to_string(), "processor");

        let resolved = registration.resolve_collaborators(&services).unwrap();
        let setters: Vec<&str> = resolved.keys().map(String::as_str).collect();
        assert_eq!(setters, vec!["writer", "processor"]);
        assert_eq!(resolved["writer"], "csv writer");

        services.remove("app.processor");
        let err = registration.resolve_collaborators(&services).unwrap_err();
        match err {
            RegistryError::UnknownService {
                step,
                setter,
                service_id,
            } => {
                assert_eq!(step, "export.write");
                assert_eq!(setter, "processor");
                assert_eq!(service_id, "app.processor");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_registration_serializes_in_field_order() {
        let json = serde_json::to_value(step("csv", "export", "read")).unwrap();
        assert_eq!(json["connector_name"], "csv");
        assert_eq!(json["processor_class"], "ItemStep");
        assert!(json["collaborators"].as_object().unwrap().is_empty());
    }
}
