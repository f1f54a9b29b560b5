//! Registry compilation
//!
//! Turns discovered declaration sources into step registrations. Every source
//! is staged in full before anything reaches the sink, and the sink only sees
//! the staged records once the whole run has succeeded, so a failing run never
//! leaves a partial registry behind.

use crate::config::{DuplicatePolicy, FailurePolicy, RegistryConfig};
use crate::discovery::{locate_all, JobDefinitionSource};
use crate::error::{RegistryError, Result};
use crate::registry::{RegistrySink, StepRegistration};
use crate::resources::ResourceTracker;
use crate::schema::SchemaValidator;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Outcome of a compile run
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Sources processed
    pub sources: usize,

    /// Registrations appended to the sink
    pub registered: usize,

    /// Sources dropped under [`FailurePolicy::Skip`], in discovery order
    pub skipped: Vec<SkippedSource>,
}

impl CompileReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A source that was left out of the registry and why
#[derive(Debug)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub error: RegistryError,
}

/// Compiles declaration sources into a registry sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobRegistryCompiler {
    validator: SchemaValidator,
    failure_policy: FailurePolicy,
    duplicate_policy: DuplicatePolicy,
}

impl JobRegistryCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiler with the policies of `config`
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            validator: SchemaValidator::new(config.unknown_keys),
            failure_policy: config.failure_policy,
            duplicate_policy: config.duplicate_policy,
        }
    }

    pub fn with_validator(mut self, validator: SchemaValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Compile `sources`, in the order given, into `sink`.
    ///
    /// Steps register in source order, then job order, then step order. Under
    /// [`FailurePolicy::Abort`] the first failing source is returned as the
    /// error and the sink is left untouched.
    #[tracing::instrument(skip_all, fields(sources = sources.len()))]
    pub fn compile<S>(&self, sources: &[JobDefinitionSource], sink: &mut S) -> Result<CompileReport>
    where
        S: RegistrySink + ?Sized,
    {
        let mut report = CompileReport {
            sources: sources.len(),
            ..CompileReport::default()
        };
        let mut staged = Vec::new();
        let mut first_declared: HashMap<(String, String), PathBuf> = HashMap::new();

        for source in sources {
            match self.stage(source, &first_declared) {
                Ok(records) => {
                    if self.duplicate_policy == DuplicatePolicy::Reject {
                        for record in &records {
                            first_declared
                                .entry((record.job_name.clone(), record.step_name.clone()))
                                .or_insert_with(|| source.path.clone());
                        }
                    }
                    staged.extend(records);
                },
                Err(error) => match self.failure_policy {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::Skip => {
                        warn!(
                            path = %source.path.display(),
                            error = %error,
                            "Skipping invalid job declaration"
                        );
                        report.skipped.push(SkippedSource {
                            path: source.path.clone(),
                            error,
                        });
                    },
                },
            }
        }

        report.registered = staged.len();
        for record in staged {
            sink.add_step_to_job(record);
        }

        info!(
            sources = report.sources,
            registered = report.registered,
            skipped = report.skipped.len(),
            "Compiled job registry"
        );

        Ok(report)
    }

    /// Records of one source, or the reason it cannot be registered
    fn stage(
        &self,
        source: &JobDefinitionSource,
        first_declared: &HashMap<(String, String), PathBuf>,
    ) -> Result<Vec<StepRegistration>> {
        let declaration = self.validator.parse(source)?;
        let connector = declaration.name;

        let mut records = Vec::new();
        for (job_name, job) in declaration.jobs {
            for (step_name, step) in job.steps {
                if self.duplicate_policy == DuplicatePolicy::Reject {
                    let key = (job_name.clone(), step_name.clone());
                    if let Some(first) = first_declared.get(&key) {
                        return Err(RegistryError::DuplicateStep {
                            job: job_name,
                            step: step_name,
                            first: first.clone(),
                            second: source.path.clone(),
                        });
                    }
                }

                debug!(
                    connector = %connector,
                    job = %job_name,
                    step = %step_name,
                    class = %step.processor_class,
                    "Registered job step"
                );

                records.push(StepRegistration {
                    connector_name: connector.clone(),
                    job_type: job.job_type.clone(),
                    job_name: job_name.clone(),
                    step_name,
                    processor_class: step.processor_class,
                    collaborators: step.collaborators,
                    parameters: step.parameters,
                });
            }
        }

        Ok(records)
    }
}

/// Discover the declarations of every configured module and compile them.
///
/// Each located file is reported to `tracker` before it is read.
pub fn compile_modules<S, T>(config: &RegistryConfig, sink: &mut S, tracker: &mut T) -> Result<CompileReport>
where
    S: RegistrySink + ?Sized,
    T: ResourceTracker + ?Sized,
{
    config.validate()?;
    let sources = locate_all(&config.module_roots, tracker)?;
    JobRegistryCompiler::from_config(config).compile(&sources, sink)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::registry::{InMemoryJobRegistry, JobCatalog};

    const EXPORT: &str = r#"
name: csv
jobs:
  export:
    type: export
    steps:
      read: ~
      write: ~
"#;

    const IMPORT: &str = r#"
name: xml
jobs:
  import:
    type: import
    steps:
      read: ~
"#;

    // First job is valid, second is not
    const HALF_VALID: &str = r#"
name: broken
jobs:
  cleanup:
    type: maintenance
    steps:
      purge: ~
  reindex:
    steps:
      run: ~
"#;

    fn sources(docs: &[(&str, &str)]) -> Vec<JobDefinitionSource> {
        docs.iter()
            .map(|(path, yaml)| JobDefinitionSource::new(*path, *yaml))
            .collect()
    }

    fn pairs(registry: &InMemoryJobRegistry) -> Vec<(&str, &str)> {
        registry
            .records()
            .iter()
            .map(|r| (r.job_name.as_str(), r.step_name.as_str()))
            .collect()
    }

    #[test]
    fn test_registers_in_source_then_declaration_order() {
        let mut registry = InMemoryJobRegistry::new();
        let report = JobRegistryCompiler::new()
            .compile(&sources(&[("a.yml", EXPORT), ("b.yml", IMPORT)]), &mut registry)
            .unwrap();

        assert_eq!(report.sources, 2);
        assert_eq!(report.registered, 3);
        assert!(report.is_clean());
        assert_eq!(
            pairs(&registry),
            vec![("export", "read"), ("export", "write"), ("import", "read")]
        );
        assert_eq!(registry.records()[2].connector_name, "xml");
        assert_eq!(registry.records()[2].job_type, "import");
    }

    #[test]
    fn test_abort_leaves_sink_untouched() {
        let mut registry = InMemoryJobRegistry::new();
        let err = JobRegistryCompiler::new()
            .compile(
                &sources(&[("a.yml", EXPORT), ("b.yml", HALF_VALID), ("c.yml", IMPORT)]),
                &mut registry,
            )
            .unwrap_err();

        assert_eq!(err.path(), Some(std::path::Path::new("b.yml")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_skip_drops_the_whole_failing_source() {
        let mut registry = InMemoryJobRegistry::new();
        let report = JobRegistryCompiler::new()
            .with_failure_policy(FailurePolicy::Skip)
            .compile(
                &sources(&[("a.yml", EXPORT), ("b.yml", HALF_VALID), ("c.yml", IMPORT)]),
                &mut registry,
            )
            .unwrap();

        assert_eq!(report.registered, 3);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, PathBuf::from("b.yml"));
        assert!(matches!(report.skipped[0].error, RegistryError::Schema { .. }));
        // Nothing from the valid first job of the broken source
        assert!(registry.steps_for("cleanup").is_empty());
        assert_eq!(registry.connectors(), vec!["csv", "xml"]);
    }

    #[test]
    fn test_duplicates_allowed_by_default() {
        let mut registry = InMemoryJobRegistry::new();
        JobRegistryCompiler::new()
            .compile(&sources(&[("a.yml", EXPORT), ("b.yml", EXPORT)]), &mut registry)
            .unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.steps_for("export").len(), 4);
    }

    #[test]
    fn test_duplicates_rejected_name_both_files() {
        let mut registry = InMemoryJobRegistry::new();
        let err = JobRegistryCompiler::new()
            .with_duplicate_policy(DuplicatePolicy::Reject)
            .compile(&sources(&[("a.yml", EXPORT), ("b.yml", EXPORT)]), &mut registry)
            .unwrap_err();

        match err {
            RegistryError::DuplicateStep {
                job,
                step,
                first,
                second,
            } => {
                assert_eq!(job, "export");
                assert_eq!(step, "read");
                assert_eq!(first, PathBuf::from("a.yml"));
                assert_eq!(second, PathBuf::from("b.yml"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_skipped_source_does_not_claim_its_steps() {
        // b.yml repeats `export.read` and is skipped; c.yml may then declare
        // `import.read` and a.yml's pairs stay the only ones claimed
        let duplicate = "name: dup\njobs:\n  export:\n    type: export\n    steps:\n      read: ~\n";
        let mut registry = InMemoryJobRegistry::new();
        let report = JobRegistryCompiler::new()
            .with_failure_policy(FailurePolicy::Skip)
            .with_duplicate_policy(DuplicatePolicy::Reject)
            .compile(
                &sources(&[("a.yml", EXPORT), ("b.yml", duplicate), ("c.yml", IMPORT)]),
                &mut registry,
            )
            .unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0].error, RegistryError::DuplicateStep { .. }));
        assert_eq!(registry.connectors(), vec!["csv", "xml"]);
    }

    #[test]
    fn test_compile_is_idempotent() {
        let input = sources(&[("a.yml", EXPORT), ("b.yml", IMPORT)]);
        let compiler = JobRegistryCompiler::new();

        let mut first: Vec<StepRegistration> = Vec::new();
        let mut second: Vec<StepRegistration> = Vec::new();
        compiler.compile(&input, &mut first).unwrap();
        compiler.compile(&input, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_config_applies_policies() {
        let config = RegistryConfig::builder()
            .module_root("/modules/a")
            .failure_policy(FailurePolicy::Skip)
            .duplicate_policy(DuplicatePolicy::Reject)
            .unknown_keys(crate::config::UnknownKeyPolicy::Ignore)
            .build();

        let compiler = JobRegistryCompiler::from_config(&config);
        assert_eq!(
            compiler,
            JobRegistryCompiler::new()
                .with_validator(SchemaValidator::new(crate::config::UnknownKeyPolicy::Ignore))
                .with_failure_policy(FailurePolicy::Skip)
                .with_duplicate_policy(DuplicatePolicy::Reject)
        );
    }
}
