//! Batch Job Registry
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Builds the in-process registry of batch jobs from the declarations shipped
//! by extension modules.
//!
//! # Overview
//!
//! The pipeline runs once, synchronously, at host start-up:
//!
//! 1. **Discovery** ([`discovery`]): each module root contributes either every
//!    file under `config/batch_jobs/` or the single file
//!    `config/batch_jobs.yml`, in lexicographic path order.
//! 2. **Validation** ([`schema`]): each YAML document is checked against the
//!    connector schema and normalized, filling in defaults.
//! 3. **Compilation** ([`compiler`]): every declared step becomes one
//!    [`StepRegistration`] appended to a [`RegistrySink`], in discovery then
//!    declaration order.
//!
//! Once compiled, the registry is frozen and shared read-only with the
//! executors. Collaborator service ids stay opaque strings until an executor
//! resolves them through a [`ServiceLocator`].
//!
//! # Example
//!
//! ```no_run
//! use batch_registry::{compile_modules, InMemoryJobRegistry, JobCatalog, RecordingTracker, RegistryConfig};
//!
//! fn main() -> batch_registry::Result<()> {
//!     let config = RegistryConfig::builder()
//!         .module_root("./modules/catalog")
//!         .module_root("./modules/connector_csv")
//!         .build();
//!
//!     let mut registry = InMemoryJobRegistry::new();
//!     let mut tracker = RecordingTracker::default();
//!     let report = compile_modules(&config, &mut registry, &mut tracker)?;
//!
//!     let registry = registry.freeze();
//!     println!("{} steps from {} files", report.registered, report.sources);
//!     for job in registry.jobs() {
//!         println!("{job}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod declaration;
pub mod discovery;
pub mod error;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod services;

// Re-export commonly used types
pub use compiler::{compile_modules, CompileReport, JobRegistryCompiler, SkippedSource};
pub use config::{DuplicatePolicy, FailurePolicy, RegistryConfig, UnknownKeyPolicy};
pub use declaration::{ConnectorDeclaration, JobSpec, ScalarValue, StepSpec, DEFAULT_PROCESSOR_CLASS};
pub use discovery::{locate, locate_all, sort_sources, JobDefinitionSource};
pub use error::{RegistryError, Result};
pub use registry::{FrozenJobRegistry, InMemoryJobRegistry, JobCatalog, RegistrySink, StepRegistration};
pub use resources::{NoopTracker, RecordingTracker, ResourceTracker};
pub use schema::SchemaValidator;
pub use services::ServiceLocator;
