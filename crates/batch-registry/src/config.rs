//! Configuration of the registry pipeline
//!
//! The host passes the extension module roots explicitly, in the order their
//! declarations must be registered. Policies cover the choices the declaration
//! format leaves to the host.

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Environment Variables
// ============================================================================

/// Module roots, as an OS path list (`:` separated on Unix, `;` on Windows)
pub const ENV_MODULE_ROOTS: &str = "BATCH_MODULE_ROOTS";

/// Failure policy (`abort` or `skip`)
pub const ENV_FAILURE_POLICY: &str = "BATCH_FAILURE_POLICY";

/// Duplicate step policy (`allow` or `reject`)
pub const ENV_DUPLICATE_POLICY: &str = "BATCH_DUPLICATE_POLICY";

/// Unknown key policy (`reject` or `ignore`)
pub const ENV_UNKNOWN_KEYS: &str = "BATCH_UNKNOWN_KEYS";

/// What to do with the remaining sources when one declaration is invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first invalid source and register nothing
    #[default]
    Abort,
    /// Drop the invalid source entirely, report it, and keep going
    Skip,
}

impl std::str::FromStr for FailurePolicy {
    type Err = RegistryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" | "abort-all" => Ok(FailurePolicy::Abort),
            "skip" | "skip-and-continue" => Ok(FailurePolicy::Skip),
            _ => Err(RegistryError::config(format!("Invalid failure policy: {}", s))),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Abort => write!(f, "abort"),
            FailurePolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Whether the same `(job, step)` pair may be declared by several files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Register every declaration, in order
    #[default]
    Allow,
    /// Fail on the second declaration of a pair
    Reject,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = RegistryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(DuplicatePolicy::Allow),
            "reject" | "deny" => Ok(DuplicatePolicy::Reject),
            _ => Err(RegistryError::config(format!("Invalid duplicate policy: {}", s))),
        }
    }
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicatePolicy::Allow => write!(f, "allow"),
            DuplicatePolicy::Reject => write!(f, "reject"),
        }
    }
}

/// How keys outside the connector schema are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeyPolicy {
    /// Unknown keys are a schema error
    #[default]
    Reject,
    /// Unknown keys are logged and skipped
    Ignore,
}

impl std::str::FromStr for UnknownKeyPolicy {
    type Err = RegistryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" | "strict" => Ok(UnknownKeyPolicy::Reject),
            "ignore" | "lenient" => Ok(UnknownKeyPolicy::Ignore),
            _ => Err(RegistryError::config(format!("Invalid unknown key policy: {}", s))),
        }
    }
}

impl std::fmt::Display for UnknownKeyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnknownKeyPolicy::Reject => write!(f, "reject"),
            UnknownKeyPolicy::Ignore => write!(f, "ignore"),
        }
    }
}

/// Registry pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Extension module roots, in registration order
    pub module_roots: Vec<PathBuf>,

    /// Behavior when a declaration fails to parse or validate
    pub failure_policy: FailurePolicy,

    /// Behavior when a `(job, step)` pair is declared twice
    pub duplicate_policy: DuplicatePolicy,

    /// Behavior on keys outside the schema
    pub unknown_keys: UnknownKeyPolicy,
}

impl RegistryConfig {
    /// Create a config with default policies and no module roots
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay environment variables on top of `self`
    ///
    /// Environment variables:
    /// - `BATCH_MODULE_ROOTS`: module roots, replacing any already set
    /// - `BATCH_FAILURE_POLICY`: `abort` or `skip`
    /// - `BATCH_DUPLICATE_POLICY`: `allow` or `reject`
    /// - `BATCH_UNKNOWN_KEYS`: `reject` or `ignore`
    pub fn merge_env(mut self) -> Result<Self> {
        if let Some(roots) = std::env::var_os(ENV_MODULE_ROOTS) {
            self.module_roots = std::env::split_paths(&roots)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }

        if let Ok(policy) = std::env::var(ENV_FAILURE_POLICY) {
            self.failure_policy = policy.parse()?;
        }

        if let Ok(policy) = std::env::var(ENV_DUPLICATE_POLICY) {
            self.duplicate_policy = policy.parse()?;
        }

        if let Ok(policy) = std::env::var(ENV_UNKNOWN_KEYS) {
            self.unknown_keys = policy.parse()?;
        }

        Ok(self)
    }

    /// Load config from environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> RegistryConfigBuilder {
        RegistryConfigBuilder::default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.module_roots.is_empty() {
            return Err(RegistryError::config(format!(
                "No module roots configured. Pass --module or set {}",
                ENV_MODULE_ROOTS
            )));
        }

        if let Some(pos) = self
            .module_roots
            .iter()
            .enumerate()
            .position(|(i, root)| self.module_roots[..i].contains(root))
        {
            return Err(RegistryError::config(format!(
                "Module root '{}' is listed more than once",
                self.module_roots[pos].display()
            )));
        }

        Ok(())
    }
}

/// Builder for RegistryConfig
#[derive(Default)]
pub struct RegistryConfigBuilder {
    config: RegistryConfig,
}

impl RegistryConfigBuilder {
    pub fn module_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.module_roots.push(root.into());
        self
    }

    pub fn module_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.module_roots.extend(roots.into_iter().map(Into::into));
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.config.duplicate_policy = policy;
        self
    }

    pub fn unknown_keys(mut self, policy: UnknownKeyPolicy) -> Self {
        self.config.unknown_keys = policy;
        self
    }

    pub fn build(self) -> RegistryConfig {
        self.config
    }
}
