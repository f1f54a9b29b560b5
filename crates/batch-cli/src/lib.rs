//! Batch Jobs CLI Library
//!
//! Command-line host for the batch job registry.
//!
//! # Overview
//!
//! - **Compilation**: Build the registry from module declarations (`batch-jobs compile`)
//! - **Discovery**: List the declaration files a compile would read (`batch-jobs discover`)
//! - **Validation**: Check a single declaration file (`batch-jobs validate`)
//! - **Configuration**: Show the effective pipeline settings (`batch-jobs config show`)
//!
//! Module roots and policies come from `BATCH_*` environment variables (a
//! `.env` file is loaded first) and can be overridden by flags.

pub mod commands;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, Result};

use batch_registry::{DuplicatePolicy, FailurePolicy, RegistryConfig, UnknownKeyPolicy};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// batch-jobs - compile and inspect the batch job registry
#[derive(Parser, Debug)]
#[command(name = "batch-jobs")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile the job registry from every module and print it
    Compile {
        #[command(flatten)]
        modules: ModuleArgs,

        #[command(flatten)]
        policies: PolicyArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List the declaration files of every module, in registration order
    Discover {
        #[command(flatten)]
        modules: ModuleArgs,
    },

    /// Validate one declaration file and print it normalized
    Validate {
        /// Declaration file
        file: PathBuf,

        /// Unknown key policy (reject, ignore)
        #[arg(long, value_name = "POLICY")]
        unknown_keys: Option<UnknownKeyPolicy>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        #[command(flatten)]
        modules: ModuleArgs,

        #[command(flatten)]
        policies: PolicyArgs,
    },
}

/// Module root selection
#[derive(Args, Debug, Clone, Default)]
pub struct ModuleArgs {
    /// Extension module root, repeatable, in registration order (overrides BATCH_MODULE_ROOTS)
    #[arg(short, long = "module", value_name = "DIR")]
    pub modules: Vec<PathBuf>,
}

/// Policy overrides
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// What to do with an invalid declaration (abort, skip)
    #[arg(long, value_name = "POLICY")]
    pub on_error: Option<FailurePolicy>,

    /// Whether a job step may be declared twice (allow, reject)
    #[arg(long, value_name = "POLICY")]
    pub duplicates: Option<DuplicatePolicy>,

    /// Unknown key policy (reject, ignore)
    #[arg(long, value_name = "POLICY")]
    pub unknown_keys: Option<UnknownKeyPolicy>,
}

/// Output format of `compile`
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl ModuleArgs {
    /// Replace the configured module roots when any were given
    pub fn apply(&self, config: &mut RegistryConfig) {
        if !self.modules.is_empty() {
            config.module_roots = self.modules.clone();
        }
    }
}

impl PolicyArgs {
    pub fn apply(&self, config: &mut RegistryConfig) {
        if let Some(policy) = self.on_error {
            config.failure_policy = policy;
        }
        if let Some(policy) = self.duplicates {
            config.duplicate_policy = policy;
        }
        if let Some(policy) = self.unknown_keys {
            config.unknown_keys = policy;
        }
    }
}

/// Environment configuration with command-line overrides on top
pub fn effective_config(modules: &ModuleArgs, policies: &PolicyArgs) -> Result<RegistryConfig> {
    let mut config = RegistryConfig::from_env()?;
    modules.apply(&mut config);
    policies.apply(&mut config);
    Ok(config)
}
