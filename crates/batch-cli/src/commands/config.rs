//! `batch-jobs config` command implementation
//!
//! Shows the effective registry configuration.

use crate::error::Result;
use batch_registry::config::{
    ENV_DUPLICATE_POLICY, ENV_FAILURE_POLICY, ENV_MODULE_ROOTS, ENV_UNKNOWN_KEYS,
};
use batch_registry::RegistryConfig;
use colored::Colorize;
use std::io::Write;

/// Show all configuration
pub fn show<W: Write>(config: &RegistryConfig, out: &mut W) -> Result<()> {
    writeln!(out, "{}", "Registry Configuration:".cyan().bold())?;
    writeln!(out)?;
    writeln!(out, "{:<18} {}", "failure_policy:", config.failure_policy)?;
    writeln!(out, "{:<18} {}", "duplicate_policy:", config.duplicate_policy)?;
    writeln!(out, "{:<18} {}", "unknown_keys:", config.unknown_keys)?;
    writeln!(out, "module_roots:")?;
    if config.module_roots.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for root in &config.module_roots {
        writeln!(out, "  {}", root.display())?;
    }
    writeln!(out)?;
    writeln!(out, "{}", "Environment Variables:".cyan())?;
    writeln!(out, "  {:<24} - Module roots, as an OS path list", ENV_MODULE_ROOTS)?;
    writeln!(out, "  {:<24} - abort or skip", ENV_FAILURE_POLICY)?;
    writeln!(out, "  {:<24} - allow or reject", ENV_DUPLICATE_POLICY)?;
    writeln!(out, "  {:<24} - reject or ignore", ENV_UNKNOWN_KEYS)?;

    Ok(())
}
