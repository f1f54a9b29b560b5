//! `batch-jobs discover` command implementation
//!
//! Lists, module by module, the declaration files a compile would read.

use crate::error::Result;
use batch_registry::{locate, RecordingTracker, RegistryConfig};
use colored::Colorize;
use std::io::Write;

/// Print the declaration files of every configured module
pub fn run<W: Write>(config: &RegistryConfig, out: &mut W) -> Result<()> {
    config.validate()?;

    let mut tracker = RecordingTracker::new();
    for root in &config.module_roots {
        let before = tracker.paths().len();
        locate(root, &mut tracker)?;

        writeln!(out, "{}", root.display().to_string().cyan().bold())?;
        let found = &tracker.paths()[before..];
        if found.is_empty() {
            writeln!(out, "  (no job declarations)")?;
        }
        for path in found {
            let relative = path.strip_prefix(root).unwrap_or(path);
            writeln!(out, "  {}", relative.display())?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "{} declaration file(s) in {} module(s)",
        tracker.paths().len(),
        config.module_roots.len()
    )?;

    Ok(())
}
