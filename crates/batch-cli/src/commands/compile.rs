//! `batch-jobs compile` command implementation
//!
//! Compiles every module's declarations and prints the resulting registry.

use crate::error::Result;
use crate::OutputFormat;
use batch_registry::{
    compile_modules, CompileReport, FrozenJobRegistry, InMemoryJobRegistry, JobCatalog,
    NoopTracker, RegistryConfig, StepRegistration,
};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct CompileOutput<'a> {
    registrations: &'a [StepRegistration],
    skipped: Vec<SkippedOutput>,
    summary: Summary,
}

#[derive(Serialize)]
struct SkippedOutput {
    path: String,
    error: String,
}

#[derive(Serialize)]
struct Summary {
    sources: usize,
    registered: usize,
    jobs: usize,
    skipped: usize,
}

/// Compile the registry and print it
pub fn run<W: Write>(config: &RegistryConfig, format: OutputFormat, out: &mut W) -> Result<()> {
    let mut registry = InMemoryJobRegistry::new();
    let report = compile_modules(config, &mut registry, &mut NoopTracker)?;
    let registry = registry.freeze();

    match format {
        OutputFormat::Json => write_json(&registry, &report, out),
        OutputFormat::Text => write_text(&registry, &report, out),
    }
}

fn summary(registry: &FrozenJobRegistry, report: &CompileReport) -> Summary {
    Summary {
        sources: report.sources,
        registered: report.registered,
        jobs: registry.jobs().len(),
        skipped: report.skipped.len(),
    }
}

fn write_json<W: Write>(registry: &FrozenJobRegistry, report: &CompileReport, out: &mut W) -> Result<()> {
    let output = CompileOutput {
        registrations: registry.records(),
        skipped: report
            .skipped
            .iter()
            .map(|s| SkippedOutput {
                path: s.path.display().to_string(),
                error: s.error.to_string(),
            })
            .collect(),
        summary: summary(registry, report),
    };

    serde_json::to_writer_pretty(&mut *out, &output)?;
    writeln!(out)?;
    Ok(())
}

fn write_text<W: Write>(registry: &FrozenJobRegistry, report: &CompileReport, out: &mut W) -> Result<()> {
    if registry.is_empty() {
        writeln!(out, "No job steps registered.")?;
        writeln!(
            out,
            "Declare jobs in config/batch_jobs.yml or config/batch_jobs/ of a module."
        )?;
    } else {
        writeln!(out, "{}", "Registered Jobs:".cyan().bold())?;
        writeln!(out)?;

        for job in registry.jobs() {
            let steps = registry.steps_for(job);
            if let Some(first) = steps.first() {
                writeln!(
                    out,
                    "{} [{}] from {}",
                    job.green(),
                    first.job_type,
                    first.connector_name
                )?;
            }
            for step in steps {
                writeln!(out, "  {:<20} {}", step.step_name, step.processor_class)?;
                for (setter, id) in &step.collaborators {
                    writeln!(out, "    {} -> @{}", setter, id)?;
                }
                for (setter, value) in &step.parameters {
                    writeln!(out, "    {} = {}", setter, value)?;
                }
            }
            writeln!(out)?;
        }
    }

    if !report.is_clean() {
        writeln!(out, "{}", "Skipped Declarations:".yellow().bold())?;
        for skipped in &report.skipped {
            writeln!(out, "{} {}", "⚠".yellow(), skipped.path.display())?;
            writeln!(out, "  {}", skipped.error)?;
        }
        writeln!(out)?;
    }

    let summary = summary(registry, report);
    writeln!(out, "{}", "Summary:".cyan().bold())?;
    writeln!(out, "  Files:   {}", summary.sources)?;
    writeln!(out, "  Jobs:    {}", summary.jobs)?;
    writeln!(out, "  Steps:   {}", summary.registered)?;
    writeln!(out, "  Skipped: {}", summary.skipped)?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use batch_registry::FailurePolicy;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn module(root: &Path, yaml: &str) -> PathBuf {
        let file = root.join("config/batch_jobs.yml");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, yaml).unwrap();
        root.to_path_buf()
    }

    #[test]
    fn test_json_output() {
        let tmp = TempDir::new().unwrap();
        let root = module(
            tmp.path(),
            "name: csv\njobs:\n  csv_import:\n    type: import\n    steps:\n      import:\n        services: {reader: app.reader.csv}\n        parameters: {batchSize: 100}\n",
        );
        let config = RegistryConfig::builder().module_root(root).build();

        let mut out = Vec::new();
        run(&config, OutputFormat::Json, &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let registration = &json["registrations"][0];
        assert_eq!(registration["job_name"], "csv_import");
        assert_eq!(registration["collaborators"]["reader"], "app.reader.csv");
        assert_eq!(registration["parameters"]["batchSize"], 100);
        assert_eq!(json["summary"]["registered"], 1);
        assert_eq!(json["summary"]["jobs"], 1);
    }

    #[test]
    fn test_text_output_lists_skipped_files() {
        let tmp = TempDir::new().unwrap();
        let root = module(tmp.path(), "name: broken\n");
        let config = RegistryConfig::builder()
            .module_root(root)
            .failure_policy(FailurePolicy::Skip)
            .build();

        let mut out = Vec::new();
        run(&config, OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("No job steps registered."));
        assert!(text.contains("batch_jobs.yml"));
        assert!(text.contains("Skipped: 1"));
    }
}
