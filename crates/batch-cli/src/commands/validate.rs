//! `batch-jobs validate` command implementation
//!
//! Validates a single declaration file and prints it with defaults filled in.

use crate::error::Result;
use batch_registry::{JobDefinitionSource, RegistryConfig, SchemaValidator, UnknownKeyPolicy};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Validate `file` and print the normalized declaration as JSON
///
/// Without an explicit policy, the unknown key policy comes from the
/// environment.
pub fn run<W: Write>(file: &Path, unknown_keys: Option<UnknownKeyPolicy>, out: &mut W) -> Result<()> {
    let policy = match unknown_keys {
        Some(policy) => policy,
        None => RegistryConfig::from_env()?.unknown_keys,
    };

    let source = JobDefinitionSource::read(file)?;
    let declaration = SchemaValidator::new(policy).parse(&source)?;
    info!(
        path = %file.display(),
        connector = %declaration.name,
        jobs = declaration.jobs.len(),
        "Job declaration is valid"
    );

    serde_json::to_writer_pretty(&mut *out, &declaration)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use batch_registry::RegistryError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_prints_normalized_declaration() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("jobs.yml");
        fs::write(
            &file,
            "name: demo\njobs:\n  export:\n    type: export\n    steps:\n      write: ~\n",
        )
        .unwrap();

        let mut out = Vec::new();
        run(&file, Some(UnknownKeyPolicy::Reject), &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let step = &json["jobs"]["export"]["steps"]["write"];
        assert_eq!(json["name"], "demo");
        assert_eq!(json["jobs"]["export"]["type"], "export");
        assert_eq!(step["class"], "ItemStep");
        assert!(step["services"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_key_policy_flag() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("jobs.yml");
        fs::write(&file, "name: demo\nowner: team\njobs: {}\n").unwrap();

        let err = run(&file, Some(UnknownKeyPolicy::Reject), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::Registry(RegistryError::Schema { .. })));

        assert!(run(&file, Some(UnknownKeyPolicy::Ignore), &mut Vec::new()).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = run(&tmp.path().join("absent.yml"), Some(UnknownKeyPolicy::Reject), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, CliError::Registry(RegistryError::Discovery { .. })));
    }
}
