//! Build automation tasks for the batch job registry
//!
//! - Generating the CLI reference from the clap definitions
//! - Checking that the committed reference is up to date

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for batch-jobs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the CLI reference in Markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: PathBuf,

        /// Fail instead of writing when the committed reference is stale
        #[arg(long)]
        check: bool,
    },
}

const REFERENCE_FILE: &str = "cli-reference.md";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir, check } => generate_cli_docs(&output_dir, check)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &Path, check: bool) -> anyhow::Result<()> {
    let markdown = clap_markdown::help_markdown::<batch_cli::Cli>();
    let file_path = output_dir.join(REFERENCE_FILE);

    if check {
        check_reference(&file_path, &markdown)?;
        println!("✅ {} is up to date", file_path.display());
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;
    fs::write(&file_path, render(&markdown))?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());
    Ok(())
}

fn render(commands: &str) -> String {
    format!(
        r#"# batch-jobs CLI Reference

Generated from the CLI source code on {}.

`batch-jobs` compiles the batch job registry from the job declarations of
extension modules. Each module declares its jobs in `config/batch_jobs.yml`,
or in any number of files under `config/batch_jobs/`.

## Quick Start

```bash
# List the declaration files of two modules
batch-jobs discover -m modules/catalog -m modules/connector_csv

# Check one declaration file
batch-jobs validate modules/catalog/config/batch_jobs.yml

# Compile the registry, dropping invalid files instead of aborting
batch-jobs compile -m modules/catalog -m modules/connector_csv --on-error skip
```

## Declaration Format

```yaml
name: csv_connector
jobs:
  csv_product_import:
    type: import
    steps:
      import:
        class: ItemStep
        services:
          reader: app.reader.csv
        parameters:
          batchSize: 100
```

## Environment Variables

- `BATCH_MODULE_ROOTS` - Module roots, as an OS path list
- `BATCH_FAILURE_POLICY` - `abort` (default) or `skip`
- `BATCH_DUPLICATE_POLICY` - `allow` (default) or `reject`
- `BATCH_UNKNOWN_KEYS` - `reject` (default) or `ignore`
- `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`, `LOG_DIR`, `LOG_FILTER` - Logging

A `.env` file in the working directory is loaded first. Flags override the
environment.

## Commands

{}
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        commands
    )
}

fn strip_date(doc: &str) -> String {
    doc.lines()
        .filter(|line| !line.starts_with("Generated from the CLI source code on"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fail unless the reference at `file_path` matches freshly rendered docs.
/// A missing reference counts as stale.
fn check_reference(file_path: &Path, markdown: &str) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!(
            "{} has not been generated yet. Run `cargo xtask generate-cli-docs`.",
            file_path.display()
        );
    }

    let committed = fs::read_to_string(file_path)?;
    // The date line changes on every run
    if strip_date(&committed) != strip_date(&render(markdown)) {
        anyhow::bail!(
            "{} is out of date. Run `cargo xtask generate-cli-docs`.",
            file_path.display()
        );
    }
    Ok(())
}
