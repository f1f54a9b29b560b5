//! batch-jobs CLI - Main entry point

use batch_cli::{commands, effective_config, Cli, Commands, ConfigCommand, PolicyArgs};
use batch_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::io::Write;
use std::process;
use tracing::error;

fn main() {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let log_config = LogConfig::builder()
        .level(LogLevel::Warn)
        .output(LogOutput::Console)
        .log_file_prefix("batch-jobs")
        .build();

    // Environment variables take precedence, --verbose over both
    let mut log_config = log_config.clone().merge_env().unwrap_or(log_config);
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    // The CLI works without logging
    let guard = init_logging(&log_config).ok().flatten();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = execute_command(&cli, &mut out).and_then(|()| Ok(out.flush()?));

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        drop(guard);
        process::exit(1);
    }
}

/// Execute the CLI command
fn execute_command<W: Write>(cli: &Cli, out: &mut W) -> batch_cli::Result<()> {
    match &cli.command {
        Commands::Compile {
            modules,
            policies,
            format,
        } => {
            let config = effective_config(modules, policies)?;
            commands::compile::run(&config, *format, out)
        },

        Commands::Discover { modules } => {
            let config = effective_config(modules, &PolicyArgs::default())?;
            commands::discover::run(&config, out)
        },

        Commands::Validate { file, unknown_keys } => {
            commands::validate::run(file, *unknown_keys, out)
        },

        Commands::Config { command } => match command {
            ConfigCommand::Show { modules, policies } => {
                let config = effective_config(modules, policies)?;
                commands::config::show(&config, out)
            },
        },
    }
}
