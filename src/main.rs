use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::env;
use std::process::ExitCode;

mod cli;
mod logging;

use cli::RootArgs;
use lookup_enums::config::{self, GeneratorConfig, DEFAULT_CONFIG_FILE};
use lookup_enums::generate::{Generator, ManifestFiles};
use lookup_enums::paths::WorkspacePaths;
use lookup_enums::report;
use lookup_enums::rows::SqliteRowSource;

/// Exit status for a completed run that recorded error diagnostics under `--strict`.
const EXIT_DIAGNOSTICS: u8 = 2;

fn main() -> ExitCode {
    let args = RootArgs::parse();
    logging::init(args.verbose);

    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &RootArgs) -> Result<ExitCode> {
    if args.print_config {
        println!("{}", config::config_stub());
        return Ok(ExitCode::SUCCESS);
    }

    let root = match &args.root {
        Some(root) => root.clone(),
        None => env::current_dir().context("resolve current directory")?,
    };
    let mut config = config::load_config_for_root(&root, args.config.as_deref())?;
    config::validate_config(&config)?;
    config.resolve_paths(&root);
    if let Some(database) = &args.database {
        config.database = Some(database.clone());
    }

    let database = config.database.clone().ok_or_else(|| {
        anyhow!("no database configured; pass --database or set \"database\" in {DEFAULT_CONFIG_FILE}")
    })?;
    let source = SqliteRowSource::new(database, config.attach.clone(), config.query_timeout());
    let generator = Generator::new(
        WorkspacePaths::from_config(&config),
        config.emit_options(),
        &source,
    );
    let report = generator.run(&manifest_files(args, &config))?;

    for path in &report.written {
        println!("Wrote file to {}", path.display());
    }
    for path in &report.removed {
        println!("Removed stale file {}", path.display());
    }
    if let Some(path) = &args.report {
        report::write_report(path, &report)?;
        println!("Wrote report to {}", path.display());
    }
    tracing::info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "generation complete"
    );

    if args.strict && report.has_errors() {
        return Ok(ExitCode::from(EXIT_DIAGNOSTICS));
    }
    Ok(ExitCode::SUCCESS)
}

fn manifest_files(args: &RootArgs, config: &GeneratorConfig) -> ManifestFiles {
    ManifestFiles {
        lookup_tables: cli::non_blank(args.lookup_tables.as_deref())
            .unwrap_or(&config.lookup_tables)
            .to_string(),
        lookup_tables_with_parents: cli::non_blank(args.lookup_tables_with_parents.as_deref())
            .unwrap_or(&config.lookup_tables_with_parents)
            .to_string(),
    }
}
