use anyhow::{Context, bail};
use clap::Parser;
use std::path::Path;

use classgraph::cli::commands::{check, init, query};
use classgraph::cli::{Cli, Commands};
use classgraph::io::ExitCode;
use classgraph::{Settings, logging};

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("configuration file not found: {}", path.display());
            }
            Settings::load_from(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))
        }
        None => Settings::load().context("failed to load configuration"),
    }
}

fn run(command: Commands, settings: &Settings) -> ExitCode {
    match command {
        Commands::Init { force } => match std::env::current_dir() {
            Ok(dir) => init::run_init(&dir, force),
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::IoError
            }
        },
        Commands::Config => init::run_config(settings),
        Commands::Check {
            files,
            json,
            strict,
        } => check::run(&files, json, strict, settings),
        Commands::Query {
            file,
            json,
            query: kind,
        } => query::run(&file, json, &kind, settings),
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Init must work even when an existing config is broken
    let settings = if matches!(cli.command, Commands::Init { .. }) {
        Settings::default()
    } else {
        match load_settings(cli.config.as_deref()) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error: {e:#}");
                return ExitCode::ConfigError.into();
            }
        }
    };

    logging::init(&settings.logging, settings.debug);

    run(cli.command, &settings).into()
}
