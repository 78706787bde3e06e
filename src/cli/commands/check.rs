//! Check command: build and validate one graph per declaration file.
//!
//! Files are independent closed worlds, so they are built in parallel and
//! reported in argument order.

use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::config::{ResolverConfig, Settings};
use crate::graph::TypeGraph;
use crate::input::{self, InputError};
use crate::io::{ExitCode, OutputFormat};
use crate::logging::Stage;
use crate::report::{CheckReport, CheckStatus, GraphReport};

/// Report for one file and the exit code it contributes.
#[derive(Debug)]
pub struct FileOutcome {
    pub report: CheckReport,
    pub exit: ExitCode,
}

/// Load, build and summarise a single declaration file.
pub fn check_file(path: &Path, config: &ResolverConfig, strict: bool) -> FileOutcome {
    let source = path.display().to_string();

    let declarations = match input::load_file(path) {
        Ok(declarations) => declarations,
        Err(error) => {
            let exit = match &error {
                InputError::Io { .. } => ExitCode::IoError,
                InputError::Json(_) => ExitCode::ParseError,
                InputError::Declaration(_) => ExitCode::GeneralError,
            };
            tracing::warn!("[check] {source}: {error}");
            return FileOutcome {
                report: CheckReport::failed(source, &error),
                exit,
            };
        }
    };

    let graph = match TypeGraph::build(declarations, config) {
        Ok(graph) => graph,
        Err(error) => {
            crate::debug_event!(Stage::Check, "build failed", "{source}: {error}");
            return FileOutcome {
                report: CheckReport::failed(source, &error),
                exit: ExitCode::GeneralError,
            };
        }
    };

    let report = match GraphReport::from_graph(&graph) {
        Ok(summary) => CheckReport::built(source, summary),
        Err(error) => {
            return FileOutcome {
                report: CheckReport::failed(source, &error),
                exit: ExitCode::GeneralError,
            };
        }
    };

    let exit = if strict && report.status == CheckStatus::Incomplete {
        ExitCode::BlockingError
    } else {
        ExitCode::Success
    };

    FileOutcome { report, exit }
}

/// Run check command over every file.
pub fn run(files: &[PathBuf], json: bool, strict: bool, settings: &Settings) -> ExitCode {
    let format = OutputFormat::from_json_flag_or(json, settings.output.format);

    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|path| check_file(path, &settings.resolver, strict))
        .collect();

    crate::log_event!(Stage::Check, "done", "{} files", outcomes.len());

    let exit = outcomes
        .iter()
        .fold(ExitCode::Success, |worst, outcome| worst.worst(outcome.exit));

    if format.is_json() {
        let reports: Vec<&CheckReport> = outcomes.iter().map(|outcome| &outcome.report).collect();
        match serde_json::to_string_pretty(&reports) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::GeneralError;
            }
        }
    } else {
        for outcome in &outcomes {
            print!(
                "{}",
                outcome.report.render_text(settings.output.show_clean_types)
            );
        }
    }

    exit
}
