//! Query command: answer one hierarchy question about one file.

use serde_json::{Value, json};
use std::path::Path;

use crate::cli::QueryKind;
use crate::config::Settings;
use crate::error::QueryResult;
use crate::graph::TypeGraph;
use crate::input::{self, InputError};
use crate::io::{ExitCode, OutputFormat};
use crate::logging::Stage;

/// Evaluate `query` against `graph` as a JSON value.
pub fn answer(graph: &TypeGraph, query: &QueryKind) -> QueryResult<Value> {
    let value = match query {
        QueryKind::Subtype { sub, sup } => json!(graph.is_subtype_of(sub, sup)?),
        QueryKind::Ancestors { name } => json!(graph.ancestors_of(name)?),
        QueryKind::Interfaces { name } => json!(graph.interfaces_of(name)?),
        QueryKind::Enclosing { name } => json!(graph.enclosing_chain_of(name)?),
        QueryKind::Abstracts { name } => {
            let owed: Vec<String> = graph
                .unresolved_abstracts(name)?
                .iter()
                .map(|sig| sig.to_string())
                .collect();
            json!(owed)
        }
        QueryKind::Subtypes { name } => json!(graph.subtypes_of(name)?),
    };
    Ok(value)
}

fn render_text(value: &Value) -> String {
    match value {
        Value::Bool(answer) => answer.to_string(),
        Value::Array(items) if items.is_empty() => "(none)".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Run query command.
pub fn run(file: &Path, json: bool, query: &QueryKind, settings: &Settings) -> ExitCode {
    let format = OutputFormat::from_json_flag_or(json, settings.output.format);

    let declarations = match input::load_file(file) {
        Ok(declarations) => declarations,
        Err(e) => {
            eprintln!("Error: {e}");
            return match e {
                InputError::Io { .. } => ExitCode::IoError,
                InputError::Json(_) => ExitCode::ParseError,
                InputError::Declaration(_) => ExitCode::GeneralError,
            };
        }
    };

    let graph = match TypeGraph::build(declarations, &settings.resolver) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::GeneralError;
        }
    };

    let value = match answer(&graph, query) {
        Ok(value) => value,
        Err(e) => {
            if format.is_json() {
                let body = json!({ "query": query.as_str(), "error": e.to_string() });
                println!("{body}");
            } else {
                eprintln!("Error: {e}");
            }
            return ExitCode::NotFound;
        }
    };

    crate::debug_event!(Stage::Query, query.as_str(), "{value}");

    if format.is_json() {
        let body = json!({ "query": query.as_str(), "result": value });
        match serde_json::to_string_pretty(&body) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::GeneralError;
            }
        }
    } else {
        println!("{}", render_text(&value));
    }

    ExitCode::Success
}
