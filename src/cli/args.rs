//! CLI argument parsing using clap.
//!
//! Contains the Cli struct, Commands enum and the query subcommands.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Class hierarchy resolver
#[derive(Parser, Debug)]
#[command(
    name = "classgraph",
    version = env!("CARGO_PKG_VERSION"),
    about = "Resolve and check class/interface hierarchies",
    long_about = "Build a validated type hierarchy from JSON declarations and query it.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .classgraph directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings")]
    Config,

    /// Build and validate one graph per declaration file
    #[command(
        about = "Check declaration files for cycles, conflicts and missing implementations",
        after_help = "Examples:\n  classgraph check types.json\n  classgraph check a.json b.json --json\n  classgraph check types.json --strict"
    )]
    Check {
        /// Declaration files (JSON)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Fail when a concrete class has unresolved abstract methods
        #[arg(long)]
        strict: bool,
    },

    /// Query one graph
    #[command(
        about = "Ask subtype, ancestor, interface, enclosing and obligation questions",
        after_help = "Examples:\n  classgraph query types.json subtype app.Circle app.Shape\n  classgraph query types.json ancestors app.Circle\n  classgraph query types.json abstracts app.Blob --json"
    )]
    Query {
        /// Declaration file (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output in JSON format
        #[arg(long, global = true)]
        json: bool,

        #[command(subcommand)]
        query: QueryKind,
    },
}

/// Query subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum QueryKind {
    /// Is SUB a subtype of SUPER (reflexive, transitive)
    Subtype {
        #[arg(value_name = "SUB")]
        sub: String,
        #[arg(value_name = "SUPER")]
        sup: String,
    },

    /// Superclass chain, nearest first
    Ancestors { name: String },

    /// Every interface implemented directly or through ancestors
    Interfaces { name: String },

    /// Enclosing types, innermost first
    Enclosing { name: String },

    /// Abstract methods a concrete class leaves unimplemented
    Abstracts { name: String },

    /// Types directly extending or implementing NAME
    Subtypes { name: String },
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Subtype { .. } => "subtype",
            QueryKind::Ancestors { .. } => "ancestors",
            QueryKind::Interfaces { .. } => "interfaces",
            QueryKind::Enclosing { .. } => "enclosing",
            QueryKind::Abstracts { .. } => "abstracts",
            QueryKind::Subtypes { .. } => "subtypes",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from(["classgraph", "check", "a.json", "b.json", "--strict"]);
        match cli.command {
            Commands::Check {
                files,
                json,
                strict,
            } => {
                assert_eq!(files.len(), 2);
                assert!(!json);
                assert!(strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_query() {
        let cli = Cli::parse_from([
            "classgraph",
            "-c",
            "custom.toml",
            "query",
            "types.json",
            "subtype",
            "A",
            "B",
            "--json",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Commands::Query { json, query, .. } => {
                assert!(json);
                assert_eq!(query.as_str(), "subtype");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
