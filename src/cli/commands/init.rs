//! `init` writes default settings; `config` prints the effective ones.

use std::path::Path;

use crate::config::Settings;
use crate::io::ExitCode;

/// Create `.classgraph/settings.toml` under `dir`.
pub fn run_init(dir: &Path, force: bool) -> ExitCode {
    match Settings::init_config_file(dir, force) {
        Ok(path) => {
            let defaults = Settings::default();
            println!("Created {}", path.display());
            println!(
                "  root type: {} (aliases: {})",
                defaults.resolver.root_type,
                defaults.resolver.root_aliases.join(", ")
            );
            println!(
                "  external prefixes: {}",
                defaults.resolver.external_prefixes.join(", ")
            );
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::ConfigError
        }
    }
}

/// Print the merged settings as TOML.
///
/// The header is a TOML comment so the output can be saved as a settings file.
pub fn run_config(settings: &Settings) -> ExitCode {
    match toml::to_string_pretty(settings) {
        Ok(body) => {
            println!("# effective classgraph settings (defaults < settings.toml < CLASSGRAPH_*)");
            print!("{body}");
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: failed to render settings: {e}");
            ExitCode::ConfigError
        }
    }
}
