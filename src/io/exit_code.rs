//! Process exit codes shared by every command.

/// Exit codes returned by the `classgraph` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Every graph built and nothing was flagged
    Success = 0,
    /// A structural error aborted at least one build
    GeneralError = 1,
    /// Builds succeeded but `--strict` found unresolved abstract methods
    BlockingError = 2,
    /// A queried type does not exist in the graph
    NotFound = 3,
    /// Input file could not be decoded
    ParseError = 4,
    /// Input file could not be read
    IoError = 5,
    /// Configuration could not be loaded or written
    ConfigError = 6,
}

impl ExitCode {
    /// Keep the most severe of two codes; lower non-zero codes rank higher.
    pub fn worst(self, other: ExitCode) -> ExitCode {
        match (self, other) {
            (ExitCode::Success, other) => other,
            (current, ExitCode::Success) => current,
            (a, b) => {
                if (a as u8) <= (b as u8) {
                    a
                } else {
                    b
                }
            }
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}
