//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module and returns the process
//! exit code.

pub mod check;
pub mod init;
pub mod query;
