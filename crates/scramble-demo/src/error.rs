#![forbid(unsafe_code)]

//! Demo error type.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::cli::CliError;

/// Anything that ends the demo early.
#[derive(Debug)]
pub enum DemoError {
    /// Terminal or file I/O failed.
    Io(io::Error),
    /// The configuration file is not valid scramble JSON.
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A bad command-line value.
    Cli(CliError),
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Config { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            Self::Cli(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config { source, .. } => Some(source),
            Self::Cli(err) => Some(err),
        }
    }
}

impl From<io::Error> for DemoError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<CliError> for DemoError {
    fn from(err: CliError) -> Self {
        Self::Cli(err)
    }
}

/// Standard result type for the demo.
pub type Result<T> = std::result::Result<T, DemoError>;
