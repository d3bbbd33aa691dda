//! Error types for the launcher.
//!
//! A child process exiting non-zero is not an error here: its status is
//! forwarded as the launcher's own exit code.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    /// The current working directory could not be read.
    #[error("unable to determine the project root: {0}")]
    ProjectRoot(#[source] io::Error),

    /// The output directory could not be created.
    #[error("could not create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A subprocess (compiler or built binary) could not be started.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Invalid configuration file or environment value.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, LaunchError>;
