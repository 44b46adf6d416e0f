//! Error handling for the Launchpad application.
//! Defines custom error types and results used throughout the application.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for Launchpad operations.
///
/// Filesystem and template errors stop the stage that produced them.
/// Command errors are reported by the git driver and the pipeline decides
/// whether to continue, see [`crate::pipeline::FailurePolicy`].
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur while spawning processes or other plain I/O
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// A directory or file could not be created or written during materialization
    #[error("Filesystem error at '{}': {source}.", path.display())]
    FileSystemError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An external version-control command exited with a non-zero status
    #[error("Command '{command}' failed with status {status}: {stderr}")]
    CommandError { command: String, status: i32, stderr: String },

    /// Represents errors that occur during template processing
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Errors reported by the MiniJinja engine
    #[error("MiniJinja error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors that occur during metadata file parsing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents validation failures in project metadata
    #[error("Validation error: {0}.")]
    ValidationError(String),

    /// The project directory already exists and overwriting was declined
    #[error("Output directory '{output_dir}' already exists. Use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },

    /// Repository discovery errors from libgit2
    #[error("Git error: {0}.")]
    Git2Error(#[from] git2::Error),
}

impl Error {
    /// Wraps an I/O error together with the path it happened on.
    pub fn fs<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::FileSystemError { path: path.into(), source }
    }

    /// Returns true for errors produced by a failed external command.
    pub fn is_command_error(&self) -> bool {
        matches!(self, Error::CommandError { .. })
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
