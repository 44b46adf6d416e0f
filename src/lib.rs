//! Launchpad generates a deployable service skeleton, commits it file by
//! file, then generates and commits CI workflows for every service
//! directory found in the repository.

/// Template catalogs for the service skeleton and the CI workflows
pub mod catalog;

/// Command-line interface module for the Launchpad application
pub mod cli;

/// Project metadata and metadata files (JSON or YAML)
pub mod config;

/// Common constants: marker files, branch names, defaults
pub mod constants;

/// Detection of qualifying service directories
pub mod detector;

/// Error types and handling for the Launchpad application
pub mod error;

/// Git primitives and the repository session
pub mod git;

/// Logger setup
pub mod logger;

/// Stage orchestration and failure policy
pub mod pipeline;

/// Writing rendered catalogs to disk
pub mod processor;

/// User input and interaction handling
pub mod prompt;

/// MiniJinja rendering
pub mod renderer;
