//! Common constants used throughout the Launchpad application.

/// Paths that must all exist under a directory for it to count as a service
pub const MARKER_FILES: [&str; 4] = ["Dockerfile", "pyproject.toml", "app", "tests"];

/// Workflow definitions location, relative to the repository root
pub const WORKFLOWS_DIR: &str = ".github/workflows";

/// Prefix of the branch that receives the generated service files
pub const FEATURE_BRANCH_PREFIX: &str = "feature/";

/// Branch that receives the generated workflow definitions
pub const WORKFLOWS_BRANCH: &str = "feature/add-github-actions-workflows";

/// Commit message used for the workflows directory
pub const WORKFLOWS_COMMIT_MESSAGE: &str = "Add GitHub Actions workflows";

/// Remote that branches are pushed to
pub const DEFAULT_REMOTE: &str = "origin";

pub const DEFAULT_NAME: &str = "example_app";
pub const DEFAULT_VERSION: &str = "0.1.0";
pub const DEFAULT_DESCRIPTION: &str =
    "A FastAPI application with Pydantic models and CLI capabilities.";
pub const DEFAULT_AUTHOR: &str = "Your Name <your.email@example.com>";
