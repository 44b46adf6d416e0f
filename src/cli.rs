//! Command-line interface implementation for Launchpad.
//! Provides argument parsing and help text formatting using clap.

use crate::config::{load_metadata_file, MetadataSource, ProjectMetadata};
use crate::error::Result;
use crate::pipeline::{FailurePolicy, PipelineConfig};
use clap::{error::ErrorKind, Args as ClapArgs, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for Launchpad.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Launchpad: service scaffolding and release automation",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate the service, commit it, then generate and commit its workflows
    Run(RunArgs),
    /// Generate the service skeleton only
    Generate(GenerateArgs),
    /// Commit the generated service files one by one and push the branch
    Commit(CommitArgs),
    /// Generate workflows for every service directory in the repository
    Workflows(RepoArgs),
    /// Commit the workflows directory and push the branch
    CommitWorkflows(CommitWorkflowsArgs),
}

/// Project metadata options. Flags override values from `--config`.
#[derive(ClapArgs, Debug, Default)]
pub struct ProjectArgs {
    /// Project name, used as the directory name [default: example_app]
    #[arg(short, long)]
    pub name: Option<String>,

    /// Project version [default: 0.1.0]
    #[arg(long = "project-version", value_name = "VERSION")]
    pub project_version: Option<String>,

    /// Project description
    #[arg(long)]
    pub description: Option<String>,

    /// Project author, repeat for several authors
    #[arg(long = "author", value_name = "AUTHOR")]
    pub authors: Vec<String>,

    /// Metadata file (JSON or YAML) with name, version, description and authors
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ProjectArgs {
    /// Resolves the metadata: defaults, then the metadata file, then flags.
    pub fn metadata(&self) -> Result<ProjectMetadata> {
        let file = match &self.config {
            Some(path) => load_metadata_file(path)?,
            None => MetadataSource::default(),
        };
        let flags = MetadataSource {
            name: self.name.clone(),
            version: self.project_version.clone(),
            description: self.description.clone(),
            authors: (!self.authors.is_empty()).then(|| self.authors.clone()),
        };
        file.merge(flags).into_metadata()
    }
}

#[derive(ClapArgs, Debug)]
pub struct RepoArgs {
    /// Repository root: where the service is generated and services are detected
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub repo_root: PathBuf,
}

#[derive(ClapArgs, Debug, Default)]
pub struct GitArgs {
    /// Stop at the first failing git command instead of continuing
    #[arg(long)]
    pub fail_fast: bool,

    /// Commit without pushing branches
    #[arg(long)]
    pub no_push: bool,
}

#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
    #[command(flatten)]
    pub repo: RepoArgs,
    #[command(flatten)]
    pub git: GitArgs,
    /// Overwrite an existing project directory without asking
    #[arg(short, long)]
    pub force: bool,
}

#[derive(ClapArgs, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
    #[command(flatten)]
    pub repo: RepoArgs,
    /// Overwrite an existing project directory without asking
    #[arg(short, long)]
    pub force: bool,
}

#[derive(ClapArgs, Debug)]
pub struct CommitArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
    #[command(flatten)]
    pub repo: RepoArgs,
    #[command(flatten)]
    pub git: GitArgs,
}

#[derive(ClapArgs, Debug)]
pub struct CommitWorkflowsArgs {
    #[command(flatten)]
    pub repo: RepoArgs,
    #[command(flatten)]
    pub git: GitArgs,
}

/// Builds the pipeline configuration from repository and git options.
pub fn pipeline_config(repo: &RepoArgs, git: Option<&GitArgs>) -> PipelineConfig {
    let mut config = PipelineConfig::new(repo.repo_root.clone());
    if let Some(git) = git {
        config.policy =
            if git.fail_fast { FailurePolicy::FailFast } else { FailurePolicy::BestEffort };
        config.push = !git.no_push;
    }
    config
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if the subcommand is missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(
                e.kind(),
                ErrorKind::MissingSubcommand
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
