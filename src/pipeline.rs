//! Pipeline orchestration.
//!
//! Runs the four stages in order:
//! 1. Materialize the service skeleton
//! 2. Commit each generated file on its own feature branch
//! 3. Detect service directories and materialize their workflows
//! 4. Commit the workflows directory on a second branch
//!
//! Filesystem and template errors stop the pipeline. What a failed git
//! command does depends on the [`FailurePolicy`].

use crate::catalog::{Catalog, GeneratedFile, ProjectContext, WorkflowContext};
use crate::config::ProjectMetadata;
use crate::constants::{
    FEATURE_BRANCH_PREFIX, WORKFLOWS_BRANCH, WORKFLOWS_COMMIT_MESSAGE, WORKFLOWS_DIR,
};
use crate::detector::{AppDetector, AppDirectory};
use crate::error::{Error, Result};
use crate::git::{CommandOutput, VersionControl};
use crate::processor::Materializer;
use crate::renderer::TemplateRenderer;
use indexmap::IndexMap;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// What to do when a git command exits with a non-zero status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure, record it in the report and carry on
    #[default]
    BestEffort,
    /// Return the first failure
    FailFast,
}

/// Last stage the pipeline completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    StructureGenerated,
    BaseCommitted,
    WorkflowsGenerated,
    WorkflowsCommitted,
}

/// One path committed on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitUnit {
    /// Path relative to the working tree when possible
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Where the service is generated and where services are detected
    pub repo_root: PathBuf,
    pub policy: FailurePolicy,
    /// Push feature branches after committing
    pub push: bool,
}

impl PipelineConfig {
    pub fn new<P: Into<PathBuf>>(repo_root: P) -> Self {
        Self { repo_root: repo_root.into(), policy: FailurePolicy::default(), push: true }
    }

    pub fn workflows_dir(&self) -> PathBuf {
        WORKFLOWS_DIR.split('/').fold(self.repo_root.clone(), |dir, part| dir.join(part))
    }
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub generated: Vec<GeneratedFile>,
    /// Commit operations issued for generated files
    pub commits: usize,
    pub services: Vec<AppDirectory>,
    pub workflows: Vec<GeneratedFile>,
    pub workflows_committed: bool,
    /// Command failures tolerated under [`FailurePolicy::BestEffort`]
    pub failures: Vec<Error>,
}

pub struct Pipeline<'a, V: VersionControl> {
    config: PipelineConfig,
    vcs: V,
    renderer: &'a dyn TemplateRenderer,
    detector: AppDetector,
    stage: Stage,
    report: PipelineReport,
}

impl<'a, V: VersionControl> Pipeline<'a, V> {
    pub fn new(config: PipelineConfig, vcs: V, renderer: &'a dyn TemplateRenderer) -> Self {
        Self {
            config,
            vcs,
            renderer,
            detector: AppDetector::new(),
            stage: Stage::Init,
            report: PipelineReport::default(),
        }
    }

    pub fn with_detector(mut self, detector: AppDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn report(&self) -> &PipelineReport {
        &self.report
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn into_parts(self) -> (V, PipelineReport) {
        (self.vcs, self.report)
    }

    /// Runs all four stages.
    pub fn run(&mut self, metadata: &ProjectMetadata) -> Result<&PipelineReport> {
        let files = self.generate_structure(metadata)?;
        self.commit_structure(metadata, &files)?;
        self.generate_workflows()?;
        self.commit_workflows()?;
        Ok(&self.report)
    }

    /// Stage 1: writes the service skeleton under `<repo_root>/<name>/`.
    pub fn generate_structure(&mut self, metadata: &ProjectMetadata) -> Result<Vec<GeneratedFile>> {
        info!("Generating project structure for '{}'", metadata.name());
        let context = ProjectContext::from(metadata);
        let files = Materializer::new(self.renderer).materialize(
            &self.config.repo_root,
            &Catalog::service(),
            &context,
        )?;
        for file in &files {
            println!("Created: '{}'", file.path.display());
        }
        println!("Project structure created successfully!");

        self.report.generated = files.clone();
        self.stage = Stage::StructureGenerated;
        Ok(files)
    }

    /// The commit units for `files`: those present on disk, in catalog order.
    pub fn commit_units(&self, files: &[GeneratedFile]) -> Vec<CommitUnit> {
        files
            .iter()
            .filter(|file| file.path.exists())
            .map(|file| CommitUnit {
                path: repo_relative(self.vcs.workdir(), &file.path),
                message: file.message.clone(),
            })
            .collect()
    }

    /// Stage 2: one branch, one commit per generated file, one push.
    ///
    /// # Returns
    /// * `Result<usize>` - Number of commit operations issued
    pub fn commit_structure(
        &mut self,
        metadata: &ProjectMetadata,
        files: &[GeneratedFile],
    ) -> Result<usize> {
        let branch = format!("{FEATURE_BRANCH_PREFIX}{}", metadata.dashed_name());
        info!("Committing generated files on '{}'", branch);
        self.attempt(|vcs| vcs.create_branch(&branch))?;

        let mut commits = 0;
        for unit in self.commit_units(files) {
            self.attempt(|vcs| vcs.stage_path(&unit.path))?;
            commits += 1;
            if self.attempt(|vcs| vcs.commit(&unit.message, Some(&unit.path)))?.is_some() {
                println!("Committed: '{}'", unit.path.display());
            }
        }

        self.push(&branch)?;
        self.report.commits = commits;
        self.stage = Stage::BaseCommitted;
        Ok(commits)
    }

    /// Stage 3: workflows for every detected service.
    ///
    /// No detected service is not an error; nothing is written then, not
    /// even the workflows directory. Every service is rendered before
    /// anything is written.
    ///
    /// # Errors
    /// * `Error::TemplateError` if two services render to the same workflow
    ///   file, e.g. `billing_api` and `billing-api`
    pub fn generate_workflows(&mut self) -> Result<Vec<GeneratedFile>> {
        let repo_root = self.config.repo_root.clone();
        let services = self.detector.detect(&repo_root)?;

        let mut workflows = Vec::new();
        if services.is_empty() {
            info!("No service directories found under {}", repo_root.display());
        } else {
            let workflows_dir = self.config.workflows_dir();
            let mut owners: IndexMap<PathBuf, &str> = IndexMap::new();
            for app in &services {
                println!("Creating workflows for app: {}", app.name);
                let context = WorkflowContext::new(app, &repo_root);
                let files = Catalog::workflows().render(self.renderer, &context, &workflows_dir)?;
                for file in &files {
                    if let Some(owner) = owners.insert(file.relative_path.clone(), &app.name) {
                        return Err(Error::TemplateError(format!(
                            "services '{}' and '{}' both produce workflow '{}'",
                            owner,
                            app.name,
                            file.relative_path.display()
                        )));
                    }
                }
                workflows.extend(files);
            }

            Materializer::write(&workflows_dir, &workflows)?;
            println!("GitHub Actions workflows created successfully!");
        }

        self.report.services = services;
        self.report.workflows = workflows.clone();
        self.stage = Stage::WorkflowsGenerated;
        Ok(workflows)
    }

    /// Stage 4: the workflows directory as a single commit on its own branch.
    ///
    /// The commit is limited to the workflows directory; anything else left
    /// in the index stays staged.
    ///
    /// # Returns
    /// * `Result<bool>` - false when there was no workflows directory to commit
    pub fn commit_workflows(&mut self) -> Result<bool> {
        let workflows_dir = self.config.workflows_dir();
        if !workflows_dir.is_dir() {
            info!("Skipping workflow commit: {} does not exist", workflows_dir.display());
            return Ok(false);
        }

        let path = repo_relative(self.vcs.workdir(), &workflows_dir);
        self.attempt(|vcs| vcs.create_branch(WORKFLOWS_BRANCH))?;
        self.attempt(|vcs| vcs.stage_path(&path))?;
        self.attempt(|vcs| vcs.commit(WORKFLOWS_COMMIT_MESSAGE, Some(&path)))?;
        self.push(WORKFLOWS_BRANCH)?;

        self.report.workflows_committed = true;
        self.stage = Stage::WorkflowsCommitted;
        Ok(true)
    }

    fn push(&mut self, branch: &str) -> Result<()> {
        if !self.config.push {
            info!("Not pushing '{}'", branch);
            return Ok(());
        }
        self.attempt(|vcs| vcs.push_branch(branch))?;
        Ok(())
    }

    /// Runs one primitive and applies the failure policy to its result.
    fn attempt<F>(&mut self, op: F) -> Result<Option<CommandOutput>>
    where
        F: FnOnce(&mut V) -> Result<CommandOutput>,
    {
        match op(&mut self.vcs) {
            Ok(output) => Ok(Some(output)),
            Err(err)
                if err.is_command_error() && self.config.policy == FailurePolicy::BestEffort =>
            {
                warn!("{err}");
                self.report.failures.push(err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// `path` relative to `workdir`, or `path` itself when it lies elsewhere.
fn repo_relative(workdir: &Path, path: &Path) -> PathBuf {
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let base = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
    match absolute.strip_prefix(&base) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => absolute,
    }
}
