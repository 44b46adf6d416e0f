//! Launchpad's main application entry point.
//! Parses arguments, builds the pipeline and runs the requested stages.

use launchpad::{
    catalog::{Catalog, ProjectContext},
    cli::{get_args, pipeline_config, Args, Command},
    error::{default_error_handler, Result},
    git::GitSession,
    logger::init_logger,
    pipeline::{Pipeline, PipelineReport},
    processor::ensure_output_dir,
    prompt::DialoguerPrompter,
    renderer::MiniJinjaRenderer,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// Stages that never touch git (generate, workflows) get a session over the
/// repository root without opening the repository, so they also work in a
/// plain directory.
fn run(args: Args) -> Result<()> {
    let renderer = MiniJinjaRenderer::new();
    let prompt = DialoguerPrompter::new();

    match args.command {
        Command::Run(args) => {
            let metadata = args.project.metadata()?;
            let config = pipeline_config(&args.repo, Some(&args.git));
            ensure_output_dir(&prompt, &config.repo_root.join(metadata.name()), args.force)?;
            let session = GitSession::open(&config.repo_root)?;
            let mut pipeline = Pipeline::new(config, session, &renderer);
            let report = pipeline.run(&metadata)?;
            print_summary(report);
        }
        Command::Generate(args) => {
            let metadata = args.project.metadata()?;
            let config = pipeline_config(&args.repo, None);
            ensure_output_dir(&prompt, &config.repo_root.join(metadata.name()), args.force)?;
            let session = GitSession::new(config.repo_root.clone(), None);
            Pipeline::new(config, session, &renderer).generate_structure(&metadata)?;
        }
        Command::Commit(args) => {
            let metadata = args.project.metadata()?;
            let config = pipeline_config(&args.repo, Some(&args.git));
            // The file list comes from the catalog; files missing on disk are skipped.
            let context = ProjectContext::from(&metadata);
            let files = Catalog::service().render(&renderer, &context, &config.repo_root)?;
            let session = GitSession::open(&config.repo_root)?;
            let mut pipeline = Pipeline::new(config, session, &renderer);
            pipeline.commit_structure(&metadata, &files)?;
            print_summary(pipeline.report());
        }
        Command::Workflows(repo) => {
            let config = pipeline_config(&repo, None);
            let session = GitSession::new(config.repo_root.clone(), None);
            Pipeline::new(config, session, &renderer).generate_workflows()?;
        }
        Command::CommitWorkflows(args) => {
            let config = pipeline_config(&args.repo, Some(&args.git));
            let session = GitSession::open(&config.repo_root)?;
            let mut pipeline = Pipeline::new(config, session, &renderer);
            pipeline.commit_workflows()?;
            print_summary(pipeline.report());
        }
    }
    Ok(())
}

fn print_summary(report: &PipelineReport) {
    if report.failures.is_empty() {
        return;
    }
    eprintln!("{} git command(s) failed and were skipped:", report.failures.len());
    for failure in &report.failures {
        eprintln!("  {failure}");
    }
}
