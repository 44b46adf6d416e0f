use std::path::{Path, PathBuf};

use launchpad::catalog::{Catalog, GeneratedFile, ProjectContext, WorkflowContext};
use launchpad::config::ProjectMetadata;
use launchpad::detector::AppDirectory;
use launchpad::renderer::MiniJinjaRenderer;

fn metadata(name: &str, version: &str) -> ProjectMetadata {
    ProjectMetadata::new(name, version, "Billing service", vec!["A <a@x.com>".to_string()])
        .unwrap()
}

fn render_service(metadata: &ProjectMetadata) -> Vec<GeneratedFile> {
    let renderer = MiniJinjaRenderer::new();
    Catalog::service()
        .render(&renderer, &ProjectContext::from(metadata), Path::new("root"))
        .unwrap()
}

fn render_workflows(name: &str) -> Vec<GeneratedFile> {
    let renderer = MiniJinjaRenderer::new();
    let app = AppDirectory { path: Path::new("repo").join(name), name: name.to_string() };
    let context = WorkflowContext::new(&app, Path::new("repo"));
    Catalog::workflows().render(&renderer, &context, Path::new("workflows")).unwrap()
}

fn content_of<'a>(files: &'a [GeneratedFile], relative: &str) -> &'a str {
    let relative: PathBuf = relative.split('/').collect();
    files
        .iter()
        .find(|file| file.relative_path == relative)
        .map(|file| file.content.as_str())
        .unwrap_or_else(|| panic!("{} not rendered", relative.display()))
}

#[test]
fn test_catalogs_validate() {
    let renderer = MiniJinjaRenderer::new();
    let project = ProjectContext::from(&ProjectMetadata::default());
    Catalog::service().validate(&renderer, &project).unwrap();

    let app = AppDirectory { path: PathBuf::from("svc"), name: "svc".to_string() };
    let workflow = WorkflowContext::new(&app, Path::new(""));
    Catalog::workflows().validate(&renderer, &workflow).unwrap();
}

#[test]
fn test_catalog_order_and_messages() {
    let files = render_service(&metadata("billing_api", "0.1.0"));
    assert_eq!(files.len(), 22);
    assert_eq!(files[0].relative_path, Path::new("billing_api").join("app").join("__init__.py"));
    assert_eq!(files[0].message, "Add init file for app module");
    assert_eq!(files[21].relative_path, Path::new("billing_api").join("Makefile"));
    assert_eq!(files[21].message, "Add Makefile for project automation");
    assert!(files.iter().all(|file| file.path == Path::new("root").join(&file.relative_path)));
}

#[test]
fn test_entry_point_imports_router_from_name() {
    let files = render_service(&metadata("billing_api", "0.1.0"));
    let main = content_of(&files, "billing_api/app/main.py");
    assert!(main.contains("from billing_api.app.routers import user"));
}

#[test]
fn test_manifest_contains_version_and_authors() {
    let files = render_service(&metadata("billing_api", "2.3.1"));
    let manifest = content_of(&files, "billing_api/pyproject.toml");
    assert!(manifest.contains(r#"version = "2.3.1""#));
    assert!(manifest.contains(r#"name = "billing_api""#));
    assert!(manifest.contains(r#"authors = ["A <a@x.com>"]"#));
    assert!(manifest.contains(r#"billing-api = "cli.main:cli""#));
}

#[test]
fn test_dashed_name_used_consistently() {
    let files = render_service(&metadata("billing_api", "0.1.0"));
    let makefile = content_of(&files, "billing_api/Makefile");
    assert!(makefile.contains("docker build -t billing-api ."));
    assert!(makefile.contains("--env-file .env billing-api"));
    assert!(makefile.contains("\n\tpytest\n"));

    let workflows = render_workflows("billing_api");
    let names: Vec<String> = workflows
        .iter()
        .map(|file| file.relative_path.display().to_string())
        .collect();
    assert_eq!(
        names,
        [
            "billing-api-test-and-deploy.yml",
            "billing-api-pull-request.yml",
            "billing-api-release.yml",
            "billing-api-docker-build.yml",
        ]
    );
    let docker = content_of(&workflows, "billing-api-docker-build.yml");
    assert!(docker.contains("/billing-api:latest"));
    assert!(docker.contains("context: billing_api"));
}

#[test]
fn test_readme_title() {
    let files = render_service(&metadata("billing_api", "0.1.0"));
    let readme = content_of(&files, "billing_api/README.md");
    assert!(readme.starts_with("# Billing Api\n\nBilling service\n"));
}

#[test]
fn test_workflows_keep_github_expressions() {
    let workflows = render_workflows("billing_api");
    let release = content_of(&workflows, "billing-api-release.yml");
    assert!(release.contains("${{ secrets.PYPI_USERNAME }}"));
    assert!(release.contains("${{ github.ref_name }}"));
    assert!(release.contains("platforms: linux/amd64,linux/arm64"));
    assert!(release.contains("cd billing_api"));
}

#[test]
fn test_workflows_are_valid_yaml() {
    for file in render_workflows("billing_api") {
        let parsed: serde_yaml::Value = serde_yaml::from_str(&file.content)
            .unwrap_or_else(|e| panic!("{}: {e}", file.relative_path.display()));
        assert!(parsed.get("jobs").is_some(), "{} has no jobs", file.relative_path.display());
    }
}

#[test]
fn test_pull_request_workflow_only_tests() {
    let workflows = render_workflows("billing_api");
    let pr = content_of(&workflows, "billing-api-pull-request.yml");
    let parsed: serde_yaml::Value = serde_yaml::from_str(pr).unwrap();
    let jobs = parsed.get("jobs").and_then(|jobs| jobs.as_mapping()).unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(pr.contains("poetry run pytest"));
    assert!(!pr.contains("publish"));
}

#[test]
fn test_version_is_escaped_in_string_literals() {
    let files = render_service(&metadata("billing_api", "1.0\"x"));
    let manifest = content_of(&files, "billing_api/pyproject.toml");
    assert!(manifest.contains(r#"version = "1.0\"x""#));
    let main = content_of(&files, "billing_api/app/main.py");
    assert!(main.contains(r#"version="1.0\"x")"#));
    let cli = content_of(&files, "billing_api/cli/main.py");
    assert!(cli.contains(r#"@click.version_option("1.0\"x", "#));
}
