//! Template catalogs.
//!
//! A catalog is an ordered list of file templates: an output path template,
//! a content template and the commit message that introduces the file.
//! Order is significant, it becomes the order of the commit history.
//! Rendering is pure; nothing here touches the filesystem.

use crate::config::{dashed, ProjectMetadata};
use crate::detector::AppDirectory;
use crate::error::{Error, Result};
use crate::renderer::TemplateRenderer;
use indexmap::IndexSet;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// A single templated output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTemplate {
    /// Output path relative to the materialization root, itself a template
    pub path: &'static str,
    pub content: &'static str,
    /// Commit message used when the file is committed on its own
    pub message: &'static str,
}

/// A rendered file, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Target path, `root` joined with `relative_path`
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub content: String,
    pub message: String,
}

/// Values available to the service templates.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectContext {
    pub name: String,
    pub dashed_name: String,
    pub title: String,
    pub version: String,
    pub description: String,
    pub authors: Vec<String>,
}

impl From<&ProjectMetadata> for ProjectContext {
    fn from(metadata: &ProjectMetadata) -> Self {
        Self {
            name: metadata.name().to_string(),
            dashed_name: metadata.dashed_name(),
            title: metadata.title(),
            version: metadata.version().to_string(),
            description: metadata.description().to_string(),
            authors: metadata.authors().to_vec(),
        }
    }
}

/// Values available to the workflow templates.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowContext {
    pub name: String,
    pub dashed_name: String,
    /// Service directory relative to the repository root, `/` separated
    pub path: String,
}

impl WorkflowContext {
    pub fn new(app: &AppDirectory, repo_root: &Path) -> Self {
        let relative = app.path.strip_prefix(repo_root).unwrap_or(&app.path);
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Self { name: app.name.clone(), dashed_name: dashed(&app.name), path }
    }
}

const SERVICE_TEMPLATES: &[FileTemplate] = &[
    FileTemplate {
        path: "{{ name }}/app/__init__.py",
        content: include_str!("../templates/service/init.py.j2"),
        message: "Add init file for app module",
    },
    FileTemplate {
        path: "{{ name }}/app/main.py",
        content: include_str!("../templates/service/main.py.j2"),
        message: "Add main FastAPI application entry point",
    },
    FileTemplate {
        path: "{{ name }}/app/models/__init__.py",
        content: include_str!("../templates/service/init.py.j2"),
        message: "Add init file for models module",
    },
    FileTemplate {
        path: "{{ name }}/app/routers/__init__.py",
        content: include_str!("../templates/service/init.py.j2"),
        message: "Add init file for routers module",
    },
    FileTemplate {
        path: "{{ name }}/app/routers/user.py",
        content: include_str!("../templates/service/router.py.j2"),
        message: "Add user routes",
    },
    FileTemplate {
        path: "{{ name }}/app/dependencies/__init__.py",
        content: include_str!("../templates/service/init.py.j2"),
        message: "Add init file for dependencies module",
    },
    FileTemplate {
        path: "{{ name }}/app/dependencies/auth.py",
        content: include_str!("../templates/service/auth.py.j2"),
        message: "Add basic authentication dependency",
    },
    FileTemplate {
        path: "{{ name }}/app/schemas/__init__.py",
        content: include_str!("../templates/service/init.py.j2"),
        message: "Add init file for schemas module",
    },
    FileTemplate {
        path: "{{ name }}/app/schemas/user.py",
        content: include_str!("../templates/service/schemas.py.j2"),
        message: "Add user Pydantic models",
    },
    FileTemplate {
        path: "{{ name }}/tests/__init__.py",
        content: include_str!("../templates/service/init.py.j2"),
        message: "Add init file for tests module",
    },
    FileTemplate {
        path: "{{ name }}/tests/test_main.py",
        content: include_str!("../templates/service/test_main.py.j2"),
        message: "Add tests for main application",
    },
    FileTemplate {
        path: "{{ name }}/tests/test_user.py",
        content: include_str!("../templates/service/test_user.py.j2"),
        message: "Add tests for user routes",
    },
    FileTemplate {
        path: "{{ name }}/cli/__init__.py",
        content: include_str!("../templates/service/init.py.j2"),
        message: "Add init file for CLI module",
    },
    FileTemplate {
        path: "{{ name }}/cli/main.py",
        content: include_str!("../templates/service/cli.py.j2"),
        message: "Add basic CLI implementation",
    },
    FileTemplate {
        path: "{{ name }}/.env",
        content: include_str!("../templates/service/env.j2"),
        message: "Add environment variables file",
    },
    FileTemplate {
        path: "{{ name }}/.dockerignore",
        content: include_str!("../templates/service/dockerignore.j2"),
        message: "Add .dockerignore file",
    },
    FileTemplate {
        path: "{{ name }}/__init__.py",
        content: include_str!("../templates/service/init.py.j2"),
        message: "Add init file for main module",
    },
    FileTemplate {
        path: "{{ name }}/Dockerfile",
        content: include_str!("../templates/service/Dockerfile.j2"),
        message: "Add Dockerfile for containerization",
    },
    FileTemplate {
        path: "{{ name }}/pyproject.toml",
        content: include_str!("../templates/service/pyproject.toml.j2"),
        message: "Add pyproject.toml for project configuration",
    },
    FileTemplate {
        path: "{{ name }}/requirements.txt",
        content: include_str!("../templates/service/requirements.txt.j2"),
        message: "Add requirements.txt for dependencies",
    },
    FileTemplate {
        path: "{{ name }}/README.md",
        content: include_str!("../templates/service/README.md.j2"),
        message: "Add README.md with project details",
    },
    FileTemplate {
        path: "{{ name }}/Makefile",
        content: include_str!("../templates/service/Makefile.j2"),
        message: "Add Makefile for project automation",
    },
];

const WORKFLOW_TEMPLATES: &[FileTemplate] = &[
    FileTemplate {
        path: "{{ dashed_name }}-test-and-deploy.yml",
        content: include_str!("../templates/workflows/test-and-deploy.yml.j2"),
        message: "Add test and deploy workflow",
    },
    FileTemplate {
        path: "{{ dashed_name }}-pull-request.yml",
        content: include_str!("../templates/workflows/pull-request.yml.j2"),
        message: "Add pull request validation workflow",
    },
    FileTemplate {
        path: "{{ dashed_name }}-release.yml",
        content: include_str!("../templates/workflows/release.yml.j2"),
        message: "Add release workflow",
    },
    FileTemplate {
        path: "{{ dashed_name }}-docker-build.yml",
        content: include_str!("../templates/workflows/docker-build.yml.j2"),
        message: "Add container image workflow",
    },
];

/// An ordered, fixed set of file templates.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    templates: &'static [FileTemplate],
}

impl Catalog {
    /// The service skeleton, rendered from [`ProjectContext`].
    pub fn service() -> Self {
        Self { templates: SERVICE_TEMPLATES }
    }

    /// CI pipeline definitions for one service, rendered from [`WorkflowContext`].
    pub fn workflows() -> Self {
        Self { templates: WORKFLOW_TEMPLATES }
    }

    pub fn templates(&self) -> &'static [FileTemplate] {
        self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Renders every template in catalog order.
    ///
    /// # Arguments
    /// * `renderer` - Template engine
    /// * `context` - Parameter record the templates are rendered from
    /// * `root` - Directory the relative paths are joined to
    ///
    /// # Errors
    /// * `Error::MinijinjaError` if a template refers to a value missing from `context`
    /// * `Error::TemplateError` if a rendered path is unusable or appears twice
    pub fn render<C: Serialize>(
        &self,
        renderer: &dyn TemplateRenderer,
        context: &C,
        root: &Path,
    ) -> Result<Vec<GeneratedFile>> {
        let context = serde_json::to_value(context)
            .map_err(|e| Error::TemplateError(format!("invalid template context: {e}")))?;

        let mut seen = IndexSet::new();
        let mut files = Vec::with_capacity(self.templates.len());
        for template in self.templates {
            let rendered_path = renderer.render(template.path, &context)?;
            let relative_path = to_relative_path(&rendered_path)?;
            if !seen.insert(relative_path.clone()) {
                return Err(Error::TemplateError(format!(
                    "duplicate output path '{}'",
                    relative_path.display()
                )));
            }
            let content = renderer.render(template.content, &context)?;
            files.push(GeneratedFile {
                path: root.join(&relative_path),
                relative_path,
                content,
                message: template.message.to_string(),
            });
        }
        Ok(files)
    }

    /// Renders the whole catalog against `context` and discards the output.
    ///
    /// Fails on the first unresolved substitution point, unusable path or
    /// duplicate path.
    pub fn validate<C: Serialize>(&self, renderer: &dyn TemplateRenderer, context: &C) -> Result<()> {
        self.render(renderer, context, Path::new("")).map(|_| ())
    }
}

/// Turns a rendered `/`-separated path into a relative path that stays under the root.
fn to_relative_path(rendered: &str) -> Result<PathBuf> {
    let invalid = || Error::TemplateError(format!("invalid output path '{rendered}'"));

    let segments: Vec<&str> = rendered.split('/').collect();
    let unusable = |s: &&str| s.trim().is_empty() || *s == "." || *s == "..";
    if segments.iter().any(unusable) {
        return Err(invalid());
    }
    let path: PathBuf = segments.iter().collect();
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(invalid());
    }
    Ok(path)
}
