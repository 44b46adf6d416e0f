//! Project metadata and its configuration sources.
//! Metadata can be read from a JSON or YAML file and overridden from the
//! command line; the result is validated once and never mutated afterwards.

use crate::constants::{DEFAULT_AUTHOR, DEFAULT_DESCRIPTION, DEFAULT_NAME, DEFAULT_VERSION};
use crate::error::{Error, Result};
use cruet::Inflector;
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Path/identifier-safe rendering of a name: underscores become hyphens.
///
/// Every template that needs the dashed form gets it from here.
pub fn dashed(name: &str) -> String {
    name.replace('_', "-")
}

/// Validated project metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    name: String,
    version: String,
    description: String,
    authors: Vec<String>,
}

impl ProjectMetadata {
    /// Builds metadata, rejecting names that are not usable as a Python package name.
    pub fn new<S: Into<String>>(
        name: S,
        version: S,
        description: S,
        authors: Vec<String>,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, version: version.into(), description: description.into(), authors })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// `billing_api` -> `billing-api`
    pub fn dashed_name(&self) -> String {
        dashed(&self.name)
    }

    /// `billing_api` -> `Billing Api`
    pub fn title(&self) -> String {
        self.name.to_title_case()
    }
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            version: DEFAULT_VERSION.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            authors: vec![DEFAULT_AUTHOR.to_string()],
        }
    }
}

/// The name is both the service directory and the Python package that
/// generated imports are qualified with, so it has to be an identifier.
fn validate_name(name: &str) -> Result<()> {
    let pattern = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .map_err(|e| Error::ValidationError(e.to_string()))?;
    if name.is_empty() {
        return Err(Error::ValidationError("project name must not be empty".to_string()));
    }
    if !pattern.is_match(name) {
        return Err(Error::ValidationError(format!(
            "project name '{name}' must be a Python identifier: letters, digits and '_', not starting with a digit"
        )));
    }
    Ok(())
}

/// Partially specified metadata, as found in a metadata file or on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataSource {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub authors: Option<Vec<String>>,
}

impl MetadataSource {
    /// Layers `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: MetadataSource) -> MetadataSource {
        MetadataSource {
            name: overrides.name.or(self.name),
            version: overrides.version.or(self.version),
            description: overrides.description.or(self.description),
            authors: overrides.authors.or(self.authors),
        }
    }

    /// Fills missing fields with defaults and validates the result.
    pub fn into_metadata(self) -> Result<ProjectMetadata> {
        let defaults = ProjectMetadata::default();
        ProjectMetadata::new(
            self.name.unwrap_or(defaults.name),
            self.version.unwrap_or(defaults.version),
            self.description.unwrap_or(defaults.description),
            self.authors.unwrap_or(defaults.authors),
        )
    }
}

/// Parses metadata content, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither valid JSON nor valid YAML
pub fn parse_metadata(content: &str) -> Result<MetadataSource> {
    match serde_json::from_str(content) {
        Ok(source) => Ok(source),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid metadata format: {e}"))),
    }
}

/// Loads a metadata file.
///
/// # Errors
/// * `Error::ConfigError` if the file is missing or cannot be parsed
pub fn load_metadata_file<P: AsRef<Path>>(path: P) -> Result<MetadataSource> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::ConfigError(format!(
            "Invalid metadata file path: {}",
            path.display()
        )));
    }
    debug!("Loading metadata from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(Error::IoError)?;
    parse_metadata(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_dashed_name_and_title() {
        let metadata =
            ProjectMetadata::new("billing_api", "0.1.0", "x", vec!["A <a@x.com>".to_string()])
                .unwrap();
        assert_eq!(metadata.dashed_name(), "billing-api");
        assert_eq!(metadata.title(), "Billing Api");
    }

    #[test]
    fn rejects_invalid_names() {
        let invalid = ["", ".", "..", "a/b", "-lead", "with space", "my-service", "my.app", "1svc"];
        for name in invalid {
            let result = ProjectMetadata::new(name, "0.1.0", "x", vec![]);
            assert!(matches!(result, Err(Error::ValidationError(_))), "{name:?} accepted");
        }
    }

    #[test]
    fn accepts_python_identifiers() {
        for name in ["billing_api", "_private", "Svc2"] {
            assert!(ProjectMetadata::new(name, "0.1.0", "x", vec![]).is_ok(), "{name:?} rejected");
        }
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let metadata = MetadataSource::default().into_metadata().unwrap();
        assert_eq!(metadata, ProjectMetadata::default());
        assert_eq!(metadata.name(), DEFAULT_NAME);
    }

    #[test]
    fn overrides_win_when_merging() {
        let file = MetadataSource {
            name: Some("from_file".to_string()),
            version: Some("1.0.0".to_string()),
            ..Default::default()
        };
        let cli = MetadataSource { version: Some("2.0.0".to_string()), ..Default::default() };

        let merged = file.merge(cli);
        assert_eq!(merged.name.as_deref(), Some("from_file"));
        assert_eq!(merged.version.as_deref(), Some("2.0.0"));
        assert_eq!(merged.description, None);
    }

    #[test]
    fn parses_json_and_yaml() {
        let json = parse_metadata(r#"{"name": "svc", "authors": ["A"]}"#).unwrap();
        assert_eq!(json.name.as_deref(), Some("svc"));
        assert_eq!(json.authors, Some(vec!["A".to_string()]));

        let yaml = parse_metadata("name: svc\nversion: 2.3.1\n").unwrap();
        assert_eq!(yaml.version.as_deref(), Some("2.3.1"));
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(matches!(parse_metadata("nmae: svc\n"), Err(Error::ConfigError(_))));
    }
}
