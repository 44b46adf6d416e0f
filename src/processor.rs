//! Structure materialization.
//! Renders a catalog and writes the result under a root directory.

use crate::catalog::{Catalog, GeneratedFile};
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::renderer::TemplateRenderer;
use log::debug;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes rendered catalogs to disk.
pub struct Materializer<'a> {
    renderer: &'a dyn TemplateRenderer,
}

impl<'a> Materializer<'a> {
    pub fn new(renderer: &'a dyn TemplateRenderer) -> Self {
        Self { renderer }
    }

    /// Materializes `catalog` under `root`.
    ///
    /// Directories are created first (existing ones are left alone), then
    /// every file is created or truncated and written in catalog order.
    ///
    /// # Returns
    /// * `Result<Vec<GeneratedFile>>` - The files written, in catalog order
    ///
    /// # Errors
    /// * `Error::FileSystemError` on the first directory or file that cannot
    ///   be written. Files written before the failure are kept.
    pub fn materialize<C: Serialize>(
        &self,
        root: &Path,
        catalog: &Catalog,
        context: &C,
    ) -> Result<Vec<GeneratedFile>> {
        let files = catalog.render(self.renderer, context, root)?;
        Self::write(root, &files)?;
        Ok(files)
    }

    /// Writes already rendered `files` under `root`, directories first.
    ///
    /// # Errors
    /// * `Error::FileSystemError` on the first directory or file that cannot
    ///   be written
    pub fn write(root: &Path, files: &[GeneratedFile]) -> Result<()> {
        for dir in Self::directories(root, files) {
            debug!("Creating directory: {}", dir.display());
            create_dir(&dir)?;
        }

        for file in files {
            debug!("Writing file: {}", file.path.display());
            write_file(&file.path, file.content.as_bytes())?;
        }
        Ok(())
    }

    /// Every directory implied by `files`: the root and all intermediate
    /// segments, deduplicated, parents before children.
    pub fn directories(root: &Path, files: &[GeneratedFile]) -> Vec<PathBuf> {
        let mut dirs = BTreeSet::new();
        dirs.insert(root.to_path_buf());
        for file in files {
            let mut current = root.to_path_buf();
            if let Some(parent) = file.relative_path.parent() {
                for component in parent.components() {
                    current.push(component);
                    dirs.insert(current.clone());
                }
            }
        }
        dirs.into_iter().collect()
    }
}

/// Makes sure generating into `output_dir` is acceptable.
///
/// A missing directory is fine. An existing one is overwritten only when
/// `force` is set or the user agrees.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the user declines
pub fn ensure_output_dir(prompt: &dyn Prompter, output_dir: &Path, force: bool) -> Result<()> {
    if !output_dir.exists() {
        return Ok(());
    }
    let overwrite = prompt.confirm(
        force,
        format!("Directory '{}' already exists. Overwrite generated files?", output_dir.display()),
    )?;
    if overwrite {
        debug!("Overwriting files in {}", output_dir.display());
        Ok(())
    } else {
        Err(Error::OutputDirectoryExistsError { output_dir: output_dir.display().to_string() })
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::fs(path, e))
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path).map_err(|e| Error::fs(path, e))?;
    file.write_all(content).map_err(|e| Error::fs(path, e))?;
    file.flush().map_err(|e| Error::fs(path, e))
}
