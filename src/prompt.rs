//! User interaction.

use crate::error::{Error, Result};
use dialoguer::Confirm;

/// Asks the operator for decisions the pipeline cannot make alone.
pub trait Prompter {
    /// Asks a yes/no question, defaulting to no.
    ///
    /// # Arguments
    /// * `skip` - Answer yes without asking
    /// * `prompt` - Question shown to the user
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool>;
}

/// Terminal prompts through dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| Error::ConfigError(e.to_string()))
    }
}
