//! Persona configuration from TOML (`[persona]` section)

use serde::{Deserialize, Serialize};
use toolgate_domain::ReactPromptTemplate;
use toolgate_domain::prompt::DEFAULT_PERSONA_NAME;

/// Raw persona configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePersonaConfig {
    /// Name the assistant introduces itself with
    pub name: String,
    /// Replaces the built-in persona prompt (`{name}` is substituted)
    pub system_prompt: Option<String>,
}

impl Default for FilePersonaConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_PERSONA_NAME.to_string(),
            system_prompt: None,
        }
    }
}

impl FilePersonaConfig {
    pub fn template(&self) -> ReactPromptTemplate {
        let template = ReactPromptTemplate::new(self.name.as_str());
        match &self.system_prompt {
            Some(prompt) => template.with_system_prompt(prompt.as_str()),
            None => template,
        }
    }
}
