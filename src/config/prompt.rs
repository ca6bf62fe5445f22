use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::info;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are the official Employee Policy Assistant for Lara Tech Consulting. \
     Answer strictly from the Employee Handbook. Be professional and concise. \
     Format your responses using markdown for better readability.";

pub const DEFAULT_FALLBACK_ANSWER: &str =
    "I'm unable to find relevant information in the Employee Handbook. \
     Please contact HR for clarification.";

pub const DEFAULT_USER_TEMPLATE: &str = "Context:\n{context}\n\nQuestion:\n{question}";

#[derive(Debug)]
pub enum PromptError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// Prompt text sent to the completion deployment. Any key left out of a
/// prompts file keeps its built-in value.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    pub system_prompt: String,
    pub fallback_answer: String,
    pub user_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string(),
            user_template: DEFAULT_USER_TEMPLATE.to_string(),
        }
    }
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<Arc<PromptConfig>, PromptError> {
    let file_content = fs::read_to_string(&path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    info!("Loaded prompts from {}", path.as_ref().display());
    Ok(Arc::new(config))
}

/// Loads `path` when given, otherwise the built-in prompts.
pub fn load_or_default(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    match path {
        Some(p) => load_prompts(p),
        None => Ok(Arc::new(PromptConfig::default())),
    }
}

pub fn get_user_prompt(config: &PromptConfig, context: &str, question: &str) -> String {
    config.user_template.replace("{context}", context).replace("{question}", question)
}
