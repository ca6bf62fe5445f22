pub mod chat;

use crate::cli::Args;

/// Connection and sampling settings for the completion deployment.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&Args> for LlmConfig {
    fn from(args: &Args) -> Self {
        Self {
            endpoint: args.openai_endpoint.clone(),
            api_key: args.openai_api_key.clone(),
            deployment: args.openai_deployment.clone(),
            api_version: args.openai_api_version.clone(),
            temperature: args.temperature,
            max_tokens: args.max_tokens,
        }
    }
}
