use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE } };
use serde::{ Deserialize, Serialize };

use super::{ ChatClient, ChatError, CompletionResponse, PromptMessage };
use crate::llm::LlmConfig;

pub struct AzureOpenAIChatClient {
    http: HttpClient,
    api_key: String,
    deployment: String,
    base_url: String,
    api_version: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct AzureChatRequest<'a> {
    messages: &'a [PromptMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct AzureChatResponse {
    #[serde(default)]
    choices: Vec<AzureChoice>,
}

#[derive(Deserialize)]
struct AzureChoice {
    message: AzureMessage,
}

#[derive(Deserialize)]
struct AzureMessage {
    content: Option<String>,
}

impl AzureOpenAIChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self, ChatError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
            base_url: config.endpoint.clone(),
            api_version: config.api_version.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.base_url.trim_end_matches('/'),
            self.deployment
        )
    }
}

#[async_trait]
impl ChatClient for AzureOpenAIChatClient {
    async fn complete(&self, messages: &[PromptMessage]) -> Result<CompletionResponse, ChatError> {
        let req = AzureChatRequest {
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self.http
            .post(self.url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&req)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ChatError::Status { status, body });
        }

        let data = resp.json::<AzureChatResponse>().await?;
        let content = data.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ChatError::EmptyResponse)?;

        debug!("Completion from '{}' returned {} chars", self.deployment, content.len());

        Ok(CompletionResponse { response: content })
    }

    fn get_model(&self) -> String {
        self.deployment.clone()
    }
}
