use async_trait::async_trait;
use reqwest::Client as HttpClient;
use url::Url;

use crate::models::api::{ ChatRequest, ChatResponse };

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat server returned {0}")]
    Status(reqwest::StatusCode),
}

/// Where a chat front end sends questions.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(&self, message: &str, conversation_id: Option<&str>) -> Result<String, BackendError>;
}

/// Talks to a running server over `POST /api/chat`.
pub struct HttpChatBackend {
    http: HttpClient,
    chat_url: Url,
}

impl HttpChatBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let chat_url = Url::parse(base_url)?.join("/api/chat")?;
        Ok(Self { http: HttpClient::new(), chat_url })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn ask(&self, message: &str, conversation_id: Option<&str>) -> Result<String, BackendError> {
        let req = ChatRequest {
            message: Some(message.to_string()),
            conversation_id: conversation_id.map(str::to_string),
        };

        let resp = self.http.post(self.chat_url.clone()).json(&req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status(status));
        }

        Ok(resp.json::<ChatResponse>().await?.answer)
    }
}
