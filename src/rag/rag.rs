use crate::config::prompt::{ self, PromptConfig };
use crate::llm::chat::{ ChatClient, ChatError, PromptMessage };
use crate::search::{ DocumentSearch, EmployeeScope, SearchResult };

use log::{ debug, error, info };
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RagEngineError {
    #[error("Failed to generate answer: {0}")]
    Generation(#[from] ChatError),
}

/// Answers questions from the documents under one employee's folder.
///
/// Holds no per-request state, so one engine is shared across all requests.
pub struct RagEngine {
    search_client: Arc<dyn DocumentSearch>,
    chat_client: Arc<dyn ChatClient>,
    scope: EmployeeScope,
    prompt_config: Arc<PromptConfig>,
    top_k: usize,
}

impl RagEngine {
    pub fn new(
        search_client: Arc<dyn DocumentSearch>,
        chat_client: Arc<dyn ChatClient>,
        scope: EmployeeScope,
        prompt_config: Arc<PromptConfig>,
        top_k: usize
    ) -> Self {
        Self {
            search_client,
            chat_client,
            scope,
            prompt_config,
            top_k,
        }
    }

    pub fn scope(&self) -> &EmployeeScope {
        &self.scope
    }

    /// Each document as `Source: <path>\n<content>`, separated by a blank line.
    pub fn format_documents_for_prompt(docs: &[SearchResult]) -> String {
        docs.iter()
            .map(|d| format!("Source: {}\n{}", d.source, d.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Search failures are logged and read as "nothing found".
    pub async fn retrieve(&self, query: &str) -> Vec<SearchResult> {
        match self.search_client.search(&self.scope, query, self.top_k).await {
            Ok(docs) => docs,
            Err(e) => {
                error!("Search failed: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn generate(
        &self,
        question: &str,
        docs: &[SearchResult]
    ) -> Result<String, RagEngineError> {
        if docs.is_empty() {
            info!("No documents found under {}, returning fallback answer", self.scope);
            return Ok(self.prompt_config.fallback_answer.clone());
        }

        let context = Self::format_documents_for_prompt(docs);
        let messages = [
            PromptMessage::system(self.prompt_config.system_prompt.clone()),
            PromptMessage::user(prompt::get_user_prompt(&self.prompt_config, &context, question)),
        ];

        debug!("--- Answer Prompt ---\n{}\n---------------------", messages[1].content);

        let answer = self.chat_client.complete(&messages).await.map_err(|e| {
            error!("Completion from '{}' failed: {}", self.chat_client.get_model(), e);
            e
        })?;

        Ok(answer.response)
    }

    pub async fn query_and_answer(&self, question: &str) -> Result<String, RagEngineError> {
        let docs = self.retrieve(question).await;
        info!("Retrieved {} document(s) for question", docs.len());
        self.generate(question, &docs).await
    }
}
