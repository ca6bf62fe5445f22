use log::{ debug, error };
use uuid::Uuid;

use super::backend::{ BackendError, ChatBackend };
use super::store::ConversationStore;

pub const APOLOGY_MESSAGE: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// Questions offered on the welcome screen as `(label, question)`.
pub const QUICK_QUESTIONS: [(&str, &str); 4] = [
    ("Working hours", "What are the official working hours at Lara Tech Consulting?"),
    ("Remote work", "What is the remote or hybrid work policy?"),
    ("Leave policy", "What leave options are available to employees?"),
    ("Company policies", "What are the key company policies I should know about?"),
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a request is already in flight")]
    Busy,

    #[error("no quick question numbered {0}")]
    UnknownQuickQuestion(usize),
}

/// A question that has been recorded and is waiting for its answer.
#[derive(Debug)]
#[must_use = "a pending send leaves the session busy until it is finished"]
pub struct PendingSend {
    pub conversation_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Answered(String),
    Failed(String),
}

/// The conversation store plus the busy flag that guards it against
/// overlapping sends.
#[derive(Debug, Default)]
pub struct ChatSession {
    store: ConversationStore,
    busy: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ConversationStore {
        &mut self.store
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Records the user's message and marks the session busy.
    pub fn begin_send(&mut self, input: &str) -> Result<PendingSend, SessionError> {
        let content = input.trim();
        if content.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if self.busy {
            return Err(SessionError::Busy);
        }

        let conversation_id = self.store.append_user_message(content);
        self.busy = true;
        Ok(PendingSend { conversation_id, content: content.to_string() })
    }

    /// Appends the answer, or the apology on failure, and clears the busy flag.
    pub fn finish_send(
        &mut self,
        pending: PendingSend,
        result: Result<String, BackendError>
    ) -> SendOutcome {
        let outcome = match result {
            Ok(answer) => SendOutcome::Answered(answer),
            Err(e) => {
                error!("Chat request failed: {}", e);
                SendOutcome::Failed(APOLOGY_MESSAGE.to_string())
            }
        };

        let text = match &outcome {
            SendOutcome::Answered(t) | SendOutcome::Failed(t) => t,
        };
        if !self.store.append_assistant_message(pending.conversation_id, text) {
            debug!("Conversation {} was deleted before its answer arrived", pending.conversation_id);
        }

        self.busy = false;
        outcome
    }

    pub async fn send(
        &mut self,
        backend: &dyn ChatBackend,
        input: &str
    ) -> Result<SendOutcome, SessionError> {
        let pending = self.begin_send(input)?;
        let conversation_id = pending.conversation_id.to_string();
        let result = backend.ask(&pending.content, Some(conversation_id.as_str())).await;
        Ok(self.finish_send(pending, result))
    }

    /// Sends the quick question at 1-based `index`.
    pub async fn send_quick(
        &mut self,
        backend: &dyn ChatBackend,
        index: usize
    ) -> Result<SendOutcome, SessionError> {
        let (_, question) = index
            .checked_sub(1)
            .and_then(|i| QUICK_QUESTIONS.get(i))
            .ok_or(SessionError::UnknownQuickQuestion(index))?;
        self.send(backend, question).await
    }
}
