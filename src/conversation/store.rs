use crate::models::chat::{ derive_title, ChatMessage, Conversation, Role, PLACEHOLDER_TITLE };
use uuid::Uuid;

/// In-memory list of conversations, newest first, with at most one active.
///
/// Single owner, single writer: every mutation goes through `&mut self`.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: Option<Uuid>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_id(&self) -> Option<Uuid> {
        self.active_id
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active_id.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: Uuid) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    fn insert_front(&mut self, conversation: Conversation) -> Uuid {
        let id = conversation.id;
        self.conversations.insert(0, conversation);
        self.active_id = Some(id);
        id
    }

    /// Prepends an empty conversation and makes it active.
    pub fn create(&mut self) -> Uuid {
        self.insert_front(Conversation::new(PLACEHOLDER_TITLE))
    }

    /// Returns false, leaving the active conversation unchanged, for unknown ids.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active_id = Some(id);
        true
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.active_id == Some(id) {
            self.active_id = None;
        }
        self.conversations.len() != before
    }

    /// Appends to the active conversation, starting one if none is active.
    /// Returns the id of the conversation the message went to.
    pub fn append_user_message(&mut self, content: &str) -> Uuid {
        let id = match self.active_id.filter(|id| self.get(*id).is_some()) {
            Some(id) => id,
            None => self.insert_front(Conversation::new(derive_title(content))),
        };

        if let Some(conversation) = self.get_mut(id) {
            if conversation.messages.is_empty() {
                conversation.title = derive_title(content);
            }
            conversation.messages.push(ChatMessage::new(Role::User, content));
        }
        id
    }

    /// Returns false when the conversation was deleted while waiting.
    pub fn append_assistant_message(&mut self, conversation_id: Uuid, content: &str) -> bool {
        match self.get_mut(conversation_id) {
            Some(conversation) => {
                conversation.messages.push(ChatMessage::new(Role::Assistant, content));
                true
            }
            None => false,
        }
    }
}
