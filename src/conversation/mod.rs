pub mod backend;
pub mod session;
pub mod store;

pub use self::backend::{ BackendError, ChatBackend, HttpChatBackend };
pub use self::session::{ ChatSession, PendingSend, SendOutcome, SessionError };
pub use self::store::ConversationStore;
