//! Local chat history, settings, and the session that ties them to a
//! response client.
mod models;
mod session;
mod settings;
mod store;

pub use models::{Conversation, Role, TITLE_MAX_CHARS, Turn, derive_title, now_millis};
pub use session::{ChatSession, SendOutcome};
pub use settings::{Settings, SettingsUpdate};
pub use store::ConversationStore;
