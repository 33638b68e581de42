pub mod conversation;
pub mod store;

pub use conversation::{display_name, Conversation, ConversationSummary};
pub use store::ConversationStore;
