pub mod ai;
pub mod config;
pub mod history;
pub mod ids;
pub mod responder;
pub mod session;
pub mod store;

// Re-export main types for convenience
pub use ai::{AiError, GroqClient};
pub use config::Config;
pub use history::HistoryStore;
pub use responder::{BotReply, BotResponder};
pub use session::{ChatSession, TurnEvent};
pub use store::{reduce, ChatAction, ChatState, Message};
