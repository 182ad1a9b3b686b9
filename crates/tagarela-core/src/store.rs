//! UI-agnostic chat state and its reducer.
//!
//! The transcript is an append-only log within a session: entries are never
//! reordered or edited in place, only appended or cleared wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids;

/// A single entry in the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub is_bot: bool,
    pub timestamp: DateTime<Utc>,
    /// Display hint: true only for messages created in this session, so the
    /// UI knows which entries to animate. Loaded history is never "new".
    #[serde(default)]
    pub is_new: bool,
}

impl Message {
    pub fn new(text: impl Into<String>, is_bot: bool) -> Self {
        Self {
            id: ids::fresh(),
            text: text.into(),
            is_bot,
            timestamp: Utc::now(),
            is_new: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    pub messages: Vec<Message>,
    pub is_typing: bool,
    pub is_connected: bool,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            is_typing: false,
            is_connected: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ChatAction {
    /// Append one message to the transcript.
    Add(Message),
    /// Replace the transcript wholesale with persisted history.
    Load(Vec<Message>),
    SetTyping(bool),
    SetConnected(bool),
    /// Empty the transcript; the typing/connected flags are untouched.
    Clear,
}

/// Apply one action to the state.
///
/// Pure: no I/O, no clock, no randomness. Ids and timestamps are stamped by
/// `Message::new` before the action is built.
pub fn reduce(state: &mut ChatState, action: ChatAction) {
    match action {
        ChatAction::Add(message) => state.messages.push(message),
        ChatAction::Load(messages) => {
            state.messages = messages
                .into_iter()
                .map(|mut message| {
                    message.is_new = false;
                    message
                })
                .collect();
        }
        ChatAction::SetTyping(is_typing) => state.is_typing = is_typing,
        ChatAction::SetConnected(is_connected) => state.is_connected = is_connected,
        ChatAction::Clear => state.messages.clear(),
    }
}
