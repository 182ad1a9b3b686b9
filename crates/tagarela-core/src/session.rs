//! Turn sequencing: the single owner of chat state.
//!
//! A turn runs `Idle -> user message appended -> typing set -> awaiting
//! response -> typing cleared -> bot message appended -> Idle`. The user
//! message lands synchronously; the bot reply arrives later as a
//! [`TurnEvent`] that the owning loop feeds back through [`ChatSession::apply`],
//! so every mutation goes through one owner.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::history::HistoryStore;
use crate::responder::{BotReply, BotResponder};
use crate::store::{reduce, ChatAction, ChatState, Message};

/// Emitted by an in-flight turn once its reply is ready to display.
#[derive(Debug)]
pub enum TurnEvent {
    Reply { text: String },
}

pub struct ChatSession {
    state: ChatState,
    responder: Arc<BotResponder>,
    history: Option<Arc<HistoryStore>>,
    events_tx: mpsc::UnboundedSender<TurnEvent>,
    events_rx: mpsc::UnboundedReceiver<TurnEvent>,
}

impl ChatSession {
    pub fn new(responder: BotResponder, history: Option<HistoryStore>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: ChatState::default(),
            responder: Arc::new(responder),
            history: history.map(Arc::new),
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Load persisted history into the store. Called once at startup;
    /// loaded messages are marked not-new so the UI skips entry animations.
    pub fn hydrate(&mut self) {
        let Some(history) = &self.history else { return };
        if let Some(messages) = history.load() {
            if !messages.is_empty() {
                debug!(count = messages.len(), "hydrated chat history");
                reduce(&mut self.state, ChatAction::Load(messages));
            }
        }
    }

    /// Start one turn. Returns false, changing nothing, when the input is
    /// empty after trimming.
    pub fn submit(&mut self, input: &str) -> bool {
        let text = input.trim();
        if text.is_empty() {
            return false;
        }

        reduce(&mut self.state, ChatAction::Add(Message::new(text, false)));
        reduce(&mut self.state, ChatAction::SetTyping(true));
        self.sync_history();

        let responder = Arc::clone(&self.responder);
        let events_tx = self.events_tx.clone();
        let text = text.to_string();
        tokio::spawn(async move {
            // The inner spawn turns a responder panic into a JoinError, so
            // the turn still resolves and typing never stays stuck.
            let reply =
                match tokio::spawn(async move { responder.respond(&text).await }).await {
                    Ok(reply) => reply,
                    Err(err) => {
                        warn!(error = %err, "responder task failed");
                        BotReply::apology()
                    }
                };

            tokio::time::sleep(reply.display_delay).await;

            // A failed send means the session is gone; drop the reply
            // rather than mutate a discarded store.
            let _ = events_tx.send(TurnEvent::Reply { text: reply.text });
        });

        true
    }

    /// Next turn event, for the owner's select loop.
    pub async fn next_event(&mut self) -> Option<TurnEvent> {
        self.events_rx.recv().await
    }

    /// Apply a turn event to the store.
    pub fn apply(&mut self, event: TurnEvent) {
        match event {
            TurnEvent::Reply { text } => {
                reduce(&mut self.state, ChatAction::SetTyping(false));
                reduce(&mut self.state, ChatAction::Add(Message::new(text, true)));
                self.sync_history();
            }
        }
    }

    /// Append a bot message outside a turn (the frontend's welcome line).
    pub fn add_bot_message(&mut self, text: &str) {
        reduce(&mut self.state, ChatAction::Add(Message::new(text, true)));
        self.sync_history();
    }

    /// Wipe the transcript and its persisted copy. The typing and
    /// connected flags are left alone.
    pub fn clear(&mut self) {
        reduce(&mut self.state, ChatAction::Clear);
        if let Some(history) = &self.history {
            let history = Arc::clone(history);
            tokio::task::spawn_blocking(move || {
                if let Err(err) = history.clear() {
                    warn!(error = %err, "failed to clear persisted history");
                }
            });
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        reduce(&mut self.state, ChatAction::SetConnected(connected));
    }

    /// Mirror the transcript to storage, fire-and-forget. The in-memory
    /// store stays the source of truth; a failed save only logs.
    fn sync_history(&self) {
        let Some(history) = &self.history else { return };
        if self.state.messages.is_empty() {
            return;
        }
        let history = Arc::clone(history);
        let snapshot = self.state.messages.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(err) = history.save(&snapshot) {
                warn!(error = %err, "failed to persist chat history");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::fallback;
    use crate::config::Config;

    fn offline_session() -> ChatSession {
        let config = Config::default();
        ChatSession::new(BotResponder::from_config(&config), None)
    }

    #[tokio::test(start_paused = true)]
    async fn a_turn_appends_user_then_bot_and_cycles_the_typing_flag() {
        let mut session = offline_session();
        assert!(!session.state().is_typing);

        assert!(session.submit("olá"));

        // User message is observable synchronously, typing is on.
        assert_eq!(session.state().messages.len(), 1);
        assert_eq!(session.state().messages[0].text, "olá");
        assert!(!session.state().messages[0].is_bot);
        assert!(session.state().is_typing);

        let event = session.next_event().await.unwrap();
        // Still typing until the owner applies the event.
        assert!(session.state().is_typing);
        session.apply(event);

        assert!(!session.state().is_typing);
        assert_eq!(session.state().messages.len(), 2);
        let reply = &session.state().messages[1];
        assert!(reply.is_bot);
        assert_eq!(reply.text, fallback::GREETING);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_input_changes_nothing() {
        let mut session = offline_session();
        assert!(!session.submit(""));
        assert!(!session.submit("   \t  "));
        assert_eq!(*session.state(), ChatState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn input_is_trimmed_before_appending() {
        let mut session = offline_session();
        assert!(session.submit("  oi  "));
        assert_eq!(session.state().messages[0].text, "oi");
    }

    #[tokio::test(start_paused = true)]
    async fn turns_append_in_call_order() {
        let mut session = offline_session();
        session.submit("oi");
        session.submit("tchau");
        assert_eq!(session.state().messages.len(), 2);
        assert_eq!(session.state().messages[0].text, "oi");
        assert_eq!(session.state().messages[1].text, "tchau");

        for _ in 0..2 {
            let event = session.next_event().await.unwrap();
            session.apply(event);
        }
        assert_eq!(session.state().messages.len(), 4);
        assert!(!session.state().is_typing);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_wipes_the_transcript_but_not_the_flags() {
        let mut session = offline_session();
        session.submit("oi");
        session.clear();
        assert!(session.state().messages.is_empty());
        assert!(session.state().is_typing);
        assert!(session.state().is_connected);
    }

    #[tokio::test(start_paused = true)]
    async fn hydrate_loads_persisted_messages_as_not_new() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("history.db")).unwrap();
        store
            .save(&[Message::new("oi", false), Message::new("resposta", true)])
            .unwrap();

        let config = Config::default();
        let mut session = ChatSession::new(BotResponder::from_config(&config), Some(store));
        session.hydrate();

        assert_eq!(session.state().messages.len(), 2);
        assert!(session.state().messages.iter().all(|m| !m.is_new));
        assert_eq!(session.state().messages[0].text, "oi");
        assert_eq!(session.state().messages[1].text, "resposta");
    }

    #[tokio::test(start_paused = true)]
    async fn welcome_message_is_a_new_bot_message() {
        let mut session = offline_session();
        session.add_bot_message("Olá! Sou seu assistente virtual.");
        let state = session.state();
        assert_eq!(state.messages.len(), 1);
        assert!(state.messages[0].is_bot);
        assert!(state.messages[0].is_new);
        assert!(!state.is_typing);
    }

    #[tokio::test(start_paused = true)]
    async fn set_connected_flips_only_the_flag() {
        let mut session = offline_session();
        session.set_connected(false);
        assert!(!session.state().is_connected);
        assert!(session.state().messages.is_empty());
    }
}
