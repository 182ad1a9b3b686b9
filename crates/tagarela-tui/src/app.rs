use tagarela_core::{ChatSession, Message};

/// First line shown when there is no history to restore.
const WELCOME: &str = "Olá! Sou seu assistente virtual. Como posso te ajudar hoje?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub session: ChatSession,
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Input state
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Chat viewport state
    pub chat_scroll: u16,
    pub max_scroll: u16, // set during render, for scroll clamping
    pub stick_to_bottom: bool,

    // Clear-history confirmation dialog
    pub show_clear_confirm: bool,

    // Typing indicator animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(mut session: ChatSession) -> Self {
        session.hydrate();
        if session.state().messages.is_empty() {
            session.add_bot_message(WELCOME);
        }

        Self {
            session,
            should_quit: false,
            input_mode: InputMode::Editing,
            input: String::new(),
            cursor: 0,
            chat_scroll: 0,
            max_scroll: 0,
            stick_to_bottom: true,
            show_clear_confirm: false,
            animation_frame: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.session.state().messages
    }

    pub fn is_typing(&self) -> bool {
        self.session.state().is_typing
    }

    pub fn is_connected(&self) -> bool {
        self.session.state().is_connected
    }

    /// Send the current input as a turn. Gated while a reply is pending so
    /// only one turn is in flight at a time.
    pub fn submit_input(&mut self) {
        if self.is_typing() {
            return;
        }
        let input = std::mem::take(&mut self.input);
        if self.session.submit(&input) {
            self.cursor = 0;
            self.stick_to_bottom = true;
        } else {
            // Empty after trimming: keep what the user typed.
            self.input = input;
        }
    }

    pub fn clear_chat(&mut self) {
        self.session.clear();
        self.chat_scroll = 0;
        self.stick_to_bottom = true;
        self.show_clear_confirm = false;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick(&mut self) {
        if self.is_typing() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Chat scrolling; scrolling up detaches from the bottom, scrolling
    // back past the end re-attaches.
    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
        self.stick_to_bottom = false;
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1).min(self.max_scroll);
        if self.chat_scroll >= self.max_scroll {
            self.stick_to_bottom = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
        self.stick_to_bottom = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.stick_to_bottom = true;
    }
}
