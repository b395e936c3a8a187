//! Conversation memory for a single chat session.
//!
//! History lives in memory only and is dropped with the session. Prompts see
//! a window of the last `WINDOW_SIZE` messages; the `history` command sees all.

use crate::provider::types::{ChatMessage, Role};

/// Number of most recent messages rendered into the prompt context.
pub const WINDOW_SIZE: usize = 4;

const CONTEXT_HEADER: &str = "=== Conversation History ===";

#[derive(Debug, Clone)]
pub struct SessionMemory {
    enabled: bool,
    history: Vec<ChatMessage>,
}

impl SessionMemory {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            history: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append a message. Does nothing when memory is disabled.
    pub fn record(&mut self, role: Role, content: &str) {
        if self.enabled {
            self.history.push(ChatMessage::new(role, content));
        }
    }

    /// Render the recent window as a text block for the system prompt.
    ///
    /// Empty when memory is disabled or nothing has been recorded.
    pub fn render_context(&self) -> String {
        if !self.enabled || self.history.is_empty() {
            return String::new();
        }

        let start = self.history.len().saturating_sub(WINDOW_SIZE);
        let mut text = format!("{}\n", CONTEXT_HEADER);
        for msg in &self.history[start..] {
            text.push_str(&format!("{}: {}\n", msg.role.label(), msg.content));
        }
        text
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Full recorded history, oldest first.
    pub fn entries(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
