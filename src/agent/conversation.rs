//! Append-only conversation log for one agent instance.

use crate::types::{ChatMessage, ChatRole};

/// Ordered user/assistant turns. The system instructions are not stored here;
/// they are prepended when a prompt is built.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    turns: Vec<ChatMessage>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatMessage::assistant(content));
    }

    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// `[system instructions] + turns`, ready to send to the model.
    pub fn to_prompt(&self, instructions: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.turns.len() + 1);
        messages.push(ChatMessage::system(instructions));
        messages.extend(self.turns.iter().cloned());
        messages
    }

    /// Count of turns with `role`.
    pub fn count(&self, role: ChatRole) -> usize {
        self.turns.iter().filter(|t| t.role == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_prepends_instructions_without_storing_them() {
        let mut state = ConversationState::new();
        state.push_user("hi");
        state.push_assistant("hello");

        let prompt = state.to_prompt("be brief");
        assert_eq!(prompt.len(), 3);
        assert_eq!(prompt[0], ChatMessage::system("be brief"));
        assert_eq!(prompt[2], ChatMessage::assistant("hello"));
        assert_eq!(state.len(), 2);
        assert_eq!(state.count(ChatRole::System), 0);
    }

    #[test]
    fn clear_empties_the_log() {
        let mut state = ConversationState::new();
        state.push_user("hi");
        state.clear();
        assert!(state.is_empty());
        assert_eq!(state.to_prompt("x").len(), 1);
    }
}
