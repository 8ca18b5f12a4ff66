//! The dialogue loop and the state it keeps.

pub mod conversation;
pub mod orchestrator;
pub mod system_prompt;

pub use conversation::ConversationState;
pub use orchestrator::{AgentIdentity, DialogueOrchestrator, DialogueSettings};
