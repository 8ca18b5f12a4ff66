//! The dialogue loop: decide, execute tools, finalize.
//!
//! One `chat` call makes at most two model calls. The first is offered the
//! whole tool catalog; if the model picks tools they run sequentially in the
//! order given, their outcomes are folded into a results turn, and a second
//! call without tools produces the final answer.

use crate::agent::system_prompt::build_system_prompt;
use crate::agent::ConversationState;
use crate::config::{AgentConfig, UnknownToolPolicy};
use crate::error::ChatError;
use crate::inference::{ChatModel, CompletionRequest};
use crate::tools::{ToolDescriptor, ToolExecutor};
use crate::types::{ChatMessage, InferenceResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, info_span, warn, Instrument};

/// Assistant text recorded when the model calls tools without saying anything.
pub const TOOL_PLACEHOLDER: &str = "I'll help with that.";

const RESULTS_HEADER: &str = "Results from function calls:\n";

/// Who this agent is, as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIdentity {
    pub name: String,
    pub wallet_address: Option<String>,
}

/// Knobs for the model calls.
#[derive(Debug, Clone)]
pub struct DialogueSettings {
    pub temperature: f64,
    pub max_tokens: u32,
    pub model_timeout: Duration,
    pub unknown_tool_policy: UnknownToolPolicy,
}

impl DialogueSettings {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            model_timeout: Duration::from_secs(config.request_timeout_secs),
            unknown_tool_policy: config.unknown_tool_policy,
        }
    }
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

pub struct DialogueOrchestrator {
    identity: AgentIdentity,
    instructions: String,
    model: Arc<dyn ChatModel>,
    executor: ToolExecutor,
    settings: DialogueSettings,
    /// Serializes whole turns and clears.
    turn_lock: Mutex<()>,
    conversation: RwLock<ConversationState>,
}

impl std::fmt::Debug for DialogueOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueOrchestrator")
            .field("identity", &self.identity)
            .field("model", &self.model.model_name())
            .field("tools", &self.executor.registry().len())
            .finish_non_exhaustive()
    }
}

impl DialogueOrchestrator {
    /// `module_address` is substituted into the system instructions.
    pub fn new(
        identity: AgentIdentity,
        module_address: &str,
        model: Arc<dyn ChatModel>,
        executor: ToolExecutor,
        settings: DialogueSettings,
    ) -> Self {
        let wallet = identity.wallet_address.as_deref().unwrap_or("Not found");
        let instructions = build_system_prompt(wallet, module_address);
        Self {
            identity,
            instructions,
            model,
            executor,
            settings,
            turn_lock: Mutex::new(()),
            conversation: RwLock::new(ConversationState::new()),
        }
    }

    pub fn identity(&self) -> &AgentIdentity {
        &self.identity
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// The tool catalog offered to the model.
    pub fn catalog(&self) -> Vec<ToolDescriptor> {
        self.executor.registry().describe()
    }

    /// Snapshot of the conversation.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.conversation.read().await.turns().to_vec()
    }

    /// Drop every turn. Waits for an in-flight `chat` to finish first.
    pub async fn clear_history(&self) {
        let _turn = self.turn_lock.lock().await;
        self.conversation.write().await.clear();
        info!("Conversation cleared");
    }

    /// Run one user turn to completion and return the reply.
    pub async fn chat(&self, message: &str) -> Result<String, ChatError> {
        let span = info_span!("chat", request_id = %ulid::Ulid::new());
        self.run_turn(message).instrument(span).await
    }

    async fn run_turn(&self, message: &str) -> Result<String, ChatError> {
        let _turn = self.turn_lock.lock().await;
        info!("User: {}", preview(message));

        let prompt = {
            let mut conversation = self.conversation.write().await;
            conversation.push_user(message);
            conversation.to_prompt(&self.instructions)
        };

        let decision = self.ask(prompt, self.catalog()).await?;
        if decision.tool_calls.is_empty() {
            let reply = decision.content.unwrap_or_default();
            self.conversation.write().await.push_assistant(reply.clone());
            info!("Agent: {}", preview(&reply));
            return Ok(reply);
        }

        let mut lines = Vec::with_capacity(decision.tool_calls.len());
        for call in &decision.tool_calls {
            info!("Tool: {}({})", call.name, call.raw_arguments);
            match self.executor.execute(call).await {
                Some(result) => lines.push(result.summary_line()),
                None if self.settings.unknown_tool_policy == UnknownToolPolicy::Report => {
                    lines.push(format!("Function {} failed: unknown tool", call.name));
                }
                None => {}
            }
        }

        let preamble = decision
            .content
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| TOOL_PLACEHOLDER.to_string());
        let results = format!("{}{}", RESULTS_HEADER, lines.join("\n"));

        let prompt = {
            let mut conversation = self.conversation.write().await;
            conversation.push_assistant(preamble);
            conversation.push_user(results);
            conversation.to_prompt(&self.instructions)
        };

        let answer = self.ask(prompt, Vec::new()).await?;
        let reply = answer.content.unwrap_or_default();
        self.conversation.write().await.push_assistant(reply.clone());
        info!("Agent: {}", preview(&reply));
        Ok(reply)
    }

    async fn ask(&self, messages: Vec<ChatMessage>, tools: Vec<ToolDescriptor>) -> Result<InferenceResponse, ChatError> {
        let request = CompletionRequest {
            messages,
            tools,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        match tokio::time::timeout(self.settings.model_timeout, self.model.complete(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => {
                warn!("Model call failed: {:#}", e);
                Err(ChatError::Remote(format!("{:#}", e)))
            }
            Err(_) => {
                warn!("Model call timed out");
                Err(ChatError::Timeout(self.settings.model_timeout.as_secs()))
            }
        }
    }
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FnTool, ParamType, ToolArgs, ToolRegistry};
    use crate::types::{ChatRole, ToolCall};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    /// Replays canned responses and records every request.
    #[derive(Default)]
    struct ScriptedModel {
        script: StdMutex<VecDeque<anyhow::Result<InferenceResponse>>>,
        requests: StdMutex<Vec<CompletionRequest>>,
        delay: Option<Duration>,
    }

    impl ScriptedModel {
        fn new(script: Vec<anyhow::Result<InferenceResponse>>) -> Arc<Self> {
            Arc::new(Self {
                script: StdMutex::new(script.into()),
                ..Self::default()
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: CompletionRequest) -> anyhow::Result<InferenceResponse> {
            self.requests.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("script exhausted")))
        }
    }

    fn text(content: &str) -> anyhow::Result<InferenceResponse> {
        Ok(InferenceResponse {
            content: Some(content.to_string()),
            ..InferenceResponse::default()
        })
    }

    fn calls(content: Option<&str>, calls: &[(&str, &str)]) -> anyhow::Result<InferenceResponse> {
        Ok(InferenceResponse {
            content: content.map(str::to_string),
            tool_calls: calls.iter().map(|(n, a)| ToolCall::new(*n, *a)).collect(),
            ..InferenceResponse::default()
        })
    }

    struct Harness {
        agent: DialogueOrchestrator,
        model: Arc<ScriptedModel>,
        invoked: Arc<StdMutex<Vec<String>>>,
    }

    fn harness(script: Vec<anyhow::Result<InferenceResponse>>, policy: UnknownToolPolicy) -> Harness {
        let invoked = Arc::new(StdMutex::new(Vec::new()));
        let log = |name: &'static str| {
            let invoked = invoked.clone();
            move || invoked.lock().unwrap().push(name.to_string())
        };

        let balance_log = log("get_balance_in_apt");
        let send_log = log("send_email");
        let fail_log = log("transfer_in_octa");
        let registry = ToolRegistry::builder()
            .register(FnTool::new(
                ToolDescriptor::new("get_balance_in_apt", "Balance"),
                move |_args: ToolArgs| {
                    balance_log();
                    async { Ok::<_, anyhow::Error>("12.5 APT".to_string()) }
                },
            ))
            .register(FnTool::new(
                ToolDescriptor::new("send_email", "Email")
                    .param("recipient", ParamType::String, "To"),
                move |_args: ToolArgs| {
                    send_log();
                    async { Ok::<_, anyhow::Error>("Sent!".to_string()) }
                },
            ))
            .register(FnTool::new(
                ToolDescriptor::new("transfer_in_octa", "Transfer")
                    .param("amount", ParamType::Integer, "Octas"),
                move |_args: ToolArgs| {
                    fail_log();
                    async { Err::<String, _>(anyhow!("insufficient balance")) }
                },
            ))
            .build()
            .unwrap();

        let model = ScriptedModel::new(script);
        let settings = DialogueSettings {
            unknown_tool_policy: policy,
            ..DialogueSettings::default()
        };
        let agent = DialogueOrchestrator::new(
            AgentIdentity {
                name: "test".into(),
                wallet_address: Some("0xabc".into()),
            },
            "0xfeed",
            model.clone(),
            ToolExecutor::new(Arc::new(registry), Duration::from_secs(5)),
            settings,
        );
        Harness {
            agent,
            model,
            invoked,
        }
    }

    fn roles(history: &[ChatMessage]) -> Vec<ChatRole> {
        history.iter().map(|m| m.role).collect()
    }

    #[tokio::test]
    async fn plain_answers_add_two_turns_each() {
        let h = harness(vec![text("hello"), text("bye")], UnknownToolPolicy::Drop);

        assert_eq!(h.agent.chat("hi").await.unwrap(), "hello");
        assert_eq!(h.agent.chat("later").await.unwrap(), "bye");

        let history = h.agent.history().await;
        assert_eq!(
            roles(&history),
            vec![ChatRole::User, ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
        );
        assert_eq!(history[2].content, "later");
        assert_eq!(h.model.requests().len(), 2);
    }

    #[tokio::test]
    async fn first_call_gets_instructions_history_and_catalog() {
        let h = harness(vec![text("hello")], UnknownToolPolicy::Drop);
        h.agent.chat("hi").await.unwrap();

        let request = &h.model.requests()[0];
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert!(request.messages[0].content.contains("Your wallet address is 0xabc"));
        assert!(request.messages[0].content.contains("0xfeed"));
        assert_eq!(request.messages[1], ChatMessage::user("hi"));
        assert_eq!(request.tools.len(), 3);
        assert_eq!(request.temperature, 0.2);
    }

    #[tokio::test]
    async fn balance_question_round_trips_through_the_tool() {
        let h = harness(
            vec![
                calls(None, &[("get_balance_in_apt", "{}")]),
                text("Your balance is 12.5 APT."),
            ],
            UnknownToolPolicy::Drop,
        );

        let reply = h.agent.chat("what's my balance?").await.unwrap();
        assert!(reply.contains("12.5"));

        let requests = h.model.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].tools.is_empty());
        let results = &requests[1].messages.last().unwrap().content;
        assert_eq!(
            results,
            "Results from function calls:\nFunction get_balance_in_apt returned: 12.5 APT"
        );

        let history = h.agent.history().await;
        assert_eq!(history.len(), 4);
        assert_eq!(history[1], ChatMessage::assistant(TOOL_PLACEHOLDER));
        assert_eq!(history[2].role, ChatRole::User);
        assert_eq!(history[3], ChatMessage::assistant("Your balance is 12.5 APT."));
    }

    #[tokio::test]
    async fn tools_run_in_model_order_and_failures_do_not_abort() {
        let h = harness(
            vec![
                calls(
                    Some("Let me check."),
                    &[
                        ("transfer_in_octa", r#"{"amount": 5}"#),
                        ("send_email", r#"{"recipient": "a@b.c"}"#),
                        ("get_balance_in_apt", ""),
                    ],
                ),
                text("Done."),
            ],
            UnknownToolPolicy::Drop,
        );

        assert_eq!(h.agent.chat("do things").await.unwrap(), "Done.");
        assert_eq!(
            *h.invoked.lock().unwrap(),
            vec!["transfer_in_octa", "send_email", "get_balance_in_apt"]
        );

        let history = h.agent.history().await;
        assert_eq!(history[1], ChatMessage::assistant("Let me check."));
        let lines: Vec<&str> = history[2].content.lines().collect();
        assert_eq!(lines[0], "Results from function calls:");
        assert!(lines[1].starts_with("Function transfer_in_octa failed:"));
        assert!(lines[1].contains("insufficient balance"));
        assert_eq!(lines[2], "Function send_email returned: Sent!");
        assert_eq!(lines[3], "Function get_balance_in_apt returned: 12.5 APT");
    }

    #[tokio::test]
    async fn bad_arguments_become_a_failure_line() {
        let h = harness(
            vec![calls(None, &[("transfer_in_octa", "not json")]), text("Sorry.")],
            UnknownToolPolicy::Drop,
        );

        h.agent.chat("send").await.unwrap();
        assert!(h.invoked.lock().unwrap().is_empty());
        let history = h.agent.history().await;
        assert!(history[2].content.contains("Function transfer_in_octa failed: Invalid arguments"));
    }

    #[tokio::test]
    async fn unknown_tools_are_dropped_by_default() {
        let h = harness(
            vec![
                calls(None, &[("launch_rocket", "{}"), ("get_balance_in_apt", "{}")]),
                text("ok"),
            ],
            UnknownToolPolicy::Drop,
        );

        h.agent.chat("go").await.unwrap();
        let history = h.agent.history().await;
        assert!(!history[2].content.contains("launch_rocket"));
        assert!(history[2].content.contains("get_balance_in_apt returned"));
        assert_eq!(*h.invoked.lock().unwrap(), vec!["get_balance_in_apt"]);
    }

    #[tokio::test]
    async fn unknown_tools_can_be_reported() {
        let h = harness(
            vec![calls(None, &[("launch_rocket", "{}")]), text("ok")],
            UnknownToolPolicy::Report,
        );

        h.agent.chat("go").await.unwrap();
        let history = h.agent.history().await;
        assert_eq!(
            history[2].content,
            "Results from function calls:\nFunction launch_rocket failed: unknown tool"
        );
    }

    #[tokio::test]
    async fn first_model_failure_keeps_only_the_user_turn() {
        let h = harness(vec![Err(anyhow!("rate limited"))], UnknownToolPolicy::Drop);

        let err = h.agent.chat("hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Remote(ref m) if m.contains("rate limited")));
        assert_eq!(h.agent.history().await, vec![ChatMessage::user("hi")]);
    }

    #[tokio::test]
    async fn second_model_failure_keeps_committed_turns() {
        let h = harness(
            vec![calls(None, &[("get_balance_in_apt", "{}")]), Err(anyhow!("boom"))],
            UnknownToolPolicy::Drop,
        );

        assert!(h.agent.chat("balance").await.is_err());
        let history = h.agent.history().await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].role, ChatRole::User);
    }

    #[tokio::test]
    async fn empty_final_reply_is_recorded_as_empty() {
        let h = harness(
            vec![
                calls(None, &[("get_balance_in_apt", "{}")]),
                Ok(InferenceResponse::default()),
            ],
            UnknownToolPolicy::Drop,
        );

        assert_eq!(h.agent.chat("balance").await.unwrap(), "");
        assert_eq!(h.agent.history().await[3], ChatMessage::assistant(""));
    }

    #[tokio::test]
    async fn slow_model_times_out() {
        let model = Arc::new(ScriptedModel {
            script: StdMutex::new(VecDeque::from(vec![text("late")])),
            delay: Some(Duration::from_millis(200)),
            ..ScriptedModel::default()
        });
        let agent = DialogueOrchestrator::new(
            AgentIdentity {
                name: "test".into(),
                wallet_address: None,
            },
            "0xfeed",
            model,
            ToolExecutor::new(Arc::new(ToolRegistry::builder().build().unwrap()), Duration::from_secs(1)),
            DialogueSettings {
                model_timeout: Duration::from_millis(20),
                ..DialogueSettings::default()
            },
        );

        assert!(matches!(agent.chat("hi").await, Err(ChatError::Timeout(_))));
        assert!(agent.instructions().contains("Your wallet address is Not found"));
    }

    #[tokio::test]
    async fn clear_then_history_is_empty() {
        let h = harness(vec![text("hello")], UnknownToolPolicy::Drop);
        h.agent.chat("hi").await.unwrap();
        h.agent.clear_history().await;
        assert!(h.agent.history().await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_chats_do_not_interleave() {
        let h = harness(
            (0..8).map(|i| text(&format!("reply {i}"))).collect(),
            UnknownToolPolicy::Drop,
        );
        let agent = Arc::new(h.agent);

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let agent = agent.clone();
                tokio::spawn(async move { agent.chat(&format!("msg {i}")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let history = agent.history().await;
        assert_eq!(history.len(), 16);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, ChatRole::User);
            assert_eq!(pair[1].role, ChatRole::Assistant);
        }
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        assert_eq!(preview(&long).chars().count(), 200);
        assert_eq!(preview("short"), "short");
    }
}
