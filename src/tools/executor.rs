//! Tool execution boundary.
//!
//! Every fault a tool can produce (an `Err`, a panic, a timeout, arguments
//! that do not decode) is turned into [`ToolOutcome::Failure`] here and never
//! reaches the dialogue loop. Each request runs at most once; nothing is
//! retried.

use crate::tools::{ToolArgs, ToolRegistry};
use crate::types::{ToolCall, ToolOutcome, ToolResult};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Runs tool calls against a registry with a per-call time limit.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute one tool call.
    ///
    /// Returns `None` when the name is not registered: no handler runs and no
    /// result exists for the call.
    pub async fn execute(&self, call: &ToolCall) -> Option<ToolResult> {
        let Some(descriptor) = self.registry.descriptor(&call.name) else {
            warn!(tool = %call.name, "Model requested unknown tool");
            return None;
        };

        let start = Instant::now();
        let outcome = match ToolArgs::decode(descriptor, &call.raw_arguments) {
            Ok(args) => self.run(&call.name, args).await,
            Err(reason) => ToolOutcome::Failure(format!("Invalid arguments: {}", reason)),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match &outcome {
            ToolOutcome::Success(output) => info!(
                tool = %call.name,
                duration_ms,
                output_chars = output.len(),
                "Tool succeeded"
            ),
            ToolOutcome::Failure(reason) => warn!(
                tool = %call.name,
                duration_ms,
                reason = %reason,
                "Tool failed"
            ),
        }

        Some(ToolResult {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            outcome,
        })
    }

    async fn run(&self, name: &str, args: ToolArgs) -> ToolOutcome {
        let invocation = AssertUnwindSafe(self.registry.invoke(name, args)).catch_unwind();

        match tokio::time::timeout(self.timeout, invocation).await {
            Ok(Ok(Ok(output))) => ToolOutcome::Success(output),
            Ok(Ok(Err(e))) => ToolOutcome::Failure(format!("Error: {:#}", e)),
            Ok(Err(panic)) => ToolOutcome::Failure(format!("Tool panicked: {}", panic_message(&*panic))),
            Err(_) => ToolOutcome::Failure(format!(
                "Timed out after {}s",
                self.timeout.as_secs_f64()
            )),
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FnTool, ParamType, ToolDescriptor};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn executor(calls: Arc<AtomicUsize>) -> ToolExecutor {
        let counter = calls.clone();
        let registry = ToolRegistry::builder()
            .register(FnTool::new(
                ToolDescriptor::new("get_balance_in_apt", "Balance"),
                move |_args: ToolArgs| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, anyhow::Error>("12.5 APT".to_string()) }
                },
            ))
            .register(FnTool::new(
                ToolDescriptor::new("transfer_in_octa", "Transfer")
                    .param("amount", ParamType::Integer, "Octas"),
                |_args: ToolArgs| async { Err::<String, _>(anyhow::anyhow!("insufficient balance")) },
            ))
            .register(FnTool::new(
                ToolDescriptor::new("explode", "Panics"),
                |_args: ToolArgs| async {
                    if true {
                        panic!("boom");
                    }
                    Ok::<_, anyhow::Error>(String::new())
                },
            ))
            .register(FnTool::new(
                ToolDescriptor::new("stall", "Never finishes"),
                |_args: ToolArgs| async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok::<_, anyhow::Error>(String::new())
                },
            ))
            .build()
            .unwrap();
        ToolExecutor::new(Arc::new(registry), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn success_is_captured() {
        let calls = Arc::new(AtomicUsize::new(0));
        let exec = executor(calls.clone());
        let result = exec
            .execute(&ToolCall::new("get_balance_in_apt", "{}"))
            .await
            .unwrap();
        assert_eq!(result.outcome, ToolOutcome::Success("12.5 APT".into()));
        assert_eq!(result.tool_name, "get_balance_in_apt");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_tool_produces_no_result_and_no_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let exec = executor(calls.clone());
        assert!(exec.execute(&ToolCall::new("get_balance", "{}")).await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tool_error_becomes_failure() {
        let exec = executor(Arc::new(AtomicUsize::new(0)));
        let result = exec
            .execute(&ToolCall::new("transfer_in_octa", r#"{"amount": 5}"#))
            .await
            .unwrap();
        assert_eq!(
            result.outcome,
            ToolOutcome::Failure("Error: insufficient balance".into())
        );
    }

    #[tokio::test]
    async fn bad_arguments_become_failure_without_running_the_tool() {
        let exec = executor(Arc::new(AtomicUsize::new(0)));
        let result = exec
            .execute(&ToolCall::new("transfer_in_octa", r#"{"amount": "#))
            .await
            .unwrap();
        match result.outcome {
            ToolOutcome::Failure(reason) => assert!(reason.starts_with("Invalid arguments"), "{reason}"),
            other => panic!("expected failure, got {other:?}"),
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let exec = executor(calls.clone());
        let result = exec
            .execute(&ToolCall::new("get_balance_in_apt", r#"{"address": "0x1"}"#))
            .await
            .unwrap();
        assert!(!result.outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn panics_are_contained() {
        let exec = executor(Arc::new(AtomicUsize::new(0)));
        let result = exec.execute(&ToolCall::new("explode", "")).await.unwrap();
        assert_eq!(result.outcome, ToolOutcome::Failure("Tool panicked: boom".into()));
    }

    #[tokio::test]
    async fn slow_tools_time_out() {
        let exec = executor(Arc::new(AtomicUsize::new(0)));
        let result = exec.execute(&ToolCall::new("stall", "")).await.unwrap();
        match result.outcome {
            ToolOutcome::Failure(reason) => assert!(reason.starts_with("Timed out"), "{reason}"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
