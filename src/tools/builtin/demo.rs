//! Stand-in tools with canned behaviour.

use crate::tools::{FnTool, ParamType, Tool, ToolArgs, ToolDescriptor};
use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

pub(super) fn tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(FnTool::new(
            ToolDescriptor::new(
                "get_weather",
                "Get the current weather in a given location. Location MUST be a city.",
            )
            .param("location", ParamType::String, "The city to get the weather for")
            .optional("time", ParamType::String, "When to get the weather for, defaults to now"),
            |args: ToolArgs| async move { execute_get_weather(&args) },
        )),
        Arc::new(FnTool::new(
            ToolDescriptor::new("send_email", "Send an email.")
                .param("recipient", ParamType::String, "Email address of the recipient")
                .param("subject", ParamType::String, "Subject line")
                .param("body", ParamType::String, "Message body"),
            |args: ToolArgs| async move { execute_send_email(&args) },
        )),
    ]
}

fn execute_get_weather(args: &ToolArgs) -> Result<String> {
    let location = args.str("location")?;
    let time = args.opt_str("time").unwrap_or("now");
    Ok(json!({"location": location, "temperature": "65", "time": time}).to_string())
}

/// There is no mail transport; the message is written to the log.
fn execute_send_email(args: &ToolArgs) -> Result<String> {
    let recipient = args.str("recipient")?;
    let subject = args.str("subject")?;
    info!("Sending email to {}: {}", recipient, subject);
    debug!("Email body: {}", args.str("body")?);
    Ok("Sent!".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    fn args(value: Value) -> ToolArgs {
        match value {
            Value::Object(map) => ToolArgs::from_map(map),
            _ => ToolArgs::from_map(Map::new()),
        }
    }

    #[test]
    fn weather_defaults_time_to_now() {
        let out = execute_get_weather(&args(json!({"location": "Paris"}))).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!({"location": "Paris", "temperature": "65", "time": "now"}));
    }

    #[test]
    fn email_reports_sent() {
        let out = execute_send_email(&args(json!({
            "recipient": "a@b.c", "subject": "Hi", "body": "Hello"
        })))
        .unwrap();
        assert_eq!(out, "Sent!");
    }
}
