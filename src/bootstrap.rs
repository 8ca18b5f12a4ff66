//! Wire config and secrets into a ready orchestrator.

use crate::agent::{AgentIdentity, DialogueOrchestrator, DialogueSettings};
use crate::config::{AgentConfig, Secrets};
use crate::identity::AptosAccount;
use crate::inference::OpenAiCompatClient;
use crate::tools::{default_registry, ToolContext, ToolExecutor};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the agent. Fails if the private key is malformed or the catalog is
/// inconsistent.
pub fn build_agent(config: &AgentConfig, secrets: &Secrets) -> Result<Arc<DialogueOrchestrator>> {
    let account = Arc::new(
        AptosAccount::from_hex(&secrets.aptos_private_key).context("APTOS_PRIVATE_KEY is not a valid key")?,
    );

    let ctx = ToolContext::new(config, account.clone(), secrets.twitter.clone())?;
    let registry = default_registry(Arc::new(ctx))?;
    let executor = ToolExecutor::new(Arc::new(registry), Duration::from_secs(config.tool_timeout_secs));

    let model = OpenAiCompatClient::new(
        &config.inference_api_url,
        &secrets.model_api_key,
        &config.model,
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let identity = AgentIdentity {
        name: config.name.clone(),
        wallet_address: Some(account.address().to_string()),
    };

    info!(
        "Agent '{}' ready (model: {}, wallet: {}, {} tools)",
        identity.name,
        config.model,
        account.address(),
        executor.registry().len()
    );

    Ok(Arc::new(DialogueOrchestrator::new(
        identity,
        &config.healthcare_module_address,
        Arc::new(model),
        executor,
        DialogueSettings::from_config(config),
    )))
}
