//! Configuration schema for agent.toml.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// What to do when the model names a tool that is not registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownToolPolicy {
    /// Skip the call; it leaves no trace in the results block.
    #[default]
    Drop,
    /// Add a failure line so the model learns the tool does not exist.
    Report,
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Human-readable agent name.
    pub name: String,

    /// Chat-completion model identifier.
    pub model: String,

    /// OpenAI-compatible inference API base URL.
    pub inference_api_url: String,

    /// Sampling temperature for both model rounds.
    pub temperature: f64,

    /// Maximum completion tokens per model call.
    pub max_tokens: u32,

    /// Timeout applied to every remote HTTP request.
    pub request_timeout_secs: u64,

    /// Upper bound on a single tool invocation.
    pub tool_timeout_secs: u64,

    /// Behaviour for tool names the model hallucinates.
    pub unknown_tool_policy: UnknownToolPolicy,

    /// Aptos fullnode REST endpoint (without the `/v1` suffix).
    pub aptos_node_url: String,

    /// Aptos faucet endpoint.
    pub aptos_faucet_url: String,

    /// Publisher address of the healthcare Move module.
    pub healthcare_module_address: String,

    /// Name of the healthcare Move module.
    pub healthcare_module_name: String,

    /// Fully-qualified `0x<address>::<module>` used for fungible token
    /// creation. Unset means `create_token` is not offered.
    pub token_factory_module: Option<String>,

    /// Gas limit for submitted transactions.
    pub max_gas_amount: u64,

    /// Gas price in octas.
    pub gas_unit_price: u64,

    /// Seconds until a submitted transaction expires.
    pub tx_expiration_secs: u64,

    /// How long to poll for transaction confirmation.
    pub transaction_wait_secs: u64,

    /// Twitter API base URL.
    pub twitter_api_url: String,

    /// Address the HTTP facade listens on.
    pub bind: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "Aptos Healthcare Agent".into(),
            model: "llama3-8b-8192".into(),
            inference_api_url: "https://api.groq.com/openai".into(),
            temperature: 0.2,
            max_tokens: 1024,
            request_timeout_secs: 30,
            tool_timeout_secs: 60,
            unknown_tool_policy: UnknownToolPolicy::Drop,
            aptos_node_url: "https://fullnode.testnet.aptoslabs.com".into(),
            aptos_faucet_url: "https://faucet.testnet.aptoslabs.com".into(),
            healthcare_module_address:
                "0x8e46115deae69c3ffc41c50f29c94501935467de0212a666d2f0f0b83f1574ac".into(),
            healthcare_module_name: "healthcare".into(),
            token_factory_module: None,
            max_gas_amount: 20_000,
            gas_unit_price: 100,
            tx_expiration_secs: 600,
            transaction_wait_secs: 30,
            twitter_api_url: "https://api.twitter.com".into(),
            bind: "127.0.0.1:8000".into(),
        }
    }
}

impl AgentConfig {
    /// Fully-qualified `address::module` of the healthcare contract.
    pub fn healthcare_module(&self) -> String {
        format!(
            "{}::{}",
            self.healthcare_module_address, self.healthcare_module_name
        )
    }

    /// Reject settings that would only fail later at request time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.request_timeout_secs == 0 || self.tool_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be non-zero".into()));
        }
        if !is_account_address(&self.healthcare_module_address) {
            return Err(ConfigError::Invalid(format!(
                "healthcare_module_address is not an account address: {}",
                self.healthcare_module_address
            )));
        }
        if self.healthcare_module_name.is_empty() {
            return Err(ConfigError::Invalid("healthcare_module_name is empty".into()));
        }
        if let Some(factory) = &self.token_factory_module {
            match factory.split_once("::") {
                Some((addr, module)) if is_account_address(addr) && !module.is_empty() => {}
                _ => {
                    return Err(ConfigError::Invalid(format!(
                        "token_factory_module must look like 0x<address>::<module>, got {}",
                        factory
                    )))
                }
            }
        }
        Ok(())
    }
}

/// `0x` followed by 1..=64 hex digits.
pub fn is_account_address(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.len() <= 64 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
