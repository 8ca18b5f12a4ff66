//! The agent's built-in tool catalog.
//!
//! Each group module exposes `tools(ctx)`; [`default_registry`] stitches the
//! groups together in the order the model is shown them.

mod demo;
mod healthcare;
mod social;
mod wallet;

use crate::chain::{AptosClient, FaucetClient, HealthcareContract, TransactionOptions};
use crate::config::AgentConfig;
use crate::error::RegistryError;
use crate::identity::AptosAccount;
use crate::social::{TwitterAuth, TwitterClient};
use crate::tools::{FnTool, Tool, ToolArgs, ToolDescriptor, ToolRegistry};
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Everything a built-in tool may touch.
#[derive(Debug)]
pub struct ToolContext {
    pub account: Arc<AptosAccount>,
    pub chain: AptosClient,
    pub faucet: FaucetClient,
    pub healthcare: HealthcareContract,
    /// Present only when Twitter credentials are configured.
    pub twitter: Option<TwitterClient>,
    /// Launchpad module; `create_token` is offered only when set.
    pub token_factory_module: Option<String>,
}

impl ToolContext {
    pub fn new(config: &AgentConfig, account: Arc<AptosAccount>, twitter: Option<TwitterAuth>) -> Result<Self> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let options = TransactionOptions {
            max_gas_amount: config.max_gas_amount,
            gas_unit_price: config.gas_unit_price,
            expiration_secs: config.tx_expiration_secs,
            wait_timeout: Duration::from_secs(config.transaction_wait_secs),
            ..TransactionOptions::default()
        };

        let chain = AptosClient::new(&config.aptos_node_url, request_timeout, options)?;
        let faucet = FaucetClient::new(&config.aptos_faucet_url, request_timeout)?;
        let healthcare = HealthcareContract::new(config.healthcare_module(), chain.clone(), account.clone());
        let twitter = twitter
            .map(|auth| TwitterClient::new(&config.twitter_api_url, auth, request_timeout))
            .transpose()?;

        Ok(Self {
            account,
            chain,
            faucet,
            healthcare,
            twitter,
            token_factory_module: config.token_factory_module.clone(),
        })
    }

    /// The caller's address override, or the agent's own.
    fn address_or_self<'a>(&'a self, address: Option<&'a str>) -> &'a str {
        address.filter(|a| !a.trim().is_empty()).unwrap_or_else(|| self.account.address())
    }
}

/// Bind an `async fn(ctx, args)` handler to the shared context.
fn with_ctx<F, Fut>(ctx: &Arc<ToolContext>, descriptor: ToolDescriptor, handler: F) -> Arc<dyn Tool>
where
    F: Fn(Arc<ToolContext>, ToolArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    let ctx = ctx.clone();
    Arc::new(FnTool::new(descriptor, move |args| handler(ctx.clone(), args)))
}

/// The full catalog, registered once in display order.
pub fn default_registry(ctx: Arc<ToolContext>) -> Result<ToolRegistry, RegistryError> {
    ToolRegistry::builder()
        .extend(demo::tools())
        .extend(social::tools(&ctx))
        .extend(wallet::tools(&ctx))
        .extend(healthcare::tools(&ctx))
        .build()
}
