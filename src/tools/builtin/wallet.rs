//! Tools that read from or sign with the agent's Aptos account.

use super::{with_ctx, ToolContext};
use crate::chain::{format_apt, EntryArg, EntryFunctionCall, OCTAS_PER_APT};
use crate::identity::normalize_address;
use crate::tools::{ParamType, Tool, ToolArgs, ToolDescriptor};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::info;

const TRANSFER_FUNCTION: &str = "0x1::aptos_account::transfer";

pub(super) fn tools(ctx: &Arc<ToolContext>) -> Vec<Arc<dyn Tool>> {
    let mut tools = vec![
        with_ctx(
            ctx,
            ToolDescriptor::new("fund_wallet_in_apt", "Fund the agent's wallet with APT from the testnet faucet.")
                .param("amount", ParamType::Integer, "Whole APT to mint"),
            execute_fund_wallet,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("get_balance_in_apt", "Get the APT balance of the agent's wallet."),
            execute_get_balance,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("transfer_in_octa", "Transfer octas (1 APT = 100000000 octas) to another account.")
                .param("sender", ParamType::String, "Sending address, must be the agent's own")
                .param("receiver", ParamType::String, "Receiving address")
                .param("amount", ParamType::Integer, "Amount in octas"),
            execute_transfer,
        ),
    ];

    if ctx.token_factory_module.is_some() {
        tools.push(with_ctx(
            ctx,
            ToolDescriptor::new("create_token", "Create a new fungible token through the launchpad.")
                .param("sender", ParamType::String, "Creating address, must be the agent's own")
                .param("name", ParamType::String, "Token name")
                .param("symbol", ParamType::String, "Token symbol")
                .param("icon_uri", ParamType::String, "URI of the token icon")
                .param("project_uri", ParamType::String, "URI of the project site"),
            execute_create_token,
        ));
    } else {
        info!("token_factory_module is not set; create_token is disabled");
    }

    tools.extend([
        with_ctx(
            ctx,
            ToolDescriptor::new("get_transaction_history", "Get the transactions sent by an account.")
                .optional("address_to_check", ParamType::String, "Account to inspect, defaults to the agent"),
            execute_transaction_history,
        ),
        with_ctx(
            ctx,
            ToolDescriptor::new("get_on_chain_data", "Read one resource stored under an account.")
                .param("resource_type", ParamType::String, "Fully-qualified resource type, e.g. 0x1::account::Account")
                .optional("address_to_check", ParamType::String, "Account to inspect, defaults to the agent"),
            execute_on_chain_data,
        ),
    ]);
    tools
}

/// The agent can only sign for itself; any other `sender` is refused.
fn require_own_sender(ctx: &ToolContext, args: &ToolArgs) -> Result<()> {
    let sender = normalize_address(args.str("sender")?)?;
    if sender != ctx.account.address() {
        bail!(
            "Can only act from the agent's own account {}, not {}",
            ctx.account.address(),
            sender
        );
    }
    Ok(())
}

fn positive(args: &ToolArgs, name: &str) -> Result<u64> {
    let value = args.int(name)?;
    match u64::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => bail!("'{}' must be a positive integer, got {}", name, value),
    }
}

async fn execute_fund_wallet(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let apt = positive(&args, "amount")?;
    let octas = apt
        .checked_mul(OCTAS_PER_APT)
        .context("Amount is too large")?;
    let address = ctx.account.address();
    let hashes = ctx.faucet.fund(address, octas).await?;
    Ok(format!(
        "Funded {} with {}; transactions: {}",
        address,
        format_apt(octas),
        hashes.join(", ")
    ))
}

async fn execute_get_balance(ctx: Arc<ToolContext>, _args: ToolArgs) -> Result<String> {
    let octas = ctx.chain.apt_balance(ctx.account.address()).await?;
    Ok(format_apt(octas))
}

async fn execute_transfer(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    require_own_sender(&ctx, &args)?;
    let receiver = normalize_address(args.str("receiver")?)?;
    let amount = positive(&args, "amount")?;

    let call = EntryFunctionCall::new(
        TRANSFER_FUNCTION,
        vec![EntryArg::Address(receiver), EntryArg::U64(amount)],
    );
    let outcome = ctx.chain.execute_entry_function(&ctx.account, &call).await?;
    Ok(serde_json::to_string(&outcome)?)
}

async fn execute_create_token(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let factory = ctx
        .token_factory_module
        .as_deref()
        .context("token_factory_module is not configured")?;
    require_own_sender(&ctx, &args)?;
    let call = EntryFunctionCall::new(
        format!("{}::create_token", factory),
        vec![
            EntryArg::String(args.str("name")?.to_string()),
            EntryArg::String(args.str("symbol")?.to_string()),
            EntryArg::String(args.str("icon_uri")?.to_string()),
            EntryArg::String(args.str("project_uri")?.to_string()),
        ],
    );
    let outcome = ctx.chain.execute_entry_function(&ctx.account, &call).await?;
    Ok(serde_json::to_string(&outcome)?)
}

async fn execute_transaction_history(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let address = ctx.address_or_self(args.opt_str("address_to_check"));
    let history = ctx.chain.account_transactions(address, None).await?;
    Ok(history.to_string())
}

async fn execute_on_chain_data(ctx: Arc<ToolContext>, args: ToolArgs) -> Result<String> {
    let resource_type = args.str("resource_type")?;
    let address = ctx.address_or_self(args.opt_str("address_to_check"));
    let resource = ctx.chain.account_resource(address, resource_type).await?;
    Ok(resource.to_string())
}
