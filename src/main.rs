//! Aptos Healthcare Agent.
//!
//! Usage:
//!   aptos-health-agent serve      Start the HTTP API
//!   aptos-health-agent chat       Talk to the agent in the terminal
//!   aptos-health-agent tools      Print the tool catalog
//!   aptos-health-agent address    Show the wallet address
//!   aptos-health-agent keygen     Generate a fresh Ed25519 key

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use aptos_health_agent::agent::DialogueOrchestrator;
use aptos_health_agent::bootstrap::build_agent;
use aptos_health_agent::config::{self, AgentConfig, Secrets};
use aptos_health_agent::identity::AptosAccount;
use aptos_health_agent::server;
use aptos_health_agent::types::ChatRole;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "aptos-health-agent")]
#[command(version)]
#[command(about = "LLM agent for Aptos wallet and healthcare contract operations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to agent.toml (defaults to ~/.aptos-agent/agent.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API.
    Serve {
        /// Address to listen on, overrides `bind` from the config.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Interactive chat on the terminal.
    Chat,

    /// Print the tool catalog as JSON.
    Tools,

    /// Print the wallet address derived from APTOS_PRIVATE_KEY.
    Address,

    /// Generate a new private key.
    Keygen,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let config_path = cli.config.unwrap_or_else(config::default_config_path);

    match cli.command {
        Commands::Serve { bind } => cmd_serve(&config_path, bind).await,
        Commands::Chat => cmd_chat(&config_path).await,
        Commands::Tools => cmd_tools(&config_path),
        Commands::Address => cmd_address(),
        Commands::Keygen => cmd_keygen(),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_serve(config_path: &Path, bind: Option<String>) -> Result<()> {
    let (config, agent) = bootstrap(config_path)?;
    let bind = bind.unwrap_or_else(|| config.bind.clone());

    println!(
        "{} Starting {} API on http://{}",
        ">>>".green().bold(),
        config.name,
        bind
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                println!("\n{} Shutting down gracefully...", "<<<".red().bold());
                signal_cancel.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    server::serve(agent, &bind, cancel).await?;

    info!("Shutdown complete");
    Ok(())
}

async fn cmd_chat(config_path: &Path) -> Result<()> {
    let (config, agent) = bootstrap(config_path)?;

    println!();
    println!("{}", format!("=== {} ===", config.name).bold());
    println!(
        "  Wallet: {}",
        agent.identity().wallet_address.as_deref().unwrap_or("Not found")
    );
    println!("  Commands: /history, /clear, /quit");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt()?;
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };
        let message = line.trim();
        match message {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                agent.clear_history().await;
                println!("{}", "History cleared.".dimmed());
            }
            "/history" => print_history(&agent).await,
            _ => match agent.chat(message).await {
                Ok(reply) => println!("{} {}\n", "agent>".green().bold(), reply),
                Err(e) => println!("{} {}\n", "error>".red().bold(), e),
            },
        }
    }

    Ok(())
}

fn cmd_tools(config_path: &Path) -> Result<()> {
    let (_, agent) = bootstrap(config_path)?;
    let catalog: Vec<serde_json::Value> = agent
        .catalog()
        .iter()
        .map(|t| {
            serde_json::json!({
                "name": t.name,
                "description": t.description,
                "parameters": t.parameters_schema(),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

fn cmd_address() -> Result<()> {
    let secrets = Secrets::from_env()?;
    let account = AptosAccount::from_hex(&secrets.aptos_private_key)?;
    println!("{}", account.address());
    Ok(())
}

fn cmd_keygen() -> Result<()> {
    let account = AptosAccount::generate();
    println!("{}", "New Ed25519 account".bold());
    println!("  Address:     {}", account.address());
    println!("  Public key:  {}", account.public_key_hex());
    println!("  Private key: {}", account.private_key_hex());
    println!();
    println!("{}", "Store the private key in APTOS_PRIVATE_KEY; it is not saved anywhere.".yellow());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load config and secrets and build the agent.
fn bootstrap(config_path: &Path) -> Result<(AgentConfig, Arc<DialogueOrchestrator>)> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    let secrets = Secrets::from_env()?;
    let agent = build_agent(&cfg, &secrets)?;
    Ok((cfg, agent))
}

fn print_prompt() -> Result<()> {
    use std::io::Write;
    print!("{} ", "you>".cyan().bold());
    std::io::stdout().flush().context("Failed to flush stdout")
}

async fn print_history(agent: &DialogueOrchestrator) {
    let history = agent.history().await;
    if history.is_empty() {
        println!("{}", "(empty)".dimmed());
        return;
    }
    for turn in history {
        let role = match turn.role {
            ChatRole::User => "user".cyan(),
            ChatRole::Assistant => "assistant".green(),
            ChatRole::System => "system".dimmed(),
        };
        println!("[{}] {}", role, turn.content);
    }
    println!();
}
