//! Aptos fullnode REST client: reads, view functions and entry-function
//! submission.

use crate::identity::AptosAccount;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Octas per APT.
pub const OCTAS_PER_APT: u64 = 100_000_000;

const APT_COIN_TYPE: &str = "0x1::aptos_coin::AptosCoin";

/// Gas and timing knobs applied to every submitted transaction.
#[derive(Debug, Clone)]
pub struct TransactionOptions {
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub expiration_secs: u64,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            max_gas_amount: 20_000,
            gas_unit_price: 100,
            expiration_secs: 600,
            wait_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// A typed Move argument for an entry function.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryArg {
    String(String),
    U8(u8),
    U64(u64),
    Address(String),
}

impl EntryArg {
    /// JSON encoding used by the REST API: small integers as numbers,
    /// `u64` as decimal strings.
    fn to_json(&self) -> Value {
        match self {
            Self::String(s) | Self::Address(s) => Value::String(s.clone()),
            Self::U8(n) => Value::from(*n),
            Self::U64(n) => Value::String(n.to_string()),
        }
    }
}

/// A call to `address::module::function`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFunctionCall {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<EntryArg>,
}

impl EntryFunctionCall {
    pub fn new(function: impl Into<String>, arguments: Vec<EntryArg>) -> Self {
        Self {
            function: function.into(),
            type_arguments: Vec::new(),
            arguments,
        }
    }

    fn payload(&self) -> Value {
        json!({
            "type": "entry_function_payload",
            "function": self.function,
            "type_arguments": self.type_arguments,
            "arguments": self.arguments.iter().map(EntryArg::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Outcome of a submitted and confirmed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryFunctionOutcome {
    pub transaction_hash: String,
    pub success: bool,
    pub vm_status: String,
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LedgerInfo {
    pub chain_id: u8,
    pub ledger_version: String,
    pub ledger_timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    pub sequence_number: String,
    pub authentication_key: String,
}

#[derive(Debug, Deserialize)]
struct PendingTransaction {
    hash: String,
}

#[derive(Debug, Serialize)]
struct ViewRequest<'a> {
    function: &'a str,
    type_arguments: &'a [String],
    arguments: Vec<Value>,
}

/// Aptos fullnode client.
#[derive(Debug, Clone)]
pub struct AptosClient {
    base_url: String,
    options: TransactionOptions,
    http: reqwest::Client,
}

impl AptosClient {
    /// Create a client for `node_url` (with or without the `/v1` suffix).
    pub fn new(node_url: &str, request_timeout: Duration, options: TransactionOptions) -> Result<Self> {
        let trimmed = node_url.trim_end_matches('/');
        let base_url = if trimmed.ends_with("/v1") {
            trimmed.to_string()
        } else {
            format!("{}/v1", trimmed)
        };
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build Aptos HTTP client")?;
        Ok(Self {
            base_url,
            options,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json(&self, path: &str, what: &str) -> Result<Value> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("Aptos {} request failed", what))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Aptos {} failed ({}): {}", what, status, body);
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse Aptos {} response", what))
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T, what: &str) -> Result<Value> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Aptos {} request failed", what))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Aptos {} failed ({}): {}", what, status, body);
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse Aptos {} response", what))
    }

    /// Chain id and latest ledger version.
    pub async fn ledger_info(&self) -> Result<LedgerInfo> {
        let value = self.get_json("", "ledger info").await?;
        serde_json::from_value(value).context("Unexpected ledger info shape")
    }

    pub async fn account(&self, address: &str) -> Result<AccountInfo> {
        let value = self
            .get_json(&format!("accounts/{}", address), "account")
            .await?;
        serde_json::from_value(value).context("Unexpected account shape")
    }

    /// Raw JSON of one resource stored under `address`.
    pub async fn account_resource(&self, address: &str, resource_type: &str) -> Result<Value> {
        self.get_json(
            &format!("accounts/{}/resource/{}", address, resource_type),
            "resource",
        )
        .await
    }

    /// Raw JSON of the transactions sent by `address`, newest page first.
    pub async fn account_transactions(&self, address: &str, limit: Option<u16>) -> Result<Value> {
        let path = match limit {
            Some(limit) => format!("accounts/{}/transactions?limit={}", address, limit),
            None => format!("accounts/{}/transactions", address),
        };
        self.get_json(&path, "transaction history").await
    }

    /// Call a Move view function.
    pub async fn view(&self, function: &str, type_arguments: &[String], arguments: Vec<Value>) -> Result<Value> {
        debug!("Aptos view: {}", function);
        self.post_json(
            "view",
            &ViewRequest {
                function,
                type_arguments,
                arguments,
            },
            "view",
        )
        .await
    }

    /// APT balance of `address` in octas.
    pub async fn apt_balance(&self, address: &str) -> Result<u64> {
        let value = self
            .view(
                "0x1::coin::balance",
                &[APT_COIN_TYPE.to_string()],
                vec![Value::String(address.to_string())],
            )
            .await?;

        let raw = value
            .get(0)
            .and_then(|v| v.as_str().map(str::to_string).or_else(|| v.as_u64().map(|n| n.to_string())))
            .with_context(|| format!("Unexpected balance response: {}", value))?;
        raw.parse::<u64>()
            .with_context(|| format!("Balance is not an integer: {}", raw))
    }

    /// Build, sign and submit an entry-function transaction. Returns the hash.
    pub async fn submit_entry_function(&self, account: &AptosAccount, call: &EntryFunctionCall) -> Result<String> {
        let sender = account.address();
        let sequence_number = self.account(sender).await?.sequence_number;
        let expiration = chrono::Utc::now().timestamp() as u64 + self.options.expiration_secs;

        let mut request = json!({
            "sender": sender,
            "sequence_number": sequence_number,
            "max_gas_amount": self.options.max_gas_amount.to_string(),
            "gas_unit_price": self.options.gas_unit_price.to_string(),
            "expiration_timestamp_secs": expiration.to_string(),
            "payload": call.payload(),
        });

        // The node returns the exact bytes to sign (domain prefix + BCS).
        let encoded = self
            .post_json("transactions/encode_submission", &request, "encode submission")
            .await?;
        let signing_message = encoded
            .as_str()
            .with_context(|| format!("Unexpected encode_submission response: {}", encoded))?;
        let signing_bytes = hex::decode(signing_message.trim_start_matches("0x"))
            .context("encode_submission returned invalid hex")?;

        let signature = account.sign(&signing_bytes);
        request["signature"] = json!({
            "type": "ed25519_signature",
            "public_key": account.public_key_hex(),
            "signature": format!("0x{}", hex::encode(signature)),
        });

        let submitted = self
            .post_json("transactions", &request, "submit transaction")
            .await?;
        let pending: PendingTransaction =
            serde_json::from_value(submitted).context("Unexpected submit response")?;

        info!("Submitted {} as {}", call.function, pending.hash);
        Ok(pending.hash)
    }

    /// Poll until the transaction leaves the mempool or the wait times out.
    pub async fn wait_for_transaction(&self, hash: &str) -> Result<Value> {
        let deadline = tokio::time::Instant::now() + self.options.wait_timeout;
        loop {
            let resp = self
                .http
                .get(self.url(&format!("transactions/by_hash/{}", hash)))
                .send()
                .await
                .context("Aptos transaction lookup failed")?;

            let status = resp.status();
            if status.is_success() {
                let body: Value = resp
                    .json()
                    .await
                    .context("Failed to parse transaction")?;
                if body["type"] != "pending_transaction" {
                    return Ok(body);
                }
            } else if status.as_u16() != 404 {
                let body = resp.text().await.unwrap_or_default();
                bail!("Aptos transaction lookup failed ({}): {}", status, body);
            }

            if tokio::time::Instant::now() >= deadline {
                bail!(
                    "Transaction {} not confirmed within {}s",
                    hash,
                    self.options.wait_timeout.as_secs()
                );
            }
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }

    /// Submit an entry function and wait for its result.
    pub async fn execute_entry_function(
        &self,
        account: &AptosAccount,
        call: &EntryFunctionCall,
    ) -> Result<EntryFunctionOutcome> {
        let hash = self.submit_entry_function(account, call).await?;
        let committed = self.wait_for_transaction(&hash).await?;

        Ok(EntryFunctionOutcome {
            transaction_hash: hash,
            success: committed["success"].as_bool().unwrap_or(false),
            vm_status: committed["vm_status"].as_str().unwrap_or_default().to_string(),
            version: committed["version"].as_str().map(str::to_string),
        })
    }
}

/// Render an octa amount as APT with trailing zeros trimmed.
pub fn format_apt(octas: u64) -> String {
    let whole = octas / OCTAS_PER_APT;
    let frac = octas % OCTAS_PER_APT;
    if frac == 0 {
        format!("{} APT", whole)
    } else {
        let frac = format!("{:08}", frac);
        format!("{}.{} APT", whole, frac.trim_end_matches('0'))
    }
}
