//! Testnet faucet client.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct FaucetClient {
    base_url: String,
    http: reqwest::Client,
}

impl FaucetClient {
    pub fn new(faucet_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build faucet HTTP client")?;
        Ok(Self {
            base_url: faucet_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Mint `octas` to `address`. Returns the funding transaction hashes.
    pub async fn fund(&self, address: &str, octas: u64) -> Result<Vec<String>> {
        let url = format!("{}/mint", self.base_url);
        let resp = self
            .http
            .post(&url)
            .query(&[("amount", octas.to_string()), ("address", address.to_string())])
            .send()
            .await
            .context("Faucet request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Faucet mint failed ({}): {}", status, body);
        }

        let body: Value = resp.json().await.context("Failed to parse faucet response")?;
        let hashes = body
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|h| h.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        info!("Faucet minted {} octas to {}", octas, address);
        Ok(hashes)
    }
}
