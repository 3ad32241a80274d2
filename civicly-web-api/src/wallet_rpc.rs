use crate::dto::{Network, WalletBalance};
use crate::error::CivicError;
use crate::pool::CivicConfig;
use rocket::serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

const SOLANA_DECIMALS: u8 = 9;
const ETHEREUM_DECIMALS: u8 = 18;

#[derive(Debug, Serialize)]
#[serde(crate = "rocket::serde")]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(crate = "rocket::serde")]
struct SolanaBalance {
    value: u64,
}

impl<T> RpcResponse<T> {
    fn into_result(self) -> Result<T, CivicError> {
        match (self.result, self.error) {
            (Some(result), _) => Ok(result),
            (None, Some(error)) => Err(CivicError::Rpc(format!(
                "{} (code {})",
                error.message, error.code
            ))),
            (None, None) => Err(CivicError::Rpc("empty response".to_owned())),
        }
    }
}

/// `0x`-prefixed quantity as returned by `eth_getBalance`.
pub fn parse_hex_quantity(quantity: &str) -> Result<u128, CivicError> {
    let digits = quantity
        .strip_prefix("0x")
        .ok_or_else(|| CivicError::Rpc(format!("not a hex quantity: {}", quantity)))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16)
        .map_err(|error| CivicError::Rpc(format!("bad hex quantity {}: {}", quantity, error)))
}

fn endpoint(config: &CivicConfig, network: Network) -> Option<&str> {
    let url = match network {
        Network::Solana => config.solana_rpc_url.as_deref(),
        Network::Ethereum => config.ethereum_rpc_url.as_deref(),
    };
    url.map(str::trim).filter(|url| !url.is_empty())
}

async fn call<T: for<'de> Deserialize<'de>>(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Value,
) -> Result<T, CivicError> {
    let request = RpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method,
        params,
    };
    let response = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await
        .map_err(|error| CivicError::Rpc(error.to_string()))?;
    if !response.status().is_success() {
        return Err(CivicError::Rpc(format!(
            "{} returned {}",
            method,
            response.status()
        )));
    }
    response
        .json::<RpcResponse<T>>()
        .await
        .map_err(|error| CivicError::Rpc(error.to_string()))?
        .into_result()
}

/// Native balance of `wallet_address` in the network's smallest unit.
pub async fn fetch_balance(
    client: &reqwest::Client,
    config: &CivicConfig,
    network: Network,
    wallet_address: &str,
) -> Result<WalletBalance, CivicError> {
    let url = endpoint(config, network).ok_or_else(|| {
        CivicError::Rpc(format!("No RPC endpoint configured for {}", network))
    })?;
    debug!("Fetching {} balance for {}", network, wallet_address);

    let balance = match network {
        Network::Solana => {
            let balance: SolanaBalance =
                call(client, url, "getBalance", json!([wallet_address])).await?;
            WalletBalance {
                amount: balance.value.to_string(),
                unit: "lamports".to_owned(),
                decimals: SOLANA_DECIMALS,
            }
        }
        Network::Ethereum => {
            let quantity: String = call(
                client,
                url,
                "eth_getBalance",
                json!([wallet_address, "latest"]),
            )
            .await?;
            WalletBalance {
                amount: parse_hex_quantity(&quantity)?.to_string(),
                unit: "wei".to_owned(),
                decimals: ETHEREUM_DECIMALS,
            }
        }
    };
    Ok(balance)
}

/// Like [`fetch_balance`], but a failure becomes a user-facing note instead of an error.
pub async fn balance_or_note(
    client: &reqwest::Client,
    config: &CivicConfig,
    network: Network,
    wallet_address: &str,
) -> (Option<WalletBalance>, String) {
    match fetch_balance(client, config, network, wallet_address).await {
        Ok(balance) => (Some(balance), "".to_owned()),
        Err(error) => {
            warn!("Balance lookup failed for {}: {}", wallet_address, error);
            (None, format!("Balance unavailable: {}", error))
        }
    }
}

#[cfg(test)]
#[path = "wallet_rpc_tests.rs"]
mod wallet_rpc_tests;
