use super::*;
use crate::pool::test_config;

#[test]
fn hex_quantity_parses_wei() {
    assert_eq!(parse_hex_quantity("0x0").unwrap(), 0);
    assert_eq!(parse_hex_quantity("0x").unwrap(), 0);
    assert_eq!(
        parse_hex_quantity("0xde0b6b3a7640000").unwrap(),
        1_000_000_000_000_000_000
    );
}

#[test]
fn hex_quantity_needs_prefix() {
    assert!(parse_hex_quantity("1234").is_err());
    assert!(parse_hex_quantity("0xzz").is_err());
}

#[test]
fn solana_response_reads_value() {
    let body = r#"{"jsonrpc":"2.0","result":{"context":{"slot":1},"value":2500000000},"id":1}"#;
    let response: RpcResponse<SolanaBalance> = serde_json::from_str(body).unwrap();
    assert_eq!(response.into_result().unwrap().value, 2_500_000_000);
}

#[test]
fn rpc_error_body_is_reported() {
    let body = r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid param"},"id":1}"#;
    let response: RpcResponse<String> = serde_json::from_str(body).unwrap();
    match response.into_result() {
        Err(CivicError::Rpc(message)) => assert_eq!(message, "Invalid param (code -32602)"),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn missing_endpoint_gives_note() {
    let client = reqwest::Client::new();
    let config = test_config();
    let (balance, note) = balance_or_note(&client, &config, Network::Ethereum, "0xabc").await;
    assert!(balance.is_none());
    assert_eq!(
        note,
        "Balance unavailable: Wallet RPC error: No RPC endpoint configured for ethereum"
    );
}

#[test]
fn blank_endpoint_is_ignored() {
    let mut config = test_config();
    config.solana_rpc_url = Some("  ".to_owned());
    assert!(endpoint(&config, Network::Solana).is_none());
    config.solana_rpc_url = Some("https://api.devnet.solana.com".to_owned());
    assert_eq!(
        endpoint(&config, Network::Solana),
        Some("https://api.devnet.solana.com")
    );
}
