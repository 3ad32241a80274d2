use crate::dto::Network;
use crate::error::CivicError;
use crate::pool::CivicConfig;
use base64::{engine::general_purpose, Engine as _};
use tracing::{debug, warn};

const SIGNATURE_LENGTH: usize = 64;

/// Wallet clients send base64; base58 is what Solana tooling prints.
pub fn decode_signature(signature: &str) -> Result<Vec<u8>, String> {
    if let Ok(bytes) = general_purpose::STANDARD.decode(signature) {
        if bytes.len() == SIGNATURE_LENGTH {
            return Ok(bytes);
        }
    }
    match bs58::decode(signature).into_vec() {
        Ok(bytes) if bytes.len() == SIGNATURE_LENGTH => Ok(bytes),
        Ok(_) => Err("Not valid signature".to_string()),
        Err(error) => {
            warn!("signature decode error: {}", error);
            Err("Signature decoding failed".to_string())
        }
    }
}

pub fn verify_wallet_signature(
    wallet_address: &str,
    message: &str,
    signature: &str,
) -> Result<bool, String> {
    let key_decoded = match bs58::decode(wallet_address).into_vec() {
        Ok(pkey) => pkey,
        Err(error) => {
            warn!("wallet_address decode error: {}", error);
            return Err("Key decoding failed".to_string());
        }
    };
    let pubkey = match ed25519_dalek::PublicKey::from_bytes(&key_decoded) {
        Ok(pubkey) => pubkey,
        Err(error) => {
            warn!("Invalid pubkey: {}", error);
            return Err("Not valid user wallet key".to_string());
        }
    };

    let signature = decode_signature(signature)?;
    let signature = match ed25519_dalek::Signature::try_from(signature.as_slice()) {
        Ok(signature) => signature,
        Err(error) => {
            warn!("Bad signature: {}", error);
            return Err("Not valid signature".to_string());
        }
    };

    Ok(pubkey.verify_strict(message.as_bytes(), &signature).is_ok())
}

/// Presence is checked by the caller. Cryptographic verification runs only when enabled,
/// on solana, and when the signed text came with the request.
pub fn check_request_signature(
    config: &CivicConfig,
    network: Network,
    wallet_address: &str,
    message: Option<&str>,
    signature: &str,
) -> Result<(), CivicError> {
    if !config.verify_signatures || network != Network::Solana {
        return Ok(());
    }
    let message = match message {
        Some(message) if !message.trim().is_empty() => message,
        _ => {
            debug!("No signed message supplied by {}, skipping verification", wallet_address);
            return Ok(());
        }
    };
    match verify_wallet_signature(wallet_address, message, signature) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CivicError::InvalidSignature(
            "signature does not match wallet".to_owned(),
        )),
        Err(error) => Err(CivicError::InvalidSignature(error)),
    }
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod signature_tests;
