use crate::dto::{ApiResponse, ResponseData, RESPONSE_BAD_REQUEST, RESPONSE_INTERNAL_ERROR};
use crate::pool::CivicConfig;
use crate::signature::verify_wallet_signature;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jwt::token::verified::VerifyWithKey;
use jwt::SignWithKey;
use rocket::State;
use sha2::Sha256;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[get("/auth/login?<wallet_address>&<message>&<signature>")]
pub async fn login(
    config: &State<CivicConfig>,
    wallet_address: String,
    message: String,
    signature: String,
) -> ApiResponse<String> {
    match verify_wallet_signature(&wallet_address, &message, &signature) {
        Ok(true) => {
            match generate_jwt_token(
                &wallet_address,
                &message,
                &signature,
                &config.jwt_key,
                Utc::now(),
            ) {
                Ok(jwt_token) => ResponseData::ok(jwt_token),
                Err(error) => ResponseData::error(RESPONSE_INTERNAL_ERROR, error),
            }
        }
        Ok(false) => ResponseData::error(
            RESPONSE_BAD_REQUEST,
            "Signature verification failed".to_owned(),
        ),
        Err(error) => ResponseData::error(RESPONSE_BAD_REQUEST, error),
    }
}

#[get("/auth/verify?<wallet_address>&<jwt_token>")]
pub async fn verify(
    config: &State<CivicConfig>,
    wallet_address: String,
    jwt_token: String,
) -> ApiResponse<String> {
    let status = if verify_jwt_token(&config.jwt_key, &wallet_address, &jwt_token, Utc::now()) {
        "successful"
    } else {
        "failed"
    };
    ResponseData::ok(status.to_owned())
}

fn signing_key(jwt_key: &str) -> Result<Hmac<Sha256>, String> {
    Hmac::new_from_slice(jwt_key.as_bytes()).map_err(|error| {
        warn!("Invalid key: {}", error);
        "Invalid key".to_string()
    })
}

pub fn generate_jwt_token(
    wallet_address: &str,
    message: &str,
    signature: &str,
    jwt_key: &str,
    now: DateTime<Utc>,
) -> Result<String, String> {
    let key = signing_key(jwt_key)?;
    let expiry = (now + Duration::days(1)).to_rfc3339();

    let mut claims: BTreeMap<&str, &str> = BTreeMap::new();
    claims.insert("pubkey", wallet_address);
    claims.insert("message", message);
    claims.insert("signature", signature);
    claims.insert("expiry", &expiry);

    claims.sign_with_key(&key).map_err(|error| error.to_string())
}

pub fn verify_jwt_token(
    jwt_key: &str,
    wallet_address: &str,
    jwt_token: &str,
    now: DateTime<Utc>,
) -> bool {
    let key = match signing_key(jwt_key) {
        Ok(key) => key,
        Err(_) => return false,
    };
    let claims: BTreeMap<String, String> = match jwt_token.verify_with_key(&key) {
        Ok(claims) => claims,
        Err(error) => {
            info!("JWT verification error: {}", error);
            return false;
        }
    };
    if claims.get("pubkey").map(String::as_str) != Some(wallet_address) {
        info!("Wrong pubkey in JWT token");
        return false;
    }

    let expiry = match claims
        .get("expiry")
        .map(String::as_str)
        .map(DateTime::parse_from_rfc3339)
    {
        Some(Ok(expiry)) => expiry.with_timezone(&Utc),
        Some(Err(error)) => {
            warn!("Bad expiry string: {}", error);
            return false;
        }
        None => {
            warn!("JWT token without expiry");
            return false;
        }
    };
    if now <= expiry {
        true
    } else {
        info!("JWT token is expired");
        false
    }
}

#[cfg(test)]
#[path = "web3_auth_tests.rs"]
mod web3_auth_tests;
