use crate::error::CivicError;
use civicly_db_entity::db::message::Model as MessageModel;
use civicly_db_entity::db::stake::Model as StakeModel;
use civicly_db_entity::db::user::Model as UserModel;
use rocket::http::Status;
use rocket::serde::{json::Json, Deserialize, Serialize};
use sea_orm::{DbErr, QueryResult};
use std::str::FromStr;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ResponseData<T> {
    pub code: Option<u16>,
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    pub message: String,
    pub data: Option<T>,
}

pub type ApiResponse<T> = (Status, Json<ResponseData<T>>);

impl<T> ResponseData<T> {
    pub fn new(code: u16, message: String, data: Option<T>) -> ResponseData<T> {
        ResponseData {
            code: Some(code),
            status_code: None,
            message,
            data,
        }
    }

    pub fn ok(data: T) -> ApiResponse<T> {
        Self::respond(RESPONSE_OK, String::new(), Some(data))
    }

    pub fn error(code: u16, message: String) -> ApiResponse<T> {
        Self::respond(code, message, None)
    }

    pub fn respond(code: u16, message: String, data: Option<T>) -> ApiResponse<T> {
        let status = Status::from_code(code).unwrap_or(Status::InternalServerError);
        (status, Json(ResponseData::new(code, message, data)))
    }
}

pub const RESPONSE_OK: u16 = 200;
pub const RESPONSE_BAD_REQUEST: u16 = 400;
pub const RESPONSE_NOT_FOUND: u16 = 404;
pub const RESPONSE_INTERNAL_ERROR: u16 = 500;
pub const RESPONSE_MAINTENANCE: u16 = 503;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Display, EnumString)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    Solana,
    Ethereum,
}

impl Default for Network {
    fn default() -> Self {
        Network::Solana
    }
}

impl Network {
    /// Missing or blank falls back to solana, like every client does.
    pub fn parse(network: Option<&str>) -> Result<Network, CivicError> {
        match network.map(str::trim) {
            None | Some("") => Ok(Network::default()),
            Some(value) => Network::from_str(&value.to_lowercase())
                .map_err(|_| CivicError::BadRequest(format!("Unsupported network: {}", value))),
        }
    }
}

/// Returns the trimmed value, or a 400 naming every missing field.
pub fn required<'a>(fields: &[(&str, Option<&'a str>)]) -> Result<Vec<&'a str>, CivicError> {
    let mut values = Vec::with_capacity(fields.len());
    let mut missing = vec![];
    for (name, value) in fields {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => values.push(v),
            _ => missing.push(*name),
        }
    }
    if missing.is_empty() {
        Ok(values)
    } else {
        Err(CivicError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub wallet_address: Option<String>,
    pub email: Option<String>,
    pub network: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub wallet_address: Option<String>,
    pub signature: Option<String>,
    pub message: Option<String>,
    pub network: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub wallet_address: Option<String>,
    pub content: Option<String>,
    pub signature: Option<String>,
    /// Signed text, checked when signature verification is on
    pub message: Option<String>,
    pub network: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct StakeRequest {
    pub wallet_address: Option<String>,
    pub amount: Option<i64>,
    pub duration: Option<i64>,
    pub signature: Option<String>,
    pub message: Option<String>,
    pub network: Option<String>,
}

impl StakeRequest {
    /// Both must be present and non-zero; range checks happen in the service.
    pub fn amount_and_duration(&self) -> Result<(i64, i64), CivicError> {
        match (self.amount, self.duration) {
            (Some(amount), Some(duration)) if amount != 0 && duration != 0 => {
                Ok((amount, duration))
            }
            _ => Err(CivicError::BadRequest(
                "Wallet address, amount, duration, and signature are required".to_owned(),
            )),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct UnstakeRequest {
    pub wallet_address: Option<String>,
    pub stake_id: Option<String>,
    pub signature: Option<String>,
    pub message: Option<String>,
    pub network: Option<String>,
}

#[derive(Debug, FromForm)]
pub struct WalletQuery {
    #[field(name = "walletAddress")]
    pub wallet_address: Option<String>,
    pub network: Option<String>,
}

#[derive(Debug, FromForm)]
pub struct LeaderboardQuery {
    pub network: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, FromForm)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Validated `(page, limit)` for list endpoints.
pub fn page_and_limit(
    page: Option<i64>,
    limit: Option<i64>,
    default_limit: i64,
    max_limit: i64,
) -> Result<(i64, i64), CivicError> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(default_limit);
    if page < 1 {
        return Err(CivicError::BadRequest("'page' starts at 1".to_owned()));
    }
    if limit < 1 || limit > max_limit {
        return Err(CivicError::BadRequest(format!(
            "'limit' should be between 1 and {}",
            max_limit
        )));
    }
    page_offset(page, limit)?;
    Ok((page, limit))
}

/// Rows to skip before `page`; pages whose offset does not fit an `i64` are rejected.
pub fn page_offset(page: i64, limit: i64) -> Result<i64, CivicError> {
    page.checked_sub(1)
        .filter(|skipped| *skipped >= 0)
        .and_then(|skipped| skipped.checked_mul(limit))
        .ok_or_else(|| CivicError::BadRequest("'page' is out of range".to_owned()))
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct UserWithRank {
    #[serde(flatten)]
    pub user: UserModel,
    pub leaderboard_rank: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UserResponse<U> {
    pub user: U,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub user: UserWithRank,
    pub points_earned: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HistoryDay {
    pub date: String,
    pub checked: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HistoryResponse {
    pub history: Vec<HistoryDay>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StakeResponse {
    pub stake: StakeModel,
    pub user: UserWithRank,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct UnstakeResponse {
    pub user: UserWithRank,
    pub unstaked: i64,
    pub reward: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StakesResponse {
    pub stakes: Vec<StakeModel>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub wallet_address: String,
    pub network: String,
    pub points: i64,
    pub streak: i32,
    pub rank: i64,
    pub wallet_short: String,
}

impl LeaderboardEntry {
    pub fn new(row: &QueryResult) -> Result<LeaderboardEntry, DbErr> {
        let wallet_address: String = row.try_get("", "wallet_address")?;
        Ok(LeaderboardEntry {
            id: row.try_get("", "id")?,
            wallet_short: crate::points::wallet_short(&wallet_address),
            wallet_address,
            network: row.try_get("", "network")?,
            points: row.try_get("", "points")?,
            streak: row.try_get("", "streak")?,
            rank: row.try_get("", "user_rank")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct MessageAuthor {
    pub wallet_address: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct MessageWithAuthor {
    #[serde(flatten)]
    pub message: MessageModel,
    pub user: Option<MessageAuthor>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct MessagesResponse {
    pub messages: Vec<MessageWithAuthor>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct MessageResponse {
    pub message: MessageModel,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WalletBalance {
    /// Smallest unit (lamports / wei) as a decimal string
    pub amount: String,
    pub unit: String,
    pub decimals: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "camelCase")]
pub struct WalletView {
    pub wallet_address: String,
    pub network: String,
    pub points: i64,
    pub streak: i32,
    pub balance: Option<WalletBalance>,
}

#[cfg(test)]
#[path = "dto_tests.rs"]
mod dto_tests;
