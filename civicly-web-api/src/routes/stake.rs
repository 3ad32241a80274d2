use crate::civic_service::{self, StakeInput};
use crate::dto::{
    required, ApiResponse, Network, StakeRequest, StakeResponse, StakesResponse, UnstakeRequest,
    UnstakeResponse, WalletQuery,
};
use crate::error::CivicError;
use crate::pool::{CivicConfig, Db};
use crate::signature::check_request_signature;
use rocket::{serde::json::Json, State};
use sea_orm_rocket::Connection;
use uuid::Uuid;

#[post("/stake", format = "application/json", data = "<request>")]
pub async fn create(
    conn: Connection<'_, Db>,
    config: &State<CivicConfig>,
    request: Json<StakeRequest>,
) -> ApiResponse<StakeResponse> {
    let db = conn.into_inner();
    let result: Result<StakeResponse, CivicError> = async {
        let fields = required(&[
            ("walletAddress", request.wallet_address.as_deref()),
            ("signature", request.signature.as_deref()),
        ])?;
        let (amount, duration_days) = request.amount_and_duration()?;
        let network = Network::parse(request.network.as_deref())?;
        check_request_signature(
            config,
            network,
            fields[0],
            request.message.as_deref(),
            fields[1],
        )?;
        let input = StakeInput {
            wallet_address: fields[0],
            network,
            amount,
            duration_days,
            signature: fields[1],
        };
        civic_service::stake(
            db,
            input,
            config.max_stake_days(),
            chrono::Utc::now().timestamp(),
        )
        .await
    }
    .await;
    super::respond(result)
}

#[put("/stake", format = "application/json", data = "<request>")]
pub async fn release(
    conn: Connection<'_, Db>,
    config: &State<CivicConfig>,
    request: Json<UnstakeRequest>,
) -> ApiResponse<UnstakeResponse> {
    let db = conn.into_inner();
    let result: Result<UnstakeResponse, CivicError> = async {
        let fields = required(&[
            ("walletAddress", request.wallet_address.as_deref()),
            ("stakeId", request.stake_id.as_deref()),
            ("signature", request.signature.as_deref()),
        ])?;
        let stake_id = Uuid::parse_str(fields[1])
            .map_err(|_| CivicError::NotFound("Stake not found".to_owned()))?;
        let network = Network::parse(request.network.as_deref())?;
        check_request_signature(
            config,
            network,
            fields[0],
            request.message.as_deref(),
            fields[2],
        )?;
        civic_service::unstake(
            db,
            fields[0],
            network,
            stake_id,
            chrono::Utc::now().timestamp(),
        )
        .await
    }
    .await;
    super::respond(result)
}

#[get("/stake?<query..>")]
pub async fn list(conn: Connection<'_, Db>, query: WalletQuery) -> ApiResponse<StakesResponse> {
    let db = conn.into_inner();
    let result: Result<StakesResponse, CivicError> = async {
        let fields = required(&[("walletAddress", query.wallet_address.as_deref())])?;
        let network = Network::parse(query.network.as_deref())?;
        let stakes = civic_service::active_stakes(db, fields[0], network).await?;
        Ok(StakesResponse { stakes })
    }
    .await;
    super::respond(result)
}
