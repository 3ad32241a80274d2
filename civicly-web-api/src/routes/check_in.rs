use crate::civic_service;
use crate::dto::{
    required, ApiResponse, CheckInRequest, CheckInResponse, HistoryResponse, Network, WalletQuery,
};
use crate::error::CivicError;
use crate::pool::{CivicConfig, Db};
use crate::signature::check_request_signature;
use rocket::{serde::json::Json, State};
use sea_orm_rocket::Connection;

#[post("/check-in", format = "application/json", data = "<request>")]
pub async fn create(
    conn: Connection<'_, Db>,
    config: &State<CivicConfig>,
    request: Json<CheckInRequest>,
) -> ApiResponse<CheckInResponse> {
    let db = conn.into_inner();
    let result: Result<CheckInResponse, CivicError> = async {
        let fields = required(&[
            ("walletAddress", request.wallet_address.as_deref()),
            ("signature", request.signature.as_deref()),
            ("message", request.message.as_deref()),
        ])?;
        let (wallet_address, signature) = (fields[0], fields[1]);
        let network = Network::parse(request.network.as_deref())?;
        check_request_signature(
            config,
            network,
            wallet_address,
            request.message.as_deref(),
            signature,
        )?;
        civic_service::check_in(db, wallet_address, network, signature, chrono::Utc::now()).await
    }
    .await;
    super::respond(result)
}

#[get("/check-in/history?<query..>")]
pub async fn history(conn: Connection<'_, Db>, query: WalletQuery) -> ApiResponse<HistoryResponse> {
    let db = conn.into_inner();
    let result: Result<HistoryResponse, CivicError> = async {
        let fields = required(&[("walletAddress", query.wallet_address.as_deref())])?;
        let network = Network::parse(query.network.as_deref())?;
        let today = chrono::Utc::now().date_naive();
        let history = civic_service::check_in_history(db, fields[0], network, today).await?;
        Ok(HistoryResponse { history })
    }
    .await;
    super::respond(result)
}
