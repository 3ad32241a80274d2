use crate::civic_service;
use crate::dto::{required, ApiResponse, Network, ResponseData, WalletQuery, WalletView, RESPONSE_OK};
use crate::error::CivicError;
use crate::pool::{CivicConfig, Db};
use crate::wallet_rpc;
use rocket::State;
use sea_orm_rocket::Connection;

#[get("/wallet?<query..>")]
pub async fn get(
    conn: Connection<'_, Db>,
    config: &State<CivicConfig>,
    client: &State<reqwest::Client>,
    query: WalletQuery,
) -> ApiResponse<WalletView> {
    let db = conn.into_inner();
    let result: Result<(WalletView, String), CivicError> = async {
        let fields = required(&[("walletAddress", query.wallet_address.as_deref())])?;
        let network = Network::parse(query.network.as_deref())?;
        let user = civic_service::require_user(db, fields[0], network).await?;
        let (balance, note) =
            wallet_rpc::balance_or_note(client, config, network, &user.wallet_address).await;
        let view = WalletView {
            wallet_address: user.wallet_address,
            network: user.network,
            points: user.points,
            streak: user.streak,
            balance,
        };
        Ok((view, note))
    }
    .await;
    match result {
        Ok((view, note)) => ResponseData::respond(RESPONSE_OK, note, Some(view)),
        Err(error) => super::respond(Err(error)),
    }
}
