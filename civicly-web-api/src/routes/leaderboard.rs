use crate::civic_service;
use crate::dto::{page_and_limit, ApiResponse, LeaderboardQuery, LeaderboardResponse, Network};
use crate::error::CivicError;
use crate::pool::Db;
use sea_orm_rocket::Connection;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[get("/leaderboard?<query..>")]
pub async fn get(
    conn: Connection<'_, Db>,
    query: LeaderboardQuery,
) -> ApiResponse<LeaderboardResponse> {
    let db = conn.into_inner();
    let result: Result<LeaderboardResponse, CivicError> = async {
        let network = Network::parse(query.network.as_deref())?;
        let (page, limit) = page_and_limit(query.page, query.limit, DEFAULT_LIMIT, MAX_LIMIT)?;
        let leaderboard = civic_service::leaderboard(db, network, page, limit).await?;
        Ok(LeaderboardResponse { leaderboard })
    }
    .await;
    super::respond(result)
}
