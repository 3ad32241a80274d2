use crate::civic_service;
use crate::dto::{
    required, ApiResponse, AuthRequest, Network, UserResponse, UserWithRank,
};
use crate::error::CivicError;
use crate::pool::Db;
use civicly_db_entity::db::user::Model as UserModel;
use rocket::serde::json::Json;
use sea_orm_rocket::Connection;

#[post("/auth", format = "application/json", data = "<request>")]
pub async fn auth(
    conn: Connection<'_, Db>,
    request: Json<AuthRequest>,
) -> ApiResponse<UserResponse<UserModel>> {
    let db = conn.into_inner();
    let result: Result<UserResponse<UserModel>, CivicError> = async {
        let fields = required(&[("walletAddress", request.wallet_address.as_deref())])?;
        let network = Network::parse(request.network.as_deref())?;
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty());
        let user = civic_service::register_user(
            db,
            fields[0],
            network,
            email,
            chrono::Utc::now().timestamp(),
        )
        .await?;
        Ok(UserResponse { user })
    }
    .await;
    super::respond(result)
}

#[post("/user-data", format = "application/json", data = "<request>")]
pub async fn user_data(
    conn: Connection<'_, Db>,
    request: Json<AuthRequest>,
) -> ApiResponse<UserResponse<UserWithRank>> {
    let db = conn.into_inner();
    let result: Result<UserResponse<UserWithRank>, CivicError> = async {
        let fields = required(&[("walletAddress", request.wallet_address.as_deref())])?;
        let network = Network::parse(request.network.as_deref())?;
        let user =
            civic_service::user_data(db, fields[0], network, chrono::Utc::now().timestamp())
                .await?;
        Ok(UserResponse { user })
    }
    .await;
    super::respond(result)
}
