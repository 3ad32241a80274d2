use crate::civic_service::{self, PostMessageInput};
use crate::dto::{
    page_and_limit, required, ApiResponse, MessageResponse, MessagesResponse, Network, PageQuery,
    PostMessageRequest,
};
use crate::error::CivicError;
use crate::pool::{CivicConfig, Db};
use crate::signature::check_request_signature;
use rocket::{serde::json::Json, State};
use sea_orm_rocket::Connection;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[get("/messages?<query..>")]
pub async fn list(conn: Connection<'_, Db>, query: PageQuery) -> ApiResponse<MessagesResponse> {
    let db = conn.into_inner();
    let result: Result<MessagesResponse, CivicError> = async {
        let (page, limit) = page_and_limit(query.page, query.limit, DEFAULT_LIMIT, MAX_LIMIT)?;
        let messages = civic_service::messages(db, page, limit).await?;
        Ok(MessagesResponse { messages })
    }
    .await;
    super::respond(result)
}

#[post("/messages", format = "application/json", data = "<request>")]
pub async fn create(
    conn: Connection<'_, Db>,
    config: &State<CivicConfig>,
    request: Json<PostMessageRequest>,
) -> ApiResponse<MessageResponse> {
    let db = conn.into_inner();
    let result: Result<MessageResponse, CivicError> = async {
        let fields = required(&[
            ("walletAddress", request.wallet_address.as_deref()),
            ("content", request.content.as_deref()),
            ("signature", request.signature.as_deref()),
        ])?;
        let network = Network::parse(request.network.as_deref())?;
        check_request_signature(
            config,
            network,
            fields[0],
            request.message.as_deref(),
            fields[2],
        )?;
        let input = PostMessageInput {
            wallet_address: fields[0],
            network,
            content: fields[1],
            signature: fields[2],
        };
        let message = civic_service::post_message(
            db,
            input,
            config.message_max_length(),
            chrono::Utc::now().timestamp(),
        )
        .await?;
        Ok(MessageResponse { message })
    }
    .await;
    super::respond(result)
}
