use crate::dto::{ApiResponse, ResponseData, RESPONSE_INTERNAL_ERROR};
use crate::error::CivicError;
use rocket::fairing::AdHoc;
use tracing::{error, warn};

pub mod check_in;
pub mod leaderboard;
pub mod messages;
pub mod stake;
pub mod user;
pub mod wallet;
pub mod web3_auth;

pub fn mount() -> AdHoc {
    AdHoc::on_ignite("Attaching Routes", |rocket| async {
        rocket.mount(
            "/",
            routes![
                check_in::create,
                check_in::history,
                leaderboard::get,
                messages::list,
                messages::create,
                stake::create,
                stake::release,
                stake::list,
                user::auth,
                user::user_data,
                wallet::get,
                web3_auth::login,
                web3_auth::verify
            ],
        )
    })
}

pub fn respond<T>(result: Result<T, CivicError>) -> ApiResponse<T> {
    match result {
        Ok(data) => ResponseData::ok(data),
        Err(err) => {
            if err.code() == RESPONSE_INTERNAL_ERROR {
                error!("{}", err);
            } else {
                warn!("{}", err);
            }
            ResponseData::error(err.code(), err.public_message())
        }
    }
}
