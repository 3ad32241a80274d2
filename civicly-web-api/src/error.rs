use crate::dto::{RESPONSE_BAD_REQUEST, RESPONSE_INTERNAL_ERROR, RESPONSE_NOT_FOUND};
use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CivicError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Already checked in today")]
    AlreadyCheckedIn,

    #[error("Not enough points")]
    InsufficientPoints,

    #[error("Signature verification failed: {0}")]
    InvalidSignature(String),

    #[error("Wallet RPC error: {0}")]
    Rpc(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type Result<T> = std::result::Result<T, CivicError>;

impl CivicError {
    pub fn user_not_found() -> Self {
        CivicError::NotFound("User not found".to_owned())
    }

    pub fn code(&self) -> u16 {
        match self {
            CivicError::BadRequest(_)
            | CivicError::AlreadyCheckedIn
            | CivicError::InsufficientPoints
            | CivicError::InvalidSignature(_) => RESPONSE_BAD_REQUEST,
            CivicError::NotFound(_) => RESPONSE_NOT_FOUND,
            CivicError::Rpc(_) | CivicError::Database(_) => RESPONSE_INTERNAL_ERROR,
        }
    }

    /// Message safe to hand back to the caller. Internal failures stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            CivicError::Database(_) | CivicError::Rpc(_) => "Something went wrong".to_owned(),
            other => other.to_string(),
        }
    }
}

/// Postgres unique_violation (SQLSTATE 23505).
pub fn is_unique_violation(error: &DbErr) -> bool {
    match error {
        DbErr::Exec(RuntimeErr::SqlxError(sea_orm::SqlxError::Database(db_error)))
        | DbErr::Query(RuntimeErr::SqlxError(sea_orm::SqlxError::Database(db_error))) => {
            db_error.code().as_deref() == Some("23505")
        }
        _ => false,
    }
}
