use async_trait::async_trait;
use rocket::serde::Deserialize;
use rocket::Config;
use sea_orm::{ConnectOptions, DbErr};
use sea_orm_rocket::{rocket::figment::Figment, Database};
use std::time::Duration;

#[derive(Database, Debug)]
#[database("sea_orm")]
pub struct Db(SeaOrmPool);

// sea-orm's `mock` feature (dev-dependency) removes `Clone` from DatabaseConnection
#[derive(Debug)]
#[cfg_attr(not(test), derive(Clone))]
pub struct SeaOrmPool {
    pub conn: sea_orm::DatabaseConnection,
}

#[async_trait]
impl sea_orm_rocket::Pool for SeaOrmPool {
    type Error = sea_orm::DbErr;

    type Connection = sea_orm::DatabaseConnection;

    async fn init(_figment: &Figment) -> Result<Self, Self::Error> {
        let config = Config::figment()
            .extract::<CivicConfig>()
            .map_err(|error| DbErr::Custom(format!("Invalid configuration: {}", error)))?;
        let mut options: ConnectOptions = config.database_url.to_owned().into();
        options
            .max_connections(config.sqlx_max_connections)
            .min_connections(match config.sqlx_min_connections {
                Some(v) => v,
                None => 2,
            })
            .connect_timeout(Duration::from_secs(match config.sqlx_connect_timeout {
                Some(v) => v,
                None => 8,
            }))
            .idle_timeout(Duration::from_secs(match config.sqlx_idle_timeout {
                Some(v) => v,
                None => 8,
            }))
            .max_lifetime(Duration::from_secs(match config.sqlx_max_lifetime {
                Some(v) => v,
                None => 8,
            }))
            .sqlx_logging(match config.sqlx_logging {
                Some(v) => v,
                None => false,
            })
            .sqlx_logging_level(
                match config
                    .web_api_sqlx_logging_level
                    .parse::<log::LevelFilter>()
                {
                    Ok(level) => level,
                    Err(_) => log::LevelFilter::Info,
                },
            );

        let conn = sea_orm::Database::connect(options).await?;

        Ok(SeaOrmPool { conn })
    }

    fn borrow(&self) -> &Self::Connection {
        &self.conn
    }
}

pub const DEFAULT_MAX_STAKE_DAYS: i64 = 365;
pub const DEFAULT_MESSAGE_MAX_LENGTH: usize = 500;

#[derive(Deserialize, Debug, Clone)]
#[serde(crate = "rocket::serde")]
pub struct CivicConfig {
    pub database_url: String,
    pub sqlx_max_connections: u32,
    pub sqlx_min_connections: Option<u32>,
    pub sqlx_connect_timeout: Option<u64>,
    pub sqlx_idle_timeout: Option<u64>,
    pub sqlx_max_lifetime: Option<u64>,
    pub sqlx_logging: Option<bool>,
    pub web_api_sqlx_logging_level: String,
    pub rust_log: String,
    pub web_api_log: String,
    pub cors_allowed_domains: String,
    pub jwt_key: String,
    pub enable_datadog: bool,
    pub datadog_host: String,
    pub datadog_port: String,
    pub enable_maintenance: bool,
    #[serde(default)]
    pub verify_signatures: bool,
    pub max_stake_days: Option<i64>,
    pub message_max_length: Option<usize>,
    pub solana_rpc_url: Option<String>,
    pub ethereum_rpc_url: Option<String>,
}

impl CivicConfig {
    pub fn max_stake_days(&self) -> i64 {
        match self.max_stake_days {
            Some(v) if v > 0 => v,
            _ => DEFAULT_MAX_STAKE_DAYS,
        }
    }

    pub fn message_max_length(&self) -> usize {
        match self.message_max_length {
            Some(v) if v > 0 => v,
            _ => DEFAULT_MESSAGE_MAX_LENGTH,
        }
    }
}

#[cfg(test)]
pub fn test_config() -> CivicConfig {
    CivicConfig {
        database_url: "postgres://localhost/civicly_test".to_owned(),
        sqlx_max_connections: 1,
        sqlx_min_connections: None,
        sqlx_connect_timeout: None,
        sqlx_idle_timeout: None,
        sqlx_max_lifetime: None,
        sqlx_logging: None,
        web_api_sqlx_logging_level: "off".to_owned(),
        rust_log: "warn".to_owned(),
        web_api_log: "info".to_owned(),
        cors_allowed_domains: "http://localhost:3000".to_owned(),
        jwt_key: "test-jwt-key".to_owned(),
        enable_datadog: false,
        datadog_host: "localhost".to_owned(),
        datadog_port: "8126".to_owned(),
        enable_maintenance: false,
        verify_signatures: true,
        max_stake_days: None,
        message_max_length: None,
        solana_rpc_url: None,
        ethereum_rpc_url: None,
    }
}
