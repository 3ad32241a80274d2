mod civic_service;
mod cors;
mod datadog;
mod dto;
mod error;
mod maintenance;
mod points;
mod pool;
mod routes;
mod signature;
mod sql_stmt;
mod wallet_rpc;

use dto::{
    ApiResponse, ResponseData, RESPONSE_INTERNAL_ERROR, RESPONSE_MAINTENANCE, RESPONSE_NOT_FOUND,
};
use pool::{CivicConfig, Db};
use rocket::{http::Status, serde::json::Json, Build, Config, Request, Rocket};
use sea_orm_rocket::Database;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

#[macro_use]
extern crate rocket;

#[get("/")]
async fn health_ping() -> &'static str {
    ""
}

#[get("/maintenance_mode")]
async fn maintenance_mode() -> ApiResponse<()> {
    ResponseData::error(
        RESPONSE_MAINTENANCE,
        "Civicly is down for maintenance".to_owned(),
    )
}

#[catch(404)]
async fn not_found(req: &Request<'_>) -> Json<ResponseData<()>> {
    let message = format!("Couldn't find '{}'", req.uri());
    Json(ResponseData::new(RESPONSE_NOT_FOUND, message, None))
}

#[catch(500)]
async fn internal_error() -> Json<ResponseData<()>> {
    Json(ResponseData::new(
        RESPONSE_INTERNAL_ERROR,
        "Whoops! Looks like we messed up.".to_owned(),
        None,
    ))
}

#[catch(default)]
async fn bad_request(status: Status, _: &Request<'_>) -> Json<ResponseData<()>> {
    Json(ResponseData::new(
        status.code,
        "Please check the request body and params.".to_owned(),
        None,
    ))
}

fn init_tracing(config: &CivicConfig) {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.rust_log);
    }

    let mut filter = EnvFilter::from_default_env();
    match format!("civicly_web_api={}", &config.web_api_log).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(error) => eprintln!("Ignoring web_api_log '{}': {}", config.web_api_log, error),
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::FULL)
        .init();
}

/// Everything except the database pool, the route table and Datadog.
fn assemble(rocket: Rocket<Build>, config: CivicConfig) -> Rocket<Build> {
    let cors = cors::OriginHeader::new(&config.cors_allowed_domains);
    rocket
        .register("/", catchers![not_found, internal_error, bad_request])
        .attach(datadog::RequestTimer)
        .attach(maintenance::MaintenanceMode)
        .attach(cors)
        .manage(config)
        .manage(reqwest::Client::new())
        .mount("/", routes![health_ping, maintenance_mode])
}

#[launch]
async fn rocket() -> _ {
    let civic_config = Config::figment()
        .extract::<CivicConfig>()
        .expect("Invalid civicly configuration");
    init_tracing(&civic_config);

    let datadog_client = datadog_apm::Client::new(datadog_apm::Config {
        env: None,
        service: datadog::SERVICE_NAME.to_owned(),
        host: civic_config.datadog_host.to_owned(),
        port: civic_config.datadog_port.to_owned(),
        ..Default::default()
    });

    assemble(rocket::build(), civic_config)
        .attach(Db::init())
        .manage(datadog_client)
        .attach(routes::mount())
}
