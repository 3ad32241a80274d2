use crate::pool::CivicConfig;
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::{uri::Origin, Method},
    Data, Request,
};
use tracing::info;

pub const MAINTENANCE_PATH: &str = "/maintenance_mode";

pub struct MaintenanceMode;

#[rocket::async_trait]
impl Fairing for MaintenanceMode {
    fn info(&self) -> Info {
        Info {
            name: "Maintenance Mode",
            kind: Kind::Request,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let enabled = request
            .rocket()
            .state::<CivicConfig>()
            .map(|config| config.enable_maintenance)
            .unwrap_or(false);
        if !enabled || request.uri().path().as_str() == "/" {
            return;
        }
        if let Ok(uri) = Origin::parse(MAINTENANCE_PATH) {
            info!("Maintenance mode, rerouting {}", request.uri());
            request.set_uri(uri);
            request.set_method(Method::Get);
        }
    }
}
