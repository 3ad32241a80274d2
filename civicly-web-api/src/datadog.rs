use crate::pool::CivicConfig;
use datadog_apm::{ErrorInfo, HttpInfo, Span, Trace};
use rocket::{
    fairing::{Fairing, Info, Kind},
    http::Status,
    Data, Request, Response,
};
use std::{
    collections::HashMap,
    time::{Duration, SystemTime},
};
use tracing::warn;

pub const SERVICE_NAME: &str = "civicly-web-api";

pub struct RequestTimer;

#[derive(Clone)]
struct TimerStart(Option<SystemTime>);

fn enabled(request: &Request<'_>) -> bool {
    request
        .rocket()
        .state::<CivicConfig>()
        .map(|config| config.enable_datadog)
        .unwrap_or(false)
}

#[rocket::async_trait]
impl Fairing for RequestTimer {
    fn info(&self) -> Info {
        Info {
            name: "Datadog trace",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        if !enabled(request) || request.uri().path().as_str() == "/" {
            return;
        }
        request.local_cache(|| TimerStart(Some(SystemTime::now())));
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if !enabled(request)
            || response.status() == Status::NotFound
            || request.uri().path().as_str() == "/"
        {
            return;
        }

        let datadog_client = match request.rocket().state::<datadog_apm::Client>() {
            Some(client) => client.clone(),
            None => return,
        };
        let start = match request.local_cache(|| TimerStart(None)).0 {
            Some(start) => start,
            None => return,
        };

        let status_code = response.status().code;
        let error = if status_code == 200 {
            None
        } else {
            let msg = if status_code >= 500 {
                "Internal error".to_owned()
            } else {
                "Bad input error".to_owned()
            };
            Some(ErrorInfo {
                r#type: "unknown".to_owned(),
                msg,
                stack: "".to_owned(),
            })
        };

        send_trace(
            datadog_client,
            request.method().as_str(),
            request.uri().to_string(),
            request.uri().path().as_str(),
            status_code,
            start,
            error,
        );
    }
}

fn send_trace(
    datadog_client: datadog_apm::Client,
    method: &str,
    url: String,
    path: &str,
    status_code: u16,
    start: SystemTime,
    error: Option<ErrorInfo>,
) {
    let duration = match SystemTime::now().duration_since(start) {
        Ok(d) => d,
        Err(error) => {
            warn!("Failed calculating duration: {}", error);
            Duration::from_millis(0)
        }
    };

    let span = Span {
        id: 1,
        parent_id: None,
        name: "request".to_owned(),
        resource: method.to_owned() + " " + path,
        r#type: "web".to_owned(),
        start,
        duration,
        http: Some(HttpInfo {
            url,
            method: method.to_owned(),
            status_code: status_code.to_string(),
        }),
        error,
        sql: None,
        tags: HashMap::new(),
    };

    datadog_client.send_trace(Trace {
        id: 1,
        priority: 1,
        spans: vec![span],
    });
}
