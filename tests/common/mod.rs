//! An in-process stand-in for the campaign service and its collaborators.
//!
//! It answers with the same envelope contract as the real services, keeps
//! campaigns in memory, and makes writes visible to `CampaignRecords` only
//! after `write_delay` to mimic the asynchronous persistence.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use actix_web::http::header::{HeaderName, ACCEPT, CONTENT_TYPE};
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing_actix_web::TracingLogger;

use campaign_e2e::campaign::db::CampaignRecords;
use campaign_e2e::config::{Endpoints, HttpConfig};
use campaign_e2e::envelope::{Envelope, ErrorCode};
use campaign_e2e::Error;

const EMAIL_TEMPLATES: [&str; 2] = ["EM-001", "EM-002"];
const RECIPIENT_LISTS: [&str; 2] = ["RL-001", "RL-002"];

struct StoredCampaign {
    id: u64,
    name: String,
    email_template_id: String,
    recipient_list_id: String,
    scheduled_time: i64,
    visible_at: Instant,
}

impl StoredCampaign {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "campaignName": self.name,
            "emailTemplateId": self.email_template_id,
            "recipientListId": self.recipient_list_id,
            "scheduledTime": self.scheduled_time,
        })
    }
}

#[derive(Default)]
pub struct StubState {
    campaigns: Vec<StoredCampaign>,
    next_id: u64,
    pub email_template_down: bool,
    pub recipient_list_down: bool,
    pub write_delay: Duration,
}

#[derive(Clone)]
pub struct StubService {
    state: Arc<Mutex<StubState>>,
    base_url: String,
}

impl StubService {
    /// Starts a healthy stub; must be called from inside an actix runtime.
    pub fn start() -> StubService {
        StubService::start_with(|_| {})
    }

    pub fn start_with(configure: impl FnOnce(&mut StubState)) -> StubService {
        let mut state = StubState {
            next_id: 1,
            ..Default::default()
        };
        configure(&mut state);
        let state = Arc::new(Mutex::new(state));

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let data = web::Data::from(Arc::clone(&state));

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .wrap(TracingLogger::default())
                .route("/campaigns", web::post().to(create_campaign))
                .route("/campaigns/{id}", web::get().to(get_campaign))
                .route("/campaigns/{id}/name", web::patch().to(update_campaign_name))
                .route("/email/templates", web::get().to(get_email_templates))
                .route("/email/templates/{id}", web::get().to(get_email_template))
                .route("/recipients/lists", web::get().to(get_recipient_lists))
                .route("/recipients/lists/{id}", web::get().to(get_recipient_list))
                .route("/echo/headers", web::route().to(echo_headers))
                .route("/garbage", web::route().to(garbage))
                .route("/slow", web::route().to(slow))
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();
        actix_web::rt::spawn(server);

        StubService {
            state,
            base_url: format!("http://127.0.0.1:{}", port),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            create_campaign: self.url("/campaigns"),
            update_campaign: self.url("/campaigns"),
            get_campaign: self.url("/campaigns"),
            recipient_list: self.url("/recipients/lists"),
            email_template: self.url("/email/templates"),
        }
    }

    pub fn campaign_count(&self) -> usize {
        self.state.lock().unwrap().campaigns.len()
    }

    pub fn campaign_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .campaigns
            .iter()
            .map(|campaign| campaign.name.clone())
            .collect()
    }
}

#[async_trait]
impl CampaignRecords for StubService {
    async fn find_campaign_by_name(&self, name: &str) -> Result<Option<String>, Error> {
        let state = self.state.lock().unwrap();
        let now = Instant::now();

        Ok(state
            .campaigns
            .iter()
            .find(|campaign| campaign.name == name && campaign.visible_at <= now)
            .map(|campaign| campaign.name.clone()))
    }
}

/// Endpoints on a port nothing listens on.
pub fn unreachable_endpoints() -> Endpoints {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let base = format!("http://127.0.0.1:{}", port);
    Endpoints {
        create_campaign: format!("{}/campaigns", base),
        update_campaign: format!("{}/campaigns", base),
        get_campaign: format!("{}/campaigns", base),
        recipient_list: format!("{}/recipients/lists", base),
        email_template: format!("{}/email/templates", base),
    }
}

pub fn http_config() -> HttpConfig {
    HttpConfig { timeout_ms: 2_000 }
}

fn success(data: Value) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::success(data))
}

fn failure(status: StatusCode, code: ErrorCode, detail: Option<String>) -> HttpResponse {
    HttpResponse::build(status).json(Envelope::<Value>::failure(vec![code.to_api_error(detail)]))
}

fn invalid_input() -> HttpResponse {
    failure(StatusCode::BAD_REQUEST, ErrorCode::InputValidationError, None)
}

fn lookup_failed(path: &str) -> HttpResponse {
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::InternalServerError,
        Some(format!(
            "I/O error on GET request for \"http://host.docker.internal{}\": null",
            path
        )),
    )
}

fn text_field(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned)
}

async fn create_campaign(state: web::Data<Mutex<StubState>>, body: web::Bytes) -> HttpResponse {
    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(_) => return invalid_input(),
    };
    let fields = (
        text_field(&body, "campaignName"),
        text_field(&body, "emailTemplateId"),
        text_field(&body, "recipientListId"),
        body.get("scheduledTime").and_then(Value::as_i64),
    );
    let (name, email_template_id, recipient_list_id, scheduled_time) = match fields {
        (Some(name), Some(template), Some(list), Some(time)) if time >= 0 => {
            (name, template, list, time)
        }
        _ => return invalid_input(),
    };

    let mut state = state.lock().unwrap();
    if state.email_template_down {
        return lookup_failed(&format!("/email/templates/{}", email_template_id));
    }
    if !EMAIL_TEMPLATES.contains(&email_template_id.as_str()) {
        return failure(StatusCode::NOT_FOUND, ErrorCode::EmailTemplateNotFound, None);
    }
    if state.recipient_list_down {
        return lookup_failed(&format!("/recipients/lists/{}", recipient_list_id));
    }
    if !RECIPIENT_LISTS.contains(&recipient_list_id.as_str()) {
        return failure(StatusCode::NOT_FOUND, ErrorCode::RecipientListNotFound, None);
    }
    if state.campaigns.iter().any(|campaign| campaign.name == name) {
        return failure(StatusCode::CONFLICT, ErrorCode::CampaignNameNotUnique, None);
    }

    let campaign = StoredCampaign {
        id: state.next_id,
        name,
        email_template_id,
        recipient_list_id,
        scheduled_time,
        visible_at: Instant::now() + state.write_delay,
    };
    state.next_id += 1;
    let response = success(campaign.to_json());
    state.campaigns.push(campaign);

    response
}

async fn get_campaign(
    state: web::Data<Mutex<StubState>>,
    params: web::Path<String>,
) -> HttpResponse {
    let id = params.into_inner();
    let state = state.lock().unwrap();

    match state
        .campaigns
        .iter()
        .find(|campaign| campaign.id.to_string() == id)
    {
        Some(campaign) => success(campaign.to_json()),
        None => failure(StatusCode::NOT_FOUND, ErrorCode::CampaignNotFound, None),
    }
}

async fn update_campaign_name(
    state: web::Data<Mutex<StubState>>,
    params: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let id = params.into_inner();
    let name = match serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|body| text_field(&body, "campaignName"))
    {
        Some(name) => name,
        None => return invalid_input(),
    };

    let mut state = state.lock().unwrap();
    let write_delay = state.write_delay;
    match state
        .campaigns
        .iter_mut()
        .find(|campaign| campaign.id.to_string() == id)
    {
        Some(campaign) => {
            campaign.name = name;
            campaign.visible_at = Instant::now() + write_delay;
            success(campaign.to_json())
        }
        None => failure(StatusCode::NOT_FOUND, ErrorCode::CampaignNotFound, None),
    }
}

fn collaborator_list(down: bool, ids: &[&str], path: &str) -> HttpResponse {
    if down {
        return lookup_failed(path);
    }
    let data: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "id": id, "name": format!("stub {}", id) }))
        .collect();
    success(Value::Array(data))
}

fn collaborator_item(down: bool, ids: &[&str], id: &str, missing: ErrorCode) -> HttpResponse {
    if down {
        return lookup_failed(&format!("/{}", id));
    }
    if ids.contains(&id) {
        success(json!({ "id": id, "name": format!("stub {}", id) }))
    } else {
        failure(StatusCode::NOT_FOUND, missing, None)
    }
}

async fn get_email_templates(state: web::Data<Mutex<StubState>>) -> HttpResponse {
    let down = state.lock().unwrap().email_template_down;
    collaborator_list(down, &EMAIL_TEMPLATES, "/email/templates")
}

async fn get_email_template(
    state: web::Data<Mutex<StubState>>,
    params: web::Path<String>,
) -> HttpResponse {
    let down = state.lock().unwrap().email_template_down;
    collaborator_item(
        down,
        &EMAIL_TEMPLATES,
        &params.into_inner(),
        ErrorCode::EmailTemplateNotFound,
    )
}

async fn get_recipient_lists(state: web::Data<Mutex<StubState>>) -> HttpResponse {
    let down = state.lock().unwrap().recipient_list_down;
    collaborator_list(down, &RECIPIENT_LISTS, "/recipients/lists")
}

async fn get_recipient_list(
    state: web::Data<Mutex<StubState>>,
    params: web::Path<String>,
) -> HttpResponse {
    let down = state.lock().unwrap().recipient_list_down;
    collaborator_item(
        down,
        &RECIPIENT_LISTS,
        &params.into_inner(),
        ErrorCode::RecipientListNotFound,
    )
}

async fn echo_headers(req: HttpRequest) -> HttpResponse {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };

    success(json!({
        "method": req.method().as_str(),
        "accept": header(ACCEPT),
        "contentType": header(CONTENT_TYPE),
    }))
}

async fn garbage() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html")
        .body("<html>upstream exploded</html>")
}

async fn slow() -> HttpResponse {
    actix_web::rt::time::sleep(Duration::from_secs(10)).await;
    success(Value::Null)
}
