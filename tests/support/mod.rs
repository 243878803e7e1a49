//! An in-process stand-in for the DreamSpace backend.
//!
//! Access tokens are JWTs carrying a `generation`; bumping [`Backend::expire_access_tokens`]
//! makes every access token issued so far answer 401, which is how the tests simulate expiry.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE};
use actix_web::http::Method;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use dreamspace::auth::{MemoryTokenStore, TokenPair};
use dreamspace::{ApiClient, ClientConfig};

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct horse";
pub const TAKEN_EMAIL: &str = "taken@example.com";

const SECRET: &[u8] = b"dreamspace-test-secret";
const TIMESTAMP: &str = "2024-03-01T09:30:00Z";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    kind: String,
    generation: u64,
    serial: u64,
    exp: usize,
}

/// One request as it reached the backend.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Seen {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

/// Observable state of the mock backend.
#[derive(Default)]
pub struct Backend {
    generation: AtomicU64,
    issued: AtomicU64,
    refresh_calls: AtomicUsize,
    refresh_delay_ms: AtomicU64,
    refresh_rejected: AtomicBool,
    reject_every_token: AtomicBool,
    outage: AtomicBool,
    hits: Mutex<HashMap<String, usize>>,
    seen: Mutex<Vec<Seen>>,
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl Backend {
    /// Invalidates every access token issued so far. Refresh tokens stay valid.
    pub fn expire_access_tokens(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn reject_refresh(&self) {
        self.refresh_rejected.store(true, Ordering::SeqCst);
    }

    /// Makes protected endpoints answer 401 even for freshly refreshed tokens.
    pub fn reject_every_token(&self) {
        self.reject_every_token.store(true, Ordering::SeqCst);
    }

    pub fn slow_refresh(&self, delay: Duration) {
        self.refresh_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn start_outage(&self) {
        self.outage.store(true, Ordering::SeqCst);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// How many times `path` (without query string) was requested.
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    /// The `Authorization` header of every request to `path`, in arrival order.
    pub fn authorization_for(&self, path: &str) -> Vec<Option<String>> {
        self.seen(path)
            .into_iter()
            .map(|seen| seen.authorization)
            .collect()
    }

    /// The query string of the latest request to `path`.
    pub fn last_query(&self, path: &str) -> Option<String> {
        self.seen(path).pop().map(|seen| seen.query)
    }

    /// The latest request to `path`.
    pub fn last(&self, path: &str) -> Option<Seen> {
        self.seen(path).pop()
    }

    /// `"METHOD /path"` for every request, in arrival order.
    pub fn log(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|seen| format!("{} {}", seen.method, seen.path))
            .collect()
    }

    fn seen(&self, path: &str) -> Vec<Seen> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|seen| seen.path == path)
            .cloned()
            .collect()
    }

    /// Raw bodies of every multipart upload, keyed by path.
    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn issue(&self, kind: &str) -> String {
        let claims = Claims {
            sub: EMAIL.to_string(),
            kind: kind.to_string(),
            generation: self.generation.load(Ordering::SeqCst),
            serial: self.issued.fetch_add(1, Ordering::SeqCst),
            exp: 4_102_444_800,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn record(&self, req: &HttpRequest, body: &[u8]) {
        let path = req.path().trim_start_matches("/api").to_string();
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::to_owned)
        };
        *self.hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;
        self.seen.lock().unwrap().push(Seen {
            method: req.method().to_string(),
            path,
            query: req.query_string().to_string(),
            authorization: header(AUTHORIZATION),
            content_type: header(CONTENT_TYPE),
            body: body.to_vec(),
        });
    }

    fn decode(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(SECRET),
            &Validation::default(),
        )
        .ok()
        .map(|data| data.claims)
    }

    /// Records a protected request and checks its bearer token.
    fn authenticate(&self, req: &HttpRequest) -> Result<(), HttpResponse> {
        self.record(req, &[]);
        self.check(req)
    }

    fn check(&self, req: &HttpRequest) -> Result<(), HttpResponse> {
        let unauthorized = || {
            HttpResponse::Unauthorized().json(json!({
                "detail": "Given token not valid for any token type",
                "code": "token_not_valid"
            }))
        };
        if self.reject_every_token.load(Ordering::SeqCst) {
            return Err(unauthorized());
        }
        let Some(token) = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        else {
            return Err(HttpResponse::Unauthorized().json(json!({
                "detail": "Authentication credentials were not provided."
            })));
        };
        match self.decode(token) {
            Some(claims)
                if claims.kind == "access"
                    && claims.generation == self.generation.load(Ordering::SeqCst) =>
            {
                if self.outage.load(Ordering::SeqCst) {
                    Err(HttpResponse::InternalServerError().body("<h1>Server Error (500)</h1>"))
                } else {
                    Ok(())
                }
            }
            _ => Err(unauthorized()),
        }
    }
}

fn user() -> Value {
    json!({
        "id": 1,
        "email": EMAIL,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "phone": "",
        "role": "designer",
        "bio": "",
        "location": "Lagos",
        "profile_image": null,
        "is_verified": true,
        "business_name": ""
    })
}

fn project(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "user": 1,
        "name": name,
        "description": "",
        "client_name": "Okafor family",
        "start_date": "2024-03-04",
        "end_date": null,
        "tasks_count": 2,
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP
    })
}

fn task(id: i64, project: i64, title: &str, status: &str) -> Value {
    json!({
        "id": id,
        "project": project,
        "title": title,
        "description": "",
        "status": status,
        "due_date": null,
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP
    })
}

async fn login(
    backend: web::Data<Backend>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    backend.record(&req, &[]);
    if body["email"] == "" {
        return HttpResponse::BadRequest().json(json!({
            "email": ["This field may not be blank."]
        }));
    }
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        HttpResponse::Ok().json(json!({
            "access": backend.issue("access"),
            "refresh": backend.issue("refresh")
        }))
    } else {
        HttpResponse::Unauthorized().json(json!({
            "detail": "No active account found with the given credentials"
        }))
    }
}

async fn refresh(backend: web::Data<Backend>, body: web::Json<Value>) -> HttpResponse {
    backend.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = backend.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        actix_rt::time::sleep(Duration::from_millis(delay)).await;
    }

    let valid = !backend.refresh_rejected.load(Ordering::SeqCst)
        && body["refresh"]
            .as_str()
            .and_then(|token| backend.decode(token))
            .map_or(false, |claims| claims.kind == "refresh");
    if valid {
        HttpResponse::Ok().json(json!({ "access": backend.issue("access") }))
    } else {
        HttpResponse::Unauthorized().json(json!({
            "detail": "Token is invalid or expired",
            "code": "token_not_valid"
        }))
    }
}

async fn register(
    backend: web::Data<Backend>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    backend.record(&req, &[]);
    if body["email"] == TAKEN_EMAIL {
        return HttpResponse::BadRequest().json(json!({
            "email": ["user with this email already exists."]
        }));
    }
    if body["password"] != body["password2"] {
        return HttpResponse::BadRequest().json(json!({
            "password": ["Password fields didn't match."]
        }));
    }
    let mut created = user();
    created["email"] = body["email"].clone();
    HttpResponse::Created().json(created)
}

async fn me(backend: web::Data<Backend>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = backend.authenticate(&req) {
        return response;
    }
    HttpResponse::Ok().json(user())
}

async fn list_projects(backend: web::Data<Backend>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = backend.authenticate(&req) {
        return response;
    }
    HttpResponse::Ok().json(json!([
        project(1, "Lekki duplex"),
        project(2, "Ikoyi penthouse")
    ]))
}

async fn create_project(
    backend: web::Data<Backend>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Err(response) = backend.authenticate(&req) {
        return response;
    }
    match body["name"].as_str() {
        Some(name) if !name.trim().is_empty() => HttpResponse::Created().json(project(3, name)),
        _ => HttpResponse::BadRequest().json(json!({
            "name": ["This field may not be blank."]
        })),
    }
}

async fn delete_project(backend: web::Data<Backend>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = backend.authenticate(&req) {
        return response;
    }
    HttpResponse::NoContent().finish()
}

#[derive(Deserialize)]
struct TaskFilter {
    project: Option<i64>,
}

async fn list_tasks(
    backend: web::Data<Backend>,
    req: HttpRequest,
    filter: web::Query<TaskFilter>,
) -> HttpResponse {
    if let Err(response) = backend.authenticate(&req) {
        return response;
    }
    let tasks = vec![
        task(10, 1, "Order tiles", "todo"),
        task(11, 1, "Confirm lighting plan", "in_progress"),
        task(12, 2, "Hand over keys", "done"),
    ];
    let tasks: Vec<Value> = tasks
        .into_iter()
        .filter(|t| filter.project.map_or(true, |p| t["project"] == p))
        .collect();
    HttpResponse::Ok().json(tasks)
}

async fn list_artisans(backend: web::Data<Backend>, req: HttpRequest) -> HttpResponse {
    if let Err(response) = backend.authenticate(&req) {
        return response;
    }
    HttpResponse::Ok().json(json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [{
            "id": 4,
            "user_name": "Chidi Okeke",
            "business_name": "Okeke Joinery",
            "description": "Custom cabinetry",
            "services": [{"id": 2, "name": "Carpentry", "description": "", "icon": "hammer"}],
            "city": "Enugu",
            "state": "Enugu",
            "is_available": true,
            "average_rating": "4.50",
            "total_reviews": 12,
            "total_projects": 30,
            "hourly_rate": "25.00",
            "created_at": TIMESTAMP
        }]
    }))
}

async fn upload_item(
    backend: web::Data<Backend>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if let Err(response) = backend.authenticate(&req) {
        return response;
    }
    let multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .map_or(false, |ct| ct.starts_with("multipart/form-data"));
    if !multipart {
        return HttpResponse::UnsupportedMediaType().json(json!({
            "detail": "Unsupported media type in request."
        }));
    }
    backend
        .uploads
        .lock()
        .unwrap()
        .push((req.path().to_string(), body.to_vec()));
    HttpResponse::Created().json(json!({
        "id": 21,
        "moodboard": 5,
        "image": "http://127.0.0.1/media/moodboard_items/swatch.png",
        "title": "Swatch",
        "x": 100.0,
        "y": 100.0,
        "width": 200.0,
        "height": 200.0,
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP
    }))
}

async fn move_item(
    backend: web::Data<Backend>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    if let Err(response) = backend.authenticate(&req) {
        return response;
    }
    HttpResponse::Ok().json(json!({
        "id": 21,
        "moodboard": 5,
        "image": null,
        "x": body["x"],
        "y": body["y"],
        "width": 200.0,
        "height": 200.0,
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP
    }))
}

fn moodboard() -> Value {
    json!({
        "id": 5,
        "project": 1,
        "title": "Living room",
        "description": "Warm neutrals",
        "items": [],
        "items_count": 0,
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP
    })
}

fn moodboard_item() -> Value {
    json!({
        "id": 21,
        "moodboard": 5,
        "image": "http://127.0.0.1/media/moodboard_items/swatch.png",
        "x": 100.0,
        "y": 100.0,
        "width": 200.0,
        "height": 200.0,
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP
    })
}

fn service_category() -> Value {
    json!({"id": 2, "name": "Carpentry", "description": "Joinery and cabinets", "icon": "hammer"})
}

fn portfolio_item() -> Value {
    json!({
        "id": 8,
        "title": "Walnut kitchen",
        "description": "",
        "image": "http://127.0.0.1/media/portfolio/kitchen.jpg",
        "project_date": "2023-11-20",
        "client_name": "",
        "created_at": TIMESTAMP
    })
}

fn review() -> Value {
    json!({
        "id": 30,
        "artisan": 4,
        "reviewer": 1,
        "reviewer_name": "Ada Lovelace",
        "project": null,
        "rating": 5,
        "title": "Superb",
        "comment": "On time and tidy.",
        "professionalism": 5,
        "quality_of_work": 5,
        "timeliness": null,
        "communication": null,
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP
    })
}

fn artisan_profile() -> Value {
    json!({
        "id": 4,
        "user": 9,
        "user_name": "Chidi Okeke",
        "user_email": "chidi@example.com",
        "business_name": "Okeke Joinery",
        "services": [service_category()],
        "experience_level": "expert",
        "years_of_experience": 12,
        "city": "Enugu",
        "state": "Enugu",
        "is_available": true,
        "average_rating": "4.50",
        "hourly_rate": "25.00",
        "min_project_budget": null,
        "portfolio": [portfolio_item()],
        "reviews": [review()],
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP
    })
}

/// Overwrites fixture fields with the ones a JSON request body sent.
fn merged(mut fixture: Value, body: &[u8]) -> Value {
    if let (Some(target), Ok(Value::Object(sent))) = (
        fixture.as_object_mut(),
        serde_json::from_slice::<Value>(body),
    ) {
        for (key, value) in sent {
            if target.contains_key(&key) {
                target.insert(key, value);
            }
        }
    }
    fixture
}

/// Canned CRUD answers for the resources whose tests only check the request that was made.
async fn resource(backend: web::Data<Backend>, req: HttpRequest, body: web::Bytes) -> HttpResponse {
    backend.record(&req, &body);
    if let Err(response) = backend.check(&req) {
        return response;
    }
    let pattern = req.match_pattern().unwrap_or_default();
    let pattern = pattern.trim_start_matches("/api");
    let fixture = match pattern {
        "/projects/{id}/" => project(1, "Lekki duplex"),
        "/tasks/" | "/tasks/{id}/" => task(10, 1, "Order tiles", "todo"),
        "/moodboards/" | "/moodboards/{id}/" => moodboard(),
        "/moodboard-items/" | "/moodboard-items/{id}/" => moodboard_item(),
        "/service-categories/" => service_category(),
        "/artisans/" | "/artisans/{id}/" | "/artisans/my-profile/" => artisan_profile(),
        "/artisans/{id}/portfolio/" | "/portfolio/" | "/portfolio/{id}/" => portfolio_item(),
        "/artisans/{id}/reviews/" | "/reviews/" => review(),
        other => {
            return HttpResponse::NotFound().json(json!({
                "detail": format!("No route for {}", other)
            }))
        }
    };

    let method = req.method();
    if method == Method::DELETE {
        HttpResponse::NoContent().finish()
    } else if method == Method::POST {
        HttpResponse::Created().json(merged(fixture, &body))
    } else if method == Method::PATCH {
        HttpResponse::Ok().json(merged(fixture, &body))
    } else if pattern.ends_with("{id}/") || pattern == "/artisans/my-profile/" {
        HttpResponse::Ok().json(fixture)
    } else {
        HttpResponse::Ok().json(json!([fixture]))
    }
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/login/", web::post().to(login))
        .route("/auth/refresh/", web::post().to(refresh))
        .route("/users/", web::post().to(register))
        .route("/users/me/", web::get().to(me))
        .route("/projects/", web::get().to(list_projects))
        .route("/projects/", web::post().to(create_project))
        .route("/projects/{id}/", web::delete().to(delete_project))
        .route("/projects/{id}/", web::get().to(resource))
        .route("/projects/{id}/", web::patch().to(resource))
        .route("/tasks/", web::get().to(list_tasks))
        .route("/tasks/", web::post().to(resource))
        .route("/tasks/{id}/", web::patch().to(resource))
        .route("/tasks/{id}/", web::delete().to(resource))
        .route("/moodboards/", web::get().to(resource))
        .route("/moodboards/", web::post().to(resource))
        .route("/moodboards/{id}/", web::get().to(resource))
        .route("/moodboards/{id}/", web::patch().to(resource))
        .route("/moodboards/{id}/", web::delete().to(resource))
        .route("/moodboard-items/", web::get().to(resource))
        .route("/moodboard-items/", web::post().to(upload_item))
        .route("/moodboard-items/{id}/", web::patch().to(move_item))
        .route("/moodboard-items/{id}/", web::delete().to(resource))
        .route("/service-categories/", web::get().to(resource))
        .route("/artisans/", web::get().to(list_artisans))
        .route("/artisans/", web::post().to(resource))
        .route("/artisans/my-profile/", web::get().to(resource))
        .route("/artisans/{id}/", web::get().to(resource))
        .route("/artisans/{id}/", web::patch().to(resource))
        .route("/artisans/{id}/portfolio/", web::get().to(resource))
        .route("/artisans/{id}/reviews/", web::get().to(resource))
        .route("/portfolio/", web::get().to(resource))
        .route("/portfolio/", web::post().to(resource))
        .route("/portfolio/{id}/", web::delete().to(resource))
        .route("/reviews/", web::get().to(resource))
        .route("/reviews/", web::post().to(resource));
}

/// Starts the mock backend on an ephemeral port and returns its state and `/api` base URL.
pub fn spawn_backend() -> (Arc<Backend>, String) {
    let backend = Arc::new(Backend::default());
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind mock backend");
    let port = listener.local_addr().unwrap().port();

    let state = web::Data::from(backend.clone());
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(web::scope("/api").configure(routes))
    })
    .workers(1)
    .disable_signals()
    .listen(listener)
    .expect("Failed to listen")
    .run();
    actix_rt::spawn(server);

    (backend, format!("http://127.0.0.1:{}/api", port))
}

pub fn config_for(api_url: &str) -> ClientConfig {
    ClientConfig {
        api_url: api_url.to_string(),
        timeout_secs: 5,
        ..ClientConfig::default()
    }
}

/// A client with in-memory credentials pointed at a fresh mock backend.
pub fn client() -> (Arc<Backend>, ApiClient) {
    let (backend, api_url) = spawn_backend();
    let client = ApiClient::new(config_for(&api_url), MemoryTokenStore::new())
        .expect("Failed to build client");
    (backend, client)
}

/// Like [`client`], with a valid token pair already stored.
pub fn logged_in_client() -> (Arc<Backend>, ApiClient) {
    let (backend, client) = client();
    client
        .session()
        .store(TokenPair::new(backend.issue("access"), backend.issue("refresh")))
        .expect("Failed to store tokens");
    (backend, client)
}
