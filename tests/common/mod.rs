//! In-process stand-in for the portfolio backend plus helpers for driving
//! the router without a socket.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;

use folio::api::ApiClient;
use folio::config::Config;
use folio::contact::{MailError, Mailer};
use folio::forms::ContactForm;
use folio::state::AppState;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_TOKEN: &str = "user-token";
pub const PASSWORD: &str = "Secret123";

/// Calls the fake backend received, as "METHOD path".
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, call: &str) -> bool {
        self.calls().iter().any(|c| c == call)
    }
}

pub fn photo(id: &str, title: &str, tags: &[&str]) -> Value {
    json!({
        "_id": id,
        "title": title,
        "description": format!("{} description", title),
        "tags": tags,
        "imageUrl": format!("https://cdn.example/{}.jpg", id),
        "thumbnailUrl": format!("https://cdn.example/{}_thumb.jpg", id),
        "isFeatured": true,
        "metadata": {
            "photographer": "Vivian Maier",
            "originalWidth": 4000,
            "originalHeight": 3000,
            "originalSizeKB": 2048.0,
            "sizeKB": 512.0,
            "format": "image/jpeg"
        },
        "createdAt": "2024-03-09T14:05:00Z"
    })
}

pub fn album(id: &str, title: &str, photos: Value) -> Value {
    json!({
        "_id": id,
        "title": title,
        "description": "Streets after rain",
        "tags": ["street"],
        "coverImageUrl": "https://cdn.example/cover.jpg",
        "photos": photos,
        "isFeatured": true,
        "createdAt": "2024-01-02T08:00:00Z"
    })
}

fn user_json(token: &str) -> Option<Value> {
    match token {
        ADMIN_TOKEN => Some(json!({
            "_id": "u-admin",
            "firstName": "Ada",
            "lastName": "Admin",
            "username": "ada",
            "email": "ada@example.com",
            "role": "admin",
            "favorites": []
        })),
        USER_TOKEN => Some(json!({
            "_id": "u-user",
            "firstName": "Uma",
            "lastName": "User",
            "username": "uma",
            "email": "uma@example.com",
            "role": "user",
            "favorites": [{ "item": "p1", "type": "photo" }, "garbage"]
        })),
        _ => None,
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Not authorized" })),
    )
        .into_response()
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    search: Option<String>,
}

impl ListQuery {
    /// Tag must match exactly, search is a case-insensitive title match.
    fn keep(&self, item: &Value) -> bool {
        let tag_ok = self.tag.as_deref().map_or(true, |tag| {
            item["tags"]
                .as_array()
                .is_some_and(|tags| tags.iter().any(|t| t == tag))
        });
        let search_ok = self.search.as_deref().map_or(true, |term| {
            item["title"]
                .as_str()
                .is_some_and(|title| title.to_lowercase().contains(&term.to_lowercase()))
        });
        tag_ok && search_ok
    }
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

/// Three pages of photos, one album, two known users.
pub fn backend(log: CallLog) -> Router {
    let l = log.clone();
    let check = move |headers: HeaderMap| {
        let log = l.clone();
        async move {
            log.push("GET /api/auth/check");
            match bearer(&headers).as_deref().and_then(user_json) {
                Some(user) => Json(json!({ "isAuthenticated": true, "user": user })).into_response(),
                None => unauthorized(),
            }
        }
    };

    let login = |Json(body): Json<LoginBody>| async move {
        if body.password == PASSWORD {
            let token = if body.email.starts_with("ada") { ADMIN_TOKEN } else { USER_TOKEN };
            Json(json!({ "token": token, "user": user_json(token) })).into_response()
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid credentials" })),
            )
                .into_response()
        }
    };

    let photos = |Query(q): Query<ListQuery>| async move {
        let page = q.page.unwrap_or(1);
        let items: Vec<Value> = [
            photo("p1", "Salt Flats", &["bolivia", "desert"]),
            photo("p2", "Harbour Fog", &["sea"]),
        ]
        .into_iter()
        .filter(|p| q.keep(p))
        .collect();
        Json(json!({ "photos": items, "totalPages": 3, "currentPage": page }))
    };

    let featured_photos = || async { Json(json!({ "photos": [photo("p1", "Salt Flats", &["bolivia"])] })) };

    let l = log.clone();
    let get_photo = move |Path(id): Path<String>| {
        let log = l.clone();
        async move {
            log.push(format!("GET /api/photos/{}", id));
            match id.as_str() {
                "p1" => Json(json!({ "photo": photo("p1", "Salt Flats", &["bolivia", "desert"]) })).into_response(),
                "p2" => Json(photo("p2", "Harbour Fog", &["sea"])).into_response(),
                _ => (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "message": "Photo not found" })),
                )
                    .into_response(),
            }
        }
    };

    let l = log.clone();
    let delete_photo = move |Path(id): Path<String>, headers: HeaderMap| {
        let log = l.clone();
        async move {
            if bearer(&headers).as_deref() != Some(ADMIN_TOKEN) {
                return unauthorized();
            }
            log.push(format!("DELETE /api/photos/{}", id));
            Json(json!({ "message": "Photo deleted" })).into_response()
        }
    };

    let l = log.clone();
    let create_photo = move |headers: HeaderMap, mut multipart: Multipart| {
        let log = l.clone();
        async move {
            if bearer(&headers).as_deref() != Some(ADMIN_TOKEN) {
                return unauthorized();
            }
            let mut fields = Vec::new();
            let mut title = String::new();
            while let Ok(Some(field)) = multipart.next_field().await {
                let name = field.name().unwrap_or_default().to_string();
                let data = field.bytes().await.unwrap_or_default();
                if name == "title" {
                    title = String::from_utf8_lossy(&data).to_string();
                }
                fields.push(name);
            }
            log.push(format!("POST /api/photos {}", fields.join(",")));
            (
                StatusCode::CREATED,
                Json(json!({ "photo": photo("p-new", &title, &[]) })),
            )
                .into_response()
        }
    };

    let albums = |Query(q): Query<ListQuery>| async move {
        let page = q.page.unwrap_or(1);
        let items: Vec<Value> = [album("a1", "Night Walks", json!(["p1", "p2"]))]
            .into_iter()
            .filter(|a| q.keep(a))
            .collect();
        Json(json!({ "albums": items, "totalPages": 1, "currentPage": page }))
    };

    let l = log.clone();
    let create_album = move |headers: HeaderMap, Json(body): Json<Value>| {
        let log = l.clone();
        async move {
            if bearer(&headers).as_deref() != Some(ADMIN_TOKEN) {
                return unauthorized();
            }
            log.push(format!("POST /api/albums cover={}", body["coverImageUrl"]));
            log.push(format!("POST /api/albums photos={}", body["photos"]));
            let title = body["title"].as_str().unwrap_or_default();
            (
                StatusCode::CREATED,
                Json(json!({ "album": album("a-new", title, body["photos"].clone()) })),
            )
                .into_response()
        }
    };

    let l = log.clone();
    let update_album = move |Path(id): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
        let log = l.clone();
        async move {
            if bearer(&headers).as_deref() != Some(ADMIN_TOKEN) {
                return unauthorized();
            }
            log.push(format!("PUT /api/albums/{} photos={}", id, body["photos"]));
            let title = body["title"].as_str().unwrap_or_default();
            Json(json!({ "album": album(&id, title, body["photos"].clone()) })).into_response()
        }
    };

    let featured_albums = || async {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
    };

    let get_album = |Path(id): Path<String>| async move {
        match id.as_str() {
            "a1" => Json(json!({ "album": album("a1", "Night Walks", json!(["p1", "missing"])) })).into_response(),
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Album not found" })),
            )
                .into_response(),
        }
    };

    let full_image = |Path(id): Path<String>| async move {
        if id == "p1" {
            (
                [(header::CONTENT_TYPE, "image/jpeg")],
                b"\xff\xd8full-resolution".to_vec(),
            )
                .into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        }
    };

    let me = |headers: HeaderMap| async move {
        match bearer(&headers).as_deref().and_then(user_json) {
            Some(user) => Json(json!({ "user": user })).into_response(),
            None => unauthorized(),
        }
    };

    let favorites = |headers: HeaderMap| async move {
        match bearer(&headers).as_deref() {
            Some(USER_TOKEN) => Json(json!({ "favorites": [photo("p1", "Salt Flats", &[])] })).into_response(),
            Some(ADMIN_TOKEN) => Json(json!({ "favorites": [] })).into_response(),
            _ => unauthorized(),
        }
    };

    let is_favorited = |Path(id): Path<String>| async move {
        Json(json!({ "isFavorited": id == "p1" }))
    };

    let l = log.clone();
    let add_favorite = move |Json(body): Json<Value>| {
        let log = l.clone();
        async move {
            log.push(format!("PUT /api/users/me/favorites {}", body["id"].as_str().unwrap_or_default()));
            Json(json!({ "message": "Added to favorites" }))
        }
    };

    let l = log.clone();
    let remove_favorite = move |Path(id): Path<String>| {
        let log = l.clone();
        async move {
            log.push(format!("DELETE /api/users/me/favorites/{}", id));
            Json(json!({ "message": "Removed from favorites" }))
        }
    };

    Router::new()
        .route("/api/auth/check", get(check))
        .route("/api/auth/login", post(login))
        .route("/api/photos", get(photos).post(create_photo))
        .route("/api/photos/featured", get(featured_photos))
        .route("/api/photos/{id}", get(get_photo).delete(delete_photo))
        .route("/api/photos/{id}/full", get(full_image))
        .route("/api/albums", get(albums).post(create_album))
        .route("/api/albums/featured", get(featured_albums))
        .route("/api/albums/{id}", get(get_album).put(update_album))
        .route("/api/users/me", get(me))
        .route("/api/users/me/favorites", get(favorites).put(add_favorite))
        .route(
            "/api/users/me/favorites/{id}",
            get(is_favorited).delete(remove_favorite),
        )
}

/// Mailer that keeps what it was asked to send.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<ContactForm>>>,
    pub fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, form: &ContactForm) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Rejected {
                status: 503,
                body: "unavailable".into(),
            });
        }
        self.sent.lock().unwrap().push(form.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    /// Client pointed at the fake backend.
    pub api: ApiClient,
    pub log: CallLog,
    pub mailer: RecordingMailer,
}

impl TestApp {
    pub async fn start() -> Self {
        Self::with_mailer(RecordingMailer::default()).await
    }

    pub async fn with_mailer(mailer: RecordingMailer) -> Self {
        Self::configured(mailer, |_| {}).await
    }

    /// Like `with_mailer`, with a chance to adjust the config first.
    pub async fn configured(mailer: RecordingMailer, configure: impl FnOnce(&mut Config)) -> Self {
        let log = CallLog::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let backend = backend(log.clone());
        tokio::spawn(async move {
            axum::serve(listener, backend).await.unwrap();
        });

        let mut config = Config::default();
        config.api.base_url = format!("http://{}", addr);
        configure(&mut config);
        let api = ApiClient::new(&config.api.base_url, Duration::from_secs(5)).unwrap();
        let state = AppState::with_mailer(config, api.clone(), Arc::new(mailer.clone()));

        TestApp {
            router: folio::routes::router(state),
            api,
            log,
            mailer,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        self.send(request("GET", uri, token).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_form(&self, uri: &str, token: Option<&str>, body: &str) -> Response {
        let request = request("POST", uri, token)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::COOKIE, format!("folio_token={}", token)),
        None => builder,
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

pub fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
