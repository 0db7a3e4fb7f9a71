//! Typed client for the portfolio REST backend.
//!
//! `ApiClient` carries the conventions every resource shares (pagination,
//! tag and search filters, bearer tokens, error bodies). `ResourceApi`
//! layers the generic CRUD calls on top of it for photos and albums.

pub mod albums;
pub mod auth;
pub mod photos;
pub mod users;

use std::marker::PhantomData;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::models::{record_from_value, Page};

pub use albums::{AlbumDraft, AlbumsApi};
pub use auth::AuthApi;
pub use photos::{ImageUpload, NewPhoto, PhotoUpdate, PhotosApi};
pub use users::{ProfileField, UserApi};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Network(String),

    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Invalid backend URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        match self {
            ApiError::Transport(e) => e.status().is_none(),
            _ => false,
        }
    }
}

/// Shared HTTP plumbing for every backend resource.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        // Validate early so a typo in config fails at startup.
        url::Url::parse(base_url)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Paths are appended to the base URL as-is so a base with a path
    /// prefix keeps it.
    pub fn endpoint(&self, path: &str) -> Result<url::Url, ApiError> {
        Ok(url::Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    /// `path` followed by `segments`, each percent-encoded as a single path
    /// segment. Ids come from page urls and forms, so `/` and `..` inside
    /// them must not reach another endpoint.
    pub fn endpoint_with(&self, path: &str, segments: &[&str]) -> Result<url::Url, ApiError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::Status {
                status: 404,
                message: format!("Invalid id \"{}\"", bad),
            });
        }
        let mut endpoint = self.endpoint(path)?;
        endpoint
            .path_segments_mut()
            .map_err(|()| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .extend(segments);
        Ok(endpoint)
    }

    pub fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self.request_url(method, self.endpoint(path)?, token))
    }

    pub fn request_url(&self, method: Method, url: url::Url, token: Option<&str>) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub fn photos(&self) -> PhotosApi {
        PhotosApi::new(self.clone())
    }

    pub fn albums(&self) -> AlbumsApi {
        AlbumsApi::new(self.clone())
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    pub fn users(&self) -> UserApi {
        UserApi::new(self.clone())
    }
}

/// Pull a human-readable message out of an error body shaped
/// `{"message": ...}` or `{"errors": [{"msg"|"message": ...}]}`.
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        if !message.is_empty() {
            return Some(message.to_string());
        }
    }
    let errors = value.get("errors")?.as_array()?;
    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|e| {
            e.get("msg")
                .and_then(Value::as_str)
                .or_else(|| e.get("message").and_then(Value::as_str))
        })
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(", "))
    }
}

/// Turn a non-success response into `ApiError::Status`.
/// `action` reads like "fetch photos" or "delete album".
pub async fn ensure_success(response: Response, action: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        format!(
            "Failed to {}: {} {}",
            action,
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
        .trim_end()
        .to_string()
    });
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

pub async fn read_value(response: Response, action: &str) -> Result<Value, ApiError> {
    let response = ensure_success(response, action).await?;
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

pub async fn read_json<T: DeserializeOwned>(response: Response, action: &str) -> Result<T, ApiError> {
    let value = read_value(response, action).await?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pagination and filter parameters for listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u32,
    pub page: u32,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn page(limit: u32, page: u32) -> Self {
        Self {
            limit,
            page: page.max(1),
            tag: None,
            search: None,
        }
    }

    /// Blank tags are dropped; the rest are trimmed.
    pub fn with_tag(mut self, tag: &str) -> Self {
        let tag = tag.trim();
        self.tag = (!tag.is_empty()).then(|| tag.to_string());
        self
    }

    pub fn with_search(mut self, term: &str) -> Self {
        self.search = Some(term.trim().to_string());
        self
    }

    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("page", self.page.to_string()),
        ];
        if let Some(tag) = &self.tag {
            pairs.push(("tag", tag.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

/// A backend collection with the shared CRUD conventions.
pub trait Resource: DeserializeOwned + Send + 'static {
    /// Collection path, e.g. `/api/photos`.
    const PATH: &'static str;
    const NAME: &'static str;
    const PLURAL: &'static str;
}

/// Generic CRUD calls for one resource.
pub struct ResourceApi<R> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> ResourceApi<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn item(&self, method: Method, id: &str, token: Option<&str>) -> Result<RequestBuilder, ApiError> {
        let url = self.client.endpoint_with(R::PATH, &[id])?;
        Ok(self.client.request_url(method, url, token))
    }

    async fn fetch_page(&self, path: &str, query: &ListQuery, action: &str) -> Result<Page<R>, ApiError> {
        let response = self
            .client
            .request(Method::GET, path, None)?
            .query(&query.pairs())
            .send()
            .await?;
        let value = read_value(response, action).await?;
        Page::from_value(value, R::PLURAL).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<R>, ApiError> {
        let action = if query.search.is_some() {
            format!("search {}", R::PLURAL)
        } else {
            format!("fetch {}", R::PLURAL)
        };
        self.fetch_page(R::PATH, query, &action)
            .await
            .inspect_err(|e| tracing::error!("Error fetching {}: {}", R::PLURAL, e))
    }

    pub async fn get_all(&self, limit: u32, page: u32) -> Result<Page<R>, ApiError> {
        self.list(&ListQuery::page(limit, page)).await
    }

    pub async fn get_featured(&self, limit: u32, page: u32) -> Result<Page<R>, ApiError> {
        let path = format!("{}/featured", R::PATH);
        let action = format!("fetch featured {}", R::PLURAL);
        self.fetch_page(&path, &ListQuery::page(limit, page), &action)
            .await
            .inspect_err(|e| tracing::error!("Error fetching featured {}: {}", R::PLURAL, e))
    }

    pub async fn get_by_tag(&self, tag: &str, limit: u32, page: u32) -> Result<Page<R>, ApiError> {
        self.list(&ListQuery::page(limit, page).with_tag(tag)).await
    }

    pub async fn search(&self, term: &str, limit: u32, page: u32) -> Result<Page<R>, ApiError> {
        self.list(&ListQuery::page(limit, page).with_search(term)).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<R, ApiError> {
        let response = self
            .item(Method::GET, id, None)?
            .send()
            .await?;
        let value = read_value(response, &format!("fetch {}", R::NAME))
            .await
            .inspect_err(|e| tracing::error!("Error fetching {} {}: {}", R::NAME, id, e))?;
        record_from_value(value, R::NAME).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B, token: &str) -> Result<R, ApiError> {
        let request = self
            .client
            .request(Method::POST, R::PATH, Some(token))?
            .json(body);
        self.send_record(request, "create").await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &str,
        body: &B,
        token: &str,
    ) -> Result<R, ApiError> {
        let request = self
            .item(Method::PUT, id, Some(token))?
            .json(body);
        self.send_record(request, "update").await
    }

    pub async fn create_multipart(
        &self,
        form: reqwest::multipart::Form,
        token: &str,
    ) -> Result<R, ApiError> {
        let request = self
            .client
            .request(Method::POST, R::PATH, Some(token))?
            .multipart(form);
        self.send_record(request, "create").await
    }

    pub async fn update_multipart(
        &self,
        id: &str,
        form: reqwest::multipart::Form,
        token: &str,
    ) -> Result<R, ApiError> {
        let request = self
            .item(Method::PUT, id, Some(token))?
            .multipart(form);
        self.send_record(request, "update").await
    }

    pub async fn delete(&self, id: &str, token: &str) -> Result<(), ApiError> {
        let response = self
            .item(Method::DELETE, id, Some(token))?
            .send()
            .await?;
        ensure_success(response, &format!("delete {}", R::NAME))
            .await
            .inspect_err(|e| tracing::error!("Error deleting {} {}: {}", R::NAME, id, e))?;
        tracing::info!("Deleted {} {}", R::NAME, id);
        Ok(())
    }

    async fn send_record(&self, request: RequestBuilder, verb: &str) -> Result<R, ApiError> {
        let action = format!("{} {}", verb, R::NAME);
        let response = request.send().await?;
        let value = read_value(response, &action)
            .await
            .inspect_err(|e| tracing::error!("Error {}: {}", action, e))?;
        record_from_value(value, R::NAME).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
