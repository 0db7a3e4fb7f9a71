use reqwest::Method;
use serde::Serialize;

use super::{read_json, ApiClient, ApiError};
use crate::models::{AuthSession, AuthStatus};

const AUTH_PATH: &str = "/api/auth";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, ApiError> {
        let result = self
            .post_json("/login", &LoginRequest { email, password }, "log in")
            .await;
        result.map_err(|e| {
            network_hint(
                e,
                "Network error detected. Your login may have been successful, but the server did not respond correctly. Please check your account status before trying again.",
            )
        })
    }

    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<AuthSession, ApiError> {
        let result = self.post_json("/register", request, "register").await;
        result.map_err(|e| {
            network_hint(
                e,
                "Network error detected. Your account may have been created, but the server did not respond correctly. Please try logging in.",
            )
        })
    }

    /// Ask the backend whether `token` is still valid. Never fails: any
    /// problem yields a signed-out status carrying the reason.
    pub async fn check(&self, token: Option<&str>) -> AuthStatus {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return AuthStatus::signed_out(None);
        };
        let path = format!("{}/check", AUTH_PATH);
        let response = match self.client.request(Method::GET, &path, Some(token)) {
            Ok(request) => request.send().await.map_err(ApiError::from),
            Err(e) => Err(e),
        };
        let result = match response {
            Ok(response) => read_json::<AuthStatus>(response, "check authentication").await,
            Err(e) => Err(e),
        };
        match result {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Auth check failed: {}", e);
                AuthStatus::signed_out(Some(e.to_string()))
            }
        }
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        action: &str,
    ) -> Result<AuthSession, ApiError> {
        let path = format!("{}{}", AUTH_PATH, path);
        let response = self
            .client
            .request(Method::POST, &path, None)?
            .json(body)
            .send()
            .await?;
        read_json(response, action)
            .await
            .inspect_err(|e| tracing::error!("Failed to {}: {}", action, e))
    }
}

/// The request may have gone through even though we saw no response;
/// say so instead of surfacing a raw transport error.
fn network_hint(error: ApiError, hint: &str) -> ApiError {
    if error.is_transport() {
        ApiError::Network(hint.to_string())
    } else {
        error
    }
}
