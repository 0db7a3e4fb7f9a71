use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;

use crate::access::RouteGuard;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Whoever is looking at the page. Resolved once per request by asking the
/// backend whether the session cookie's token is still good.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Viewer {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    /// A cookie was sent but the backend no longer accepts it.
    pub fn has_stale_token(&self) -> bool {
        self.token.is_some() && self.user.is_none()
    }

    /// Token and user together, or the guard's rejection.
    fn require(self, guard: RouteGuard) -> Result<(String, User), AppError> {
        guard.decide(self.user.as_ref()).into_result()?;
        match (self.token, self.user) {
            (Some(token), Some(user)) => Ok((token, user)),
            _ => Err(AppError::Unauthorized),
        }
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(viewer) = parts.extensions.get::<Viewer>() {
            return Ok(viewer.clone());
        }

        let token = cookie_value(parts, &state.config.auth.cookie_name)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let user = match token.as_deref() {
            Some(token) => {
                let status = state.api.auth().check(Some(token)).await;
                if status.is_authenticated {
                    status.user
                } else {
                    None
                }
            }
            None => None,
        };

        let viewer = Viewer { token, user };
        parts.extensions.insert(viewer.clone());
        Ok(viewer)
    }
}

/// A signed-in user. Signed-out requests are sent to `/login`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub token: String,
    pub user: User,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let viewer = Viewer::from_request_parts(parts, state).await?;
        let (token, user) = viewer.require(RouteGuard::User)?;
        Ok(CurrentUser { token, user })
    }
}

/// A signed-in admin. Other users are sent home.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub token: String,
    pub user: User,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let viewer = Viewer::from_request_parts(parts, state).await?;
        let (token, user) = viewer.require(RouteGuard::Admin)?;
        Ok(AdminUser { token, user })
    }
}

/// Key the contact rate limiter uses for a client: the peer address, or
/// the first forwarded address when `server.behind_proxy` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

impl ClientKey {
    fn from_parts(parts: &Parts, behind_proxy: bool) -> Self {
        if behind_proxy {
            let forwarded = parts
                .headers
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.split(',').next())
                .map(str::trim)
                .filter(|h| !h.is_empty());
            if let Some(addr) = forwarded {
                return ClientKey(addr.to_string());
            }
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        ClientKey(peer)
    }
}

impl FromRequestParts<AppState> for ClientKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientKey::from_parts(parts, state.config.server.behind_proxy))
    }
}

pub fn cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}

pub fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

pub fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}
