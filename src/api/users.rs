use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{read_json, read_value, ApiClient, ApiError};
use crate::models::{record_from_value, FavoriteKind, MessageResponse, Page, Photo, User};

const USERS_PATH: &str = "/api/users";

/// Profile fields that can be edited one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
    Username,
    ProfilePicture,
}

impl ProfileField {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "firstName" => Some(ProfileField::FirstName),
            "lastName" => Some(ProfileField::LastName),
            "username" => Some(ProfileField::Username),
            "profilePicture" => Some(ProfileField::ProfilePicture),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::FirstName => "firstName",
            ProfileField::LastName => "lastName",
            ProfileField::Username => "username",
            ProfileField::ProfilePicture => "profilePicture",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            ProfileField::FirstName => "/me/firstname",
            ProfileField::LastName => "/me/lastname",
            ProfileField::Username => "/me/username",
            ProfileField::ProfilePicture => "/me/profilePicture",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ProfileField::FirstName => "first name",
            ProfileField::LastName => "last name",
            ProfileField::Username => "username",
            ProfileField::ProfilePicture => "profile picture",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteStatus {
    #[serde(default)]
    is_favorited: bool,
}

/// Calls on the signed-in user's own account. Every call needs a token.
#[derive(Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn me(&self, token: &str) -> Result<User, ApiError> {
        let value = self.send(Method::GET, "/me", token, None, &[], "get user").await?;
        record_from_value(value, "user").map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn update_field(
        &self,
        field: ProfileField,
        value: &str,
        token: &str,
    ) -> Result<MessageResponse, ApiError> {
        let body = json!({ field.key(): value });
        let action = format!("update {}", field.label());
        let value = self
            .send(Method::PUT, field.path(), token, Some(body), &[], &action)
            .await?;
        tracing::info!("Updated {}", field.label());
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    pub async fn update_first_name(&self, first_name: &str, token: &str) -> Result<MessageResponse, ApiError> {
        self.update_field(ProfileField::FirstName, first_name, token).await
    }

    pub async fn update_last_name(&self, last_name: &str, token: &str) -> Result<MessageResponse, ApiError> {
        self.update_field(ProfileField::LastName, last_name, token).await
    }

    pub async fn update_username(&self, username: &str, token: &str) -> Result<MessageResponse, ApiError> {
        self.update_field(ProfileField::Username, username, token).await
    }

    pub async fn update_profile_picture(&self, url: &str, token: &str) -> Result<MessageResponse, ApiError> {
        self.update_field(ProfileField::ProfilePicture, url, token).await
    }

    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
        token: &str,
    ) -> Result<MessageResponse, ApiError> {
        let body = json!({ "currentPassword": current_password, "newPassword": new_password });
        let value = self
            .send(Method::PUT, "/me/password", token, Some(body), &[], "update password")
            .await?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    pub async fn favorites(&self, kind: FavoriteKind, token: &str) -> Result<Vec<Photo>, ApiError> {
        let value = self
            .send(
                Method::GET,
                "/me/favorites",
                token,
                None,
                &[("type", kind.as_str())],
                "get favorites",
            )
            .await?;
        let page: Page<Photo> =
            Page::from_value(value, "favorites").map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(page.items)
    }

    pub async fn is_favorited(&self, id: &str, kind: FavoriteKind, token: &str) -> Result<bool, ApiError> {
        let url = self.favorite_url(id)?;
        let response = self
            .client
            .request_url(Method::GET, url, Some(token))
            .query(&[("type", kind.as_str())])
            .send()
            .await?;
        let status: FavoriteStatus = read_json(response, "check favorite status").await?;
        Ok(status.is_favorited)
    }

    pub async fn add_favorite(&self, id: &str, kind: FavoriteKind, token: &str) -> Result<MessageResponse, ApiError> {
        let body = json!({ "id": id, "type": kind.as_str() });
        let value = self
            .send(Method::PUT, "/me/favorites", token, Some(body), &[], "add to favorites")
            .await?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    pub async fn remove_favorite(&self, id: &str, kind: FavoriteKind, token: &str) -> Result<MessageResponse, ApiError> {
        let url = self.favorite_url(id)?;
        let value = self
            .send_to(
                Method::DELETE,
                url,
                token,
                None,
                &[("type", kind.as_str())],
                "remove from favorites",
            )
            .await?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    /// Flip the favorite state; returns whether the item is now a favorite.
    pub async fn toggle_favorite(&self, id: &str, kind: FavoriteKind, token: &str) -> Result<bool, ApiError> {
        if self.is_favorited(id, kind, token).await? {
            self.remove_favorite(id, kind, token).await?;
            Ok(false)
        } else {
            self.add_favorite(id, kind, token).await?;
            Ok(true)
        }
    }

    fn favorite_url(&self, id: &str) -> Result<url::Url, ApiError> {
        self.client
            .endpoint_with(&format!("{}/me/favorites", USERS_PATH), &[id])
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<Value>,
        query: &[(&str, &str)],
        action: &str,
    ) -> Result<Value, ApiError> {
        let url = self.client.endpoint(&format!("{}{}", USERS_PATH, path))?;
        self.send_to(method, url, token, body, query, action).await
    }

    async fn send_to(
        &self,
        method: Method,
        url: url::Url,
        token: &str,
        body: Option<Value>,
        query: &[(&str, &str)],
        action: &str,
    ) -> Result<Value, ApiError> {
        let mut request = self.client.request_url(method, url, Some(token));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        read_value(response, action)
            .await
            .inspect_err(|e| tracing::error!("Failed to {}: {}", action, e))
    }
}
