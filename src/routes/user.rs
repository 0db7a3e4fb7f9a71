use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::api::ProfileField;
use crate::extractors::CurrentUser;
use crate::forms::{PasswordForm, ProfileFieldForm};
use crate::models::{FavoriteKind, Role, User};
use crate::routes::home::Html;
use crate::routes::views::{error_page, photo_cards, Nav, PhotoCard};
use crate::state::AppState;

/// One editable line of personal information.
#[derive(Debug, Clone)]
pub struct FieldRow {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub editing: bool,
}

#[derive(Template)]
#[template(path = "pages/user.html")]
pub struct UserTemplate {
    pub nav: Nav,
    pub display_name: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub picture: String,
    pub editing_picture: bool,
    pub fields: Vec<FieldRow>,
    pub favorites: Vec<PhotoCard>,
    pub favorites_error: String,
    pub success: String,
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileParams {
    #[serde(default)]
    pub edit: Option<String>,
}

fn field_value(user: &User, field: ProfileField) -> String {
    match field {
        ProfileField::FirstName => user.first_name.clone(),
        ProfileField::LastName => user.last_name.clone(),
        ProfileField::Username => user.username.clone(),
        ProfileField::ProfilePicture => user.profile_picture.clone().unwrap_or_default(),
    }
}

impl UserTemplate {
    fn new(user: &User, editing: Option<ProfileField>) -> Self {
        let fields = [
            (ProfileField::FirstName, "First Name"),
            (ProfileField::LastName, "Last Name"),
            (ProfileField::Username, "Username"),
        ]
        .into_iter()
        .map(|(field, label)| FieldRow {
            key: field.key(),
            label,
            value: field_value(user, field),
            editing: editing == Some(field),
        })
        .collect();

        Self {
            nav: Nav::for_user(Some(user), "user"),
            display_name: user.display_name(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: match user.role {
                Role::Admin => "Administrator".to_string(),
                Role::User => "Member".to_string(),
            },
            picture: user.profile_picture.clone().unwrap_or_default(),
            editing_picture: editing == Some(ProfileField::ProfilePicture),
            fields,
            favorites: Vec::new(),
            favorites_error: String::new(),
            success: String::new(),
            error: String::new(),
        }
    }
}

/// Fresh profile plus favorites. Falls back to the session's copy of the
/// user when the profile call fails.
async fn render(
    state: &AppState,
    current: &CurrentUser,
    editing: Option<ProfileField>,
    success: String,
    error: String,
) -> Response {
    let users = state.api.users();
    let (user, favorites) = tokio::join!(
        users.me(&current.token),
        users.favorites(FavoriteKind::Photo, &current.token),
    );
    let user = match user {
        Ok(user) => user,
        Err(e) if error.is_empty() && success.is_empty() => {
            tracing::error!("Error loading user: {}", e);
            return error_page(
                StatusCode::BAD_GATEWAY,
                Nav::for_user(Some(&current.user), "user"),
                "Failed to load user data",
                "/user",
            );
        }
        Err(e) => {
            tracing::warn!("Error reloading user: {}", e);
            current.user.clone()
        }
    };

    let mut page = UserTemplate::new(&user, editing);
    match favorites {
        Ok(list) => page.favorites = photo_cards(&list),
        Err(e) => page.favorites_error = format!("Favorites unavailable: {}", e),
    }
    let status = if error.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    page.success = success;
    page.error = error;
    (status, Html(page)).into_response()
}

/// GET /user
pub async fn profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(params): Query<ProfileParams>,
) -> Response {
    let editing = params.edit.as_deref().and_then(ProfileField::parse);
    render(&state, &current, editing, String::new(), String::new()).await
}

/// POST /user/field
pub async fn update_field(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(form): Form<ProfileFieldForm>,
) -> Response {
    let Some(field) = ProfileField::parse(&form.field) else {
        return render(&state, &current, None, String::new(), "Invalid field".to_string()).await;
    };
    let users = state.api.users();
    let value = form.value.trim();
    let result = match field {
        ProfileField::FirstName => users.update_first_name(value, &current.token).await,
        ProfileField::LastName => users.update_last_name(value, &current.token).await,
        ProfileField::Username => users.update_username(value, &current.token).await,
        ProfileField::ProfilePicture => users.update_profile_picture(value, &current.token).await,
    };
    match result {
        Ok(response) => {
            let message = response
                .message
                .unwrap_or_else(|| "Profile updated successfully".to_string());
            render(&state, &current, None, message, String::new()).await
        }
        Err(e) => render(&state, &current, Some(field), String::new(), e.to_string()).await,
    }
}

/// POST /user/password
pub async fn update_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(form): Form<PasswordForm>,
) -> Response {
    if let Err(message) = form.validate() {
        return render(&state, &current, None, String::new(), message).await;
    }
    let result = state
        .api
        .users()
        .update_password(&form.current_password, &form.new_password, &current.token)
        .await;
    match result {
        Ok(response) => {
            let message = response
                .message
                .unwrap_or_else(|| "Password updated successfully".to_string());
            render(&state, &current, None, message, String::new()).await
        }
        Err(e) => render(&state, &current, None, String::new(), e.to_string()).await,
    }
}
