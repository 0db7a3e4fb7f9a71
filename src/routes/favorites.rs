use axum::extract::State;
use axum::response::Redirect;
use axum::Form;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::models::FavoriteKind;
use crate::routes::views::safe_return_path;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub id: String,
    #[serde(default)]
    pub back: Option<String>,
}

/// POST /favorites/toggle
pub async fn toggle(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(form): Form<ToggleForm>,
) -> AppResult<Redirect> {
    let now_favorite = state
        .api
        .users()
        .toggle_favorite(&form.id, FavoriteKind::Photo, &current.token)
        .await?;
    tracing::info!(photo = %form.id, favorite = now_favorite, "Toggled favorite");

    let fallback = format!("/photo/{}", form.id);
    let back = form.back.as_deref().unwrap_or(&fallback);
    Ok(Redirect::to(safe_return_path(back)))
}
