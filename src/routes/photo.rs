use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::api::PhotoUpdate;
use crate::error::AppResult;
use crate::extractors::{AdminUser, Viewer};
use crate::forms::{FieldErrors, PhotoEditForm};
use crate::models::{FavoriteKind, Photo};
use crate::routes::home::Html;
use crate::routes::views::{compression_note, error_page, photo_info, InfoRow, Nav};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    #[serde(default)]
    pub edit: Option<String>,
    #[serde(default)]
    pub confirm: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/photo.html")]
pub struct PhotoTemplate {
    pub nav: Nav,
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub description: String,
    pub tags: Vec<String>,
    pub overlay: String,
    pub basic: Vec<InfoRow>,
    pub technical: Vec<InfoRow>,
    pub compression: String,
    pub can_favorite: bool,
    pub is_favorite: bool,
    pub is_admin: bool,
    pub editing: bool,
    pub confirm_delete: bool,
    pub form_title: String,
    pub form_description: String,
    pub form_tags: String,
    pub form_featured: bool,
    pub title_error: String,
    pub description_error: String,
    pub save_error: String,
}

impl PhotoTemplate {
    fn new(photo: &Photo, viewer: &Viewer) -> Self {
        let (basic, technical) = photo_info(photo);
        let overlay = photo
            .metadata
            .as_ref()
            .and_then(|m| {
                let dims = m.original_dimensions()?;
                let dims = dims.trim_end_matches(" px").to_string();
                Some(match m.original_size_kb {
                    Some(kb) if kb > 0.0 => format!("{} • {:.1} MB", dims, kb / 1024.0),
                    _ => dims,
                })
            })
            .unwrap_or_default();
        let is_favorite = viewer.user().is_some_and(|u| {
            u.favorites
                .iter()
                .any(|f| f.kind == FavoriteKind::Photo && f.item_id == photo.id)
        });

        Self {
            nav: Nav::new(viewer, "gallery"),
            id: photo.id.clone(),
            title: photo.title.clone(),
            image_url: photo.image_url.clone(),
            description: photo.description.clone().unwrap_or_default(),
            tags: photo.tags.clone(),
            overlay,
            basic,
            technical,
            compression: compression_note(photo),
            can_favorite: viewer.user().is_some(),
            is_favorite,
            is_admin: viewer.is_admin(),
            editing: false,
            confirm_delete: false,
            form_title: photo.title.clone(),
            form_description: photo.description.clone().unwrap_or_default(),
            form_tags: photo.tags.join(", "),
            form_featured: photo.is_featured,
            title_error: String::new(),
            description_error: String::new(),
            save_error: String::new(),
        }
    }

    fn with_form(mut self, form: &PhotoEditForm, errors: &FieldErrors, save_error: String) -> Self {
        self.editing = true;
        self.form_title = form.title.clone();
        self.form_description = form.description.clone();
        self.form_tags = form.tags.clone();
        self.form_featured = form.is_featured.is_some();
        self.title_error = errors.message("title");
        self.description_error = errors.message("description");
        self.save_error = save_error;
        self
    }
}

async fn load(state: &AppState, viewer: &Viewer, id: &str) -> Result<Photo, Response> {
    state.api.photos().get(id).await.map_err(|e| {
        tracing::error!("Error fetching photo {}: {}", id, e);
        let status = if e.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_GATEWAY
        };
        error_page(
            status,
            Nav::new(viewer, "gallery"),
            "Failed to load photo.",
            format!("/photo/{}", id),
        )
    })
}

/// GET /photo/{id}
pub async fn show(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
    Query(params): Query<DetailParams>,
) -> Response {
    let photo = match load(&state, &viewer, &id).await {
        Ok(photo) => photo,
        Err(page) => return page,
    };
    let mut page = PhotoTemplate::new(&photo, &viewer);
    if page.is_admin {
        page.editing = params.edit.is_some();
        page.confirm_delete = !page.editing && params.confirm.as_deref() == Some("delete");
    }
    Html(page).into_response()
}

/// POST /photo/{id}
pub async fn update(
    State(state): State<AppState>,
    admin: AdminUser,
    viewer: Viewer,
    Path(id): Path<String>,
    Form(form): Form<PhotoEditForm>,
) -> Response {
    let photo = match load(&state, &viewer, &id).await {
        Ok(photo) => photo,
        Err(page) => return page,
    };

    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            let page = PhotoTemplate::new(&photo, &viewer).with_form(&form, &errors, String::new());
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };

    let update = PhotoUpdate {
        title: valid.title,
        description: valid.description,
        is_featured: valid.is_featured,
        tags: valid.tags,
        ..PhotoUpdate::from_photo(&photo)
    };
    match state.api.photos().update(&id, update, &admin.token).await {
        Ok(_) => {
            tracing::info!(photo = %id, "Photo updated");
            Redirect::to(&format!("/photo/{}", id)).into_response()
        }
        Err(e) => {
            tracing::error!("Error saving photo {}: {}", id, e);
            let page = PhotoTemplate::new(&photo, &viewer).with_form(
                &form,
                &FieldErrors::new(),
                e.to_string(),
            );
            (StatusCode::BAD_GATEWAY, Html(page)).into_response()
        }
    }
}

/// POST /photo/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    admin: AdminUser,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Response {
    match state.api.photos().delete(&id, &admin.token).await {
        Ok(()) => {
            tracing::info!(photo = %id, "Photo deleted");
            Redirect::to("/gallery").into_response()
        }
        Err(e) => {
            tracing::error!("Error deleting photo {}: {}", id, e);
            error_page(
                StatusCode::BAD_GATEWAY,
                Nav::new(&viewer, "gallery"),
                "Failed to delete photo.",
                format!("/photo/{}?confirm=delete", id),
            )
        }
    }
}

/// GET /photo/{id}/full. Streams the original through with the viewer's token.
pub async fn full(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let image = state
        .api
        .photos()
        .full_resolution(&id, viewer.token.as_deref())
        .await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, image.content_type),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        image.bytes,
    )
        .into_response())
}
