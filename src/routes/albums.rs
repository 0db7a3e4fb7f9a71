use askama::Template;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::extractors::{AdminUser, Viewer};
use crate::forms::{photo_ids_from_urlencoded, AlbumForm, FieldErrors};
use crate::models::{photo_count_label, Album, AlbumPhoto, Photo};
use crate::pagination::{clamp_page, Pager};
use crate::routes::gallery::{list_href, ListParams};
use crate::routes::home::Html;
use crate::routes::views::{
    album_cards, album_info, error_page, photo_cards, selectable_photos, AlbumCard, InfoRow, Nav,
    PhotoCard, SelectablePhoto,
};
use crate::state::AppState;

/// Photos offered by the album photo picker.
pub const PICKER_LIMIT: u32 = 50;

#[derive(Template)]
#[template(path = "pages/albums.html")]
pub struct AlbumsTemplate {
    pub nav: Nav,
    pub tag: String,
    pub albums: Vec<AlbumCard>,
    pub pager: Pager,
    pub empty_message: String,
}

/// GET /albums
pub async fn index(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ListParams>,
) -> Response {
    let tag = params.tag();
    let requested = params.page();
    let per_page = state.config.gallery.albums_per_page;
    let nav = Nav::new(&viewer, "albums");

    let page = match state.api.albums().browse(tag, per_page, requested).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("Error fetching albums: {}", e);
            return error_page(
                StatusCode::BAD_GATEWAY,
                nav,
                format!("Failed to load albums. {}", e),
                list_href("/albums", tag, requested),
            );
        }
    };

    let current = clamp_page(requested, page.total_pages);
    if current != requested {
        return Redirect::to(&list_href("/albums", tag, current)).into_response();
    }

    let empty_message = match tag {
        Some(tag) => format!("No albums found with tag \"{}\"", tag),
        None => "No albums yet".to_string(),
    };
    Html(AlbumsTemplate {
        nav,
        tag: tag.unwrap_or_default().to_string(),
        albums: album_cards(&page.items),
        pager: Pager::new(current, page.total_pages, |n| list_href("/albums", tag, n)),
        empty_message,
    })
    .into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct AlbumParams {
    #[serde(default)]
    pub edit: Option<String>,
    #[serde(default)]
    pub confirm: Option<String>,
    #[serde(default)]
    pub photo_search: Option<String>,
}

#[derive(Template)]
#[template(path = "pages/album.html")]
pub struct AlbumTemplate {
    pub nav: Nav,
    pub id: String,
    pub title: String,
    pub cover: String,
    pub description: String,
    pub tags: Vec<String>,
    pub count: String,
    pub featured: bool,
    pub info: Vec<InfoRow>,
    pub photos: Vec<PhotoCard>,
    pub is_admin: bool,
    pub editing: bool,
    pub confirm_delete: bool,
    pub form_title: String,
    pub form_description: String,
    pub form_tags: String,
    pub form_cover: String,
    pub form_featured: bool,
    pub photo_search: String,
    pub available: Vec<SelectablePhoto>,
    pub title_error: String,
    pub description_error: String,
    pub cover_error: String,
    pub save_error: String,
}

impl AlbumTemplate {
    fn new(album: &Album, photos: &[Photo], viewer: &Viewer) -> Self {
        Self {
            nav: Nav::new(viewer, "albums"),
            id: album.id.clone(),
            title: album.title.clone(),
            cover: album.cover_image_url.clone(),
            description: album.description.clone().unwrap_or_default(),
            tags: album.tags.clone(),
            count: photo_count_label(album.photos.len()),
            featured: album.is_featured,
            info: album_info(album),
            photos: photo_cards(photos),
            is_admin: viewer.is_admin(),
            editing: false,
            confirm_delete: false,
            form_title: album.title.clone(),
            form_description: album.description.clone().unwrap_or_default(),
            form_tags: album.tags.join(", "),
            form_cover: album.cover_image_url.clone(),
            form_featured: album.is_featured,
            photo_search: String::new(),
            available: Vec::new(),
            title_error: String::new(),
            description_error: String::new(),
            cover_error: String::new(),
            save_error: String::new(),
        }
    }

    fn with_form(mut self, form: &AlbumForm, errors: &FieldErrors, save_error: String) -> Self {
        self.editing = true;
        self.form_title = form.title.clone();
        self.form_description = form.description.clone();
        self.form_tags = form.tags.clone();
        self.form_cover = form.cover_image_url.clone();
        self.form_featured = form.is_featured;
        self.title_error = errors.message("title");
        self.description_error = errors.message("description");
        self.cover_error = errors.message("cover_image_url");
        self.save_error = save_error;
        self
    }
}

/// Album photos in album order. Entries that arrive as bare ids are
/// fetched; ones that fail to load are skipped.
pub async fn resolve_photos(state: &AppState, album: &Album) -> Vec<Photo> {
    let mut photos = Vec::with_capacity(album.photos.len());
    for entry in &album.photos {
        match entry {
            AlbumPhoto::Photo(photo) => photos.push(photo.as_ref().clone()),
            AlbumPhoto::Id(id) => match state.api.photos().get(id).await {
                Ok(photo) => photos.push(photo),
                Err(e) => tracing::warn!("Skipping album photo {}: {}", id, e),
            },
        }
    }
    photos
}

/// Photos for the picker; an empty list when the listing fails.
pub async fn picker_photos(state: &AppState) -> Vec<Photo> {
    match state.api.photos().list(PICKER_LIMIT, 1).await {
        Ok(page) => page.items,
        Err(e) => {
            tracing::error!("Error loading photos: {}", e);
            Vec::new()
        }
    }
}

/// Image url of the first selected photo, used as a fallback cover.
pub async fn first_selected_image(state: &AppState, form: &AlbumForm) -> Option<String> {
    if !form.cover_image_url.trim().is_empty() {
        return None;
    }
    let first = form.photos.first()?;
    match state.api.photos().get(first).await {
        Ok(photo) => Some(photo.image_url),
        Err(e) => {
            tracing::warn!("Could not load cover photo {}: {}", first, e);
            None
        }
    }
}

async fn load(state: &AppState, viewer: &Viewer, id: &str) -> Result<Album, Response> {
    state.api.albums().get(id).await.map_err(|e| {
        tracing::error!("Error fetching album {}: {}", id, e);
        let status = if e.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_GATEWAY
        };
        error_page(
            status,
            Nav::new(viewer, "albums"),
            "Failed to load album.",
            format!("/album/{}", id),
        )
    })
}

/// GET /album/{id}
pub async fn show(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
    Query(params): Query<AlbumParams>,
) -> Response {
    let album = match load(&state, &viewer, &id).await {
        Ok(album) => album,
        Err(page) => return page,
    };
    let photos = resolve_photos(&state, &album).await;
    let mut page = AlbumTemplate::new(&album, &photos, &viewer);

    if page.is_admin {
        page.editing = params.edit.is_some();
        page.confirm_delete = !page.editing && params.confirm.as_deref() == Some("delete");
        if page.editing {
            let term = params.photo_search.unwrap_or_default();
            let available = picker_photos(&state).await;
            page.available = selectable_photos(&available, &album.photo_ids(), &term);
            page.photo_search = term;
        }
    }
    Html(page).into_response()
}

/// POST /album/{id}
pub async fn update(
    State(state): State<AppState>,
    admin: AdminUser,
    viewer: Viewer,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let album = match load(&state, &viewer, &id).await {
        Ok(album) => album,
        Err(page) => return page,
    };
    let form = AlbumForm::from_urlencoded(&body);
    let cover = first_selected_image(&state, &form).await;

    let rerender = |errors: &FieldErrors, save_error: String, photos: Vec<Photo>, available: Vec<Photo>| {
        let mut page = AlbumTemplate::new(&album, &photos, &viewer).with_form(&form, errors, save_error);
        page.available = selectable_photos(&available, &form.photos, "");
        page
    };

    let mut draft = match form.validate(cover.as_deref()) {
        Ok(draft) => draft,
        Err(errors) => {
            let photos = resolve_photos(&state, &album).await;
            let available = picker_photos(&state).await;
            let page = rerender(&errors, String::new(), photos, available);
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };
    draft.is_hidden = album.is_hidden;
    draft.photos = form.apply_selection(&album.photo_ids());

    match state.api.albums().update(&id, &draft, &admin.token).await {
        Ok(_) => {
            tracing::info!(album = %id, "Album updated");
            Redirect::to(&format!("/album/{}", id)).into_response()
        }
        Err(e) => {
            tracing::error!("Error saving album {}: {}", id, e);
            let photos = resolve_photos(&state, &album).await;
            let available = picker_photos(&state).await;
            let page = rerender(&FieldErrors::new(), e.to_string(), photos, available);
            (StatusCode::BAD_GATEWAY, Html(page)).into_response()
        }
    }
}

/// POST /album/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    admin: AdminUser,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Response {
    match state.api.albums().delete(&id, &admin.token).await {
        Ok(()) => Redirect::to("/albums").into_response(),
        Err(e) => {
            tracing::error!("Error deleting album {}: {}", id, e);
            error_page(
                StatusCode::BAD_GATEWAY,
                Nav::new(&viewer, "albums"),
                "Failed to delete album.",
                format!("/album/{}?confirm=delete", id),
            )
        }
    }
}

/// POST /album/{id}/photos/remove
pub async fn remove_photos(
    State(state): State<AppState>,
    admin: AdminUser,
    viewer: Viewer,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let ids = photo_ids_from_urlencoded(&body);
    if ids.is_empty() {
        return Redirect::to(&format!("/album/{}", id)).into_response();
    }
    match state.api.albums().remove_photos(&id, &ids, &admin.token).await {
        Ok(_) => {
            tracing::info!(album = %id, removed = ids.len(), "Removed photos from album");
            Redirect::to(&format!("/album/{}", id)).into_response()
        }
        Err(e) => {
            tracing::error!("Error removing photos from album {}: {}", id, e);
            error_page(
                StatusCode::BAD_GATEWAY,
                Nav::new(&viewer, "albums"),
                format!("Failed to remove photos. {}", e),
                format!("/album/{}", id),
            )
        }
    }
}
