use askama::Template;
use axum::body::Bytes;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::api::{ImageUpload, NewPhoto};
use crate::error::{AppError, AppResult};
use crate::extractors::AdminUser;
use crate::forms::{AlbumForm, FieldErrors, PhotoUploadForm};
use crate::imaging::{prepare_upload, PreparedUpload};
use crate::models::User;
use crate::routes::albums::{first_selected_image, picker_photos};
use crate::routes::home::Html;
use crate::routes::views::{selectable_photos, Nav, SelectablePhoto};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/admin.html")]
pub struct AdminTemplate {
    pub nav: Nav,
}

/// GET /admin
pub async fn panel(admin: AdminUser) -> Html<AdminTemplate> {
    Html(AdminTemplate {
        nav: Nav::for_user(Some(&admin.user), "admin"),
    })
}

// --- Add photo ---

#[derive(Template, Default)]
#[template(path = "pages/add_photo.html")]
pub struct AddPhotoTemplate {
    pub nav: Nav,
    pub max_mb: usize,
    pub form: PhotoUploadForm,
    pub image_error: String,
    pub title_error: String,
    pub description_error: String,
    pub error: String,
    pub success: bool,
    pub photo_id: String,
    pub compression: String,
}

impl AddPhotoTemplate {
    fn new(user: &User, state: &AppState) -> Self {
        Self {
            nav: Nav::for_user(Some(user), "admin"),
            max_mb: state.config.upload.max_bytes / (1024 * 1024),
            ..Self::default()
        }
    }

    fn with_errors(mut self, form: PhotoUploadForm, errors: &FieldErrors) -> Self {
        self.image_error = errors.message("image");
        self.title_error = errors.message("title");
        self.description_error = errors.message("description");
        self.form = form;
        self
    }
}

/// GET /admin/add-photo
pub async fn add_photo_page(State(state): State<AppState>, admin: AdminUser) -> Html<AddPhotoTemplate> {
    Html(AddPhotoTemplate::new(&admin.user, &state))
}

struct UploadedFile {
    bytes: Vec<u8>,
    file_name: String,
    mime: String,
}

async fn read_upload(
    mut multipart: Multipart,
) -> Result<(PhotoUploadForm, Option<UploadedFile>), String> {
    let mut form = PhotoUploadForm::default();
    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let mime = field
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| {
                    mime_guess::from_path(&file_name)
                        .first_or_octet_stream()
                        .to_string()
                });
            let bytes = field.bytes().await.map_err(|e| e.body_text())?;
            // Browsers send an empty part when no file was chosen.
            if !file_name.is_empty() || !bytes.is_empty() {
                file = Some(UploadedFile {
                    bytes: bytes.to_vec(),
                    file_name,
                    mime,
                });
            }
        } else {
            let value = field.text().await.map_err(|e| e.body_text())?;
            form.set(&name, value);
        }
    }
    Ok((form, file))
}

/// POST /admin/add-photo
pub async fn add_photo(
    State(state): State<AppState>,
    admin: AdminUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let page = AddPhotoTemplate::new(&admin.user, &state);

    let (form, file) = match read_upload(multipart).await {
        Ok(parts) => parts,
        Err(e) => {
            tracing::warn!("Rejected upload: {}", e);
            let page = AddPhotoTemplate {
                error: format!(
                    "Upload failed: {}. Maximum size is {}MB.",
                    e, page.max_mb
                ),
                ..page
            };
            return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
        }
    };

    let valid = match form.validate(file.is_some()) {
        Ok(valid) => valid,
        Err(errors) => {
            let page = page.with_errors(form, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
    };
    let Some(file) = file else {
        return Err(AppError::BadRequest("Please select an image".into()));
    };

    let limits = state.upload_limits();
    let prepared: PreparedUpload = match tokio::task::spawn_blocking(move || {
        prepare_upload(file.bytes, &file.file_name, &file.mime, &limits)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
    {
        Ok(prepared) => prepared,
        Err(e) => {
            let mut errors = FieldErrors::new();
            errors.add("image", e.to_string());
            let page = page.with_errors(form, &errors);
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response());
        }
    };

    let compression = prepared.report.summary();
    let metadata = prepared.metadata(&valid.metadata);
    let new_photo = NewPhoto {
        image: ImageUpload {
            bytes: prepared.bytes,
            file_name: prepared.file_name,
            mime: prepared.mime,
        },
        title: valid.title,
        description: valid.description,
        photographer: valid.photographer,
        tags: valid.tags,
        metadata: Some(metadata),
    };

    match state.api.photos().create(new_photo, &admin.token).await {
        Ok(photo) => {
            tracing::info!(photo = %photo.id, "Photo uploaded");
            Ok(Html(AddPhotoTemplate {
                success: true,
                photo_id: photo.id,
                compression,
                ..page
            })
            .into_response())
        }
        Err(e) => {
            tracing::error!("Upload error: {}", e);
            let page = AddPhotoTemplate {
                error: e.to_string(),
                ..page.with_errors(form, &FieldErrors::new())
            };
            Ok((StatusCode::BAD_GATEWAY, Html(page)).into_response())
        }
    }
}

// --- Add album ---

#[derive(Debug, Default, Deserialize)]
pub struct PickerParams {
    #[serde(default)]
    pub photo_search: Option<String>,
}

#[derive(Template, Default)]
#[template(path = "pages/add_album.html")]
pub struct AddAlbumTemplate {
    pub nav: Nav,
    pub form_title: String,
    pub form_description: String,
    pub form_tags: String,
    pub form_cover: String,
    pub form_featured: bool,
    pub photo_search: String,
    pub available: Vec<SelectablePhoto>,
    pub selected_count: usize,
    pub title_error: String,
    pub description_error: String,
    pub cover_error: String,
    pub error: String,
    pub success: bool,
    pub album_id: String,
}

/// GET /admin/add-album
pub async fn add_album_page(
    State(state): State<AppState>,
    admin: AdminUser,
    Query(params): Query<PickerParams>,
) -> Html<AddAlbumTemplate> {
    let term = params.photo_search.unwrap_or_default();
    let available = picker_photos(&state).await;
    Html(AddAlbumTemplate {
        nav: Nav::for_user(Some(&admin.user), "admin"),
        available: selectable_photos(&available, &[], &term),
        photo_search: term,
        ..AddAlbumTemplate::default()
    })
}

/// POST /admin/add-album
pub async fn add_album(
    State(state): State<AppState>,
    admin: AdminUser,
    body: Bytes,
) -> Response {
    let form = AlbumForm::from_urlencoded(&body);
    let cover = first_selected_image(&state, &form).await;
    let available = picker_photos(&state).await;
    let page = AddAlbumTemplate {
        nav: Nav::for_user(Some(&admin.user), "admin"),
        form_title: form.title.clone(),
        form_description: form.description.clone(),
        form_tags: form.tags.clone(),
        form_cover: form.cover_image_url.clone(),
        form_featured: form.is_featured,
        available: selectable_photos(&available, &form.photos, ""),
        selected_count: form.photos.len(),
        ..AddAlbumTemplate::default()
    };

    let draft = match form.validate(cover.as_deref()) {
        Ok(draft) => draft,
        Err(errors) => {
            let page = AddAlbumTemplate {
                title_error: errors.message("title"),
                description_error: errors.message("description"),
                cover_error: errors.message("cover_image_url"),
                ..page
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };

    match state.api.albums().create(&draft, &admin.token).await {
        Ok(album) => Html(AddAlbumTemplate {
            nav: page.nav,
            success: true,
            album_id: album.id,
            available: selectable_photos(&available, &[], ""),
            ..AddAlbumTemplate::default()
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Error creating album: {}", e);
            let page = AddAlbumTemplate {
                error: format!("Failed to create album: {}", e),
                ..page
            };
            (StatusCode::BAD_GATEWAY, Html(page)).into_response()
        }
    }
}
