use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

use crate::extractors::Viewer;
use crate::models::{Album, FavoriteKind, Page, Photo};
use crate::routes::views::{album_cards, photo_cards, AlbumCard, Nav, PhotoCard};
use crate::state::AppState;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub photos: Vec<PhotoCard>,
    pub photos_error: String,
    pub albums: Vec<AlbumCard>,
    pub albums_error: String,
    pub favorites: Vec<PhotoCard>,
    pub favorites_error: String,
}

/// Featured photos, falling back to the first page of all photos when the
/// featured listing fails.
async fn featured_photos(state: &AppState) -> Result<Page<Photo>, String> {
    let photos = state.api.photos();
    match photos.featured(state.config.gallery.featured_limit).await {
        Ok(page) => Ok(page),
        Err(e) => {
            tracing::warn!("Featured photos failed, falling back to latest: {}", e);
            photos
                .list(4, 1)
                .await
                .map_err(|_| format!("Featured photos unavailable: {}", e))
        }
    }
}

async fn featured_albums(state: &AppState) -> Result<Page<Album>, String> {
    let albums = state.api.albums();
    match albums.featured(state.config.gallery.featured_limit).await {
        Ok(page) => Ok(page),
        Err(e) => {
            tracing::warn!("Featured albums failed, falling back to latest: {}", e);
            albums
                .list(4, 1)
                .await
                .map_err(|_| format!("Featured albums unavailable: {}", e))
        }
    }
}

async fn favorite_photos(state: &AppState, viewer: &Viewer) -> Result<Vec<Photo>, String> {
    let (Some(token), Some(_)) = (viewer.token.as_deref(), viewer.user()) else {
        return Ok(Vec::new());
    };
    state
        .api
        .users()
        .favorites(FavoriteKind::Photo, token)
        .await
        .map_err(|e| format!("Favorites unavailable: {}", e))
}

/// GET /. Each section loads on its own and reports its own failure.
pub async fn index(State(state): State<AppState>, viewer: Viewer) -> Response {
    let (photos, albums, favorites) = tokio::join!(
        featured_photos(&state),
        featured_albums(&state),
        favorite_photos(&state, &viewer),
    );

    let (photos, photos_error) = match photos {
        Ok(page) => (photo_cards(&page.items), String::new()),
        Err(e) => (Vec::new(), e),
    };
    let (albums, albums_error) = match albums {
        Ok(page) => (album_cards(&page.items), String::new()),
        Err(e) => (Vec::new(), e),
    };
    let (favorites, favorites_error) = match favorites {
        Ok(list) => (photo_cards(&list), String::new()),
        Err(e) => (Vec::new(), e),
    };

    Html(HomeTemplate {
        nav: Nav::new(&viewer, "home"),
        photos,
        photos_error,
        albums,
        albums_error,
        favorites,
        favorites_error,
    })
    .into_response()
}

pub async fn home_redirect() -> Redirect {
    Redirect::permanent("/")
}
