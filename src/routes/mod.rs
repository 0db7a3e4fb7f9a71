pub mod admin;
pub mod albums;
pub mod assets;
pub mod auth;
pub mod contact;
pub mod favorites;
pub mod gallery;
pub mod home;
pub mod photo;
pub mod user;
pub mod views;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Multipart overhead allowed on top of the image itself.
const UPLOAD_SLACK_BYTES: usize = 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.upload.max_bytes + UPLOAD_SLACK_BYTES;

    Router::new()
        .route("/", get(home::index))
        .route("/home", get(home::home_redirect))
        .route("/gallery", get(gallery::index))
        .route("/photo/{id}", get(photo::show).post(photo::update))
        .route("/photo/{id}/delete", post(photo::delete))
        .route("/photo/{id}/full", get(photo::full))
        .route("/albums", get(albums::index))
        .route("/album/{id}", get(albums::show).post(albums::update))
        .route("/album/{id}/delete", post(albums::delete))
        .route("/album/{id}/photos/remove", post(albums::remove_photos))
        .route("/contact-us", get(contact::page).post(contact::send))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/user", get(user::profile))
        .route("/user/field", post(user::update_field))
        .route("/user/password", post(user::update_password))
        .route("/favorites/toggle", post(favorites::toggle))
        .route("/admin", get(admin::panel))
        .route(
            "/admin/add-photo",
            get(admin::add_photo_page)
                .post(admin::add_photo)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/admin/add-album",
            get(admin::add_album_page).post(admin::add_album),
        )
        .route("/assets/{*path}", get(assets::serve))
        .fallback(views::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
