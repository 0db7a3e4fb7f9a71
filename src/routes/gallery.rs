use askama::Template;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

use crate::extractors::Viewer;
use crate::pagination::{clamp_page, Pager};
use crate::routes::home::Html;
use crate::routes::views::{error_page, photo_cards, query_value, Nav, PhotoCard};
use crate::state::AppState;

/// `?tag=&page=` as typed into the address bar; bad numbers mean page 1.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl ListParams {
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(1)
            .max(1)
    }
}

/// Link to `page` of a listing at `base`, keeping the tag filter.
pub fn list_href(base: &str, tag: Option<&str>, page: u32) -> String {
    match tag {
        Some(tag) => format!("{}?tag={}&page={}", base, query_value(tag), page),
        None if page > 1 => format!("{}?page={}", base, page),
        None => base.to_string(),
    }
}

#[derive(Template)]
#[template(path = "pages/gallery.html")]
pub struct GalleryTemplate {
    pub nav: Nav,
    pub tag: String,
    pub photos: Vec<PhotoCard>,
    pub pager: Pager,
    pub empty_message: String,
}

/// GET /gallery
pub async fn index(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ListParams>,
) -> Response {
    let tag = params.tag();
    let requested = params.page();
    let per_page = state.config.gallery.photos_per_page;
    let nav = Nav::new(&viewer, "gallery");

    let page = match state.api.photos().browse(tag, per_page, requested).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("Error fetching photos: {}", e);
            return error_page(
                StatusCode::BAD_GATEWAY,
                nav,
                format!("Failed to load photos. {}", e),
                list_href("/gallery", tag, requested),
            );
        }
    };

    let current = clamp_page(requested, page.total_pages);
    if current != requested {
        return Redirect::to(&list_href("/gallery", tag, current)).into_response();
    }

    let empty_message = match tag {
        Some(tag) => format!("No photos found with tag \"{}\"", tag),
        None => "No photos in the gallery yet".to_string(),
    };
    Html(GalleryTemplate {
        nav,
        tag: tag.unwrap_or_default().to_string(),
        photos: photo_cards(&page.items),
        pager: Pager::new(current, page.total_pages, |n| list_href("/gallery", tag, n)),
        empty_message,
    })
    .into_response()
}
