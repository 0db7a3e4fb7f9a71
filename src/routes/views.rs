//! Flat view structs handed to templates. Templates only see strings and
//! flags; every optional value is resolved here.

use askama::Template;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};

use crate::extractors::Viewer;
use crate::models::{format_file_size, photo_count_label, Album, Photo, User};
use crate::routes::home::Html;

/// Header state shared by every page.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    pub signed_in: bool,
    pub is_admin: bool,
    pub name: String,
    pub active: &'static str,
}

impl Nav {
    pub fn new(viewer: &Viewer, active: &'static str) -> Self {
        Self::for_user(viewer.user(), active)
    }

    pub fn for_user(user: Option<&User>, active: &'static str) -> Self {
        Self {
            signed_in: user.is_some(),
            is_admin: user.is_some_and(User::is_admin),
            name: user.map(User::display_name).unwrap_or_default(),
            active,
        }
    }

    pub fn is(&self, section: &str) -> bool {
        self.active == section
    }
}

#[derive(Debug, Clone)]
pub struct PhotoCard {
    pub id: String,
    pub title: String,
    pub thumb: String,
    pub tags: Vec<String>,
    pub featured: bool,
}

impl From<&Photo> for PhotoCard {
    fn from(photo: &Photo) -> Self {
        Self {
            id: photo.id.clone(),
            title: photo.title.clone(),
            thumb: photo.display_url().to_string(),
            tags: photo.tags.iter().take(3).cloned().collect(),
            featured: photo.is_featured,
        }
    }
}

pub fn photo_cards(photos: &[Photo]) -> Vec<PhotoCard> {
    photos.iter().map(PhotoCard::from).collect()
}

#[derive(Debug, Clone)]
pub struct AlbumCard {
    pub id: String,
    pub title: String,
    pub cover: String,
    pub description: String,
    pub count: String,
    pub featured: bool,
}

impl From<&Album> for AlbumCard {
    fn from(album: &Album) -> Self {
        Self {
            id: album.id.clone(),
            title: album.title.clone(),
            cover: album.cover_image_url.clone(),
            description: album.description.clone().unwrap_or_default(),
            count: photo_count_label(album.photos.len()),
            featured: album.is_featured,
        }
    }
}

pub fn album_cards(albums: &[Album]) -> Vec<AlbumCard> {
    albums.iter().map(AlbumCard::from).collect()
}

/// One labelled line in an information card.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoRow {
    pub label: &'static str,
    pub value: String,
}

fn row(label: &'static str, value: Option<String>) -> Option<InfoRow> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|value| InfoRow { label, value })
}

pub fn format_date(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(|d| d.format("%B %-d, %Y").to_string())
}

pub fn format_date_time(date: Option<DateTime<Utc>>) -> Option<String> {
    date.map(|d| d.format("%b %-d, %Y, %H:%M").to_string())
}

/// Photo information and technical details, empty rows dropped.
pub fn photo_info(photo: &Photo) -> (Vec<InfoRow>, Vec<InfoRow>) {
    let meta = photo.metadata.clone().unwrap_or_default();
    let basic = [
        row("Uploaded", format_date_time(photo.created_at)),
        row("Date Taken", format_date(meta.date_taken)),
        row("Photographer", meta.photographer.clone()),
        row("Location", meta.location.clone()),
    ];
    let technical = [
        row("Dimensions", meta.original_dimensions()),
        row("Display Size", meta.display_dimensions()),
        row("Original Size", meta.original_size_kb.filter(|kb| *kb > 0.0).map(format_file_size)),
        row("File Size", meta.size_kb.filter(|kb| *kb > 0.0).map(format_file_size)),
        row("Format", meta.format_label()),
    ];
    (
        basic.into_iter().flatten().collect(),
        technical.into_iter().flatten().collect(),
    )
}

/// "Compressed by N%" line; only for a positive saving.
pub fn compression_note(photo: &Photo) -> String {
    photo
        .metadata
        .as_ref()
        .and_then(|m| m.compression_percent())
        .filter(|p| p.parse::<f64>().is_ok_and(|v| v > 0.0))
        .map(|p| format!("Compressed by {}% for web optimization", p))
        .unwrap_or_default()
}

pub fn album_info(album: &Album) -> Vec<InfoRow> {
    [
        row("Created", format_date_time(album.created_at)),
        row("Last Updated", format_date(album.updated_at)),
        row("Photos", Some(photo_count_label(album.photos.len()))),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// A photo offered in the album photo picker.
#[derive(Debug, Clone)]
pub struct SelectablePhoto {
    pub id: String,
    pub title: String,
    pub thumb: String,
    pub selected: bool,
}

/// Case-insensitive match on title or any tag; a blank term keeps all.
pub fn matches_search(photo: &Photo, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty()
        || photo.title.to_lowercase().contains(&term)
        || photo.tags.iter().any(|t| t.to_lowercase().contains(&term))
}

pub fn selectable_photos(photos: &[Photo], selected: &[String], term: &str) -> Vec<SelectablePhoto> {
    photos
        .iter()
        .filter(|p| matches_search(p, term) || selected.contains(&p.id))
        .map(|p| SelectablePhoto {
            id: p.id.clone(),
            title: p.title.clone(),
            thumb: p.display_url().to_string(),
            selected: selected.contains(&p.id),
        })
        .collect()
}

/// Percent-encode a value for use in a query string.
pub fn query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Only same-site paths are accepted as redirect targets.
pub fn safe_return_path(path: &str) -> &str {
    if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') {
        path
    } else {
        "/"
    }
}

#[derive(Template)]
#[template(path = "pages/error.html")]
pub struct ErrorTemplate {
    pub nav: Nav,
    pub heading: String,
    pub message: String,
    pub retry_href: String,
    pub back_href: String,
    pub back_label: String,
}

/// A full error page with a "Try Again" link to `retry_href`.
pub fn error_page(
    status: StatusCode,
    nav: Nav,
    message: impl Into<String>,
    retry_href: impl Into<String>,
) -> Response {
    let heading = if status == StatusCode::NOT_FOUND {
        "Page not found"
    } else {
        "Something went wrong"
    };
    let page = ErrorTemplate {
        nav,
        heading: heading.to_string(),
        message: message.into(),
        retry_href: retry_href.into(),
        back_href: "/".to_string(),
        back_label: "Back to Home".to_string(),
    };
    (status, Html(page)).into_response()
}

pub async fn not_found(viewer: Viewer) -> Response {
    let page = ErrorTemplate {
        nav: Nav::new(&viewer, ""),
        heading: "Page not found".to_string(),
        message: "The page you're looking for doesn't exist or has been moved.".to_string(),
        retry_href: String::new(),
        back_href: "/".to_string(),
        back_label: "Back to Home".to_string(),
    };
    (StatusCode::NOT_FOUND, Html(page)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhotoMetadata;
    use chrono::TimeZone;

    fn photo() -> Photo {
        Photo {
            id: "p1".into(),
            title: "Salt Flats".into(),
            tags: vec!["Bolivia".into(), "desert".into()],
            image_url: "https://cdn/full.jpg".into(),
            ..Photo::default()
        }
    }

    #[test]
    fn nav_reflects_viewer() {
        let admin = User {
            id: "u".into(),
            username: "root".into(),
            first_name: "Ada".into(),
            role: crate::models::Role::Admin,
            ..User::default()
        };
        let nav = Nav::for_user(Some(&admin), "gallery");
        assert!(nav.signed_in && nav.is_admin);
        assert_eq!(nav.name, "Ada");
        assert!(nav.is("gallery"));
        assert!(!Nav::for_user(None, "").signed_in);
    }

    #[test]
    fn info_rows_skip_missing_values() {
        let mut p = photo();
        p.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap());
        p.metadata = Some(PhotoMetadata {
            location: Some("Uyuni".into()),
            original_width: Some(4000),
            original_height: Some(3000),
            width: Some(4000),
            height: Some(3000),
            format: Some("image/jpeg".into()),
            ..PhotoMetadata::default()
        });
        let (basic, technical) = photo_info(&p);
        let labels: Vec<_> = basic.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["Uploaded", "Location"]);
        assert_eq!(basic[0].value, "Mar 9, 2024, 14:05");
        let labels: Vec<_> = technical.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["Dimensions", "Format"]);
        assert_eq!(technical[1].value, "JPEG");
    }

    #[test]
    fn compression_note_needs_positive_saving() {
        let mut p = photo();
        assert_eq!(compression_note(&p), "");
        p.metadata = Some(PhotoMetadata {
            original_size_kb: Some(1000.0),
            size_kb: Some(250.0),
            ..PhotoMetadata::default()
        });
        assert_eq!(compression_note(&p), "Compressed by 75.0% for web optimization");
        p.metadata = Some(PhotoMetadata {
            original_size_kb: Some(100.0),
            size_kb: Some(100.0),
            ..PhotoMetadata::default()
        });
        assert_eq!(compression_note(&p), "");
    }

    #[test]
    fn search_matches_title_or_tag() {
        let p = photo();
        assert!(matches_search(&p, "salt"));
        assert!(matches_search(&p, "BOLIV"));
        assert!(matches_search(&p, "  "));
        assert!(!matches_search(&p, "forest"));
    }

    #[test]
    fn selected_photos_survive_search_filter() {
        let mut other = photo();
        other.id = "p2".into();
        other.title = "Forest".into();
        other.tags.clear();
        let list = selectable_photos(&[photo(), other], &["p2".to_string()], "salt");
        assert_eq!(list.len(), 2);
        assert!(list[1].selected);
        assert!(!list[0].selected);
    }

    #[test]
    fn album_card_counts_photos() {
        let album = Album {
            id: "a1".into(),
            title: "Andes".into(),
            photos: vec![crate::models::AlbumPhoto::Id("p1".into())],
            ..Album::default()
        };
        assert_eq!(AlbumCard::from(&album).count, "1 photo");
    }

    #[test]
    fn return_paths_stay_on_site() {
        assert_eq!(safe_return_path("/photo/1"), "/photo/1");
        assert_eq!(safe_return_path("//evil.com"), "/");
        assert_eq!(safe_return_path("https://evil.com"), "/");
    }

    #[test]
    fn query_values_are_encoded() {
        assert_eq!(query_value("black & white"), "black+%26+white");
    }
}
