use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub metadata: Option<PhotoMetadata>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMetadata {
    pub photographer: Option<String>,
    pub location: Option<String>,
    pub date_taken: Option<DateTime<Utc>>,
    pub original_width: Option<u32>,
    pub original_height: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(rename = "originalSizeKB")]
    pub original_size_kb: Option<f64>,
    #[serde(rename = "sizeKB")]
    pub size_kb: Option<f64>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover_image_url: String,
    #[serde(default)]
    pub photos: Vec<AlbumPhoto>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An album entry is either a bare photo id or a populated photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlbumPhoto {
    Id(String),
    Photo(Box<Photo>),
}

impl AlbumPhoto {
    pub fn id(&self) -> &str {
        match self {
            AlbumPhoto::Id(id) => id,
            AlbumPhoto::Photo(photo) => &photo.id,
        }
    }

    pub fn as_photo(&self) -> Option<&Photo> {
        match self {
            AlbumPhoto::Id(_) => None,
            AlbumPhoto::Photo(photo) => Some(photo),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteKind {
    Photo,
    Product,
}

impl FavoriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FavoriteKind::Photo => "photo",
            FavoriteKind::Product => "product",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(rename = "item", alias = "itemId", alias = "_id", alias = "id")]
    pub item_id: String,
    #[serde(rename = "type", alias = "itemType")]
    pub kind: FavoriteKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, deserialize_with = "lenient_favorites")]
    pub favorites: Vec<Favorite>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Favorites arrive in several shapes depending on the backend version;
/// entries that don't parse are dropped instead of failing the whole user.
fn lenient_favorites<'de, D>(deserializer: D) -> Result<Vec<Favorite>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn signed_out(error: Option<String>) -> Self {
        Self {
            is_authenticated: false,
            user: None,
            error,
        }
    }
}

/// Login/register response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub current_page: u32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 1,
            current_page: 1,
        }
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Listings come back either as `{"<key>": [...], "totalPages": n}` or
    /// as a bare array.
    pub fn from_value(value: Value, key: &str) -> Result<Self, serde_json::Error> {
        match value {
            Value::Array(_) => Ok(Page {
                items: serde_json::from_value(value)?,
                ..Page::default()
            }),
            Value::Object(mut map) => {
                let items = match map.remove(key) {
                    Some(list @ Value::Array(_)) => serde_json::from_value(list)?,
                    _ => Vec::new(),
                };
                let total_pages = page_number(map.get("totalPages"));
                let current_page = page_number(map.get("currentPage"));
                Ok(Page {
                    items,
                    total_pages,
                    current_page,
                })
            }
            _ => Ok(Page::default()),
        }
    }
}

fn page_number(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_u64)
        .map(|n| n.clamp(1, u32::MAX as u64) as u32)
        .unwrap_or(1)
}

/// Single-record responses are either the record itself or wrapped as
/// `{"<key>": {...}}`.
pub fn record_from_value<T: DeserializeOwned>(
    value: Value,
    key: &str,
) -> Result<T, serde_json::Error> {
    match value {
        Value::Object(mut map) if map.get(key).is_some_and(Value::is_object) => {
            serde_json::from_value(map.remove(key).unwrap_or_default())
        }
        other => serde_json::from_value(other),
    }
}

// --- Display helpers ---

impl Photo {
    pub fn display_url(&self) -> &str {
        match self.thumbnail_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => &self.image_url,
        }
    }
}

impl Album {
    pub fn photo_ids(&self) -> Vec<String> {
        self.photos.iter().map(|p| p.id().to_string()).collect()
    }
}

pub fn photo_count_label(count: usize) -> String {
    if count == 1 {
        "1 photo".to_string()
    } else {
        format!("{} photos", count)
    }
}

pub fn format_file_size(kb: f64) -> String {
    if kb < 1024.0 {
        format!("{:.1} KB", kb)
    } else {
        format!("{:.1} MB", kb / 1024.0)
    }
}

impl PhotoMetadata {
    /// Percentage saved by compression, one decimal.
    pub fn compression_percent(&self) -> Option<String> {
        match (self.original_size_kb, self.size_kb) {
            (Some(original), Some(size)) if original > 0.0 => {
                Some(format!("{:.1}", (original - size) / original * 100.0))
            }
            _ => None,
        }
    }

    pub fn original_dimensions(&self) -> Option<String> {
        match (self.original_width, self.original_height) {
            (Some(w), Some(h)) => Some(format!("{} × {} px", w, h)),
            _ => None,
        }
    }

    /// Only shown when the display size differs from the original.
    pub fn display_dimensions(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h))
                if Some(w) != self.original_width || Some(h) != self.original_height =>
            {
                Some(format!("{} × {} px", w, h))
            }
            _ => None,
        }
    }

    pub fn format_label(&self) -> Option<String> {
        self.format
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|f| f.trim_start_matches("image/").to_uppercase())
    }
}
