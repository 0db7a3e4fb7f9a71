use serde::Serialize;

use super::{ApiClient, ApiError, ListQuery, Resource, ResourceApi};
use crate::models::{Album, Page};

impl Resource for Album {
    const PATH: &'static str = "/api/albums";
    const NAME: &'static str = "album";
    const PLURAL: &'static str = "albums";
}

/// JSON body for album create/update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDraft {
    pub title: String,
    pub description: String,
    pub cover_image_url: String,
    pub photos: Vec<String>,
    pub is_featured: bool,
    pub is_hidden: bool,
    pub tags: Vec<String>,
}

impl From<&Album> for AlbumDraft {
    fn from(album: &Album) -> Self {
        Self {
            title: album.title.clone(),
            description: album.description.clone().unwrap_or_default(),
            cover_image_url: album.cover_image_url.clone(),
            photos: album.photo_ids(),
            is_featured: album.is_featured,
            is_hidden: album.is_hidden,
            tags: album.tags.clone(),
        }
    }
}

/// Append `added` to `current`, skipping ids already present. Order is kept.
pub fn merge_photo_ids(current: &[String], added: &[String]) -> Vec<String> {
    let mut merged = current.to_vec();
    for id in added {
        if !merged.contains(id) {
            merged.push(id.clone());
        }
    }
    merged
}

pub fn without_photo_ids(current: &[String], removed: &[String]) -> Vec<String> {
    current
        .iter()
        .filter(|id| !removed.contains(id))
        .cloned()
        .collect()
}

#[derive(Clone)]
pub struct AlbumsApi {
    inner: ResourceApi<Album>,
}

impl AlbumsApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: ResourceApi::new(client),
        }
    }

    pub async fn list(&self, limit: u32, page: u32) -> Result<Page<Album>, ApiError> {
        self.inner.get_all(limit, page).await
    }

    pub async fn featured(&self, limit: u32) -> Result<Page<Album>, ApiError> {
        self.inner.get_featured(limit, 1).await
    }

    pub async fn by_tag(&self, tag: &str, limit: u32, page: u32) -> Result<Page<Album>, ApiError> {
        self.inner.get_by_tag(tag, limit, page).await
    }

    pub async fn search(&self, term: &str, limit: u32, page: u32) -> Result<Page<Album>, ApiError> {
        self.inner.search(term, limit, page).await
    }

    pub async fn browse(&self, tag: Option<&str>, limit: u32, page: u32) -> Result<Page<Album>, ApiError> {
        let mut query = ListQuery::page(limit, page);
        if let Some(tag) = tag {
            query = query.with_tag(tag);
        }
        self.inner.list(&query).await
    }

    pub async fn get(&self, id: &str) -> Result<Album, ApiError> {
        self.inner.get_by_id(id).await
    }

    pub async fn create(&self, draft: &AlbumDraft, token: &str) -> Result<Album, ApiError> {
        tracing::info!(title = %draft.title, photos = draft.photos.len(), "Creating album");
        self.inner.create(draft, token).await
    }

    pub async fn update(&self, id: &str, draft: &AlbumDraft, token: &str) -> Result<Album, ApiError> {
        self.inner.update(id, draft, token).await
    }

    pub async fn delete(&self, id: &str, token: &str) -> Result<(), ApiError> {
        self.inner.delete(id, token).await
    }

    pub async fn add_photos(&self, id: &str, photo_ids: &[String], token: &str) -> Result<Album, ApiError> {
        let album = self.get(id).await?;
        let mut draft = AlbumDraft::from(&album);
        draft.photos = merge_photo_ids(&draft.photos, photo_ids);
        self.update(id, &draft, token).await
    }

    pub async fn remove_photos(&self, id: &str, photo_ids: &[String], token: &str) -> Result<Album, ApiError> {
        let album = self.get(id).await?;
        let mut draft = AlbumDraft::from(&album);
        draft.photos = without_photo_ids(&draft.photos, photo_ids);
        self.update(id, &draft, token).await
    }
}
