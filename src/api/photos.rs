use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Method};

use super::{ensure_success, ApiClient, ApiError, ListQuery, Resource, ResourceApi};
use crate::models::{Page, Photo, PhotoMetadata};

impl Resource for Photo {
    const PATH: &'static str = "/api/photos";
    const NAME: &'static str = "photo";
    const PLURAL: &'static str = "photos";
}

/// Image bytes ready to send as the `image` multipart part.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub image: ImageUpload,
    pub title: String,
    pub description: String,
    pub photographer: Option<String>,
    pub tags: Vec<String>,
    pub metadata: Option<PhotoMetadata>,
}

#[derive(Debug, Clone)]
pub struct PhotoUpdate {
    pub title: String,
    pub description: String,
    pub is_featured: bool,
    pub tags: Vec<String>,
    pub metadata: Option<PhotoMetadata>,
}

impl NewPhoto {
    pub fn into_form(self) -> Result<Form, ApiError> {
        let part = Part::bytes(self.image.bytes)
            .file_name(self.image.file_name)
            .mime_str(&self.image.mime)?;
        let mut form = Form::new().part("image", part).text("title", self.title);
        if !self.description.is_empty() {
            form = form.text("description", self.description);
        }
        if let Some(photographer) = self.photographer.filter(|p| !p.is_empty()) {
            form = form.text("photographer", photographer);
        }
        if !self.tags.is_empty() {
            form = form.text("tags", json_text(&self.tags)?);
        }
        if let Some(metadata) = &self.metadata {
            form = form.text("metadata", json_text(metadata)?);
        }
        Ok(form)
    }
}

impl PhotoUpdate {
    pub fn from_photo(photo: &Photo) -> Self {
        Self {
            title: photo.title.clone(),
            description: photo.description.clone().unwrap_or_default(),
            is_featured: photo.is_featured,
            tags: photo.tags.clone(),
            metadata: photo.metadata.clone(),
        }
    }

    pub fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new()
            .text("title", self.title)
            .text("description", self.description)
            .text("isFeatured", self.is_featured.to_string())
            .text("tags", json_text(&self.tags)?);
        if let Some(metadata) = &self.metadata {
            form = form.text("metadata", json_text(metadata)?);
        }
        Ok(form)
    }
}

fn json_text<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Full-resolution image bytes as served by the backend.
#[derive(Debug, Clone)]
pub struct FullImage {
    pub bytes: Bytes,
    pub content_type: String,
}

#[derive(Clone)]
pub struct PhotosApi {
    inner: ResourceApi<Photo>,
}

impl PhotosApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: ResourceApi::new(client),
        }
    }

    pub async fn list(&self, limit: u32, page: u32) -> Result<Page<Photo>, ApiError> {
        self.inner.get_all(limit, page).await
    }

    pub async fn featured(&self, limit: u32) -> Result<Page<Photo>, ApiError> {
        self.inner.get_featured(limit, 1).await
    }

    pub async fn by_tag(&self, tag: &str, limit: u32, page: u32) -> Result<Page<Photo>, ApiError> {
        self.inner.get_by_tag(tag, limit, page).await
    }

    pub async fn search(&self, term: &str, limit: u32, page: u32) -> Result<Page<Photo>, ApiError> {
        self.inner.search(term, limit, page).await
    }

    /// Listing used by the gallery: tag filter when one is given.
    pub async fn browse(&self, tag: Option<&str>, limit: u32, page: u32) -> Result<Page<Photo>, ApiError> {
        let mut query = ListQuery::page(limit, page);
        if let Some(tag) = tag {
            query = query.with_tag(tag);
        }
        self.inner.list(&query).await
    }

    pub async fn get(&self, id: &str) -> Result<Photo, ApiError> {
        self.inner.get_by_id(id).await
    }

    pub async fn full_resolution(&self, id: &str, token: Option<&str>) -> Result<FullImage, ApiError> {
        let client = self.inner.client();
        let url = client.endpoint_with(Photo::PATH, &[id, "full"])?;
        let response = client.request_url(Method::GET, url, token).send().await?;
        let response = ensure_success(response, "fetch full resolution image")
            .await
            .inspect_err(|e| tracing::error!("Error fetching full resolution image: {}", e))?;
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response.bytes().await?;
        Ok(FullImage {
            bytes,
            content_type,
        })
    }

    pub async fn create(&self, photo: NewPhoto, token: &str) -> Result<Photo, ApiError> {
        tracing::info!(title = %photo.title, size = photo.image.bytes.len(), "Uploading photo");
        self.inner.create_multipart(photo.into_form()?, token).await
    }

    pub async fn update(&self, id: &str, update: PhotoUpdate, token: &str) -> Result<Photo, ApiError> {
        self.inner.update_multipart(id, update.into_form()?, token).await
    }

    pub async fn delete(&self, id: &str, token: &str) -> Result<(), ApiError> {
        self.inner.delete(id, token).await
    }
}
