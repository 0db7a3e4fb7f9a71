//! Form input and validation for every page that accepts user input.
//!
//! Validation failures are collected per field so pages can render them
//! next to the inputs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::Deserialize;

use crate::api::albums::{merge_photo_ids, without_photo_ids};
use crate::api::AlbumDraft;
use crate::models::PhotoMetadata;

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 1000;
pub const NAME_MAX: usize = 50;
pub const PASSWORD_CHANGE_MIN: usize = 6;
pub const CONTACT_MESSAGE_MIN: usize = 10;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,50}$").expect("valid username regex"));

/// Field name -> message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Message for `field`, or an empty string for templates.
    pub fn message(&self, field: &str) -> String {
        self.get(field).unwrap_or_default().to_string()
    }

    /// First message in field order; used where a single banner is shown.
    pub fn first(&self) -> Option<&str> {
        self.0.values().next().map(String::as_str)
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split a comma-separated tag string, trimming and dropping empties.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Leading-digits integer parse; anything else falls back.
pub fn parse_number(raw: &str, fallback: Option<u32>) -> Option<u32> {
    let digits: String = raw.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok().or(fallback)
}

/// Accepts RFC 3339, `datetime-local` input values and plain dates.
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn check_title(errors: &mut FieldErrors, title: &str, missing: &'static str) {
    if title.trim().is_empty() {
        errors.add("title", missing);
    } else if char_len(title) > TITLE_MAX {
        errors.add("title", format!("Title must be less than {} characters", TITLE_MAX));
    }
}

fn check_description(errors: &mut FieldErrors, description: &str) {
    if char_len(description) > DESCRIPTION_MAX {
        errors.add(
            "description",
            format!("Description must be less than {} characters", DESCRIPTION_MAX),
        );
    }
}

fn checkbox(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("on" | "true" | "1"))
}

// --- Photo upload ---

/// Text fields of the upload form; the file itself travels separately.
#[derive(Debug, Clone, Default)]
pub struct PhotoUploadForm {
    pub title: String,
    pub description: String,
    pub tags: String,
    pub photographer: String,
    pub location: String,
    pub date_taken: String,
    pub original_width: String,
    pub original_height: String,
    pub width: String,
    pub height: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidPhotoUpload {
    pub title: String,
    pub description: String,
    pub photographer: Option<String>,
    pub tags: Vec<String>,
    /// Form-supplied metadata; detected values are merged in later.
    pub metadata: PhotoMetadata,
}

impl PhotoUploadForm {
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = value,
            "description" => self.description = value,
            "tags" => self.tags = value,
            "photographer" => self.photographer = value,
            "location" => self.location = value,
            "dateTaken" => self.date_taken = value,
            "originalWidth" => self.original_width = value,
            "originalHeight" => self.original_height = value,
            "width" => self.width = value,
            "height" => self.height = value,
            _ => {}
        }
    }

    pub fn validate(&self, has_image: bool) -> Result<ValidPhotoUpload, FieldErrors> {
        let mut errors = FieldErrors::new();
        if !has_image {
            errors.add("image", "Please select an image");
        }
        check_title(&mut errors, &self.title, "Please enter a title");
        check_description(&mut errors, &self.description);

        let photographer = Some(self.photographer.trim().to_string()).filter(|p| !p.is_empty());
        let location = Some(self.location.trim().to_string()).filter(|l| !l.is_empty());
        let metadata = PhotoMetadata {
            photographer: photographer.clone(),
            location,
            date_taken: parse_date_time(&self.date_taken),
            original_width: parse_number(&self.original_width, None),
            original_height: parse_number(&self.original_height, None),
            width: parse_number(&self.width, None),
            height: parse_number(&self.height, None),
            ..PhotoMetadata::default()
        };

        errors.into_result(ValidPhotoUpload {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            photographer,
            tags: parse_tags(&self.tags),
            metadata,
        })
    }
}

// --- Photo edit ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoEditForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub is_featured: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidPhotoEdit {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub is_featured: bool,
}

impl PhotoEditForm {
    pub fn validate(&self) -> Result<ValidPhotoEdit, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_title(&mut errors, &self.title, "Please enter a title");
        check_description(&mut errors, &self.description);
        errors.into_result(ValidPhotoEdit {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            tags: parse_tags(&self.tags),
            is_featured: checkbox(&self.is_featured),
        })
    }
}

// --- Albums ---

/// Album create/edit form. Built from raw url-encoded pairs because the
/// photo selector submits `photos` once per checked photo and `offered`
/// once per photo it showed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlbumForm {
    pub title: String,
    pub description: String,
    pub tags: String,
    pub cover_image_url: String,
    pub is_featured: bool,
    pub photos: Vec<String>,
    pub offered: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

impl AlbumForm {
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let mut form = AlbumForm::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "title" => form.title = value.into_owned(),
                "description" => form.description = value.into_owned(),
                "tags" => form.tags = value.into_owned(),
                "cover_image_url" => form.cover_image_url = value.into_owned(),
                "is_featured" => form.is_featured = matches!(value.as_ref(), "on" | "true" | "1"),
                "photos" => push_unique(&mut form.photos, value.into_owned()),
                "offered" => push_unique(&mut form.offered, value.into_owned()),
                _ => {}
            }
        }
        form
    }

    /// The album's photo ids after applying the picker to `current`. Photos
    /// the picker showed but left unchecked are dropped, checked ones are
    /// appended, and members the picker never showed are kept.
    pub fn apply_selection(&self, current: &[String]) -> Vec<String> {
        let unchecked: Vec<String> = self
            .offered
            .iter()
            .filter(|id| !self.photos.contains(id))
            .cloned()
            .collect();
        merge_photo_ids(&without_photo_ids(current, &unchecked), &self.photos)
    }

    /// `first_selected_image` is the image url of the first selected photo,
    /// used as the cover when none was given.
    pub fn validate(&self, first_selected_image: Option<&str>) -> Result<AlbumDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        check_title(&mut errors, &self.title, "Please enter an album title");
        check_description(&mut errors, &self.description);

        let mut cover = self.cover_image_url.trim().to_string();
        if cover.is_empty() && !self.photos.is_empty() {
            cover = first_selected_image.unwrap_or_default().trim().to_string();
        }
        if cover.is_empty() {
            errors.add("cover_image_url", "Please provide a cover image URL or select photos");
        }

        errors.into_result(AlbumDraft {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            cover_image_url: cover,
            photos: self.photos.clone(),
            is_featured: self.is_featured,
            is_hidden: false,
            tags: parse_tags(&self.tags),
        })
    }
}

/// Photo ids submitted for removal from an album.
pub fn photo_ids_from_urlencoded(body: &[u8]) -> Vec<String> {
    url::form_urlencoded::parse(body)
        .filter(|(key, value)| key == "photos" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .collect()
}

// --- Auth ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(self.email.trim()) {
            errors.add("email", "Please enter a valid email address");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result(())
    }
}

/// Rewrite known backend login failures into friendlier text.
pub fn login_error_message(backend: &str) -> String {
    if backend.contains("Invalid credentials") {
        "Invalid email or password. Please try again.".to_string()
    } else if backend.contains("Too many attempts") {
        "Too many login attempts. Please try again in 10 minutes.".to_string()
    } else {
        backend.to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// At least 8 characters, one letter and one digit, from the allowed set.
pub fn is_strong_password(password: &str) -> bool {
    const SPECIALS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SPECIALS.contains(c))
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, value, label) in [
            ("first_name", &self.first_name, "First name"),
            ("last_name", &self.last_name, "Last name"),
        ] {
            if value.trim().is_empty() {
                errors.add(field, format!("{} is required", label));
            } else if char_len(value) > NAME_MAX {
                errors.add(field, format!("{} must be {} characters or less", label, NAME_MAX));
            }
        }
        if self.username.trim().is_empty() {
            errors.add("username", "Username is required");
        } else if !USERNAME_RE.is_match(&self.username) {
            errors.add(
                "username",
                "Username must be 3-50 characters, letters, numbers, and underscores only",
            );
        }
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Please enter a valid email address");
        }
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if !is_strong_password(&self.password) {
            errors.add(
                "password",
                "Password must be at least 8 characters with at least 1 letter and 1 number",
            );
        }
        errors.into_result(())
    }
}

/// Map backend uniqueness failures onto the field they concern.
pub fn register_conflict(backend: &str) -> Option<FieldErrors> {
    let mut errors = FieldErrors::new();
    if backend.contains("email already exists") {
        errors.add("email", "This email is already registered");
    } else if backend.contains("username already exists") {
        errors.add("username", "This username is already taken");
    } else {
        return None;
    }
    Some(errors)
}

// --- Profile ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFieldForm {
    pub field: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl PasswordForm {
    /// Returns the single message the profile page shows.
    pub fn validate(&self) -> Result<(), String> {
        if self.new_password != self.confirm_password {
            return Err("New passwords do not match".to_string());
        }
        if char_len(&self.new_password) < PASSWORD_CHANGE_MIN {
            return Err(format!(
                "Password must be at least {} characters",
                PASSWORD_CHANGE_MIN
            ));
        }
        Ok(())
    }
}

// --- Contact ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Please enter a valid email address");
        }
        if self.subject.trim().is_empty() {
            errors.add("subject", "Subject is required");
        }
        let message = self.message.trim();
        if message.is_empty() {
            errors.add("message", "Message is required");
        } else if char_len(message) < CONTACT_MESSAGE_MIN {
            errors.add(
                "message",
                format!(
                    "Message must be at least {} characters long",
                    CONTACT_MESSAGE_MIN
                ),
            );
        }
        errors.into_result(())
    }
}
