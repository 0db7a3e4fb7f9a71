//! Upload-side image handling.
//!
//! Large uploads are downscaled to fit a fixed ceiling and re-encoded as
//! JPEG before they are sent to the backend. Every failure falls back to
//! the original bytes; nothing here is retried.

use std::io::Cursor;

use chrono::{DateTime, NaiveDate, Utc};
use exif::{In, Reader, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::models::PhotoMetadata;

pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const COMPRESS_OVER_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("Please select a valid image file")]
    NotAnImage,

    #[error("File appears to be empty. Please try another file.")]
    Empty,

    #[error("File too large. Maximum size is {0}MB.")]
    TooLarge(usize),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image processing failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Processed file is empty")]
    EmptyOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality, 1-100.
    pub quality: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_width: 2560,
            max_height: 1920,
            quality: 92,
        }
    }
}

/// Size that fits within the ceiling, scaled by a single factor so the
/// aspect ratio is kept. Images already inside the ceiling are unchanged.
pub fn target_dimensions(width: u32, height: u32, options: &CompressionOptions) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    if width <= options.max_width && height <= options.max_height {
        return (width, height);
    }
    let ratio = f64::min(
        options.max_width as f64 / width as f64,
        options.max_height as f64 / height as f64,
    );
    let scaled_width = ((width as f64 * ratio).round() as u32).max(1);
    let scaled_height = ((height as f64 * ratio).round() as u32).max(1);
    (scaled_width, scaled_height)
}

#[derive(Debug, Clone)]
pub struct Compressed {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub original_dimensions: (u32, u32),
    pub dimensions: (u32, u32),
    /// False when the original bytes were kept.
    pub reencoded: bool,
}

/// Downscale (when needed) and re-encode as JPEG. Falls back to `original`
/// on any decode/encode failure or an empty result.
pub fn compress(original: &[u8], mime: &str, options: &CompressionOptions) -> Compressed {
    match reencode(original, options) {
        Ok(compressed) => compressed,
        Err(e) => {
            tracing::warn!("Compression failed, using original file: {}", e);
            let dimensions = read_dimensions(original).unwrap_or((0, 0));
            Compressed {
                bytes: original.to_vec(),
                mime: mime.to_string(),
                original_dimensions: dimensions,
                dimensions,
                reencoded: false,
            }
        }
    }
}

fn reencode(original: &[u8], options: &CompressionOptions) -> Result<Compressed, ImagingError> {
    let img = image::load_from_memory(original)?;
    let original_dimensions = (img.width(), img.height());
    let (width, height) = target_dimensions(img.width(), img.height(), options);

    let img = if (width, height) != original_dimensions {
        img.resize_exact(width, height, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, options.quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)?;

    if bytes.is_empty() {
        return Err(ImagingError::EmptyOutput);
    }
    Ok(Compressed {
        bytes,
        mime: "image/jpeg".to_string(),
        original_dimensions,
        dimensions: (width, height),
        reencoded: true,
    })
}

/// Read width/height from the header without decoding pixels.
pub fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// `DateTimeOriginal` (or `DateTime`) from EXIF, read as UTC.
pub fn read_date_taken(bytes: &[u8]) -> Option<DateTime<Utc>> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(bytes))
        .ok()?;
    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .or_else(|| exif.get_field(Tag::DateTime, In::PRIMARY))?;
    let Value::Ascii(ref values) = field.value else {
        return None;
    };
    let parsed = exif::DateTime::from_ascii(values.first()?).ok()?;
    NaiveDate::from_ymd_opt(parsed.year as i32, parsed.month as u32, parsed.day as u32)?
        .and_hms_opt(parsed.hour as u32, parsed.minute as u32, parsed.second as u32)
        .map(|naive| naive.and_utc())
}

/// What the upload form learns about a file before it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedMetadata {
    pub original_width: Option<u32>,
    pub original_height: Option<u32>,
    pub format: String,
    pub original_size_kb: f64,
    pub date_taken: Option<DateTime<Utc>>,
}

pub fn detect_metadata(bytes: &[u8], mime: &str) -> DetectedMetadata {
    let dimensions = read_dimensions(bytes);
    DetectedMetadata {
        original_width: dimensions.map(|d| d.0),
        original_height: dimensions.map(|d| d.1),
        format: mime.to_string(),
        original_size_kb: bytes.len() as f64 / 1024.0,
        date_taken: read_date_taken(bytes),
    }
}

/// Before/after figures shown to the uploader.
#[derive(Debug, Clone, PartialEq)]
pub enum CompressionReport {
    NotNeeded,
    Compressed {
        original_size: usize,
        compressed_size: usize,
        original_dimensions: (u32, u32),
        dimensions: (u32, u32),
    },
}

impl CompressionReport {
    /// Whole-percent size reduction, e.g. 63 for a file shrunk to 37%.
    pub fn reduction_percent(&self) -> Option<i64> {
        match self {
            CompressionReport::NotNeeded => None,
            CompressionReport::Compressed {
                original_size,
                compressed_size,
                ..
            } if *original_size > 0 => {
                let ratio = *compressed_size as f64 / *original_size as f64;
                Some(((1.0 - ratio) * 100.0).round() as i64)
            }
            CompressionReport::Compressed { .. } => None,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            CompressionReport::NotNeeded => {
                "Image kept at original quality (no compression needed)".to_string()
            }
            CompressionReport::Compressed {
                original_dimensions,
                dimensions,
                ..
            } => format!(
                "{} → {} ({}% reduction)",
                format_dimensions(*original_dimensions),
                format_dimensions(*dimensions),
                self.reduction_percent().unwrap_or(0)
            ),
        }
    }
}

fn format_dimensions((w, h): (u32, u32)) -> String {
    format!("{} × {}", w, h)
}

/// A file chosen for upload, validated and compressed.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: String,
    pub detected: DetectedMetadata,
    pub size_kb: f64,
    pub report: CompressionReport,
}

impl PreparedUpload {
    /// Merge form-supplied metadata with what was detected from the file.
    /// Form values win; detected values fill the gaps.
    pub fn metadata(&self, from_form: &PhotoMetadata) -> PhotoMetadata {
        PhotoMetadata {
            photographer: from_form.photographer.clone(),
            location: from_form.location.clone(),
            date_taken: from_form.date_taken.or(self.detected.date_taken),
            original_width: from_form.original_width.or(self.detected.original_width),
            original_height: from_form.original_height.or(self.detected.original_height),
            width: from_form.width.or(self.detected.original_width),
            height: from_form.height.or(self.detected.original_height),
            original_size_kb: Some(self.detected.original_size_kb),
            size_kb: Some(self.size_kb),
            format: Some(if self.detected.format.is_empty() {
                self.mime.clone()
            } else {
                self.detected.format.clone()
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_bytes: usize,
    pub compress_over_bytes: usize,
    pub compression: CompressionOptions,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
            compress_over_bytes: COMPRESS_OVER_BYTES,
            compression: CompressionOptions::default(),
        }
    }
}

/// Validate a selected file and compress it when it is large in bytes or
/// in pixels.
pub fn prepare_upload(
    bytes: Vec<u8>,
    file_name: &str,
    mime: &str,
    limits: &UploadLimits,
) -> Result<PreparedUpload, ImagingError> {
    if !mime.starts_with("image/") {
        return Err(ImagingError::NotAnImage);
    }
    if bytes.is_empty() {
        return Err(ImagingError::Empty);
    }
    if bytes.len() > limits.max_bytes {
        return Err(ImagingError::TooLarge(limits.max_bytes / (1024 * 1024)));
    }

    let detected = detect_metadata(&bytes, mime);
    let oversized = detected
        .original_width
        .is_some_and(|w| w > limits.compression.max_width)
        || detected
            .original_height
            .is_some_and(|h| h > limits.compression.max_height);

    if bytes.len() <= limits.compress_over_bytes && !oversized {
        let size_kb = bytes.len() as f64 / 1024.0;
        return Ok(PreparedUpload {
            bytes,
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            detected,
            size_kb,
            report: CompressionReport::NotNeeded,
        });
    }

    let compressed = compress(&bytes, mime, &limits.compression);
    let (bytes, mime, report) = if compressed.reencoded && !compressed.bytes.is_empty() {
        let report = CompressionReport::Compressed {
            original_size: bytes.len(),
            compressed_size: compressed.bytes.len(),
            original_dimensions: compressed.original_dimensions,
            dimensions: compressed.dimensions,
        };
        tracing::info!(
            original = bytes.len(),
            compressed = compressed.bytes.len(),
            "Compressed upload {}",
            file_name
        );
        (compressed.bytes, compressed.mime, report)
    } else {
        (bytes, mime.to_string(), CompressionReport::NotNeeded)
    };

    let size_kb = bytes.len() as f64 / 1024.0;
    Ok(PreparedUpload {
        bytes,
        file_name: file_name.to_string(),
        mime,
        detected,
        size_kb,
        report,
    })
}
