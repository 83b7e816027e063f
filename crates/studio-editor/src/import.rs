//! Bringing images into the studio: local files and navigation seeds.
//!
//! Local files become self-contained `data:` URLs so the document never
//! depends on the file system. Seeds are image references handed over by
//! other pages through URL query parameters.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::ImageReader;
use std::io::Cursor;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file is empty")]
    Empty,

    #[error("unreadable image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid seed url: {0}")]
    Url(#[from] url::ParseError),

    #[error("seed has no imageUrl parameter")]
    MissingImage,
}

/// A decoded local image ready to become a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedImage {
    pub name: String,
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// Sniff the format of `bytes`, read its dimensions and encode it as a
/// `data:<mime>;base64,...` URL.
pub fn import_image(name: &str, bytes: &[u8]) -> Result<ImportedImage, ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::Empty);
    }
    let format = image::guess_format(bytes)?;
    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format).into_dimensions()?;
    let data_url = format!("data:{};base64,{}", format.to_mime_type(), STANDARD.encode(bytes));
    log::debug!("imported {name}: {width}x{height} {format:?}");
    Ok(ImportedImage {
        name: name.to_string(),
        data_url,
        width,
        height,
    })
}

/// An image reference passed to the studio by another page.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSeed {
    pub image_url: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl LayerSeed {
    /// Parse `imageUrl`, `width` and `height` from a query string
    /// (with or without the leading `?`). Values are percent-decoded.
    pub fn from_query(query: &str) -> Result<Self, ImportError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut image_url = None;
        let mut width = None;
        let mut height = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "imageUrl" if !value.is_empty() => image_url = Some(value.into_owned()),
                "width" => width = positive(&value),
                "height" => height = positive(&value),
                _ => {}
            }
        }
        Ok(Self {
            image_url: image_url.ok_or(ImportError::MissingImage)?,
            width,
            height,
        })
    }

    /// Parse a full page URL such as `https://host/studio?imageUrl=...`.
    pub fn from_url(url: &str) -> Result<Self, ImportError> {
        let url = Url::parse(url)?;
        Self::from_query(url.query().unwrap_or_default())
    }
}

fn positive(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}
