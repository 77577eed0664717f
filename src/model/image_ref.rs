//! Opaque image payloads used as map backgrounds.

use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use thiserror::Error;

use crate::constants::FALLBACK_IMAGE_MIME;

/// Errors raised while parsing an inline image.
#[derive(Error, Debug)]
pub enum ImageRefError {
    /// The string does not start with `data:`
    #[error("Not a data URI")]
    NotDataUri,

    /// The data URI is not base64 encoded
    #[error("Data URI is not base64 encoded")]
    NotBase64,

    /// The base64 payload could not be decoded
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Raw image bytes plus their MIME type.
///
/// The payload is reference counted, so cloning an image (and therefore
/// cloning the map tree that holds it) never copies pixel data.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageRef {
    mime: String,
    data: Arc<[u8]>,
}

impl ImageRef {
    /// Wrap uploaded bytes with the MIME type reported by the upload surface.
    pub fn new(mime: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime: mime.into(),
            data: data.into(),
        }
    }

    /// Wrap bytes whose MIME type is unknown, sniffing it from the header.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mime = image::guess_format(&data)
            .map(|format| format.to_mime_type())
            .unwrap_or(FALLBACK_IMAGE_MIME);
        Self::new(mime, data)
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pixel dimensions, read from the encoded image header.
    pub fn dimensions(&self) -> Result<(u32, u32), image::ImageError> {
        let reader = image::ImageReader::new(Cursor::new(self.bytes())).with_guessed_format()?;
        reader.into_dimensions()
    }

    /// Render as a `data:<mime>;base64,<payload>` URI.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            BASE64_STANDARD.encode(self.bytes())
        )
    }

    /// Parse a base64 data URI.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageRefError> {
        let rest = uri.trim().strip_prefix("data:").ok_or(ImageRefError::NotDataUri)?;
        let (header, payload) = rest.split_once(',').ok_or(ImageRefError::NotDataUri)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(ImageRefError::NotBase64)?;
        let mime = if mime.is_empty() {
            FALLBACK_IMAGE_MIME
        } else {
            mime
        };

        let data = BASE64_STANDARD.decode(payload.as_bytes())?;
        Ok(Self::new(mime, data))
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRef")
            .field("mime", &self.mime)
            .field("len", &self.data.len())
            .finish()
    }
}
