//! Test map image generation.
//!
//! Small in-memory PNG/JPEG maps for exercising the image, codec and session
//! code without fixture files.

use std::io::Cursor;

use crate::model::ImageRef;

/// Encode a `width` x `height` gradient with a per-image `seed` tint.
pub(crate) fn gradient_bytes(width: u32, height: u32, seed: u8, format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        image::Rgb([r, g, seed])
    });

    let mut out = Cursor::new(Vec::new());
    if let Err(e) = img.write_to(&mut out, format) {
        log::warn!("Failed to encode test image: {}", e);
    }
    out.into_inner()
}

/// PNG map image of the given size.
pub(crate) fn png_map(width: u32, height: u32, seed: u8) -> ImageRef {
    ImageRef::new(
        "image/png",
        gradient_bytes(width, height, seed, image::ImageFormat::Png),
    )
}

/// JPEG map image of the given size.
pub(crate) fn jpeg_map(width: u32, height: u32, seed: u8) -> ImageRef {
    ImageRef::new(
        "image/jpeg",
        gradient_bytes(width, height, seed, image::ImageFormat::Jpeg),
    )
}
