//! Image previews for the file list.

use std::io::Cursor;
use std::path::Path;

const THUMBNAIL_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Only JPEG and PNG uploads get a preview.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| THUMBNAIL_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Downscale `bytes` to fit in a `size`x`size` box, encoded as PNG.
///
/// Returns `None` when the bytes cannot be decoded as an image.
pub fn render(bytes: &[u8], size: u32) -> Option<Vec<u8>> {
    let img = image::load_from_memory(bytes).ok()?;
    let thumb = img.thumbnail(size, size);
    let mut out = Cursor::new(Vec::new());
    thumb
        .write_to(&mut out, image::ImageOutputFormat::Png)
        .ok()?;
    Some(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("uploads/1-cat.PNG")));
        assert!(is_supported(Path::new("uploads/1-cat.jpeg")));
        assert!(!is_supported(Path::new("uploads/1-cat.gif")));
        assert!(!is_supported(Path::new("uploads/1-report")));
    }

    #[test]
    fn test_render_keeps_aspect_ratio() {
        let thumb = render(&png_bytes(64, 32), 16).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.dimensions(), (16, 8));
    }

    #[test]
    fn test_render_rejects_garbage() {
        assert!(render(b"definitely not an image", 16).is_none());
    }
}
