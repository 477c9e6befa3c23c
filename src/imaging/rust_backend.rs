//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, TIFF, WebP) | `image::ImageReader` → `into_rgba8` |
//! | Encode (PNG, TIFF, WebP) | `RgbaImage::save_with_format` |
//!
//! JPEG is read-only here: it has no alpha channel, so a transparent sprite
//! cannot be written back to it.

use super::backend::{BackendError, ImageBackend};
use image::{ImageFormat, ImageReader, RgbaImage};
use std::path::Path;
use std::sync::LazyLock;

/// Formats we decode, keyed by lowercase extension.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

/// Formats that can store an alpha channel and have an encoder compiled in.
const OUTPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_INPUT: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_INPUT
}

/// Whether files with this extension can be written with transparency intact.
pub fn is_alpha_output_extension(ext: &str) -> bool {
    OUTPUT_CANDIDATES
        .iter()
        .any(|(candidate, fmt)| candidate.eq_ignore_ascii_case(ext) && fmt.writing_enabled())
}

fn output_format(path: &Path) -> Result<ImageFormat, BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    OUTPUT_CANDIDATES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, fmt)| *fmt)
        .ok_or_else(|| {
            BackendError::write(path, format!("unsupported output format: {ext:?}"))
        })
}

/// `image`-crate backend. Stateless; construct freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<RgbaImage, BackendError> {
        let image = ImageReader::open(path)
            .map_err(|e| BackendError::decode(path, e))?
            .with_guessed_format()
            .map_err(|e| BackendError::decode(path, e))?
            .decode()
            .map_err(|e| BackendError::decode(path, e))?;
        Ok(image.into_rgba8())
    }

    fn encode(&self, image: &RgbaImage, path: &Path) -> Result<(), BackendError> {
        let format = output_format(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| BackendError::write(path, e))?;
        }
        image
            .save_with_format(path, format)
            .map_err(|e| BackendError::write(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 20) as u8, (y * 30) as u8, 77, ((x + y) * 10) as u8])
        })
    }

    #[test]
    fn supported_extensions_include_png_and_jpeg() {
        let exts = supported_input_extensions();
        for expected in &["png", "jpg", "jpeg", "tif", "tiff", "webp"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn alpha_output_extensions() {
        assert!(is_alpha_output_extension("png"));
        assert!(is_alpha_output_extension("PNG"));
        assert!(is_alpha_output_extension("webp"));
        assert!(!is_alpha_output_extension("jpg"));
        assert!(!is_alpha_output_extension(""));
    }

    #[test]
    fn png_roundtrip_preserves_pixels_exactly() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sprite.png");
        let original = gradient(7, 5);

        let backend = RustBackend::new();
        backend.encode(&original, &path).unwrap();
        let decoded = backend.decode(&path).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn encode_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/deeper/sprite.png");

        RustBackend::new().encode(&gradient(2, 2), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn encode_rejects_formats_without_alpha() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sprite.jpg");

        let result = RustBackend::new().encode(&gradient(2, 2), &path);
        assert!(matches!(result, Err(BackendError::Write { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn decode_opaque_jpeg_gains_alpha() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        let rgb = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10]));
        rgb.save_with_format(&path, ImageFormat::Jpeg).unwrap();

        let decoded = RustBackend::new().decode(&path).unwrap();
        assert_eq!(decoded.dimensions(), (4, 4));
        assert!(decoded.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn decode_corrupt_file_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let result = RustBackend::new().decode(&path);
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    #[test]
    fn decode_nonexistent_file_errors() {
        let result = RustBackend::new().decode(Path::new("/nonexistent/sprite.png"));
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }
}
