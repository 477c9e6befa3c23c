//! Codec seam between the pixel pipeline and the filesystem.
//!
//! The [`ImageBackend`] trait covers the two operations that touch disk:
//! decoding a file into an RGBA buffer and encoding a buffer back out.
//! Everything in between (background removal, trim, resize) works on
//! in-memory [`RgbaImage`]s and never sees a path.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests swap in the
//! `MockBackend` below so pipeline logic runs without real files.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("failed to write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },
}

impl BackendError {
    pub fn decode(path: &Path, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn write(path: &Path, reason: impl ToString) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Trait for image codec backends.
///
/// `decode` always yields 8-bit RGBA: sources without an alpha channel come
/// back fully opaque. `encode` creates missing parent directories and picks
/// the container format from the output extension.
pub trait ImageBackend: Sync {
    /// Decode the file at `path` into an RGBA buffer.
    fn decode(&self, path: &Path) -> Result<RgbaImage, BackendError>;

    /// Encode `image` and write it to `path`.
    fn encode(&self, image: &RgbaImage, path: &Path) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory backend that records every call.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub sources: Mutex<HashMap<PathBuf, RgbaImage>>,
        pub written: Mutex<HashMap<PathBuf, RgbaImage>>,
        pub operations: Mutex<Vec<RecordedOp>>,
        pub fail_writes: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(String),
        Encode {
            path: String,
            width: u32,
            height: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_source(path: impl Into<PathBuf>, image: RgbaImage) -> Self {
            let backend = Self::new();
            backend.add_source(path, image);
            backend
        }

        pub fn add_source(&self, path: impl Into<PathBuf>, image: RgbaImage) {
            self.sources.lock().unwrap().insert(path.into(), image);
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn written_image(&self, path: &Path) -> Option<RgbaImage> {
            self.written.lock().unwrap().get(path).cloned()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, path: &Path) -> Result<RgbaImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));

            self.sources
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| BackendError::decode(path, "no mock image registered"))
        }

        fn encode(&self, image: &RgbaImage, path: &Path) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                path: path.to_string_lossy().to_string(),
                width: image.width(),
                height: image.height(),
            });
            if self.fail_writes {
                return Err(BackendError::write(path, "mock write failure"));
            }
            self.written
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), image.clone());
            Ok(())
        }
    }

    #[test]
    fn mock_decodes_registered_source() {
        let backend = MockBackend::with_source("/sprites/toad.png", RgbaImage::new(8, 6));

        let image = backend.decode(Path::new("/sprites/toad.png")).unwrap();
        assert_eq!(image.dimensions(), (8, 6));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Decode(p) if p == "/sprites/toad.png"));
    }

    #[test]
    fn mock_unknown_source_is_decode_error() {
        let backend = MockBackend::new();
        let result = backend.decode(Path::new("/missing.png"));
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    #[test]
    fn mock_records_encode() {
        let backend = MockBackend::new();
        backend
            .encode(&RgbaImage::new(3, 4), Path::new("/out/toad_processed.png"))
            .unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Encode {
                path: "/out/toad_processed.png".to_string(),
                width: 3,
                height: 4,
            }]
        );
        assert!(
            backend
                .written_image(Path::new("/out/toad_processed.png"))
                .is_some()
        );
    }

    #[test]
    fn error_messages_name_the_path() {
        let err = BackendError::write(Path::new("/ro/out.png"), "permission denied");
        assert_eq!(err.to_string(), "failed to write /ro/out.png: permission denied");
    }
}
