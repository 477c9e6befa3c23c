//! Single-sprite processing.
//!
//! One call to [`process`] runs the full lifecycle for one file:
//!
//! ```text
//! decode → remove background → trim → resize (→ canvas) → encode
//! ```
//!
//! Each stage is switched on or off by [`ProcessingConfig`] but the order
//! never changes. Stages hand an owned [`RgbaImage`] to the next one, so
//! nothing is shared between files and batch mode can run them in any order.
//!
//! ## Output Paths
//!
//! Without an explicit output, the result lands beside the input with the
//! configured marker appended to the stem:
//!
//! ```text
//! sprites/toad.png  →  sprites/toad_processed.png
//! ```
//!
//! The extension is kept when the format can store transparency; anything
//! else (e.g. `.jpg`) is written as `.png`.

use crate::config::{BgMethod, ConfigError, ProcessingConfig, ResizeBounds};
use crate::imaging::{
    BackendError, ImageBackend, RustBackend, is_alpha_output_extension, place_on_canvas,
    remove_background, resize_to_fit, trim,
};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpriteError {
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error(transparent)]
    Decode(BackendError),
    #[error(transparent)]
    Write(BackendError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Two inputs in one run would produce the same output file.
    #[error("{} would overwrite {}, already written for {}", input.display(), output.display(), claimed_by.display())]
    OutputCollision {
        input: PathBuf,
        output: PathBuf,
        claimed_by: PathBuf,
    },
}

impl From<BackendError> for SpriteError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode { .. } => SpriteError::Decode(err),
            BackendError::Write { .. } => SpriteError::Write(err),
        }
    }
}

/// Progress reported while processing. Rendered by
/// [`output::format_process_event`](crate::output::format_process_event).
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// Input decoded.
    Started {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    BackgroundRemoved {
        method: BgMethod,
        threshold: u8,
        tolerance: u32,
    },
    Trimmed {
        from: (u32, u32),
        to: (u32, u32),
    },
    Resized {
        bounds: ResizeBounds,
        to: (u32, u32),
        canvas: bool,
    },
    Saved {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    /// Directory walk finished.
    Discovered {
        directory: PathBuf,
        count: usize,
    },
    /// Input already carries the output marker.
    Skipped {
        path: PathBuf,
    },
    /// A batch entry failed; the batch goes on.
    Failed {
        path: PathBuf,
        error: String,
    },
    SheetSplit {
        path: PathBuf,
        columns: u32,
        rows: u32,
        frame: (u32, u32),
    },
    ManifestWritten {
        path: PathBuf,
    },
}

pub(crate) fn emit(events: Option<&Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is listening
        let _ = tx.send(event);
    }
}

/// Extension for outputs derived from `input`: kept when it can hold
/// alpha, `png` otherwise.
pub fn output_extension(input: &Path) -> &str {
    input
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| is_alpha_output_extension(e))
        .unwrap_or("png")
}

/// File name for a derived output: `<stem><marker>.<ext>`.
pub fn output_file_name(input: &Path, marker: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("{stem}{marker}.{}", output_extension(input))
}

/// Same directory as `input`, marker appended to the stem.
pub fn derive_output_path(input: &Path, marker: &str) -> PathBuf {
    input.with_file_name(output_file_name(input, marker))
}

/// Where the result for `input` goes.
///
/// An explicit `output` names a directory when it exists as one, ends with a
/// path separator or has no extension. A directory receives the derived file
/// name and is created on write. Any other explicit path is used verbatim.
pub fn resolve_output_path(input: &Path, output: Option<&Path>, marker: &str) -> PathBuf {
    match output {
        Some(dir) if names_directory(dir) => dir.join(output_file_name(input, marker)),
        Some(path) => path.to_path_buf(),
        None => derive_output_path(input, marker),
    }
}

fn names_directory(path: &Path) -> bool {
    path.is_dir()
        || path.to_string_lossy().ends_with(std::path::is_separator)
        || path.extension().is_none()
}

/// Run the enabled pixel stages in their fixed order.
pub fn transform(
    image: RgbaImage,
    config: &ProcessingConfig,
    events: Option<&Sender<ProcessEvent>>,
) -> RgbaImage {
    let mut image = image;

    if config.remove_bg {
        image = remove_background(image, &config.background_params());
        emit(
            events,
            ProcessEvent::BackgroundRemoved {
                method: config.bg_method,
                threshold: config.threshold,
                tolerance: config.tolerance,
            },
        );
    }

    if config.trim {
        let from = image.dimensions();
        image = trim(image, config.padding);
        emit(
            events,
            ProcessEvent::Trimmed {
                from,
                to: image.dimensions(),
            },
        );
    }

    if let Some(bounds) = config.resize {
        image = fit_to_bounds(image, bounds, config.canvas);
        emit(
            events,
            ProcessEvent::Resized {
                bounds,
                to: image.dimensions(),
                canvas: config.canvas,
            },
        );
    }

    image
}

/// Resize into `bounds`, optionally padding out to exactly `bounds`.
pub(crate) fn fit_to_bounds(image: RgbaImage, bounds: ResizeBounds, canvas: bool) -> RgbaImage {
    let resized = resize_to_fit(image, bounds.max_width, bounds.max_height);
    if canvas {
        place_on_canvas(&resized, bounds.max_width, bounds.max_height)
    } else {
        resized
    }
}

/// Process one sprite with the `image`-crate backend.
///
/// Returns the path that was written.
pub fn process(
    input: &Path,
    output: Option<&Path>,
    config: &ProcessingConfig,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<PathBuf, SpriteError> {
    process_with_backend(&RustBackend::new(), input, output, config, events)
}

/// Process one sprite using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    input: &Path,
    output: Option<&Path>,
    config: &ProcessingConfig,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<PathBuf, SpriteError> {
    if !input.exists() {
        return Err(SpriteError::NotFound(input.to_path_buf()));
    }

    let image = backend.decode(input)?;
    let (width, height) = image.dimensions();
    emit(
        events,
        ProcessEvent::Started {
            path: input.to_path_buf(),
            width,
            height,
        },
    );

    let image = transform(image, config, events);

    let output_path = resolve_output_path(input, output, &config.marker);
    backend.encode(&image, &output_path)?;
    emit(
        events,
        ProcessEvent::Saved {
            path: output_path.clone(),
            width: image.width(),
            height: image.height(),
        },
    );

    Ok(output_path)
}
