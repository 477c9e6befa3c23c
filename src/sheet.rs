//! Sprite-sheet splitting.
//!
//! A sheet is a grid of equally sized frames. [`process_sheet`] cuts it into
//! `floor(sheet_w / frame_w) × floor(sheet_h / frame_h)` frames in row-major
//! order, cleans each frame and writes it as its own file:
//!
//! ```text
//! walk.png (4×2 grid)  →  walk_processed/
//!                         ├── walk_00.png … walk_07.png
//!                         └── manifest.json
//! ```
//!
//! Every frame uses the background colour sampled from the first frame, and
//! frames are not trimmed, so all frames keep the same size and alignment.
//! Resize and canvas apply per frame. Partial frames at the right and bottom
//! edges are dropped.

use crate::config::{ConfigError, ProcessingConfig};
use crate::imaging::{
    BackendError, ImageBackend, RustBackend, calculate_frame_grid,
    remove_background_with_reference, sample_reference,
};
use crate::sprite::{self, ProcessEvent, SpriteError, emit};
use image::{RgbaImage, imageops};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

/// Written as `manifest.json` next to the frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetManifest {
    /// Input file stem.
    pub name: String,
    /// Frame size as cut from the sheet, before any resize.
    pub frame_size: [u32; 2],
    pub columns: u32,
    pub rows: u32,
    /// Frame file names in row-major order.
    pub frames: Vec<String>,
}

/// Cut `sheet` into frames of `frame` size, row-major.
pub fn split_sheet(sheet: &RgbaImage, frame: (u32, u32)) -> Vec<RgbaImage> {
    let (columns, rows) = calculate_frame_grid(sheet.dimensions(), frame);
    let (fw, fh) = frame;
    (0..rows)
        .flat_map(|row| (0..columns).map(move |col| (col, row)))
        .map(|(col, row)| imageops::crop_imm(sheet, col * fw, row * fh, fw, fh).to_image())
        .collect()
}

/// Default frame directory: `<dir>/<stem><marker>/`.
pub fn sheet_output_dir(input: &Path, marker: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{marker}"))
}

/// Split and clean a sheet with the `image`-crate backend.
pub fn process_sheet(
    input: &Path,
    output_dir: Option<&Path>,
    frame: (u32, u32),
    config: &ProcessingConfig,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<SheetManifest, SpriteError> {
    process_sheet_with_backend(&RustBackend::new(), input, output_dir, frame, config, events)
}

/// Split and clean a sheet using a specific backend (allows testing with mock).
pub fn process_sheet_with_backend(
    backend: &impl ImageBackend,
    input: &Path,
    output_dir: Option<&Path>,
    frame: (u32, u32),
    config: &ProcessingConfig,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<SheetManifest, SpriteError> {
    if !input.exists() {
        return Err(SpriteError::NotFound(input.to_path_buf()));
    }

    let sheet = backend.decode(input)?;
    let (width, height) = sheet.dimensions();
    emit(
        events,
        ProcessEvent::Started {
            path: input.to_path_buf(),
            width,
            height,
        },
    );

    let (columns, rows) = calculate_frame_grid((width, height), frame);
    if columns == 0 || rows == 0 {
        return Err(ConfigError::Validation(format!(
            "sheet {width}x{height} is smaller than one {}x{} frame",
            frame.0, frame.1
        ))
        .into());
    }
    emit(
        events,
        ProcessEvent::SheetSplit {
            path: input.to_path_buf(),
            columns,
            rows,
            frame,
        },
    );

    let frames = split_sheet(&sheet, frame);
    let reference = frames.first().and_then(sample_reference);
    let params = config.background_params();

    let dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| sheet_output_dir(input, &config.marker));
    let name = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = sprite::output_extension(input);

    let mut names = Vec::with_capacity(frames.len());
    for (index, mut image) in frames.into_iter().enumerate() {
        if config.remove_bg {
            image = remove_background_with_reference(image, &params, reference);
        }
        if let Some(bounds) = config.resize {
            image = sprite::fit_to_bounds(image, bounds, config.canvas);
        }

        let file_name = format!("{name}_{index:02}.{ext}");
        let path = dir.join(&file_name);
        backend.encode(&image, &path)?;
        emit(
            events,
            ProcessEvent::Saved {
                path,
                width: image.width(),
                height: image.height(),
            },
        );
        names.push(file_name);
    }

    let manifest = SheetManifest {
        name,
        frame_size: [frame.0, frame.1],
        columns,
        rows,
        frames: names,
    };
    let manifest_path = dir.join("manifest.json");
    write_manifest(&manifest, &manifest_path)?;
    emit(
        events,
        ProcessEvent::ManifestWritten {
            path: manifest_path,
        },
    );

    Ok(manifest)
}

fn write_manifest(manifest: &SheetManifest, path: &Path) -> Result<(), BackendError> {
    let json =
        serde_json::to_string_pretty(manifest).map_err(|e| BackendError::write(path, e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BackendError::write(path, e))?;
    }
    fs::write(path, json).map_err(|e| BackendError::write(path, e))
}
