//! CLI output formatting for processing progress.
//!
//! # Output Format
//!
//! ## Single file
//!
//! ```text
//! Processing: sprites/toad.png (64x64)
//!     Removed white background (threshold=240)
//!     Trimmed: 64x64 -> 30x41
//!     Resized to fit 32x32: 23x32
//!     Saved: sprites/toad_processed.png (23x32)
//! ```
//!
//! ## Directory
//!
//! ```text
//! Found 3 images in sprites
//!     Skipping sprites/toad_processed.png (already processed)
//! Processing: sprites/bat.png (48x48)
//!     ...
//!     Error: failed to decode sprites/broken.png: ...
//!
//! Processed 2 files (1 failed, 1 skipped)
//! ```
//!
//! ## Sprite sheet
//!
//! ```text
//! Processing: art/walk.png (256x64)
//!     Split into 4x1 frames of 64x64
//!     Saved: art/walk_processed/walk_00.png (64x64)
//!     ...
//!     Manifest: art/walk_processed/manifest.json
//! ```
//!
//! # Architecture
//!
//! Each `format_*` function returns `Vec<String>` for testability and has a
//! `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::batch::BatchResult;
use crate::config::BgMethod;
use crate::sprite::ProcessEvent;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn size(dimensions: (u32, u32)) -> String {
    format!("{}x{}", dimensions.0, dimensions.1)
}

fn background_line(method: BgMethod, threshold: u8, tolerance: u32) -> String {
    match method {
        BgMethod::White => format!("Removed white background (threshold={threshold})"),
        BgMethod::Corner => {
            format!("Removed background by corner color (tolerance={tolerance})")
        }
        BgMethod::Flood => {
            format!("Removed background by flood fill from edges (tolerance={tolerance})")
        }
    }
}

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started {
            path,
            width,
            height,
        } => vec![format!(
            "Processing: {} ({})",
            path.display(),
            size((*width, *height))
        )],
        ProcessEvent::BackgroundRemoved {
            method,
            threshold,
            tolerance,
        } => vec![format!(
            "{}{}",
            indent(1),
            background_line(*method, *threshold, *tolerance)
        )],
        ProcessEvent::Trimmed { from, to } if from == to => vec![format!(
            "{}Trimmed: {} (nothing to crop)",
            indent(1),
            size(*from)
        )],
        ProcessEvent::Trimmed { from, to } => vec![format!(
            "{}Trimmed: {} -> {}",
            indent(1),
            size(*from),
            size(*to)
        )],
        ProcessEvent::Resized { bounds, to, canvas } => {
            let suffix = if *canvas { " (centered on canvas)" } else { "" };
            vec![format!(
                "{}Resized to fit {bounds}: {}{suffix}",
                indent(1),
                size(*to)
            )]
        }
        ProcessEvent::Saved {
            path,
            width,
            height,
        } => vec![format!(
            "{}Saved: {} ({})",
            indent(1),
            path.display(),
            size((*width, *height))
        )],
        ProcessEvent::Discovered { directory, count } => match count {
            0 => vec![format!("No images found in {}", directory.display())],
            1 => vec![format!("Found 1 image in {}", directory.display())],
            n => vec![format!("Found {n} images in {}", directory.display())],
        },
        ProcessEvent::Skipped { path } => vec![format!(
            "{}Skipping {} (already processed)",
            indent(1),
            path.display()
        )],
        ProcessEvent::Failed { error, .. } => vec![format!("{}Error: {error}", indent(1))],
        ProcessEvent::SheetSplit {
            columns,
            rows,
            frame,
            ..
        } => vec![format!(
            "{}Split into {columns}x{rows} frames of {}",
            indent(1),
            size(*frame)
        )],
        ProcessEvent::ManifestWritten { path } => {
            vec![format!("{}Manifest: {}", indent(1), path.display())]
        }
    }
}

/// True for events that belong on stderr and survive `--quiet`.
pub fn is_error_event(event: &ProcessEvent) -> bool {
    matches!(event, ProcessEvent::Failed { .. })
}

/// Closing summary for a directory run.
///
/// ```text
///
/// Processed 2 files (1 failed, 1 skipped)
/// ```
pub fn format_batch_summary(result: &BatchResult) -> Vec<String> {
    let processed = result.outputs.len();
    let noun = if processed == 1 { "file" } else { "files" };

    let mut details = Vec::new();
    if !result.failures.is_empty() {
        details.push(format!("{} failed", result.failures.len()));
    }
    if !result.skipped.is_empty() {
        details.push(format!("{} skipped", result.skipped.len()));
    }

    let mut line = format!("Processed {processed} {noun}");
    if !details.is_empty() {
        line.push_str(&format!(" ({})", details.join(", ")));
    }
    vec![String::new(), line]
}

pub fn print_batch_summary(result: &BatchResult) {
    for line in format_batch_summary(result) {
        println!("{}", line);
    }
}
