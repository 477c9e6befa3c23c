//! Directory mode: run the sprite pipeline over every matching file in a tree.
//!
//! ## Discovery
//!
//! The tree is walked with `walkdir` (symlinks are not followed). Regular
//! files whose extension is listed in `batch.extensions` are collected and
//! sorted by path, so runs are reproducible.
//!
//! Files whose stem already contains the output marker are skipped. This
//! keeps a second run over the same directory from producing
//! `toad_processed_processed.png`. It is a naming heuristic: a source the
//! user named `hero_processed.png` is skipped as well.
//!
//! ## Output Layout
//!
//! ```text
//! sprites/                    out/
//! ├── toad.png          →     ├── toad_processed.png
//! └── enemies/                └── enemies/
//!     └── bat.png       →         └── bat_processed.png
//! ```
//!
//! Without an output directory each result lands beside its input.
//!
//! ## Failure Tolerance
//!
//! A file that fails to decode or write is recorded in
//! [`BatchResult::failures`] and reported as a
//! [`ProcessEvent::Failed`]; the remaining files are still processed.
//!
//! Output paths are claimed in discovery order. When two sources map to the
//! same output (`a.jpg` and `a.png` both become `a_processed.png`), the first
//! one wins and the later one fails with [`SpriteError::OutputCollision`]
//! without being decoded.
//!
//! ## Parallelism
//!
//! With `batch.parallel` set, files are processed on the global rayon pool
//! (sized by the binary via [`effective_threads`](crate::config::effective_threads)).
//! Results are collected in discovery order either way.

use crate::config::{BatchConfig, ConfigError, SpriteConfig};
use crate::imaging::{ImageBackend, RustBackend};
use crate::sprite::{self, ProcessEvent, SpriteError, emit};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use walkdir::WalkDir;

/// A file that could not be processed.
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: SpriteError,
}

/// Outcome of a directory run, each list in discovery order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
    pub skipped: Vec<PathBuf>,
}

/// Matching files under `directory`, sorted.
pub fn discover_images(directory: &Path, config: &BatchConfig) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| config.matches_extension(p))
        .collect();
    files.sort();
    files
}

/// True when the file stem already carries `marker`.
pub fn is_processed_output(path: &Path, marker: &str) -> bool {
    path.file_stem()
        .is_some_and(|stem| stem.to_string_lossy().contains(marker))
}

/// Output location for `input`, mirroring its place under `directory`.
pub fn batch_output_path(
    input: &Path,
    directory: &Path,
    output_dir: Option<&Path>,
    marker: &str,
) -> PathBuf {
    let Some(output_dir) = output_dir else {
        return sprite::derive_output_path(input, marker);
    };
    let relative_dir = input
        .parent()
        .and_then(|parent| parent.strip_prefix(directory).ok())
        .unwrap_or(Path::new(""));
    output_dir
        .join(relative_dir)
        .join(sprite::output_file_name(input, marker))
}

/// Pair each input with its output path. An input whose output was already
/// claimed by an earlier one gets an `OutputCollision` instead.
fn plan_outputs(
    inputs: Vec<PathBuf>,
    directory: &Path,
    output_dir: Option<&Path>,
    marker: &str,
) -> Vec<(PathBuf, Result<PathBuf, SpriteError>)> {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    inputs
        .into_iter()
        .map(|input| {
            let output = batch_output_path(&input, directory, output_dir, marker);
            let planned = match claimed.get(&output) {
                Some(first) => Err(SpriteError::OutputCollision {
                    input: input.clone(),
                    output,
                    claimed_by: first.clone(),
                }),
                None => {
                    claimed.insert(output.clone(), input.clone());
                    Ok(output)
                }
            };
            (input, planned)
        })
        .collect()
}

/// Process every matching file under `directory` with the `image`-crate backend.
pub fn process_directory(
    directory: &Path,
    output_dir: Option<&Path>,
    config: &SpriteConfig,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<BatchResult, SpriteError> {
    process_directory_with_backend(&RustBackend::new(), directory, output_dir, config, events)
}

/// Process every matching file using a specific backend (allows testing with mock).
///
/// Only setup problems are returned as errors: a missing directory or a
/// path that is not a directory. Per-file errors end up in the result.
pub fn process_directory_with_backend(
    backend: &impl ImageBackend,
    directory: &Path,
    output_dir: Option<&Path>,
    config: &SpriteConfig,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<BatchResult, SpriteError> {
    if !directory.exists() {
        return Err(SpriteError::NotFound(directory.to_path_buf()));
    }
    if !directory.is_dir() {
        return Err(ConfigError::NotADirectory(directory.to_path_buf()).into());
    }

    let marker = &config.processing.marker;
    let (skipped, pending): (Vec<PathBuf>, Vec<PathBuf>) =
        discover_images(directory, &config.batch)
            .into_iter()
            .partition(|p| is_processed_output(p, marker));

    emit(
        events,
        ProcessEvent::Discovered {
            directory: directory.to_path_buf(),
            count: pending.len(),
        },
    );
    for path in &skipped {
        emit(events, ProcessEvent::Skipped { path: path.clone() });
    }

    let planned = plan_outputs(pending, directory, output_dir, marker);

    let run = |(input, planned): (PathBuf, Result<PathBuf, SpriteError>)| {
        let outcome = planned.and_then(|output| {
            sprite::process_with_backend(backend, &input, Some(&output), &config.processing, events)
        });
        if let Err(e) = &outcome {
            emit(
                events,
                ProcessEvent::Failed {
                    path: input.clone(),
                    error: e.to_string(),
                },
            );
        }
        (input, outcome)
    };

    let outcomes: Vec<(PathBuf, Result<PathBuf, SpriteError>)> = if config.batch.parallel {
        planned.into_par_iter().map(run).collect()
    } else {
        planned.into_iter().map(run).collect()
    };

    let mut result = BatchResult {
        skipped,
        ..BatchResult::default()
    };
    for (path, outcome) in outcomes {
        match outcome {
            Ok(output) => result.outputs.push(output),
            Err(error) => result.failures.push(BatchFailure { path, error }),
        }
    }
    Ok(result)
}
