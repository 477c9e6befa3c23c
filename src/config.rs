//! Processing configuration.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Stock defaults ([`SpriteConfig::default`])
//! 2. An optional TOML file passed with `--config`
//! 3. Flags given explicitly on the command line ([`Overrides`])
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [processing]
//! remove_bg = true          # Clear the background before trimming
//! bg_method = "white"       # "white", "corner" or "flood"
//! threshold = 240           # white: channels strictly above this are background
//! tolerance = 30            # corner/flood: max per-channel distance (exclusive)
//! trim = true               # Crop to visible content
//! padding = 2               # Transparent margin kept around the content
//! canvas = false            # Center the resized sprite on a full-size canvas
//! marker = "_processed"     # Suffix appended to output file stems
//! # resize = { max_width = 128, max_height = 128 }
//!
//! [batch]
//! extensions = ["png"]      # File types picked up in directory mode
//! parallel = false          # Process files concurrently
//! # max_processes = 4       # Worker cap when parallel (omit for CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{BackgroundParams, supported_input_extensions};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid size format '{0}'. Use WIDTHxHEIGHT (e.g., 128x128)")]
    InvalidSize(String),
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

/// How background pixels are selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BgMethod {
    /// Near-white pixels (all channels above `threshold`)
    #[default]
    White,
    /// Pixels close to the top-left colour, anywhere in the image
    Corner,
    /// Pixels close to the top-left colour and connected to the border
    Flood,
}

impl fmt::Display for BgMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BgMethod::White => "white",
            BgMethod::Corner => "corner",
            BgMethod::Flood => "flood",
        })
    }
}

/// Box a resized sprite must fit inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResizeBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl fmt::Display for ResizeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.max_width, self.max_height)
    }
}

/// Parse a `WIDTHxHEIGHT` string (`x` or `X`) into positive dimensions.
pub fn parse_size(value: &str) -> Result<ResizeBounds, ConfigError> {
    let invalid = || ConfigError::InvalidSize(value.to_string());

    let lowered = value.trim().to_lowercase();
    let mut parts = lowered.split('x');
    let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let max_width: u32 = w.trim().parse().map_err(|_| invalid())?;
    let max_height: u32 = h.trim().parse().map_err(|_| invalid())?;
    if max_width == 0 || max_height == 0 {
        return Err(invalid());
    }
    Ok(ResizeBounds {
        max_width,
        max_height,
    })
}

/// Per-image pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    pub remove_bg: bool,
    pub bg_method: BgMethod,
    /// Used only by the `white` method.
    pub threshold: u8,
    /// Used only by the `corner` and `flood` methods.
    pub tolerance: u32,
    pub trim: bool,
    pub padding: u32,
    pub resize: Option<ResizeBounds>,
    /// Pad the resized sprite to exactly the resize bounds.
    pub canvas: bool,
    /// Appended to the file stem of derived output paths. Inputs whose
    /// stem already contains it are skipped in directory mode.
    pub marker: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            remove_bg: true,
            bg_method: BgMethod::White,
            threshold: 240,
            tolerance: 30,
            trim: true,
            padding: 2,
            resize: None,
            canvas: false,
            marker: "_processed".to_string(),
        }
    }
}

impl ProcessingConfig {
    pub fn background_params(&self) -> BackgroundParams {
        BackgroundParams {
            method: self.bg_method,
            threshold: self.threshold,
            tolerance: self.tolerance,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .resize
            .is_some_and(|b| b.max_width == 0 || b.max_height == 0)
        {
            return Err(ConfigError::Validation(
                "processing.resize dimensions must be positive".into(),
            ));
        }
        if self.canvas && self.resize.is_none() {
            return Err(ConfigError::Validation(
                "processing.canvas requires processing.resize".into(),
            ));
        }
        if self.marker.is_empty() {
            return Err(ConfigError::Validation(
                "processing.marker must not be empty".into(),
            ));
        }
        if self.marker.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "processing.marker must not contain path separators".into(),
            ));
        }
        Ok(())
    }
}

/// Directory-mode settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Extensions (case-insensitive, no dot) picked up while walking.
    pub extensions: Vec<String>,
    /// Process files concurrently on the rayon pool.
    pub parallel: bool,
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["png".to_string()],
            parallel: false,
            max_processes: None,
        }
    }
}

impl BatchConfig {
    /// Case-insensitive extension match.
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Resolve the effective worker count for parallel batches.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &BatchConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Complete configuration as loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteConfig {
    pub processing: ProcessingConfig,
    pub batch: BatchConfig,
}

impl SpriteConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.processing.validate()?;
        if self.batch.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "batch.extensions must not be empty".into(),
            ));
        }
        if self.batch.extensions.iter().any(|e| e.is_empty() || e.starts_with('.')) {
            return Err(ConfigError::Validation(
                "batch.extensions entries must be bare extensions like \"png\"".into(),
            ));
        }
        let supported = supported_input_extensions();
        if let Some(unknown) = self
            .batch
            .extensions
            .iter()
            .find(|e| !supported.iter().any(|s| s.eq_ignore_ascii_case(e)))
        {
            return Err(ConfigError::Validation(format!(
                "batch.extensions: cannot decode {unknown:?} (supported: {})",
                supported.join(", ")
            )));
        }
        Ok(())
    }

    /// Layer explicitly given command-line values on top of this config.
    pub fn apply(&mut self, overrides: &Overrides) {
        let p = &mut self.processing;
        if overrides.no_remove_bg {
            p.remove_bg = false;
        }
        if let Some(method) = overrides.bg_method {
            p.bg_method = method;
        }
        if let Some(threshold) = overrides.threshold {
            p.threshold = threshold;
        }
        if let Some(tolerance) = overrides.tolerance {
            p.tolerance = tolerance;
        }
        if overrides.no_trim {
            p.trim = false;
        }
        if let Some(padding) = overrides.padding {
            p.padding = padding;
        }
        if let Some(bounds) = overrides.resize {
            p.resize = Some(bounds);
        }
        if overrides.canvas {
            p.canvas = true;
        }
        if overrides.parallel {
            self.batch.parallel = true;
        }
    }
}

/// Command-line values that override the loaded config when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub no_remove_bg: bool,
    pub bg_method: Option<BgMethod>,
    pub threshold: Option<u8>,
    pub tolerance: Option<u32>,
    pub no_trim: bool,
    pub padding: Option<u32>,
    pub resize: Option<ResizeBounds>,
    pub canvas: bool,
    pub parallel: bool,
}

/// Load and validate a config file. Missing keys take stock defaults.
pub fn load_config(path: &Path) -> Result<SpriteConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: SpriteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Printed by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# sprite-prep configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Per-image pipeline: background removal -> trim -> resize
# ---------------------------------------------------------------------------
[processing]
# Make the background transparent before trimming.
remove_bg = true

# How background pixels are picked:
#   "white"  - every channel strictly above `threshold`
#   "corner" - within `tolerance` of the top-left pixel, anywhere
#   "flood"  - within `tolerance` of the top-left pixel, connected to the edge
bg_method = "white"

# 0-255. Only used by "white".
threshold = 240

# Per-channel distance (exclusive). Only used by "corner" and "flood".
tolerance = 30

# Crop to the smallest box holding every visible pixel.
trim = true

# Transparent margin kept around the content when trimming.
padding = 2

# Shrink to fit inside this box, keeping aspect ratio. Never enlarges.
# resize = { max_width = 128, max_height = 128 }

# Center the resized sprite on a transparent canvas of exactly the resize box.
canvas = false

# Added to the file stem of outputs: toad.png -> toad_processed.png
marker = "_processed"

# ---------------------------------------------------------------------------
# Directory mode
# ---------------------------------------------------------------------------
[batch]
# File extensions to pick up (case-insensitive).
extensions = ["png"]

# Process files concurrently.
parallel = false

# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
