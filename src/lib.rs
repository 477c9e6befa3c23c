//! # Sprite Prep
//!
//! Cleans up game sprite images: clears the background, crops to the visible
//! content and shrinks the result to fit a bounding box.
//!
//! # Architecture: Fixed Pipeline
//!
//! Every sprite goes through the same stages, each one optional:
//!
//! ```text
//! 1. Decode       file      →  RGBA buffer    (alpha added when missing)
//! 2. Background   RGBA      →  RGBA           (selected pixels get alpha = 0)
//! 3. Trim         RGBA      →  smaller RGBA   (alpha bounding box + padding)
//! 4. Resize       RGBA      →  smaller RGBA   (aspect preserved, never enlarges)
//! 5. Encode       RGBA      →  file           (`<stem>_processed.<ext>`)
//! ```
//!
//! Stages are plain functions over owned [`image::RgbaImage`] buffers, so
//! they can be unit tested without touching the filesystem. Only the decode
//! and encode ends go through the [`imaging::ImageBackend`] trait.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Pixel operations (background, trim, resize) and the codec backend |
//! | [`config`] | `ProcessingConfig` / `BatchConfig`, TOML loading, `WIDTHxHEIGHT` parsing |
//! | [`sprite`] | One file through the pipeline, output path derivation, progress events |
//! | [`batch`] | Directory mode: discovery, marker guard, per-file failure tolerance |
//! | [`sheet`] | Sprite-sheet splitting into cleaned frames plus a JSON manifest |
//! | [`output`] | CLI output formatting for progress events and batch summaries |
//!
//! # Design Decisions
//!
//! ## Alpha Is the Only Signal
//!
//! Background removal never changes colour channels, only alpha. Trim then
//! looks at alpha alone, so any removal method composes with it, and sources
//! that arrive with transparency already trim correctly with removal off.
//!
//! ## Fully Transparent Means Untouched
//!
//! An image with no visible pixel left is written at its original size rather
//! than as an empty file. Downstream tools choke on 0×0 images, and an
//! unchanged canvas makes the problem obvious when looking at the output.
//!
//! ## Progress as Events
//!
//! Library code never prints. Progress is sent as
//! [`sprite::ProcessEvent`] values over an optional channel, and the binary
//! renders them with [`output::format_process_event`].

pub mod batch;
pub mod config;
pub mod imaging;
pub mod output;
pub mod sheet;
pub mod sprite;
