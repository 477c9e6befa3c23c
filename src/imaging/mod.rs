//! Sprite image operations on in-memory RGBA buffers.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` crate via [`ImageBackend`] |
//! | **Background removal** | threshold / colour-key / border flood fill |
//! | **Trim** | alpha bounding box + `imageops::crop_imm` |
//! | **Resize** | `imageops::resize` with `Lanczos3` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Transforms**: [`background`], [`trim`], [`resize`], each taking an
//!   owned [`image::RgbaImage`] and returning the result

pub mod background;
pub mod backend;
mod calculations;
pub mod resize;
pub mod rust_backend;
pub mod trim;

pub use background::{
    BackgroundParams, remove_background, remove_background_with_reference, sample_reference,
};
pub use backend::{BackendError, ImageBackend};
pub use calculations::{calculate_fit_dimensions, calculate_frame_grid};
pub use resize::{place_on_canvas, resize_to_fit};
pub use rust_backend::{RustBackend, is_alpha_output_extension, supported_input_extensions};
pub use trim::{BoundingBox, bounding_box, trim};
