//! Downscaling sprites to fit a bounding box.

use super::calculations::{calculate_fit_dimensions, center_offset};
use image::imageops::{self, FilterType};
use image::{Rgba, Rgba32FImage, RgbaImage};

/// Shrink `image` to fit within `max_width × max_height`, keeping its aspect
/// ratio. Images already inside the box are returned as-is.
///
/// Resampling uses Lanczos3, which holds up well under heavy downscaling.
/// Filtering runs on premultiplied alpha so the colour of cleared pixels
/// never bleeds into the sprite's edges.
pub fn resize_to_fit(image: RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (width, height) = calculate_fit_dimensions(image.dimensions(), (max_width, max_height));
    if (width, height) == image.dimensions() {
        return image;
    }
    let resized = imageops::resize(&premultiply(&image), width, height, FilterType::Lanczos3);
    unpremultiply(&resized)
}

fn premultiply(image: &RgbaImage) -> Rgba32FImage {
    let (width, height) = image.dimensions();
    Rgba32FImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0.map(|c| c as f32 / 255.0);
        Rgba([r * a, g * a, b * a, a])
    })
}

/// Back to straight alpha. Pixels that end up fully transparent get zeroed
/// colour channels.
fn unpremultiply(image: &Rgba32FImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    RgbaImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = to_channel(a);
        if alpha == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        let a = a.clamp(f32::MIN_POSITIVE, 1.0);
        Rgba([to_channel(r / a), to_channel(g / a), to_channel(b / a), alpha])
    })
}

fn to_channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Center `image` on a fully transparent canvas of exactly `width × height`.
///
/// Content larger than the canvas is clipped; callers resize first.
pub fn place_on_canvas(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    let (x, y) = center_offset(image.dimensions(), (width, height));
    imageops::replace(&mut canvas, image, x as i64, y as i64);
    canvas
}
