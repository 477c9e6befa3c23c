//! Cropping a sprite to its visible content.

use super::calculations::expand_clamped;
use image::RgbaImage;
use image::imageops;

/// Half-open rectangle: `left..right` × `top..bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Grow by `padding` on each side without leaving `[0, width] × [0, height]`.
    pub fn padded(&self, padding: u32, width: u32, height: u32) -> Self {
        let (left, top, right, bottom) = expand_clamped(
            (self.left, self.top, self.right, self.bottom),
            padding,
            (width, height),
        );
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Minimal box enclosing every pixel with alpha > 0.
///
/// Returns `None` when the image is fully transparent (or empty).
pub fn bounding_box(image: &RgbaImage) -> Option<BoundingBox> {
    let mut left = u32::MAX;
    let mut top = u32::MAX;
    let mut right = 0;
    let mut bottom = 0;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] > 0 {
            found = true;
            left = left.min(x);
            top = top.min(y);
            right = right.max(x + 1);
            bottom = bottom.max(y + 1);
        }
    }

    found.then_some(BoundingBox {
        left,
        top,
        right,
        bottom,
    })
}

/// Crop to the visible content plus `padding`.
///
/// A fully transparent image is returned unchanged at its full size.
pub fn trim(image: RgbaImage, padding: u32) -> RgbaImage {
    let Some(bbox) = bounding_box(&image) else {
        return image;
    };
    let crop = bbox.padded(padding, image.width(), image.height());

    if crop.width() == 0 || crop.height() == 0 {
        return RgbaImage::new(0, 0);
    }
    if (crop.width(), crop.height()) == image.dimensions() {
        return image;
    }

    imageops::crop_imm(&image, crop.left, crop.top, crop.width(), crop.height()).to_image()
}
