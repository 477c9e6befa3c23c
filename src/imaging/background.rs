//! Background removal by colour thresholding.
//!
//! Every method only ever lowers alpha to 0; colour channels are left as
//! they were so a later pass can still inspect them.
//!
//! | Method | Selection rule |
//! |---|---|
//! | [`BgMethod::White`] | `r > t && g > t && b > t` |
//! | [`BgMethod::Corner`] | every channel within `tolerance` (strict) of the (0,0) pixel |
//! | [`BgMethod::Flood`] | like `Corner`, but only regions 4-connected to the border |

use crate::config::BgMethod;
use image::{Rgb, RgbaImage};
use std::collections::VecDeque;

/// Parameters for one background-removal pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundParams {
    pub method: BgMethod,
    /// Used by [`BgMethod::White`].
    pub threshold: u8,
    /// Used by [`BgMethod::Corner`] and [`BgMethod::Flood`].
    pub tolerance: u32,
}

/// Make background pixels fully transparent.
///
/// The reference colour for `Corner`/`Flood` is sampled from (0,0); its
/// alpha is ignored. Zero-sized images pass through untouched.
pub fn remove_background(image: RgbaImage, params: &BackgroundParams) -> RgbaImage {
    let reference = sample_reference(&image);
    remove_background_with_reference(image, params, reference)
}

/// Same as [`remove_background`] with an explicit reference colour.
///
/// Sprite sheets use this so every frame is keyed against the colour
/// sampled from the first frame. `reference` is ignored by `White`.
pub fn remove_background_with_reference(
    mut image: RgbaImage,
    params: &BackgroundParams,
    reference: Option<Rgb<u8>>,
) -> RgbaImage {
    if image.width() == 0 || image.height() == 0 {
        return image;
    }

    match (params.method, reference) {
        (BgMethod::White, _) => clear_light_pixels(&mut image, params.threshold),
        (BgMethod::Corner, Some(reference)) => {
            clear_similar_pixels(&mut image, reference, params.tolerance)
        }
        (BgMethod::Flood, Some(reference)) => {
            flood_clear_from_border(&mut image, reference, params.tolerance)
        }
        (_, None) => {}
    }
    image
}

/// RGB of the top-left pixel, or `None` for an empty image.
pub fn sample_reference(image: &RgbaImage) -> Option<Rgb<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }
    let [r, g, b, _] = image.get_pixel(0, 0).0;
    Some(Rgb([r, g, b]))
}

fn clear_light_pixels(image: &mut RgbaImage, threshold: u8) {
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if r > threshold && g > threshold && b > threshold {
            pixel[3] = 0;
        }
    }
}

#[inline]
fn is_similar(pixel: [u8; 4], reference: Rgb<u8>, tolerance: u32) -> bool {
    let [r, g, b, _] = pixel;
    let [r0, g0, b0] = reference.0;
    (r.abs_diff(r0) as u32) < tolerance
        && (g.abs_diff(g0) as u32) < tolerance
        && (b.abs_diff(b0) as u32) < tolerance
}

fn clear_similar_pixels(image: &mut RgbaImage, reference: Rgb<u8>, tolerance: u32) {
    for pixel in image.pixels_mut() {
        if is_similar(pixel.0, reference, tolerance) {
            pixel[3] = 0;
        }
    }
}

/// Breadth-first fill seeded with every border pixel.
fn flood_clear_from_border(image: &mut RgbaImage, reference: Rgb<u8>, tolerance: u32) {
    let (width, height) = image.dimensions();
    let index = |x: u32, y: u32| (y as usize) * (width as usize) + x as usize;

    let mut visited = vec![false; width as usize * height as usize];
    let mut queue = VecDeque::new();

    let mut seed = |x: u32, y: u32, queue: &mut VecDeque<(u32, u32)>| {
        let i = index(x, y);
        if !visited[i] {
            visited[i] = true;
            queue.push_back((x, y));
        }
    };

    for x in 0..width {
        seed(x, 0, &mut queue);
        seed(x, height - 1, &mut queue);
    }
    for y in 0..height {
        seed(0, y, &mut queue);
        seed(width - 1, y, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        let pixel = image.get_pixel_mut(x, y);
        if !is_similar(pixel.0, reference, tolerance) {
            continue;
        }
        pixel[3] = 0;

        if x > 0 {
            seed(x - 1, y, &mut queue);
        }
        if x + 1 < width {
            seed(x + 1, y, &mut queue);
        }
        if y > 0 {
            seed(x, y - 1, &mut queue);
        }
        if y + 1 < height {
            seed(x, y + 1, &mut queue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn white(threshold: u8) -> BackgroundParams {
        BackgroundParams {
            method: BgMethod::White,
            threshold,
            tolerance: 30,
        }
    }

    fn keyed(method: BgMethod, tolerance: u32) -> BackgroundParams {
        BackgroundParams {
            method,
            threshold: 240,
            tolerance,
        }
    }

    // =========================================================================
    // White method
    // =========================================================================

    #[test]
    fn white_clears_pixels_strictly_above_threshold() {
        let mut img = RgbaImage::from_pixel(3, 1, WHITE);
        img.put_pixel(1, 0, Rgba([241, 241, 241, 255]));
        img.put_pixel(2, 0, Rgba([240, 255, 255, 255]));

        let out = remove_background(img, &white(240));
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(1, 0)[3], 0);
        // One channel equal to the threshold keeps the pixel
        assert_eq!(out.get_pixel(2, 0)[3], 255);
    }

    #[test]
    fn white_leaves_colour_and_existing_alpha_alone() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([10, 250, 250, 128]));
        img.put_pixel(1, 0, Rgba([250, 250, 250, 128]));

        let out = remove_background(img, &white(240));
        assert_eq!(*out.get_pixel(0, 0), Rgba([10, 250, 250, 128]));
        // Cleared pixel keeps its RGB
        assert_eq!(*out.get_pixel(1, 0), Rgba([250, 250, 250, 0]));
    }

    #[test]
    fn white_at_max_threshold_clears_nothing() {
        let img = RgbaImage::from_pixel(4, 4, WHITE);
        let out = remove_background(img, &white(255));
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn any_channel_at_or_below_threshold_keeps_alpha() {
        let img = RgbaImage::from_fn(16, 16, |x, y| {
            Rgba([
                200 + (x as u8) * 3,
                (y as u8) * 15,
                255,
                (x * 16 + y) as u8,
            ])
        });
        let original = img.clone();

        let out = remove_background(img, &white(240));
        for (x, y, pixel) in out.enumerate_pixels() {
            let before = original.get_pixel(x, y);
            if before[1] <= 240 || before[0] <= 240 {
                assert_eq!(pixel[3], before[3], "alpha changed at ({x}, {y})");
            }
        }
    }

    // =========================================================================
    // Corner method
    // =========================================================================

    #[test]
    fn corner_clears_colours_within_tolerance() {
        let green = Rgba([20, 200, 20, 255]);
        let mut img = RgbaImage::from_pixel(3, 3, green);
        img.put_pixel(1, 1, BLACK);
        img.put_pixel(2, 2, Rgba([49, 200, 20, 255])); // diff 29 < 30
        img.put_pixel(2, 1, Rgba([50, 200, 20, 255])); // diff 30, not < 30

        let out = remove_background(img, &keyed(BgMethod::Corner, 30));
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(2, 2)[3], 0);
        assert_eq!(out.get_pixel(1, 1)[3], 255);
        assert_eq!(out.get_pixel(2, 1)[3], 255);
    }

    #[test]
    fn corner_ignores_reference_alpha() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([90, 90, 90, 255]));
        img.put_pixel(0, 0, Rgba([90, 90, 90, 0]));

        let out = remove_background(img, &keyed(BgMethod::Corner, 1));
        assert_eq!(out.get_pixel(1, 0)[3], 0);
    }

    #[test]
    fn corner_zero_tolerance_clears_nothing() {
        let img = RgbaImage::from_pixel(3, 3, WHITE);
        let out = remove_background(img, &keyed(BgMethod::Corner, 0));
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn corner_clears_enclosed_regions_too() {
        let img = ring_with_hole();
        let out = remove_background(img, &keyed(BgMethod::Corner, 10));
        assert_eq!(out.get_pixel(2, 2)[3], 0);
    }

    // =========================================================================
    // Flood method
    // =========================================================================

    /// 5x5 white canvas with a black ring around a white centre pixel.
    fn ring_with_hole() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(5, 5, WHITE);
        for i in 1..4 {
            img.put_pixel(i, 1, BLACK);
            img.put_pixel(i, 3, BLACK);
            img.put_pixel(1, i, BLACK);
            img.put_pixel(3, i, BLACK);
        }
        img
    }

    #[test]
    fn flood_preserves_enclosed_background_colour() {
        let out = remove_background(ring_with_hole(), &keyed(BgMethod::Flood, 10));

        // Outer border cleared
        assert_eq!(out.get_pixel(0, 0)[3], 0);
        assert_eq!(out.get_pixel(4, 2)[3], 0);
        // Ring kept
        assert_eq!(out.get_pixel(1, 1)[3], 255);
        // Hole is not connected to the border
        assert_eq!(out.get_pixel(2, 2)[3], 255);
    }

    #[test]
    fn flood_follows_connected_paths_inward() {
        // Column 2 is white from top to the centre; the rest is black
        let mut img = RgbaImage::from_pixel(5, 5, BLACK);
        for y in 0..3 {
            img.put_pixel(2, y, WHITE);
        }
        let reference = Some(Rgb([255, 255, 255]));

        let out =
            remove_background_with_reference(img, &keyed(BgMethod::Flood, 10), reference);
        assert_eq!(out.get_pixel(2, 2)[3], 0);
        assert_eq!(out.get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn flood_on_single_pixel_image() {
        let out = remove_background(
            RgbaImage::from_pixel(1, 1, WHITE),
            &keyed(BgMethod::Flood, 5),
        );
        assert_eq!(out.get_pixel(0, 0)[3], 0);
    }

    // =========================================================================
    // Edge cases
    // =========================================================================

    #[test]
    fn zero_sized_image_is_noop() {
        for method in [BgMethod::White, BgMethod::Corner, BgMethod::Flood] {
            let out = remove_background(RgbaImage::new(0, 3), &keyed(method, 30));
            assert_eq!(out.dimensions(), (0, 3));
        }
    }

    #[test]
    fn explicit_reference_overrides_corner_sample() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        let out = remove_background_with_reference(
            img,
            &keyed(BgMethod::Corner, 5),
            Some(Rgb([0, 0, 0])),
        );
        assert!(out.pixels().all(|p| p[3] == 255));
    }
}
