//! Pure calculation functions for sprite geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the dimensions that fit `source` inside `bounds`, preserving
/// aspect ratio and never enlarging.
///
/// A single scale factor `min(bw / w, bh / h, 1.0)` is applied to both
/// edges. Each result edge is rounded to the nearest integer, kept at least
/// 1 and never above its bound.
///
/// # Examples
/// ```
/// # use sprite_prep::imaging::calculate_fit_dimensions;
/// // Width-bound landscape
/// assert_eq!(calculate_fit_dimensions((200, 100), (50, 50)), (50, 25));
///
/// // Already small enough → unchanged
/// assert_eq!(calculate_fit_dimensions((20, 10), (50, 50)), (20, 10));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 {
        return source;
    }

    let scale = (max_w as f64 / src_w as f64)
        .min(max_h as f64 / src_h as f64)
        .min(1.0);

    if scale >= 1.0 {
        return source;
    }

    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Expand a half-open `(left, top, right, bottom)` box by `padding` on every
/// side, clamped to `[0, width] × [0, height]`.
pub fn expand_clamped(
    bbox: (u32, u32, u32, u32),
    padding: u32,
    limits: (u32, u32),
) -> (u32, u32, u32, u32) {
    let (left, top, right, bottom) = bbox;
    let (width, height) = limits;
    (
        left.saturating_sub(padding),
        top.saturating_sub(padding),
        right.saturating_add(padding).min(width),
        bottom.saturating_add(padding).min(height),
    )
}

/// Top-left offset that centers `inner` on `outer`.
///
/// Odd leftovers go to the right/bottom edge.
pub fn center_offset(inner: (u32, u32), outer: (u32, u32)) -> (u32, u32) {
    (
        outer.0.saturating_sub(inner.0) / 2,
        outer.1.saturating_sub(inner.1) / 2,
    )
}

/// How many whole frames of `frame` size fit in `sheet`, as `(columns, rows)`.
///
/// Partial frames at the right and bottom edges are dropped.
pub fn calculate_frame_grid(sheet: (u32, u32), frame: (u32, u32)) -> (u32, u32) {
    let (sheet_w, sheet_h) = sheet;
    let (frame_w, frame_h) = frame;
    if frame_w == 0 || frame_h == 0 {
        return (0, 0);
    }
    (sheet_w / frame_w, sheet_h / frame_h)
}
