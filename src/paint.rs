//! Simple raster drawing into an image.
//!
//! Coordinates are signed and every routine clips silently: parts of a shape
//! that fall outside the image are skipped.

use crate::image::Image;
use crate::pixel::{Element, Pixel};

/// Segments used to approximate an ellipse.
const ELLIPSE_SEGMENTS: u32 = 16;

#[inline]
fn plot<K: Element, const CC: usize>(image: &mut Image<K, CC>, x: i32, y: i32, color: &Pixel<K, CC>) {
    if image.is_valid_index(x, y) {
        image.set(x as u32, y as u32, color);
    }
}

/// Mark a point.
///
/// `size` 1 sets the pixel itself. 2 sets its four direct neighbours. 3 and
/// above set the four diagonal neighbours plus the four pixels two steps away
/// along each axis. Sizes above 1 leave the centre untouched, and nothing is
/// drawn when the centre lies outside the image.
pub fn paint_point<K: Element, const CC: usize>(
    image: &mut Image<K, CC>,
    x: i32,
    y: i32,
    color: &Pixel<K, CC>,
    size: u32,
) {
    if !image.is_valid_index(x, y) {
        return;
    }
    match size {
        0 => {}
        1 => plot(image, x, y, color),
        2 => {
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                plot(image, x + dx, y + dy, color);
            }
        }
        _ => {
            for (dx, dy) in [
                (-1, -1),
                (1, -1),
                (-1, 1),
                (1, 1),
                (-2, 0),
                (2, 0),
                (0, -2),
                (0, 2),
            ] {
                plot(image, x + dx, y + dy, color);
            }
        }
    }
}

/// Integer Bresenham line from (x0, y0) to (x1, y1), both ends included.
///
/// Steps one pixel at a time along the major axis. Only the steps whose
/// major coordinate lies inside the image are visited, so the cost is bounded
/// by the image size however far the end points reach outside it.
pub fn paint_line<K: Element, const CC: usize>(
    image: &mut Image<K, CC>,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    color: &Pixel<K, CC>,
) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let (x0, y0) = (x0 as i64, y0 as i64);
    let (dx, dy) = (x1 as i64 - x0, y1 as i64 - y0);
    let steps = dx.abs().max(dy.abs());

    let (first, last) = if dx.abs() >= dy.abs() {
        visible_steps(x0, dx.signum(), width, steps)
    } else {
        visible_steps(y0, dy.signum(), height, steps)
    };

    for t in first..=last {
        let x = x0 + offset_at(t, dx, steps);
        let y = y0 + offset_at(t, dy, steps);
        if 0 <= x && x < width && 0 <= y && y < height {
            image.set(x as u32, y as u32, color);
        }
    }
}

/// Steps `t` in `[0, steps]` for which `start + sign * t` lies in `[0, size)`.
/// Empty when `first > last`.
fn visible_steps(start: i64, sign: i64, size: i64, steps: i64) -> (i64, i64) {
    let (lo, hi) = match sign {
        1 => (-start, size - 1 - start),
        -1 => (start - (size - 1), start),
        _ => (0, 0),
    };
    (lo.max(0), hi.min(steps))
}

/// `t * delta / steps` rounded to the nearest integer, halves away from zero.
#[inline]
fn offset_at(t: i64, delta: i64, steps: i64) -> i64 {
    if steps == 0 {
        return 0;
    }
    let num = t as i128 * delta as i128;
    let den = steps as i128;
    let magnitude = (2 * num.abs() + den) / (2 * den);
    (magnitude * num.signum()) as i64
}

/// Outline of the rectangle with corners (x, y) and (x + w, y + h).
pub fn paint_box<K: Element, const CC: usize>(
    image: &mut Image<K, CC>,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: &Pixel<K, CC>,
) {
    let (x_range, y_range) = clamped_ranges(image, x, y, w, h);
    for i in x_range {
        plot(image, i, y, color);
        plot(image, i, y + h, color);
    }
    for j in y_range {
        plot(image, x, j, color);
        plot(image, x + w, j, color);
    }
}

/// Fill `[x, x + w] × [y, y + h]`, edges included.
pub fn fill_box<K: Element, const CC: usize>(
    image: &mut Image<K, CC>,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: &Pixel<K, CC>,
) {
    let (x_range, y_range) = clamped_ranges(image, x, y, w, h);
    for j in y_range {
        for i in x_range.clone() {
            image.set(i as u32, j as u32, color);
        }
    }
}

fn clamped_ranges<K: Element, const CC: usize>(
    image: &Image<K, CC>,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
) -> (std::ops::Range<i32>, std::ops::Range<i32>) {
    let width = i32::try_from(image.width()).unwrap_or(i32::MAX);
    let height = i32::try_from(image.height()).unwrap_or(i32::MAX);
    let x_end = x.saturating_add(w).saturating_add(1).min(width);
    let y_end = y.saturating_add(h).saturating_add(1).min(height);
    (x.max(0)..x_end, y.max(0)..y_end)
}

/// Ellipse outline around (cx, cy) with semi-axis vectors `u` and `v`,
/// drawn as a closed 16-segment polygon.
pub fn paint_ellipse<K: Element, const CC: usize>(
    image: &mut Image<K, CC>,
    cx: i32,
    cy: i32,
    u: [f32; 2],
    v: [f32; 2],
    color: &Pixel<K, CC>,
) {
    let point = |phi: f32| {
        let (s, c) = phi.sin_cos();
        (
            cx + (c * u[0] + s * v[0]) as i32,
            cy + (c * u[1] + s * v[1]) as i32,
        )
    };

    let mut prev = point(0.0);
    for i in 1..=ELLIPSE_SEGMENTS {
        let phi = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
        let next = point(phi);
        paint_line(image, prev.0, prev.1, next.0, next.1, color);
        prev = next;
    }
}

/// Same as [`paint_ellipse`]: the interior is not filled.
pub fn fill_ellipse<K: Element, const CC: usize>(
    image: &mut Image<K, CC>,
    cx: i32,
    cy: i32,
    u: [f32; 2],
    v: [f32; 2],
    color: &Pixel<K, CC>,
) {
    paint_ellipse(image, cx, cy, u, v, color);
}
