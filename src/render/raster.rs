//! Pixel-level drawing on an `RgbaImage`.
//!
//! Coordinates here are already in pixel space (x right, y down, pixel
//! centres at `i + 0.5`). Vertices with non-finite coordinates are dropped
//! from fills and break strokes.

use image::{Rgba, RgbaImage};

use super::colormap::lerp_color;

/// A point in pixel space.
pub type PixelPoint = (f64, f64);

/// Composite `color` over the pixel at (x, y) using its alpha channel.
pub fn blend_pixel(img: &mut RgbaImage, x: i64, y: i64, color: [u8; 4]) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    if color[3] == 255 {
        *pixel = Rgba(color);
        return;
    }
    let alpha = color[3] as f32 / 255.0;
    let [r, g, b, a] = pixel.0;
    let [nr, ng, nb] = lerp_color([r, g, b], [color[0], color[1], color[2]], alpha);
    let na = (a as f32 + (255.0 - a as f32) * alpha).round().min(255.0) as u8;
    *pixel = Rgba([nr, ng, nb, na]);
}

/// Fill the area enclosed by `rings` using the even-odd rule, so inner
/// rings cut holes into the outer one.
pub fn fill_polygon(img: &mut RgbaImage, rings: &[Vec<PixelPoint>], color: [u8; 4]) {
    let mut edges: Vec<(PixelPoint, PixelPoint)> = Vec::new();
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for ring in rings {
        let finite: Vec<PixelPoint> = ring
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .collect();
        if finite.len() < 3 {
            continue;
        }
        for i in 0..finite.len() {
            let a = finite[i];
            let b = finite[(i + 1) % finite.len()];
            if a.1 != b.1 {
                edges.push((a, b));
            }
            min_y = min_y.min(a.1);
            max_y = max_y.max(a.1);
        }
    }
    if edges.is_empty() {
        return;
    }

    let row_start = min_y.floor().max(0.0) as i64;
    let row_end = max_y.ceil().min(img.height() as f64) as i64;
    let mut crossings: Vec<f64> = Vec::new();

    for row in row_start..row_end {
        let scan_y = row as f64 + 0.5;
        crossings.clear();
        for &((x0, y0), (x1, y1)) in &edges {
            // Half-open rule keeps shared vertices from counting twice
            if (y0 <= scan_y && scan_y < y1) || (y1 <= scan_y && scan_y < y0) {
                crossings.push(x0 + (scan_y - y0) * (x1 - x0) / (y1 - y0));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil().max(0.0) as i64;
            let end = (span[1] - 0.5).floor().min(img.width() as f64 - 1.0) as i64;
            for col in start..=end {
                blend_pixel(img, col, row, color);
            }
        }
    }
}

/// Stroke a polyline `width` pixels wide.
pub fn stroke_polyline(img: &mut RgbaImage, points: &[PixelPoint], color: [u8; 4], width: f64) {
    let radius = (width / 2.0).max(0.5);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if !(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite()) {
            continue;
        }
        let length = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
        // Segments far outside the canvas are not worth stepping through
        if length > 4.0 * (img.width() + img.height()) as f64 {
            continue;
        }
        let steps = (length * 2.0).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let x = a.0 + (b.0 - a.0) * t;
            let y = a.1 + (b.1 - a.1) * t;
            if radius <= 0.5 {
                blend_pixel(img, x.floor() as i64, y.floor() as i64, color);
            } else {
                stamp_disc(img, x, y, radius, color);
            }
        }
    }
}

/// Draw a filled circle centred on (cx, cy).
pub fn fill_circle(img: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: [u8; 4]) {
    if !(cx.is_finite() && cy.is_finite()) || radius <= 0.0 {
        return;
    }
    stamp_disc(img, cx, cy, radius, color);
}

fn stamp_disc(img: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: [u8; 4]) {
    let r2 = radius * radius;
    let x_start = (cx - radius).floor() as i64;
    let x_end = (cx + radius).ceil() as i64;
    let y_start = (cy - radius).floor() as i64;
    let y_end = (cy + radius).ceil() as i64;
    for y in y_start..=y_end {
        for x in x_start..=x_end {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                blend_pixel(img, x, y, color);
            }
        }
    }
}
