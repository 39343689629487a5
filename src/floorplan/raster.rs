//! Bitmap rendering of a planar section.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use nalgebra::Point2;

use crate::domain::model::FloorplanSettings;
use crate::geometry::section::Section2D;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Per-axis min-max normalization into `[margin, image_size - margin]`.
///
/// An axis with zero extent has no meaningful scale, so every vertex is placed at
/// the canvas centre on that axis.
pub fn normalize_to_canvas(vertices: &[Point2<f64>], image_size: u32, margin: u32) -> Vec<(f32, f32)> {
    if vertices.is_empty() {
        return Vec::new();
    }

    let (mut min, mut max) = (vertices[0], vertices[0]);
    for p in &vertices[1..] {
        min = min.inf(p);
        max = max.sup(p);
    }
    let span = max - min;

    // 邊界超過畫布時沒有可繪區域
    let drawable = margin
        .checked_mul(2)
        .map_or(0, |margins| image_size.saturating_sub(margins)) as f64;
    let offset = margin as f64;

    let scale = |value: f64, lo: f64, extent: f64| -> f64 {
        if extent > 0.0 {
            (value - lo) / extent
        } else {
            0.5
        }
    };

    if span.x <= 0.0 || span.y <= 0.0 {
        tracing::warn!(
            "⚠ Section has zero extent on an axis (dx = {}, dy = {}); centring that axis",
            span.x,
            span.y
        );
    }

    vertices
        .iter()
        .map(|p| {
            let nx = scale(p.x, min.x, span.x);
            let ny = scale(p.y, min.y, span.y);
            (
                (nx * drawable + offset) as f32,
                (ny * drawable + offset) as f32,
            )
        })
        .collect()
}

/// Draws every entity with at least two points onto a white square canvas.
pub fn rasterize(section: &Section2D, settings: &FloorplanSettings) -> RgbImage {
    let size = settings.image_size;
    let mut canvas = RgbImage::from_pixel(size, size, WHITE);

    if section.is_empty() {
        return canvas;
    }

    let pixels = normalize_to_canvas(&section.vertices, size, settings.margin);

    for entity in &section.entities {
        let points: Vec<(f32, f32)> = entity
            .iter()
            .filter_map(|&i| pixels.get(i).copied())
            .collect();
        if points.len() < 2 {
            continue;
        }
        for pair in points.windows(2) {
            draw_thick_segment(&mut canvas, pair[0], pair[1], settings.line_width, BLACK);
        }
    }

    canvas
}

/// Draws a segment `width` pixels wide as a filled quad around it.
fn draw_thick_segment(canvas: &mut RgbImage, start: (f32, f32), end: (f32, f32), width: u32, color: Rgb<u8>) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = (dx * dx + dy * dy).sqrt();

    if width <= 1 || length < f32::EPSILON {
        draw_line_segment_mut(canvas, start, end, color);
        return;
    }

    let half = width as f32 / 2.0;
    let (nx, ny) = (-dy / length * half, dx / length * half);

    let corner = |x: f32, y: f32| Point::new(x.round() as i32, y.round() as i32);
    let quad = [
        corner(start.0 + nx, start.1 + ny),
        corner(end.0 + nx, end.1 + ny),
        corner(end.0 - nx, end.1 - ny),
        corner(start.0 - nx, start.1 - ny),
    ];

    // draw_polygon_mut 不接受首尾相同的點
    if quad[0] == quad[3] {
        draw_line_segment_mut(canvas, start, end, color);
        return;
    }
    draw_polygon_mut(canvas, &quad, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_section() -> Section2D {
        Section2D {
            vertices: vec![
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 2.0),
                Point2::new(0.0, 2.0),
            ],
            entities: vec![vec![0, 1, 2, 3, 0]],
        }
    }

    #[test]
    fn test_normalize_uses_margin() {
        let pixels = normalize_to_canvas(&square_section().vertices, 2000, 50);

        assert_relative_eq!(pixels[0].0, 50.0);
        assert_relative_eq!(pixels[0].1, 50.0);
        assert_relative_eq!(pixels[2].0, 1950.0);
        assert_relative_eq!(pixels[2].1, 1950.0);
    }

    #[test]
    fn test_normalize_zero_width_axis_centres() {
        let vertices = vec![Point2::new(3.0, 0.0), Point2::new(3.0, 1.0)];
        let pixels = normalize_to_canvas(&vertices, 2000, 50);

        assert_relative_eq!(pixels[0].0, 1000.0);
        assert_relative_eq!(pixels[1].0, 1000.0);
        assert_relative_eq!(pixels[0].1, 50.0);
        assert_relative_eq!(pixels[1].1, 1950.0);
    }

    #[test]
    fn test_normalize_overflowing_margin_does_not_wrap() {
        let margin = u32::MAX / 2 + 1;
        let pixels = normalize_to_canvas(&square_section().vertices, 2000, margin);

        // 無可繪區域：所有點都落在 margin 上，而不是被拉回畫布內
        for (x, y) in pixels {
            assert_relative_eq!(x, margin as f32);
            assert_relative_eq!(y, margin as f32);
        }
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize_to_canvas(&[], 2000, 50).is_empty());
    }

    #[test]
    fn test_rasterize_draws_black_outline() {
        let canvas = rasterize(&square_section(), &FloorplanSettings::default());

        assert_eq!(canvas.dimensions(), (2000, 2000));
        // 邊框上的點是黑色，中心保持白色
        assert_eq!(*canvas.get_pixel(1000, 50), BLACK);
        assert_eq!(*canvas.get_pixel(50, 1000), BLACK);
        assert_eq!(*canvas.get_pixel(1000, 1000), WHITE);
        assert_eq!(*canvas.get_pixel(5, 5), WHITE);
    }

    #[test]
    fn test_rasterize_empty_section_is_blank() {
        let canvas = rasterize(&Section2D::default(), &FloorplanSettings::default());

        assert_eq!(canvas.dimensions(), (2000, 2000));
        assert!(canvas.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_single_point_entities_are_skipped() {
        let section = Section2D {
            vertices: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)],
            entities: vec![vec![0], vec![1]],
        };
        let canvas = rasterize(&section, &FloorplanSettings::default());

        assert!(canvas.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_degenerate_vertical_section_does_not_panic() {
        let section = Section2D {
            vertices: vec![Point2::new(1.0, 0.0), Point2::new(1.0, 5.0)],
            entities: vec![vec![0, 1]],
        };
        let canvas = rasterize(&section, &FloorplanSettings::default());

        assert_eq!(*canvas.get_pixel(1000, 1000), BLACK);
    }
}
