use image::{Rgba, RgbaImage};

use crate::geometry::{Color, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelBox {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

fn clipped_segment_box(
    start: Point,
    end: Point,
    pad: i64,
    width: u32,
    height: u32,
) -> Option<PixelBox> {
    let min_x = i64::from(start.x.min(end.x)) - pad;
    let min_y = i64::from(start.y.min(end.y)) - pad;
    let max_x = i64::from(start.x.max(end.x)) + pad;
    let max_y = i64::from(start.y.max(end.y)) + pad;

    let x0 = min_x.max(0);
    let y0 = min_y.max(0);
    let x1 = max_x.min(i64::from(width) - 1);
    let y1 = max_y.min(i64::from(height) - 1);
    if x0 > x1 || y0 > y1 {
        return None;
    }

    Some(PixelBox {
        x0: u32::try_from(x0).ok()?,
        y0: u32::try_from(y0).ok()?,
        x1: u32::try_from(x1).ok()?,
        y1: u32::try_from(y1).ok()?,
    })
}

fn point_segment_distance_sq(point: (f32, f32), start: Point, end: Point) -> f32 {
    let (sx, sy) = (start.x as f32, start.y as f32);
    let (ex, ey) = (end.x as f32, end.y as f32);
    let (dx, dy) = (ex - sx, ey - sy);
    let length_sq = dx * dx + dy * dy;

    let t = if length_sq <= f32::EPSILON {
        0.0
    } else {
        (((point.0 - sx) * dx + (point.1 - sy) * dy) / length_sq).clamp(0.0, 1.0)
    };
    let (px, py) = (sx + dx * t, sy + dy * t);
    let (ox, oy) = (point.0 - px, point.1 - py);
    ox * ox + oy * oy
}

/// Paints a round-capped segment of `stroke_width` pixels onto `surface`.
///
/// Every pixel whose center lies within half the width of the segment is
/// filled, which yields round caps at both ends. Pixels outside the surface
/// are skipped. Returns the number of pixels written.
pub(crate) fn draw_capsule(
    surface: &mut RgbaImage,
    start: Point,
    end: Point,
    color: Color,
    stroke_width: u8,
) -> u64 {
    let radius = (f32::from(stroke_width.max(1)) / 2.0).max(0.5);
    let pad = radius.ceil() as i64 + 1;
    let (width, height) = surface.dimensions();
    let Some(bounds) = clipped_segment_box(start, end, pad, width, height) else {
        return 0;
    };

    let radius_sq = radius * radius;
    let pixel = Rgba(color.rgba());
    let mut writes: u64 = 0;
    for y in bounds.y0..=bounds.y1 {
        for x in bounds.x0..=bounds.x1 {
            if point_segment_distance_sq((x as f32, y as f32), start, end) <= radius_sq {
                surface.put_pixel(x, y, pixel);
                writes = writes.saturating_add(1);
            }
        }
    }
    writes
}

pub(crate) fn clear_surface(surface: &mut RgbaImage) {
    for pixel in surface.pixels_mut() {
        *pixel = Rgba([0, 0, 0, 0]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capsule_covers_both_endpoints_and_midpoint() {
        let mut surface = RgbaImage::new(32, 32);
        let color = Color::new(10, 20, 30);
        let written = draw_capsule(&mut surface, Point::new(4, 4), Point::new(20, 4), color, 3);

        assert!(written > 0);
        for x in [4, 12, 20] {
            assert_eq!(surface.get_pixel(x, 4).0, color.rgba());
        }
        assert_eq!(surface.get_pixel(4, 10).0, [0, 0, 0, 0]);
    }

    #[test]
    fn capsule_for_degenerate_segment_paints_round_dot() {
        let mut surface = RgbaImage::new(16, 16);
        draw_capsule(&mut surface, Point::new(8, 8), Point::new(8, 8), Color::WHITE, 3);

        assert_eq!(surface.get_pixel(8, 8).0, Color::WHITE.rgba());
        assert_eq!(surface.get_pixel(9, 8).0, Color::WHITE.rgba());
        assert_eq!(surface.get_pixel(10, 10).0, [0, 0, 0, 0]);
    }

    #[test]
    fn capsule_outside_surface_writes_nothing() {
        let mut surface = RgbaImage::new(8, 8);
        let written = draw_capsule(
            &mut surface,
            Point::new(-40, -40),
            Point::new(-20, -30),
            Color::WHITE,
            3,
        );
        assert_eq!(written, 0);
    }

    #[test]
    fn capsule_partially_outside_surface_is_clipped() {
        let mut surface = RgbaImage::new(8, 8);
        let written = draw_capsule(
            &mut surface,
            Point::new(-5, 3),
            Point::new(5, 3),
            Color::WHITE,
            3,
        );
        assert!(written > 0);
        assert_eq!(surface.get_pixel(0, 3).0, Color::WHITE.rgba());
    }

    #[test]
    fn clear_surface_resets_every_pixel() {
        let mut surface = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        clear_surface(&mut surface);
        assert!(surface.pixels().all(|pixel| pixel.0 == [0, 0, 0, 0]));
    }
}
