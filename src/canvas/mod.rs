//! Raster stroke rendering onto the single drawing surface.

mod raster;

use image::RgbaImage;

use crate::geometry::{Color, Point, SurfaceSize};

/// Palette offered to the swatch picker.
pub const DEFAULT_SWATCHES: &[&str] = &[
    "#ffffff", "#ee3333", "#e64980", "#be4bdb", "#893200", "#228be6", "#3333ee", "#40c057",
    "#00aa00", "#fab005", "#fd7e14",
];

pub const DEFAULT_STROKE_WIDTH: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCap {
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: u8,
    pub cap: LineCap,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            width: DEFAULT_STROKE_WIDTH,
            cap: LineCap::Round,
        }
    }
}

impl StrokeStyle {
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_width(&mut self, width: u8) {
        self.width = width.max(1);
    }
}

/// Immediate-mode renderer: segments are painted as soon as the pointer moves,
/// and no stroke geometry is retained.
#[derive(Debug, Default)]
pub struct StrokeRenderer {
    surface: Option<RgbaImage>,
    style: StrokeStyle,
    pen: Option<Point>,
}

impl StrokeRenderer {
    pub fn new(style: StrokeStyle) -> Self {
        Self {
            surface: None,
            style,
            pen: None,
        }
    }

    pub fn attach(&mut self, size: SurfaceSize) {
        self.surface = Some(RgbaImage::new(size.width, size.height));
        self.pen = None;
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }

    pub fn size(&self) -> Option<SurfaceSize> {
        self.surface
            .as_ref()
            .map(|surface| SurfaceSize::new(surface.width(), surface.height()))
    }

    pub fn surface(&self) -> Option<&RgbaImage> {
        self.surface.as_ref()
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.set_color(color);
    }

    pub fn begin_stroke(&mut self, point: Point) {
        if self.surface.is_none() {
            return;
        }
        self.pen = Some(point);
    }

    pub fn extend_stroke(&mut self, point: Point) {
        let (Some(surface), Some(last)) = (self.surface.as_mut(), self.pen) else {
            return;
        };
        let written = raster::draw_capsule(surface, last, point, self.style.color, self.style.width);
        tracing::trace!(from = ?last, to = ?point, written, "stroke segment painted");
        self.pen = Some(point);
    }

    pub fn end_stroke(&mut self) {
        self.pen = None;
    }

    /// Wipes every pixel. A stroke in progress keeps its pen position.
    pub fn clear(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            raster::clear_surface(surface);
        }
    }

    /// Replaces the surface pixels with `snapshot`. Snapshots of a different
    /// size are rejected.
    pub fn restore(&mut self, snapshot: &RgbaImage) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        if surface.dimensions() != snapshot.dimensions() {
            tracing::warn!(
                surface = ?surface.dimensions(),
                snapshot = ?snapshot.dimensions(),
                "history snapshot size mismatch; restore skipped"
            );
            return false;
        }
        surface.copy_from_slice(snapshot.as_raw());
        self.pen = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn painted_pixels(renderer: &StrokeRenderer) -> usize {
        renderer
            .surface()
            .map(|surface| surface.pixels().filter(|pixel| pixel.0[3] != 0).count())
            .unwrap_or(0)
    }

    #[test]
    fn operations_without_surface_are_noops() {
        let mut renderer = StrokeRenderer::default();
        renderer.begin_stroke(Point::new(1, 1));
        renderer.extend_stroke(Point::new(5, 5));
        renderer.clear();
        assert!(!renderer.is_attached());
        assert!(!renderer.restore(&RgbaImage::new(2, 2)));
    }

    #[test]
    fn extend_paints_with_selected_color() {
        let mut renderer = StrokeRenderer::default();
        renderer.attach(SurfaceSize::new(40, 40));
        renderer.set_color(Color::new(0x22, 0x8b, 0xe6));
        renderer.begin_stroke(Point::new(5, 5));
        renderer.extend_stroke(Point::new(30, 5));

        let surface = renderer.surface().unwrap();
        assert_eq!(surface.get_pixel(18, 5).0, [0x22, 0x8b, 0xe6, 0xff]);
    }

    #[test]
    fn extend_without_begin_does_not_paint() {
        let mut renderer = StrokeRenderer::default();
        renderer.attach(SurfaceSize::new(20, 20));
        renderer.extend_stroke(Point::new(10, 10));
        assert_eq!(painted_pixels(&renderer), 0);

        renderer.begin_stroke(Point::new(2, 2));
        renderer.end_stroke();
        renderer.extend_stroke(Point::new(10, 10));
        assert_eq!(painted_pixels(&renderer), 0);
    }

    #[test]
    fn clear_wipes_painted_pixels() {
        let mut renderer = StrokeRenderer::default();
        renderer.attach(SurfaceSize::new(20, 20));
        renderer.begin_stroke(Point::new(2, 2));
        renderer.extend_stroke(Point::new(15, 15));
        assert!(painted_pixels(&renderer) > 0);

        renderer.clear();
        assert_eq!(painted_pixels(&renderer), 0);
    }

    #[test]
    fn restore_rejects_mismatched_snapshot() {
        let mut renderer = StrokeRenderer::default();
        renderer.attach(SurfaceSize::new(10, 10));
        assert!(!renderer.restore(&RgbaImage::new(4, 4)));

        let mut snapshot = RgbaImage::new(10, 10);
        snapshot.put_pixel(3, 3, image::Rgba([1, 2, 3, 255]));
        assert!(renderer.restore(&snapshot));
        assert_eq!(renderer.surface().unwrap().get_pixel(3, 3).0, [1, 2, 3, 255]);
    }

    #[test]
    fn default_swatches_parse_as_colors() {
        for swatch in DEFAULT_SWATCHES {
            assert!(Color::from_hex(swatch).is_some(), "{swatch} should parse");
        }
    }
}
