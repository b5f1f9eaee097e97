use egui::{Pos2, Rect, Vec2, pos2};
use image::RgbImage;

use crate::stroke::{Brush, Color, DashPattern, LineStyle};

/// Inclusive pixel rectangle, always clipped to the buffer that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl PixelRect {
    pub fn union(self, other: PixelRect) -> PixelRect {
        PixelRect {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }
}

fn merge(a: Option<PixelRect>, b: Option<PixelRect>) -> Option<PixelRect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// The pixel a canvas position lands on. Pixel `i` covers `[i, i + 1)`.
pub fn to_pixel(pos: Pos2) -> (i32, i32) {
    (pos.x.floor() as i32, pos.y.floor() as i32)
}

/// Snap a canvas position to the integer coordinate of its pixel, which the
/// drawing primitives treat as that pixel's center
pub fn snap(pos: Pos2) -> Pos2 {
    let (x, y) = to_pixel(pos);
    pos2(x as f32, y as f32)
}

/// Integer corners of a drag box, normalized so min <= max
fn pixel_corners(bbox: Rect) -> (i32, i32, i32, i32) {
    let (x0, y0) = to_pixel(bbox.min);
    let (x1, y1) = to_pixel(bbox.max);
    (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
}

/// The authoritative pixel grid of the editing session.
///
/// Dimensions are fixed at construction. Every drawing primitive clips to
/// the buffer and reports the (clipped) region it may have touched so the
/// overlay can resynchronize just that area.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    image: RgbImage,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, background),
        }
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        if self.contains(x, y) {
            Some(*self.image.get_pixel(x as u32, y as u32))
        } else {
            None
        }
    }

    /// Returns false when the point lies outside the buffer
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> bool {
        if self.contains(x, y) {
            self.image.put_pixel(x as u32, y as u32, color);
            true
        } else {
            false
        }
    }

    /// Mix `color` into the pixel by `coverage` (0..=1)
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if !self.contains(x, y) {
            return;
        }
        let coverage = coverage.clamp(0.0, 1.0);
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        for (d, s) in dst.0.iter_mut().zip(color.0) {
            let mixed = *d as f32 + (s as f32 - *d as f32) * coverage;
            *d = mixed.round() as u8;
        }
    }

    /// Clip an inclusive rectangle to the buffer
    pub fn clip(&self, min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Option<PixelRect> {
        if self.width() == 0 || self.height() == 0 {
            return None;
        }
        let rect = PixelRect {
            min_x: min_x.max(0),
            min_y: min_y.max(0),
            max_x: max_x.min(self.width() as i32 - 1),
            max_y: max_y.min(self.height() as i32 - 1),
        };
        (rect.min_x <= rect.max_x && rect.min_y <= rect.max_y).then_some(rect)
    }

    /// Lay a segment from `p0` to `p1` down with the given style
    pub fn draw_line(&mut self, p0: Pos2, p1: Pos2, brush: Brush, style: LineStyle) -> Option<PixelRect> {
        let mut phase = 0.0;
        self.draw_stroke(p0, p1, brush, style, &mut phase)
    }

    /// Like [`PixelBuffer::draw_line`], but the dot/dash pattern starts
    /// `phase` pixels in and `phase` is advanced by the segment length, so a
    /// polyline drawn segment by segment keeps one continuous pattern.
    pub fn draw_stroke(
        &mut self,
        p0: Pos2,
        p1: Pos2,
        brush: Brush,
        style: LineStyle,
        phase: &mut f32,
    ) -> Option<PixelRect> {
        match style {
            LineStyle::Solid => self.stroke_segment(p0, p1, brush, true),
            LineStyle::Dotted => {
                let step = dot_step(brush);
                let dirty = self.dotted_segment(p0, p1, brush, *phase);
                *phase = (*phase + (p1 - p0).length()) % step;
                dirty
            }
            LineStyle::Dashed(pattern) => {
                let dirty = self.dashed_segment(p0, p1, brush, pattern, *phase);
                let period = (pattern.draw + pattern.gap) as f32;
                if period > 0.0 {
                    *phase = (*phase + (p1 - p0).length()) % period;
                }
                dirty
            }
        }
    }

    /// Capsule rasterization: every pixel whose center lies within `width / 2`
    /// of the segment. Without caps only pixels projecting onto the segment count.
    fn stroke_segment(&mut self, a: Pos2, b: Pos2, brush: Brush, round_caps: bool) -> Option<PixelRect> {
        let radius = brush.width.max(1) as f32 / 2.0;
        let region = self.clip(
            (a.x.min(b.x) - radius).floor() as i32,
            (a.y.min(b.y) - radius).floor() as i32,
            (a.x.max(b.x) + radius).ceil() as i32,
            (a.y.max(b.y) + radius).ceil() as i32,
        )?;

        let d = b - a;
        let len_sq = d.length_sq();
        for y in region.min_y..=region.max_y {
            for x in region.min_x..=region.max_x {
                let p = pos2(x as f32, y as f32);
                let t = if len_sq > 0.0 { (p - a).dot(d) / len_sq } else { 0.0 };
                if !round_caps && !(0.0..=1.0).contains(&t) {
                    continue;
                }
                let closest = a + d * t.clamp(0.0, 1.0);
                if (p - closest).length_sq() <= radius * radius {
                    self.image.put_pixel(x as u32, y as u32, brush.color);
                }
            }
        }
        Some(region)
    }

    fn dotted_segment(&mut self, a: Pos2, b: Pos2, brush: Brush, phase: f32) -> Option<PixelRect> {
        let len = (b - a).length();
        if len == 0.0 {
            return None;
        }
        let dir: Vec2 = (b - a) / len;
        let step = dot_step(brush);

        let mut dirty = None;
        let mut dist = (step - phase % step) % step;
        while dist <= len {
            let center = a + dir * dist;
            dirty = merge(dirty, self.stroke_segment(center, center, brush, true));
            dist += step;
        }
        dirty
    }

    fn dashed_segment(&mut self, a: Pos2, b: Pos2, brush: Brush, pattern: DashPattern, phase: f32) -> Option<PixelRect> {
        if pattern.draw == 0 {
            return None;
        }
        if pattern.gap == 0 {
            return self.stroke_segment(a, b, brush, true);
        }
        let len = (b - a).length();
        if len == 0.0 {
            return None;
        }
        let dir: Vec2 = (b - a) / len;
        let period = (pattern.draw + pattern.gap) as f32;
        let offset = phase % period;

        // Dash k covers [k * period, k * period + draw] in pattern space
        let mut dirty = None;
        let mut dash_start = 0.0;
        while dash_start - offset < len {
            let start = (dash_start - offset).max(0.0);
            let end = (dash_start + pattern.draw as f32 - offset).min(len);
            if end > start {
                dirty = merge(dirty, self.stroke_segment(a + dir * start, a + dir * end, brush, false));
            }
            dash_start += period;
        }
        dirty
    }

    /// Ellipse inscribed in `bbox` (corners inclusive)
    pub fn draw_ellipse(&mut self, bbox: Rect, brush: Brush, filled: bool) -> Option<PixelRect> {
        let (x0, y0, x1, y1) = pixel_corners(bbox);
        let region = self.clip(x0, y0, x1, y1)?;

        let cx = (x0 + x1) as f32 / 2.0;
        let cy = (y0 + y1) as f32 / 2.0;
        let rx = (x1 - x0) as f32 / 2.0 + 0.5;
        let ry = (y1 - y0) as f32 / 2.0 + 0.5;
        let inner_rx = rx - brush.width as f32;
        let inner_ry = ry - brush.width as f32;
        let hollow = !filled && inner_rx > 0.0 && inner_ry > 0.0;

        for y in region.min_y..=region.max_y {
            for x in region.min_x..=region.max_x {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                if (dx / rx).powi(2) + (dy / ry).powi(2) > 1.0 {
                    continue;
                }
                if hollow && (dx / inner_rx).powi(2) + (dy / inner_ry).powi(2) < 1.0 {
                    continue;
                }
                self.image.put_pixel(x as u32, y as u32, brush.color);
            }
        }
        Some(region)
    }

    /// Axis-aligned rectangle whose outline grows inward from `bbox`
    pub fn draw_rectangle(&mut self, bbox: Rect, brush: Brush, filled: bool) -> Option<PixelRect> {
        let (x0, y0, x1, y1) = pixel_corners(bbox);
        let region = self.clip(x0, y0, x1, y1)?;
        let w = brush.width.max(1) as i32;

        for y in region.min_y..=region.max_y {
            for x in region.min_x..=region.max_x {
                let on_border = x < x0 + w || x > x1 - w || y < y0 + w || y > y1 - w;
                if filled || on_border {
                    self.image.put_pixel(x as u32, y as u32, brush.color);
                }
            }
        }
        Some(region)
    }

    /// Closed polygon; when filled the interior uses the even-odd rule
    pub fn draw_polygon(&mut self, points: &[Pos2], brush: Brush, filled: bool) -> Option<PixelRect> {
        let mut dirty = None;
        if filled && points.len() >= 3 {
            let bounds = Rect::from_points(points);
            let (x0, y0, x1, y1) = pixel_corners(bounds);
            if let Some(region) = self.clip(x0, y0, x1, y1) {
                for y in region.min_y..=region.max_y {
                    for x in region.min_x..=region.max_x {
                        if polygon_contains(points, pos2(x as f32, y as f32)) {
                            self.image.put_pixel(x as u32, y as u32, brush.color);
                        }
                    }
                }
                dirty = Some(region);
            }
        }

        match points {
            [] => {}
            [only] => dirty = merge(dirty, self.stroke_segment(*only, *only, brush, true)),
            _ => {
                for (i, &a) in points.iter().enumerate() {
                    let b = points[(i + 1) % points.len()];
                    dirty = merge(dirty, self.stroke_segment(a, b, brush, true));
                }
            }
        }
        dirty
    }

    /// Overwrite the sub-rectangle starting at `at` with `source`.
    /// The buffer keeps its size; whatever falls outside it is dropped.
    pub fn paste_image(&mut self, source: &RgbImage, at: (i64, i64)) -> Option<PixelRect> {
        image::imageops::replace(&mut self.image, source, at.0, at.1);
        let (x, y) = (at.0 as i32, at.1 as i32);
        self.clip(
            x,
            y,
            x + source.width() as i32 - 1,
            y + source.height() as i32 - 1,
        )
    }
}

/// Distance between dot centers of a dotted stroke
fn dot_step(brush: Brush) -> f32 {
    2.0 * brush.width.max(1) as f32
}

fn polygon_contains(points: &[Pos2], p: Pos2) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::{BLACK, WHITE};

    const RED: Color = image::Rgb([255, 0, 0]);

    fn buffer(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::new(w, h, WHITE)
    }

    fn count(buf: &PixelBuffer, color: Color) -> usize {
        buf.image().pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn test_get_set_pixel_bounds() {
        let mut buf = buffer(4, 3);
        assert!(buf.set_pixel(3, 2, RED));
        assert_eq!(buf.get_pixel(3, 2), Some(RED));
        assert!(!buf.set_pixel(4, 0, RED));
        assert!(!buf.set_pixel(-1, 0, RED));
        assert_eq!(buf.get_pixel(0, 3), None);
    }

    #[test]
    fn test_solid_line_width_one() {
        let mut buf = buffer(20, 20);
        buf.draw_line(pos2(2.0, 5.0), pos2(12.0, 5.0), Brush::new(BLACK, 1), LineStyle::Solid);
        for x in 2..=12 {
            assert_eq!(buf.get_pixel(x, 5), Some(BLACK));
        }
        assert_eq!(buf.get_pixel(1, 5), Some(WHITE));
        assert_eq!(buf.get_pixel(13, 5), Some(WHITE));
        assert_eq!(count(&buf, BLACK), 11);
    }

    #[test]
    fn test_solid_line_has_round_caps() {
        let mut buf = buffer(30, 30);
        buf.draw_line(pos2(10.0, 10.0), pos2(20.0, 10.0), Brush::new(RED, 6), LineStyle::Solid);
        // Cap extends past the endpoint along the axis but not at the corner
        assert_eq!(buf.get_pixel(7, 10), Some(RED));
        assert_eq!(buf.get_pixel(7, 7), Some(WHITE));
        assert_eq!(buf.get_pixel(15, 13), Some(RED));
    }

    #[test]
    fn test_dotted_zero_length_is_noop() {
        let mut buf = buffer(10, 10);
        let dirty = buf.draw_line(pos2(5.0, 5.0), pos2(5.0, 5.0), Brush::new(RED, 3), LineStyle::Dotted);
        assert!(dirty.is_none());
        assert_eq!(count(&buf, RED), 0);
    }

    #[test]
    fn test_dotted_spacing() {
        let mut buf = buffer(40, 10);
        buf.draw_line(pos2(0.0, 5.0), pos2(30.0, 5.0), Brush::new(RED, 2), LineStyle::Dotted);
        // Dots every 4px: centers at 0, 4, 8, ... 28
        for x in (0..=28).step_by(4) {
            assert_eq!(buf.get_pixel(x, 5), Some(RED), "dot at {x}");
        }
        assert_eq!(buf.get_pixel(2, 5), Some(WHITE));
        assert_eq!(buf.get_pixel(30, 5), Some(WHITE));
    }

    #[test]
    fn test_dashed_line_leaves_gaps() {
        let mut buf = buffer(30, 10);
        let style = LineStyle::Dashed(DashPattern::default());
        buf.draw_line(pos2(0.0, 5.0), pos2(20.0, 5.0), Brush::new(BLACK, 1), style);
        for x in 0..=4 {
            assert_eq!(buf.get_pixel(x, 5), Some(BLACK));
        }
        assert_eq!(buf.get_pixel(5, 5), Some(WHITE));
        assert_eq!(buf.get_pixel(6, 5), Some(BLACK));
        assert_eq!(buf.get_pixel(11, 5), Some(WHITE));
    }

    #[test]
    fn test_pattern_continues_across_short_segments() {
        let mut dotted = buffer(30, 10);
        let mut phase = 0.0;
        for x in 0..20 {
            let (a, b) = (pos2(x as f32, 5.0), pos2((x + 1) as f32, 5.0));
            dotted.draw_stroke(a, b, Brush::new(BLACK, 1), LineStyle::Dotted, &mut phase);
        }
        assert_eq!(count(&dotted, BLACK), 11);
        assert_eq!(dotted.get_pixel(1, 5), Some(WHITE));
        assert_eq!(dotted.get_pixel(20, 5), Some(BLACK));

        let mut dashed = buffer(30, 10);
        let mut phase = 0.0;
        for x in 0..24 {
            let (a, b) = (pos2(x as f32, 5.0), pos2((x + 1) as f32, 5.0));
            let style = LineStyle::Dashed(DashPattern::default());
            dashed.draw_stroke(a, b, Brush::new(BLACK, 1), style, &mut phase);
        }
        for x in [5, 11, 17, 23] {
            assert_eq!(dashed.get_pixel(x, 5), Some(WHITE), "gap at {x}");
        }
        assert_eq!(dashed.get_pixel(8, 5), Some(BLACK));
        assert_eq!(count(&dashed, BLACK), 20);
    }

    #[test]
    fn test_positions_map_to_the_pixel_they_fall_in() {
        assert_eq!(to_pixel(pos2(9.6, 4.2)), (9, 4));
        assert_eq!(to_pixel(pos2(0.99, 0.0)), (0, 0));
        assert_eq!(to_pixel(pos2(-0.2, 3.0)), (-1, 3));
        assert_eq!(snap(pos2(2.7, 3.9)), pos2(2.0, 3.0));
    }

    #[test]
    fn test_rectangle_outline_corners() {
        let mut buf = buffer(120, 100);
        let bbox = Rect::from_two_pos(pos2(100.0, 80.0), pos2(10.0, 10.0));
        buf.draw_rectangle(bbox, Brush::new(RED, 3), false);
        assert_eq!(buf.get_pixel(10, 10), Some(RED));
        assert_eq!(buf.get_pixel(100, 80), Some(RED));
        assert_eq!(buf.get_pixel(12, 40), Some(RED));
        assert_eq!(buf.get_pixel(13, 40), Some(WHITE));
        assert_eq!(buf.get_pixel(9, 10), Some(WHITE));
        assert_eq!(buf.get_pixel(101, 80), Some(WHITE));
        assert_eq!(buf.get_pixel(50, 40), Some(WHITE));
    }

    #[test]
    fn test_ellipse_outline_and_fill() {
        let mut outline = buffer(50, 50);
        let bbox = Rect::from_min_max(pos2(10.0, 10.0), pos2(40.0, 30.0));
        outline.draw_ellipse(bbox, Brush::new(RED, 2), false);
        assert_eq!(outline.get_pixel(10, 20), Some(RED));
        assert_eq!(outline.get_pixel(25, 10), Some(RED));
        assert_eq!(outline.get_pixel(25, 20), Some(WHITE));
        assert_eq!(outline.get_pixel(10, 10), Some(WHITE));

        let mut filled = buffer(50, 50);
        filled.draw_ellipse(bbox, Brush::new(RED, 2), true);
        assert_eq!(filled.get_pixel(25, 20), Some(RED));
        assert!(count(&filled, RED) > count(&outline, RED));
    }

    #[test]
    fn test_polygon_fill_even_odd() {
        let mut buf = buffer(30, 30);
        let triangle = [pos2(15.0, 2.0), pos2(28.0, 28.0), pos2(2.0, 28.0)];
        buf.draw_polygon(&triangle, Brush::new(BLACK, 1), true);
        assert_eq!(buf.get_pixel(15, 20), Some(BLACK));
        assert_eq!(buf.get_pixel(3, 3), Some(WHITE));
        assert_eq!(buf.get_pixel(27, 3), Some(WHITE));
    }

    #[test]
    fn test_paste_clips_and_keeps_size() {
        let mut buf = buffer(10, 10);
        let source = RgbImage::from_pixel(6, 6, RED);
        let dirty = buf.paste_image(&source, (7, 7)).unwrap();
        assert_eq!((buf.width(), buf.height()), (10, 10));
        assert_eq!(dirty, PixelRect { min_x: 7, min_y: 7, max_x: 9, max_y: 9 });
        assert_eq!(count(&buf, RED), 9);
        assert_eq!(buf.get_pixel(6, 6), Some(WHITE));
    }

    #[test]
    fn test_blend_pixel() {
        let mut buf = buffer(2, 2);
        buf.blend_pixel(0, 0, BLACK, 0.5);
        assert_eq!(buf.get_pixel(0, 0), Some(image::Rgb([128, 128, 128])));
        buf.blend_pixel(1, 1, RED, 1.0);
        assert_eq!(buf.get_pixel(1, 1), Some(RED));
    }
}
