use gridclaim_shared::config::{MAX_ZOOM, MIN_ZOOM};
use gridclaim_shared::{ImageBounds, Point};

/// Pan/zoom transform from image pixels to canvas CSS pixels.
///
/// Zoom levels follow the tiling-map convention `scale = 2^zoom`, so zoom 0
/// shows one image pixel per CSS pixel and every +1 doubles the magnification.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

const ZOOM_SENSITIVITY: f64 = 0.002;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

fn min_scale() -> f64 {
    MIN_ZOOM.exp2()
}

fn max_scale() -> f64 {
    MAX_ZOOM.exp2()
}

impl Viewport {
    pub fn zoom(&self) -> f64 {
        self.scale.log2()
    }

    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            wx * self.scale + self.offset_x,
            wy * self.scale + self.offset_y,
        )
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64) -> Point {
        Point::new(
            (sx - self.offset_x) / self.scale,
            (sy - self.offset_y) / self.scale,
        )
    }

    /// Zoom toward a focus point (screen coordinates).
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = (-delta * ZOOM_SENSITIVITY).exp();
        let new_scale = (self.scale * factor).clamp(min_scale(), max_scale());
        let ratio = new_scale / self.scale;

        // Keep the image pixel under the cursor fixed.
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Show the whole image, centered.
    pub fn fit_image(&mut self, image: ImageBounds, canvas_w: f64, canvas_h: f64) {
        let world_w = image.width() as f64;
        let world_h = image.height() as f64;
        if canvas_w <= 0.0 || canvas_h <= 0.0 {
            return;
        }

        let scale_x = canvas_w / world_w;
        let scale_y = canvas_h / world_h;
        self.scale = scale_x.min(scale_y).clamp(min_scale(), max_scale());
        self.center_on(image.center(), canvas_w, canvas_h);
    }

    /// Put `point` at the middle of the canvas without changing zoom.
    pub fn center_on(&mut self, point: Point, canvas_w: f64, canvas_h: f64) {
        self.offset_x = canvas_w / 2.0 - point.x * self.scale;
        self.offset_y = canvas_h / 2.0 - point.y * self.scale;
    }

    /// Stop panning once the view center leaves the image.
    pub fn clamp_to_image(&mut self, image: ImageBounds, canvas_w: f64, canvas_h: f64) {
        let center = self.screen_to_world(canvas_w / 2.0, canvas_h / 2.0);
        let clamped = Point::new(
            center.x.clamp(0.0, image.width() as f64),
            center.y.clamp(0.0, image.height() as f64),
        );
        if clamped != center {
            self.center_on(clamped, canvas_w, canvas_h);
        }
    }
}

#[cfg(test)]
mod tests {
    use gridclaim_shared::{ImageBounds, Point};

    use super::Viewport;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-9,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    fn image(w: u32, h: u32) -> ImageBounds {
        ImageBounds::new(w, h).expect("non-zero bounds")
    }

    #[test]
    fn zoom_is_log2_of_scale() {
        let mut vp = Viewport::default();
        assert_close(vp.zoom(), 0.0);
        vp.scale = 0.25;
        assert_close(vp.zoom(), -2.0);
        vp.scale = 1.5;
        assert_close(vp.zoom(), 1.5f64.log2());
    }

    #[test]
    fn screen_world_roundtrip() {
        let vp = Viewport {
            offset_x: 40.0,
            offset_y: -12.0,
            scale: 0.5,
        };
        let (sx, sy) = vp.world_to_screen(300.0, 80.0);
        let back = vp.screen_to_world(sx, sy);
        assert_close(back.x, 300.0);
        assert_close(back.y, 80.0);
    }

    #[test]
    fn zoom_at_keeps_focus_point_fixed() {
        let mut vp = Viewport::default();
        let before = vp.screen_to_world(200.0, 150.0);
        vp.zoom_at(-300.0, 200.0, 150.0);
        let after = vp.screen_to_world(200.0, 150.0);
        assert!(vp.scale > 1.0);
        assert_close(after.x, before.x);
        assert_close(after.y, before.y);
    }

    #[test]
    fn zoom_is_clamped_to_range() {
        let mut vp = Viewport::default();
        vp.zoom_at(1e6, 0.0, 0.0);
        assert_close(vp.zoom(), -2.0);
        vp.zoom_at(-1e6, 0.0, 0.0);
        assert_close(vp.zoom(), 6.0);
    }

    #[test]
    fn fit_image_centers_whole_image() {
        let mut vp = Viewport::default();
        vp.fit_image(image(2000, 1000), 1000.0, 800.0);
        assert_close(vp.scale, 0.5);
        let center = vp.screen_to_world(500.0, 400.0);
        assert_close(center.x, 1000.0);
        assert_close(center.y, 500.0);
    }

    #[test]
    fn center_on_keeps_zoom() {
        let mut vp = Viewport {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 2.0,
        };
        vp.center_on(Point::new(1200.0, 800.0), 1000.0, 600.0);
        assert_close(vp.scale, 2.0);
        let center = vp.screen_to_world(500.0, 300.0);
        assert_close(center.x, 1200.0);
        assert_close(center.y, 800.0);
    }

    #[test]
    fn clamp_pulls_center_back_inside_image() {
        let mut vp = Viewport::default();
        vp.center_on(Point::new(-500.0, 300.0), 800.0, 600.0);
        vp.clamp_to_image(image(1000, 1000), 800.0, 600.0);
        let center = vp.screen_to_world(400.0, 300.0);
        assert_close(center.x, 0.0);
        assert_close(center.y, 300.0);
    }
}
