//! Render surface dimensions.

use glam::Vec2;

/// Default surface size.
pub const DEFAULT_VIEWPORT: ViewportExtent = ViewportExtent::new(1024, 768);

/// Width and height of the render surface in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewportExtent {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ViewportExtent {
    /// Create an extent.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A minimized window reports a zero-sized surface.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size as a float vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Sun (and moon) radius for this surface.
    ///
    /// A thirtieth of the width in whole pixels, corrected for aspect ratios
    /// other than 4:3.
    pub fn sun_radius(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let aspect = self.height as f32 / self.width as f32;
        (self.width / 30) as f32 * (aspect / 0.75)
    }
}

impl Default for ViewportExtent {
    fn default() -> Self {
        DEFAULT_VIEWPORT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sun_radius_at_default_size() {
        assert!((DEFAULT_VIEWPORT.sun_radius() - 34.0).abs() < 1e-4);
    }

    #[test]
    fn test_sun_radius_floors_width() {
        let vp = ViewportExtent::new(800, 600);
        assert!((vp.sun_radius() - 26.0).abs() < 1e-4);
    }

    #[test]
    fn test_sun_radius_aspect_correction() {
        // 16:9 shrinks the disc relative to 4:3.
        let vp = ViewportExtent::new(1280, 720);
        let expected = 42.0 * ((720.0 / 1280.0) / 0.75);
        assert!((vp.sun_radius() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_empty_viewport() {
        assert!(ViewportExtent::new(0, 768).is_empty());
        assert_eq!(ViewportExtent::new(1024, 0).sun_radius(), 0.0);
    }
}
