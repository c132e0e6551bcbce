//! Sun and moon motion along an ellipse inscribed in the viewport.
//!
//! Angles are in degrees, always normalized to `[0, 360)`. Angle 0 and 180
//! sit on the horizon (the vertical middle of the viewport, right and left
//! edge respectively); angles in `[180, 360)` are above it with 270 at the top.

use glam::Vec2;

use crate::viewport::ViewportExtent;

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Smallest separation between two angles, in `[0, 180]`.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = normalize_angle(a - b);
    d.min(360.0 - d)
}

/// Screen position and zenith of a disc of `radius` at `angle`.
///
/// The ellipse is shrunk by `radius` on both axes so the disc stays inside
/// the viewport. Zenith is the elevation above the horizon divided by the
/// vertical semi-axis: 1 at the top of the path, -1 at the bottom.
pub fn orbit_point(angle: f64, viewport: ViewportExtent, radius: f32) -> (Vec2, f64) {
    let half = viewport.size() * 0.5;
    let semi_x = f64::from((half.x - radius).max(0.0));
    let semi_y = f64::from((half.y - radius).max(0.0));
    let rad = angle.to_radians();

    let x = f64::from(half.x) + rad.cos() * semi_x;
    // Screen y grows downward, so positive elevation moves up.
    let elevation = -rad.sin() * semi_y;
    let y = f64::from(half.y) - elevation;
    let zenith = if semi_y > 0.0 { elevation / semi_y } else { 0.0 };

    (Vec2::new(x as f32, y as f32), zenith)
}

/// A sun or moon travelling around the sky.
///
/// Position and zenith are derived from the angle and only change through
/// [`place`](Self::place), [`advance`](Self::advance) or
/// [`rescale`](Self::rescale).
#[derive(Clone, Debug, PartialEq)]
pub struct CelestialBody {
    angle: f64,
    position: Vec2,
    zenith: f64,
    step: f64,
    radius: f32,
}

impl CelestialBody {
    /// Create a body at `angle` that moves `step` degrees per tick.
    pub fn new(angle: f64, step: f64, viewport: ViewportExtent) -> Self {
        let mut body = Self {
            angle: 0.0,
            position: Vec2::ZERO,
            zenith: 0.0,
            step,
            radius: viewport.sun_radius(),
        };
        body.place(angle, viewport);
        body
    }

    /// Current angle in degrees, in `[0, 360)`.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Disc center in screen pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Raw zenith. Slightly outside `[-1, 1]` is possible after a resize.
    pub fn zenith(&self) -> f64 {
        self.zenith
    }

    /// Degrees advanced per tick.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Disc radius in pixels.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Above the horizon, where daylight grows.
    pub fn rising(&self) -> bool {
        (180.0..360.0).contains(&self.angle)
    }

    /// Move to `angle` (normalized) and recompute position and zenith.
    pub fn place(&mut self, angle: f64, viewport: ViewportExtent) {
        self.angle = normalize_angle(angle);
        let (position, zenith) = orbit_point(self.angle, viewport, self.radius);
        self.position = position;
        self.zenith = zenith;
    }

    /// Advance by this body's own step.
    pub fn advance(&mut self, viewport: ViewportExtent) {
        self.advance_by(self.step, viewport);
    }

    /// Advance by an explicit increment.
    pub fn advance_by(&mut self, increment: f64, viewport: ViewportExtent) {
        self.place(self.angle + increment, viewport);
    }

    /// Follow a viewport resize: scale the stored position by the size ratio
    /// so the body keeps its relative place until the next tick, and adopt
    /// the new radius.
    pub fn rescale(&mut self, old: ViewportExtent, new: ViewportExtent) {
        if !old.is_empty() {
            self.position.x *= new.width as f32 / old.width as f32;
            self.position.y *= new.height as f32 / old.height as f32;
        }
        self.radius = new.sun_radius();
    }
}
