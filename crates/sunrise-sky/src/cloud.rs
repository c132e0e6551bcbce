//! Clouds: drifting groups of translucent flocks.

use std::cell::Cell;
use std::ops::Range;

use glam::Vec2;
use rand::Rng;

use crate::error::SkyError;
use crate::patch::NebulaPatch;
use crate::viewport::ViewportExtent;

/// Opacity range of cloud flocks. Flock opacity doubles as the point in the
/// fade-in at which the flock appears.
pub const FLOCK_THRESHOLDS: Range<u8> = 5..35;

/// A cloud and the flocks that make up its body.
#[derive(Debug)]
pub struct CloudMass {
    /// Top-left corner at frame 0, before drift.
    pub position: Vec2,
    /// Bounding box width.
    pub width: u32,
    /// Bounding box height.
    pub height: u32,
    /// Drift speed factor; the cloud moves `speed * frame / 2` pixels.
    pub speed: f32,
    flocks: Vec<NebulaPatch>,
    dissolve: Cell<f64>,
}

impl CloudMass {
    /// Build a cloud at `(x, y)` of size `width × height`.
    ///
    /// Flock count grows with both the horizontal position and the width.
    /// Flocks avoid the four corner fifths of the box so the outline stays
    /// rounded.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<Self, SkyError> {
        let speed = 0.5 * rng.random_range(1..=3u32) as f32;
        let (w, h) = (width.max(1), height.max(1));
        let flock_count = (u64::from(x) * u64::from(w) / 400) as usize;
        let (cw, ch) = (w / 5, h / 5);

        let mut flocks = Vec::with_capacity(flock_count);
        for _ in 0..flock_count {
            let (fx, fy) = loop {
                let fx = rng.random_range(0..w);
                let fy = rng.random_range(0..h);
                let left = fx < cw;
                let right = fx > w - cw;
                let top = fy < ch;
                let bottom = fy > h - ch;
                if !((left || right) && (top || bottom)) {
                    break (fx, fy);
                }
            };
            let fw = rng.random_range(0..(w / 10).max(1)) + 5;
            let fh = rng.random_range(0..(h / 10).max(1)) + 5;
            let threshold = rng.random_range(FLOCK_THRESHOLDS);
            flocks.push(NebulaPatch::new(
                Vec2::new(fx as f32, fy as f32),
                fw,
                fh,
                threshold,
            )?);
        }

        Ok(Self {
            position: Vec2::new(x as f32, y as f32),
            width: w,
            height: h,
            speed,
            flocks,
            dissolve: Cell::new(1.0),
        })
    }

    /// All flocks, positioned relative to the cloud.
    pub fn flocks(&self) -> &[NebulaPatch] {
        &self.flocks
    }

    /// Dissolve factor for the current frame. Render-only state.
    pub fn dissolve(&self) -> f64 {
        self.dissolve.get()
    }

    /// Push this frame's dissolve factor.
    pub fn set_dissolve(&self, dissolve: f64) {
        self.dissolve.set(dissolve.clamp(0.0, 1.0));
    }

    /// Flocks dense enough to show at the current dissolve factor.
    pub fn visible_flocks(&self) -> impl Iterator<Item = &NebulaPatch> {
        let cutoff = 256.0 * self.dissolve.get();
        self.flocks
            .iter()
            .filter(move |f| f64::from(f.threshold) > cutoff)
    }
}

/// Place between `min` and `max` (inclusive) clouds in the band above the
/// horizon, sized relative to the sun radius.
pub fn generate_clouds<R: Rng + ?Sized>(
    rng: &mut R,
    viewport: ViewportExtent,
    min: usize,
    max: usize,
) -> Result<Vec<CloudMass>, SkyError> {
    if viewport.is_empty() {
        return Ok(Vec::new());
    }
    let (w, h) = (viewport.width, viewport.height);
    let sun_radius = viewport.sun_radius() as u32;
    let band = (h / 3).max(1);
    let count = rng.random_range(min.min(max)..=max);

    (0..count)
        .map(|_| {
            let x = rng.random_range(0..w);
            let y = rng.random_range(0..band) + (h - band) / 3;
            let width = rng.random_range(0..(w / 5).max(1)) + 4 * sun_radius;
            CloudMass::generate(&mut *rng, x, y, width, width / 2)
        })
        .collect()
}
