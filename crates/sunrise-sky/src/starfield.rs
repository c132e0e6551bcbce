//! Star field generation.

use std::cell::Cell;

use glam::Vec2;
use rand::Rng;

use crate::color::{Color, RED, WHITE, YELLOW, lighter};
use crate::viewport::ViewportExtent;

/// Sun radius at the default 1024-pixel width; star sizes scale relative to it.
const REFERENCE_SUN_RADIUS: f32 = 34.0;

/// A single star.
#[derive(Clone, Debug)]
pub struct Star {
    /// Position at frame 0, before sky drift.
    pub position: Vec2,
    /// Diameter in pixels.
    pub diameter: f32,
    /// Color at full night.
    pub color: Color,
    draws: Cell<u32>,
}

impl Star {
    /// Create a star that has never been drawn.
    pub fn new(position: Vec2, diameter: f32, color: Color) -> Self {
        Self {
            position,
            diameter,
            color,
            draws: Cell::new(0),
        }
    }

    /// Number of times the compositor has drawn this star.
    pub fn draw_count(&self) -> u32 {
        self.draws.get()
    }

    /// Count one more draw and return the new total. Render-only state.
    pub(crate) fn record_draw(&self) -> u32 {
        let n = self.draws.get().wrapping_add(1);
        self.draws.set(n);
        n
    }
}

/// Palette by index: every 90th star reddish, every 20th yellow, the rest white.
pub fn star_color(index: usize) -> Color {
    if index % 90 == 0 {
        lighter(RED)
    } else if index % 20 == 0 {
        YELLOW
    } else {
        WHITE
    }
}

/// Scatter `count` stars over the viewport.
///
/// Diameters are 1–3 units of a size derived from the sun radius, so stars
/// scale with the window; about one star in `twinkle_odds` gets a bonus.
pub fn generate_stars<R: Rng + ?Sized>(
    rng: &mut R,
    viewport: ViewportExtent,
    count: usize,
    twinkle_odds: u32,
) -> Vec<Star> {
    if viewport.is_empty() {
        return Vec::new();
    }
    let unit = (viewport.sun_radius() / REFERENCE_SUN_RADIUS).max(0.5);
    (0..count)
        .map(|i| {
            let x = rng.random_range(0..viewport.width) as f32;
            let y = rng.random_range(0..viewport.height) as f32;
            let mut diameter = rng.random_range(1..=3u32) as f32 * unit;
            if rng.random_ratio(1, twinkle_odds.max(1)) {
                diameter += 2.0 * unit;
            }
            Star::new(Vec2::new(x, y), diameter, star_color(i))
        })
        .collect()
}
