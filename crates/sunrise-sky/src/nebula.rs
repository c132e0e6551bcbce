//! Background nebula field: a milky-way-like scatter of faint patches.

use glam::Vec2;
use rand::Rng;

use crate::error::SkyError;
use crate::patch::NebulaPatch;
use crate::viewport::ViewportExtent;

/// Scatter `count` patches over the viewport.
///
/// Patches are confined to a horizontal band whose height is re-rolled every
/// `band_period` patches (between a half and a quarter of the viewport), so
/// the field reads as several overlapping streaks rather than uniform noise.
pub fn generate_nebula_field<R: Rng + ?Sized>(
    rng: &mut R,
    viewport: ViewportExtent,
    count: usize,
    band_period: usize,
) -> Result<Vec<NebulaPatch>, SkyError> {
    if viewport.is_empty() {
        return Ok(Vec::new());
    }
    let (w, h) = (viewport.width, viewport.height);
    let period = band_period.max(1);
    let mut band = (h / 3).max(1);
    let mut field = Vec::with_capacity(count);

    for i in 0..count {
        if i % period == 0 {
            band = (h / rng.random_range(2..=4u32)).max(1);
        }
        let x = rng.random_range(0..w);
        let y = rng.random_range(0..band) + (h - band) / 3;
        let width = rng.random_range(0..w) / 100 + 10;
        let height = rng.random_range(0..h) / 100 + 10;
        let threshold = rng.random_range(5..35u8);
        field.push(NebulaPatch::new(
            Vec2::new(x as f32, y as f32),
            width,
            height,
            threshold,
        )?);
    }
    Ok(field)
}
